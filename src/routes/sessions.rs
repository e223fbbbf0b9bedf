/// Login and logout
///
/// # Endpoints
///
/// - `GET /login` - login form (public; the gate redirects here)
/// - `POST /login` - authenticate and establish a session
/// - `DELETE /logout` - end the session
///
/// Failed logins re-render the form with the submitted email and a single
/// "Invalid email or password" message; whether the email exists is never
/// revealed.
use crate::{
    app::AppState,
    auth::{middleware::CurrentUser, password, session},
    error::AppResult,
    flash::{self, Flash},
    models::user::User,
};
use askama::Template;
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

/// Submitted login credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,
}

#[derive(Template)]
#[template(path = "sessions/login.html")]
struct LoginTemplate {
    flash: Option<Flash>,
    email: String,
}

/// `GET /login` - login form
pub async fn login_form(jar: CookieJar) -> Response {
    let (jar, flash) = flash::take(jar);
    (
        jar,
        LoginTemplate {
            flash,
            email: String::new(),
        },
    )
        .into_response()
}

/// `POST /login` - authenticate and establish a session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let user = User::find_by_email(&state.db, &form.email).await?;

    let verified = match &user {
        Some(user) => password::verify_password(&form.password, &user.password_hash)?,
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        let (jar, _) = flash::take(jar);
        return Ok((
            jar,
            LoginTemplate {
                flash: Some(Flash::alert("Invalid email or password")),
                email: form.email,
            },
        )
            .into_response());
    };

    let token = session::create_session_token(
        &session::SessionClaims::new(user.id),
        state.session_secret(),
    )?;
    let jar = jar.add(session::session_cookie(token));
    let jar = flash::set(jar, Flash::notice("Logged in successfully."));

    Ok((jar, Redirect::to("/tasks")).into_response())
}

/// `DELETE /logout` - end the session
pub async fn logout(CurrentUser(_user): CurrentUser, jar: CookieJar) -> Response {
    let jar = jar.remove(session::clear_session_cookie());
    let jar = flash::set(jar, Flash::notice("Logged out successfully."));
    (jar, Redirect::to("/tasks")).into_response()
}
