/// Login gate for routes that require a signed-in user
///
/// [`CurrentUser`] is an extractor: a handler that takes it as an argument
/// is gated. Extraction reads the session cookie, validates the token, and
/// re-loads the user from the database. On any failure — no cookie, bad or
/// expired token, user no longer exists — the request is rejected with a
/// redirect to the login page and the flash message "Login required".
///
/// # Example
///
/// ```no_run
/// use tasklist::auth::middleware::CurrentUser;
///
/// async fn new_task_form(CurrentUser(user): CurrentUser) -> String {
///     format!("signed in as {}", user.email)
/// }
/// ```
use crate::{
    app::AppState,
    auth::session,
    error::AppError,
    flash::{self, Flash},
    models::user::User,
};
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

/// The authenticated user for the current request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Response> {
        let jar = CookieJar::from_headers(&parts.headers);

        match authenticate(state, &jar).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(login_redirect(jar)),
            Err(err) => Err(err.into_response()),
        }
    }
}

/// Resolves the session cookie to a live user, if any
///
/// Invalid or expired tokens are treated as "not signed in", not as errors;
/// only infrastructure failures propagate.
async fn authenticate(state: &AppState, jar: &CookieJar) -> Result<Option<User>, AppError> {
    let Some(cookie) = jar.get(session::SESSION_COOKIE) else {
        return Ok(None);
    };

    let claims = match session::validate_session_token(cookie.value(), state.session_secret()) {
        Ok(claims) => claims,
        Err(_) => return Ok(None),
    };

    let user = User::find_by_id(&state.db, claims.sub).await?;
    Ok(user)
}

fn login_redirect(jar: CookieJar) -> Response {
    let jar = flash::set(jar, Flash::alert("Login required"));
    (jar, Redirect::to("/login")).into_response()
}
