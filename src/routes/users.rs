/// Sign-up and profile pages
///
/// # Endpoints
///
/// - `GET /sign_up` - sign-up form (public)
/// - `POST /users` - create account (public; signs the new user in)
/// - `GET /users/:id` - profile page
/// - `GET /users/:id/edit` - profile edit form (owner only)
/// - `PATCH /users/:id` - profile update (owner only)
///
/// Profile edit and update are self-only: a signed-in user reaching for
/// another user's edit path is sent back to their own profile with the
/// flash message "Forbidden access.". Submitted password fields are never
/// echoed back into a re-rendered form.
use crate::{
    app::AppState,
    auth::{middleware::CurrentUser, password, session},
    error::{is_unique_violation, AppError, AppResult},
    flash::{self, Flash},
    models::{
        task::Task,
        user::{CreateUser, User},
    },
    routes::RecordId,
    validation::{ErrorSummary, TAKEN},
};
use askama::Template;
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Sign-up form; password presence is required on create
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(length(min = 1, message = "can't be blank"))]
    #[serde(default)]
    pub email: String,

    #[validate(length(min = 1, message = "can't be blank"))]
    #[serde(default)]
    pub password: String,

    #[validate(must_match(other = "password", message = "doesn't match Password"))]
    #[serde(default)]
    pub password_confirmation: String,
}

impl SignUpForm {
    const FIELD_ORDER: &'static [&'static str] = &["email", "password", "password_confirmation"];

    fn check(&self) -> ErrorSummary {
        let mut summary = ErrorSummary::new("user");
        if let Err(errors) = self.validate() {
            summary.extend_from(&errors, Self::FIELD_ORDER);
        }
        summary
    }
}

/// Profile edit form; a blank password leaves the credentials unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, message = "can't be blank"))]
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    #[validate(must_match(other = "password", message = "doesn't match Password"))]
    #[serde(default)]
    pub password_confirmation: String,
}

impl ProfileForm {
    const FIELD_ORDER: &'static [&'static str] = &["email", "password_confirmation"];

    fn check(&self) -> ErrorSummary {
        let mut summary = ErrorSummary::new("user");
        if let Err(errors) = self.validate() {
            summary.extend_from(&errors, Self::FIELD_ORDER);
        }
        summary
    }
}

#[derive(Template)]
#[template(path = "users/sign_up.html")]
struct SignUpTemplate {
    flash: Option<Flash>,
    email: String,
    errors: ErrorSummary,
}

#[derive(Template)]
#[template(path = "users/show.html")]
struct ShowTemplate {
    flash: Option<Flash>,
    user_id: Uuid,
    user_email: String,
    task_count_message: String,
    tasks: Vec<Task>,
}

#[derive(Template)]
#[template(path = "users/edit.html")]
struct EditTemplate {
    flash: Option<Flash>,
    user_id: Uuid,
    email: String,
    errors: ErrorSummary,
}

/// `GET /sign_up` - sign-up form
pub async fn sign_up_form(jar: CookieJar) -> Response {
    render_sign_up(jar, String::new(), ErrorSummary::new("user"))
}

/// `POST /users` - create account
///
/// A successful sign-up establishes a session for the new user and lands
/// on their profile page with "User was successfully created.".
pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignUpForm>,
) -> AppResult<Response> {
    let mut errors = form.check();
    if !form.email.is_empty() && User::email_taken(&state.db, &form.email, None).await? {
        errors.add("email", TAKEN);
    }
    if !errors.is_empty() {
        return Ok(render_sign_up(jar, form.email, errors));
    }

    let password_hash = password::hash_password(&form.password)?;

    match User::create(
        &state.db,
        CreateUser {
            email: form.email.clone(),
            password_hash,
        },
    )
    .await
    {
        Ok(user) => {
            let token = session::create_session_token(
                &session::SessionClaims::new(user.id),
                state.session_secret(),
            )?;
            let jar = jar.add(session::session_cookie(token));
            let jar = flash::set(jar, Flash::notice("User was successfully created."));
            Ok((jar, Redirect::to(&format!("/users/{}", user.id))).into_response())
        }
        // Lost the race against a concurrent sign-up with the same email
        Err(err) if is_unique_violation(&err, "users_email_key") => {
            errors.add("email", TAKEN);
            Ok(render_sign_up(jar, form.email, errors))
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /users/:id` - profile page
///
/// Shows the owning user's task count and each task's title and status.
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    RecordId(id): RecordId,
    jar: CookieJar,
) -> AppResult<Response> {
    let user = if id == current.id {
        current
    } else {
        User::find_by_id(&state.db, id)
            .await?
            .ok_or(AppError::NotFound)?
    };

    let tasks = Task::list_by_user(&state.db, user.id).await?;
    let (jar, flash) = flash::take(jar);

    Ok((
        jar,
        ShowTemplate {
            flash,
            user_id: user.id,
            user_email: user.email,
            task_count_message: task_count_message(tasks.len()),
            tasks,
        },
    )
        .into_response())
}

/// `GET /users/:id/edit` - profile edit form, owner only
pub async fn edit(
    CurrentUser(current): CurrentUser,
    RecordId(id): RecordId,
    jar: CookieJar,
) -> Response {
    if id != current.id {
        return forbidden_redirect(jar, current.id);
    }
    render_edit(jar, current.id, current.email, ErrorSummary::new("user"))
}

/// `PATCH /users/:id` - profile update, owner only
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    RecordId(id): RecordId,
    jar: CookieJar,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    if id != current.id {
        return Ok(forbidden_redirect(jar, current.id));
    }

    let mut errors = form.check();
    if !form.email.is_empty() && User::email_taken(&state.db, &form.email, Some(current.id)).await?
    {
        errors.add("email", TAKEN);
    }
    if !errors.is_empty() {
        return Ok(render_edit(jar, current.id, form.email, errors));
    }

    let password_hash = if form.password.is_empty() {
        None
    } else {
        Some(password::hash_password(&form.password)?)
    };

    match User::update(&state.db, current.id, &form.email, password_hash.as_deref()).await {
        Ok(Some(user)) => {
            let jar = flash::set(jar, Flash::notice("User was successfully updated."));
            Ok((jar, Redirect::to(&format!("/users/{}", user.id))).into_response())
        }
        Ok(None) => Err(AppError::NotFound),
        Err(err) if is_unique_violation(&err, "users_email_key") => {
            errors.add("email", TAKEN);
            Ok(render_edit(jar, current.id, form.email, errors))
        }
        Err(err) => Err(err.into()),
    }
}

fn task_count_message(count: usize) -> String {
    let noun = if count == 1 { "task" } else { "tasks" };
    format!("You have {} {}.", count, noun)
}

fn forbidden_redirect(jar: CookieJar, current_id: Uuid) -> Response {
    let jar = flash::set(jar, Flash::alert("Forbidden access."));
    (jar, Redirect::to(&format!("/users/{}", current_id))).into_response()
}

fn render_sign_up(jar: CookieJar, email: String, errors: ErrorSummary) -> Response {
    let (jar, flash) = flash::take(jar);
    (
        jar,
        SignUpTemplate {
            flash,
            email,
            errors,
        },
    )
        .into_response()
}

fn render_edit(jar: CookieJar, user_id: Uuid, email: String, errors: ErrorSummary) -> Response {
    let (jar, flash) = flash::take(jar);
    (
        jar,
        EditTemplate {
            flash,
            user_id,
            email,
            errors,
        },
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_blank_email() {
        let form = SignUpForm {
            email: String::new(),
            password: "password".to_string(),
            password_confirmation: "password".to_string(),
        };
        assert_eq!(form.check().full_messages(), vec!["Email can't be blank"]);
    }

    #[test]
    fn test_sign_up_blank_password() {
        let form = SignUpForm {
            email: "tester@example.com".to_string(),
            password: String::new(),
            password_confirmation: String::new(),
        };
        assert_eq!(
            form.check().full_messages(),
            vec!["Password can't be blank"]
        );
    }

    #[test]
    fn test_sign_up_confirmation_mismatch() {
        let form = SignUpForm {
            email: "tester@example.com".to_string(),
            password: "password".to_string(),
            password_confirmation: "different".to_string(),
        };
        assert_eq!(
            form.check().full_messages(),
            vec!["Password confirmation doesn't match Password"]
        );
    }

    #[test]
    fn test_sign_up_valid() {
        let form = SignUpForm {
            email: "tester@example.com".to_string(),
            password: "password".to_string(),
            password_confirmation: "password".to_string(),
        };
        assert!(form.check().is_empty());
    }

    #[test]
    fn test_profile_blank_password_is_allowed() {
        let form = ProfileForm {
            email: "tester@example.com".to_string(),
            password: String::new(),
            password_confirmation: String::new(),
        };
        assert!(form.check().is_empty());
    }

    #[test]
    fn test_task_count_message_pluralizes() {
        assert_eq!(task_count_message(0), "You have 0 tasks.");
        assert_eq!(task_count_message(1), "You have 1 task.");
        assert_eq!(task_count_message(2), "You have 2 tasks.");
    }
}
