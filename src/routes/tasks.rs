/// Task CRUD pages and actions
///
/// The listing and detail pages are public; the form pages and all writes
/// require a signed-in user (any signed-in user — task ownership is
/// recorded on create but deliberately not enforced on edit or delete).
///
/// # Endpoints
///
/// - `GET /tasks` - listing (public)
/// - `GET /tasks/:id` - detail (public)
/// - `GET /tasks/new` - create form
/// - `POST /tasks` - create
/// - `GET /tasks/:id/edit` - edit form
/// - `PATCH /tasks/:id` - update
/// - `DELETE /tasks/:id` - destroy
///
/// Failed validation re-renders the originating form with the submitted
/// values intact and an error summary; successful writes redirect with a
/// flash message.
use crate::{
    app::AppState,
    auth::middleware::CurrentUser,
    error::{is_unique_violation, AppError, AppResult},
    flash::{self, Flash},
    models::task::{CreateTask, Task, TaskStatus, UpdateTask, DEADLINE_FIELD_FORMAT},
    routes::RecordId,
    validation::{ErrorSummary, TAKEN},
};
use askama::Template;
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::NaiveDateTime;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Submitted task form values, echoed back verbatim on validation failure
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaskForm {
    #[validate(length(min = 1, message = "can't be blank"))]
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[validate(length(min = 1, message = "can't be blank"))]
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub deadline: String,
}

impl TaskForm {
    const FIELD_ORDER: &'static [&'static str] = &["title", "status"];

    /// Runs every field-level check, accumulating all failures
    fn check(&self) -> ErrorSummary {
        let mut summary = ErrorSummary::new("task");

        if let Err(errors) = self.validate() {
            summary.extend_from(&errors, Self::FIELD_ORDER);
        }
        if !self.status.is_empty() && TaskStatus::parse(&self.status).is_none() {
            summary.add("status", "is not included in the list");
        }
        if self.parsed_deadline().is_err() {
            summary.add("deadline", "is invalid");
        }

        summary
    }

    /// Parses the deadline field, accepting the echoed `YYYY-MM-DDTHH:MM:SS`
    /// form as well as the seconds-less value a datetime-local input sends
    fn parsed_deadline(&self) -> Result<Option<NaiveDateTime>, ()> {
        let value = self.deadline.trim();
        if value.is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(value, DEADLINE_FIELD_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
            .map(Some)
            .map_err(|_| ())
    }

    /// Empty content is stored as NULL, not as an empty string
    fn content_value(&self) -> Option<String> {
        if self.content.is_empty() {
            None
        } else {
            Some(self.content.clone())
        }
    }

    fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            content: task.content.clone().unwrap_or_default(),
            status: task.status.as_str().to_string(),
            deadline: task.deadline_field(),
        }
    }
}

#[derive(Template)]
#[template(path = "tasks/index.html")]
struct IndexTemplate {
    flash: Option<Flash>,
    tasks: Vec<Task>,
}

#[derive(Template)]
#[template(path = "tasks/show.html")]
struct ShowTemplate {
    flash: Option<Flash>,
    task: Task,
}

#[derive(Template)]
#[template(path = "tasks/new.html")]
struct NewTemplate {
    flash: Option<Flash>,
    form: TaskForm,
    errors: ErrorSummary,
    statuses: &'static [TaskStatus],
}

#[derive(Template)]
#[template(path = "tasks/edit.html")]
struct EditTemplate {
    flash: Option<Flash>,
    task_id: Uuid,
    form: TaskForm,
    errors: ErrorSummary,
    statuses: &'static [TaskStatus],
}

/// `GET /tasks` - task listing, publicly viewable
pub async fn index(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let tasks = Task::list(&state.db).await?;
    let (jar, flash) = flash::take(jar);
    Ok((jar, IndexTemplate { flash, tasks }).into_response())
}

/// `GET /tasks/:id` - task detail, publicly viewable
pub async fn show(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    jar: CookieJar,
) -> AppResult<Response> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let (jar, flash) = flash::take(jar);
    Ok((jar, ShowTemplate { flash, task }).into_response())
}

/// `GET /tasks/new` - create form
pub async fn new(CurrentUser(_user): CurrentUser, jar: CookieJar) -> Response {
    render_new(jar, TaskForm::default(), ErrorSummary::new("task"))
}

/// `POST /tasks` - create
///
/// On success redirects to the detail page with "Task was successfully
/// created.". On validation failure re-renders the form with all submitted
/// values and the error summary; nothing is persisted.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<TaskForm>,
) -> AppResult<Response> {
    let mut errors = form.check();
    if !form.title.is_empty() && Task::title_taken(&state.db, &form.title, None).await? {
        errors.add("title", TAKEN);
    }
    if !errors.is_empty() {
        return Ok(render_new(jar, form, errors));
    }

    let (Some(status), Ok(deadline)) = (TaskStatus::parse(&form.status), form.parsed_deadline())
    else {
        return Ok(render_new(jar, form, errors));
    };

    match Task::create(
        &state.db,
        CreateTask {
            user_id: user.id,
            title: form.title.clone(),
            content: form.content_value(),
            status,
            deadline,
        },
    )
    .await
    {
        Ok(task) => {
            let jar = flash::set(jar, Flash::notice("Task was successfully created."));
            Ok((jar, Redirect::to(&format!("/tasks/{}", task.id))).into_response())
        }
        // Lost the race against a concurrent create with the same title
        Err(err) if is_unique_violation(&err, "tasks_title_key") => {
            errors.add("title", TAKEN);
            Ok(render_new(jar, form, errors))
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /tasks/:id/edit` - edit form
pub async fn edit(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    RecordId(id): RecordId,
    jar: CookieJar,
) -> AppResult<Response> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(render_edit(
        jar,
        task.id,
        TaskForm::from_task(&task),
        ErrorSummary::new("task"),
    ))
}

/// `PATCH /tasks/:id` - update
///
/// The failure path re-renders the edit form against the same record, so
/// the browser stays on the update target.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    RecordId(id): RecordId,
    jar: CookieJar,
    Form(form): Form<TaskForm>,
) -> AppResult<Response> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut errors = form.check();
    if !form.title.is_empty() && Task::title_taken(&state.db, &form.title, Some(task.id)).await? {
        errors.add("title", TAKEN);
    }
    if !errors.is_empty() {
        return Ok(render_edit(jar, task.id, form, errors));
    }

    let (Some(status), Ok(deadline)) = (TaskStatus::parse(&form.status), form.parsed_deadline())
    else {
        return Ok(render_edit(jar, task.id, form, errors));
    };

    match Task::update(
        &state.db,
        task.id,
        UpdateTask {
            title: form.title.clone(),
            content: form.content_value(),
            status,
            deadline,
        },
    )
    .await
    {
        Ok(Some(updated)) => {
            let jar = flash::set(jar, Flash::notice("Task was successfully updated."));
            Ok((jar, Redirect::to(&format!("/tasks/{}", updated.id))).into_response())
        }
        Ok(None) => Err(AppError::NotFound),
        Err(err) if is_unique_violation(&err, "tasks_title_key") => {
            errors.add("title", TAKEN);
            Ok(render_edit(jar, task.id, form, errors))
        }
        Err(err) => Err(err.into()),
    }
}

/// `DELETE /tasks/:id` - destroy
///
/// Destruction is immediate and one-way; the client-side confirmation
/// prompt lives in the listing template.
pub async fn destroy(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    RecordId(id): RecordId,
    jar: CookieJar,
) -> AppResult<Response> {
    if !Task::delete(&state.db, id).await? {
        return Err(AppError::NotFound);
    }
    let jar = flash::set(jar, Flash::notice("Task was successfully destroyed."));
    Ok((jar, Redirect::to("/tasks")).into_response())
}

fn render_new(jar: CookieJar, form: TaskForm, errors: ErrorSummary) -> Response {
    let (jar, flash) = flash::take(jar);
    (
        jar,
        NewTemplate {
            flash,
            form,
            errors,
            statuses: &TaskStatus::ALL[..],
        },
    )
        .into_response()
}

fn render_edit(jar: CookieJar, task_id: Uuid, form: TaskForm, errors: ErrorSummary) -> Response {
    let (jar, flash) = flash::take(jar);
    (
        jar,
        EditTemplate {
            flash,
            task_id,
            form,
            errors,
            statuses: &TaskStatus::ALL[..],
        },
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, status: &str, deadline: &str) -> TaskForm {
        TaskForm {
            title: title.to_string(),
            content: String::new(),
            status: status.to_string(),
            deadline: deadline.to_string(),
        }
    }

    #[test]
    fn test_check_blank_title() {
        let errors = form("", "todo", "").check();
        assert_eq!(errors.full_messages(), vec!["Title can't be blank"]);
    }

    #[test]
    fn test_check_blank_status() {
        let errors = form("title_test", "", "").check();
        assert_eq!(errors.full_messages(), vec!["Status can't be blank"]);
    }

    #[test]
    fn test_check_unknown_status() {
        let errors = form("title_test", "archived", "").check();
        assert_eq!(
            errors.full_messages(),
            vec!["Status is not included in the list"]
        );
    }

    #[test]
    fn test_check_valid_form() {
        let errors = form("title_test", "todo", "2020-12-17T22:50:00").check();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_parsed_deadline_with_and_without_seconds() {
        let with_seconds = form("t", "todo", "2020-12-17T22:50:00");
        let without_seconds = form("t", "todo", "2020-12-17T22:50");

        assert_eq!(
            with_seconds.parsed_deadline(),
            without_seconds.parsed_deadline()
        );
    }

    #[test]
    fn test_parsed_deadline_empty_is_none() {
        assert_eq!(form("t", "todo", "").parsed_deadline(), Ok(None));
    }

    #[test]
    fn test_parsed_deadline_garbage_is_error() {
        let errors = form("t", "todo", "next tuesday").check();
        assert_eq!(errors.full_messages(), vec!["Deadline is invalid"]);
    }

    #[test]
    fn test_content_value_empty_is_none() {
        assert_eq!(form("t", "todo", "").content_value(), None);

        let mut f = form("t", "todo", "");
        f.content = "content_test".to_string();
        assert_eq!(f.content_value(), Some("content_test".to_string()));
    }
}
