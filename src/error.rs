/// Error handling for the web application
///
/// Handlers return `Result<T, AppError>`. Validation failures are not
/// errors in this sense: they are recovered inside the handler and rendered
/// back into the originating form. `AppError` covers what is left — missing
/// records and infrastructure failures — and converts to a minimal HTML
/// response.
///
/// Authentication and authorization rejections are also not `AppError`s:
/// the gates respond with a redirect plus a flash message instead.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt;

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

/// Unified application error type
#[derive(Debug)]
pub enum AppError {
    /// Requested record does not exist (404)
    NotFound,

    /// Internal failure (500); details are logged, never rendered
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound => write!(f, "Not found"),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "<h1>404 Not Found</h1><p>The page you were looking for doesn't exist.</p>",
            ),
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "<h1>500 Internal Server Error</h1><p>We're sorry, but something went wrong.</p>",
                )
            }
        };

        (status, Html(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            _ => AppError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<crate::auth::password::PasswordError> for AppError {
    fn from(err: crate::auth::password::PasswordError) -> Self {
        AppError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<crate::auth::session::SessionError> for AppError {
    fn from(err: crate::auth::session::SessionError) -> Self {
        AppError::Internal(format!("Session operation failed: {}", err))
    }
}

/// Checks whether a database error is a unique-constraint violation on the
/// named constraint
///
/// Two concurrent submissions with the same title or email can both pass
/// the application-level pre-check; the storage-level unique index rejects
/// the second write and the handler maps that rejection back to the same
/// "has already been taken" message the pre-check would have produced.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .constraint()
            .map(|name| name == constraint)
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(AppError::NotFound.to_string(), "Not found");

        let err = AppError::Internal("boom".to_string());
        assert_eq!(err.to_string(), "Internal error: boom");
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn test_is_unique_violation_ignores_other_errors() {
        assert!(!is_unique_violation(
            &sqlx::Error::RowNotFound,
            "tasks_title_key"
        ));
    }
}
