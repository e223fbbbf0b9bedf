/// Route handlers organized by resource
///
/// - `health`: health check endpoint
/// - `tasks`: task CRUD pages and actions
/// - `users`: sign-up and profile pages
/// - `sessions`: login and logout
use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

pub mod health;
pub mod sessions;
pub mod tasks;
pub mod users;

/// UUID path segment identifying a record
///
/// A segment that is not a UUID cannot name any record, so extraction
/// fails with the same 404 page an unknown record gets, not a 400.
#[derive(Debug, Clone, Copy)]
pub struct RecordId(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, AppError> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        Ok(RecordId(id))
    }
}
