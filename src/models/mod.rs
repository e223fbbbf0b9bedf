/// Database models
///
/// - `user`: user accounts (identity and credentials)
/// - `task`: user-owned tasks with status and deadline
pub mod task;
pub mod user;
