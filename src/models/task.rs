/// Task model and database operations
///
/// Tasks are the records users manage through the web forms. Each task is
/// owned by exactly one user; a user has zero or many tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'doing', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     content TEXT,
///     status task_status NOT NULL,
///     deadline TIMESTAMP,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE UNIQUE INDEX tasks_title_key ON tasks (title);
/// ```
///
/// Title uniqueness is global, not per user, and is backed by the
/// `tasks_title_key` index as the last line of defense against concurrent
/// creates racing past the application-level [`Task::title_taken`] check.
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Format accepted from and echoed into the deadline form field
pub const DEADLINE_FIELD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Format used when displaying a deadline on a page
pub const DEADLINE_DISPLAY_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Task progress status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// In progress
    Doing,

    /// Finished
    Done,
}

impl TaskStatus {
    /// All statuses in form-select order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done];

    /// Status as the lowercase string used in forms and pages
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }

    /// Parses a form value, returning `None` for anything outside the enum
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(TaskStatus::Todo),
            "doing" => Some(TaskStatus::Doing),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// Task record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Title, unique across all tasks
    pub title: String,

    /// Optional free-form content
    pub content: Option<String>,

    /// Progress status
    pub status: TaskStatus,

    /// Optional deadline (wall-clock, no zone)
    pub deadline: Option<NaiveDateTime>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub user_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub status: TaskStatus,
    pub deadline: Option<NaiveDateTime>,
}

/// Input for updating a task
#[derive(Debug, Clone)]
pub struct UpdateTask {
    pub title: String,
    pub content: Option<String>,
    pub status: TaskStatus,
    pub deadline: Option<NaiveDateTime>,
}

impl Task {
    /// Creates a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the title already exists (unique constraint
    /// violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, content, status, deadline)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, content, status, deadline, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.content)
        .bind(data.status)
        .bind(data.deadline)
        .fetch_one(pool)
        .await
    }

    /// Finds a task by ID, returning `None` when no such task exists
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, content, status, deadline, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists all tasks, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, content, status, deadline, created_at, updated_at
            FROM tasks
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Lists tasks owned by one user, oldest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, content, status, deadline, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Checks whether another persisted task already holds this title
    ///
    /// `exclude` skips the record being updated.
    pub async fn title_taken(
        pool: &PgPool,
        title: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM tasks
            WHERE title = $1 AND ($2::uuid IS NULL OR id != $2)
            "#,
        )
        .bind(title)
        .bind(exclude)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    /// Updates a task in place
    ///
    /// # Errors
    ///
    /// Returns an error if the new title collides with another task's or
    /// the database is unreachable.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2, content = $3, status = $4, deadline = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, content, status, deadline, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.content)
        .bind(data.status)
        .bind(data.deadline)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a task, returning whether a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deadline as shown on detail and listing pages, e.g. `2020/12/17 22:50`
    pub fn deadline_display(&self) -> String {
        self.deadline
            .map(|d| d.format(DEADLINE_DISPLAY_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// Deadline as echoed back into the form field, e.g. `2020-12-17T22:50:00`
    pub fn deadline_field(&self) -> String {
        self.deadline
            .map(|d| d.format(DEADLINE_FIELD_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// Content with a missing value rendered as an empty string
    pub fn content_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}
