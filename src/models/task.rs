use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Freshly created, not yet picked up.
    Pending,
    /// Actively tracked.
    Open,
    /// Task is currently being worked on.
    InProgress,
    /// Waiting on something external.
    Blocked,
    /// Finished.
    Closed,
}

/// Input structure for creating or updating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task. Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    /// An optional description, at most 1000 characters.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Free-form note, at most 1000 characters.
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

/// Payload for the status-change endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: TaskStatus,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub note: Option<String>,
    pub status: TaskStatus,
    /// Soft-delete flag; deleted tasks stay in the table but drop out of
    /// normal listings.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Identifier of the account that owns the task.
    pub owner_id: i32,
}
