use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed and under review.
    Review,
    /// Task is completed.
    Done,
    /// Task was abandoned.
    Cancelled,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<i32>,
    pub actual_hours: Option<i32>,
    /// Kept in sync with `status`: true exactly while the task is `done`.
    pub is_completed: bool,
    pub completion_date: Option<DateTime<Utc>>,
    pub owner_id: i32,
    pub project_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Column list matching the struct fields, for SELECT/RETURNING clauses.
    pub const COLUMNS: &'static str = "id, title, description, status, priority, due_date, \
         estimated_hours, actual_hours, is_completed, completion_date, owner_id, project_id, \
         created_at, updated_at";
}

/// Input structure for creating a task.
/// Contains validation rules for its fields.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task. Must be between 2 and 255 characters.
    #[validate(length(min = 2, max = 255))]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    /// Optional due date for the task.
    pub due_date: Option<DateTime<Utc>>,

    #[validate(range(min = 0, max = 1000))]
    pub estimated_hours: Option<i32>,

    #[validate(range(min = 0, max = 1000))]
    pub actual_hours: Option<i32>,

    /// Project this task belongs to, if any.
    pub project_id: Option<i32>,
}

/// Partial update payload; absent fields keep their current value.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 2, max = 255))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,

    #[validate(range(min = 0, max = 1000))]
    pub estimated_hours: Option<i32>,

    #[validate(range(min = 0, max = 1000))]
    pub actual_hours: Option<i32>,

    pub project_id: Option<i32>,
}

/// Represents query parameters for filtering tasks when listing them.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Filter tasks by status.
    pub status: Option<TaskStatus>,
    /// Filter tasks by priority.
    pub priority: Option<TaskPriority>,
    /// Filter tasks by project.
    pub project_id: Option<i32>,
    /// Search term to filter tasks by title or description (case-insensitive).
    pub search: Option<String>,
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
}

/// Per-user task counters, returned by `/tasks/stats/me` and folded into
/// `/users/me`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskStats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub todo_tasks: i64,
}
