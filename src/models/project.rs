use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the lifecycle state of a project.
/// Corresponds to the `project_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Project is being planned, no work started.
    Planning,
    /// Work is underway.
    Active,
    /// Work is paused.
    OnHold,
    /// All work finished.
    Completed,
    /// Project was abandoned.
    Cancelled,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Planning
    }
}

/// Represents the priority of a project.
/// Corresponds to the `project_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "project_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for ProjectPriority {
    fn default() -> Self {
        ProjectPriority::Medium
    }
}

/// Represents a project entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub priority: ProjectPriority,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Budget in cents.
    pub budget: Option<i32>,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Column list matching the struct fields, for SELECT/RETURNING clauses.
    pub const COLUMNS: &'static str = "id, name, description, status, priority, start_date, \
         end_date, budget, owner_id, created_at, updated_at";
}

/// Input structure for creating a project.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProjectInput {
    /// The name of the project. Must be between 2 and 255 characters.
    #[validate(length(min = 2, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: ProjectPriority,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub budget: Option<i32>,
}

/// Partial update payload; absent fields keep their current value.
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectUpdate {
    #[validate(length(min = 2, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<ProjectPriority>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub budget: Option<i32>,
}

/// Aggregated task counters for a single project.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    /// Share of completed tasks in percent, rounded to two decimals.
    pub completion_percentage: f64,
}

impl ProjectStats {
    pub fn new(total_tasks: i64, completed_tasks: i64, in_progress_tasks: i64) -> Self {
        let completion_percentage = if total_tasks > 0 {
            (completed_tasks as f64 / total_tasks as f64 * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };
        Self {
            total_tasks,
            completed_tasks,
            in_progress_tasks,
            completion_percentage,
        }
    }
}

/// A project together with its task statistics, returned by `GET /projects/{id}`.
#[derive(Debug, Serialize)]
pub struct ProjectWithStats {
    #[serde(flatten)]
    pub project: Project,
    #[serde(flatten)]
    pub stats: ProjectStats,
}
