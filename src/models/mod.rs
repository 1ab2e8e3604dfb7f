pub mod project;
pub mod task;
pub mod user;

pub use project::{Project, ProjectInput, ProjectStats, ProjectUpdate, ProjectWithStats};
pub use task::{Task, TaskInput, TaskQuery, TaskStats, TaskUpdate};
pub use user::{User, UserCreate, UserRole, UserUpdate, UserWithStats};

use serde::Deserialize;

fn default_limit() -> i64 {
    100
}

/// Common `skip`/`limit` query parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Pagination {
    /// Clamps the raw query values into the supported window
    /// (skip >= 0, 1 <= limit <= 100).
    pub fn clamped(&self) -> (i64, i64) {
        (self.skip.max(0), self.limit.clamp(1, 100))
    }
}
