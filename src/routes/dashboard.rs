use crate::{auth::AuthenticatedUser, error::AppError, models::project::ProjectStatus, models::task::TaskStatus};
use actix_web::{get, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// System-wide counters shown on the dashboard landing page.
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Active user accounts.
    pub users_count: i64,
    pub projects_count: i64,
    pub tasks_count: i64,
    pub completed_tasks: i64,
    pub active_projects: i64,
}

/// Returns global statistics for the dashboard. Available to any
/// authenticated user.
#[get("/stats")]
pub async fn get_stats(
    pool: web::Data<PgPool>,
    _auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let users_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_active = true")
            .fetch_one(&**pool)
            .await?;

    let (projects_count, active_projects) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = $1) FROM projects",
    )
    .bind(ProjectStatus::Active)
    .fetch_one(&**pool)
    .await?;

    let (tasks_count, completed_tasks) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = $1) FROM tasks",
    )
    .bind(TaskStatus::Done)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(DashboardStats {
        users_count,
        projects_count,
        tasks_count,
        completed_tasks,
        active_projects,
    }))
}
