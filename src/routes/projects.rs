use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{
        task::TaskStatus, Pagination, Project, ProjectInput, ProjectStats, ProjectUpdate,
        ProjectWithStats,
    },
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Retrieves the authenticated user's projects, ordered by creation date
/// descending, paginated with `skip`/`limit`.
#[get("")]
pub async fn get_projects(
    pool: web::Data<PgPool>,
    pagination: web::Query<Pagination>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let (skip, limit) = pagination.clamped();

    let projects = sqlx::query_as::<_, Project>(&format!(
        "SELECT {} FROM projects WHERE owner_id = $1
         ORDER BY created_at DESC OFFSET $2 LIMIT $3",
        Project::COLUMNS
    ))
    .bind(auth.id)
    .bind(skip)
    .bind(limit)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(projects))
}

/// Creates a new project owned by the authenticated user.
#[post("")]
pub async fn create_project(
    pool: web::Data<PgPool>,
    project_data: web::Json<ProjectInput>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    // Validate input
    project_data.validate()?;

    let project = sqlx::query_as::<_, Project>(&format!(
        "INSERT INTO projects (name, description, status, priority, start_date, end_date, budget, owner_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {}",
        Project::COLUMNS
    ))
    .bind(&project_data.name)
    .bind(&project_data.description)
    .bind(project_data.status)
    .bind(project_data.priority)
    .bind(project_data.start_date)
    .bind(project_data.end_date)
    .bind(project_data.budget)
    .bind(auth.id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(project))
}

/// Retrieves a project by its ID together with its task statistics:
/// total, completed, and in-progress task counts plus the completion
/// percentage.
///
/// The authenticated user must own the project; admins may read any.
#[get("/{id}")]
pub async fn get_project(
    pool: web::Data<PgPool>,
    project_id: web::Path<i32>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let project_id = project_id.into_inner();

    let project = sqlx::query_as::<_, Project>(&format!(
        "SELECT {} FROM projects WHERE id = $1",
        Project::COLUMNS
    ))
    .bind(project_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    if !auth.can_access(project.owner_id) {
        return Err(AppError::Forbidden("Not enough permissions".into()));
    }

    let (total_tasks, completed_tasks, in_progress_tasks) =
        sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE is_completed),
                    COUNT(*) FILTER (WHERE status = $2)
             FROM tasks WHERE project_id = $1",
        )
        .bind(project_id)
        .bind(TaskStatus::InProgress)
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(ProjectWithStats {
        project,
        stats: ProjectStats::new(total_tasks, completed_tasks, in_progress_tasks),
    }))
}

/// Updates an existing project. Absent fields keep their current value.
/// Only the owner (or an admin) may update it.
#[put("/{id}")]
pub async fn update_project(
    pool: web::Data<PgPool>,
    project_id: web::Path<i32>,
    project_data: web::Json<ProjectUpdate>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    project_data.validate()?;
    let project_id = project_id.into_inner();

    // First, verify ownership
    let owner = sqlx::query_as::<_, (i32,)>("SELECT owner_id FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    if !auth.can_access(owner.0) {
        return Err(AppError::Forbidden("Not enough permissions".into()));
    }

    let project = sqlx::query_as::<_, Project>(&format!(
        "UPDATE projects
         SET name = COALESCE($1, name),
             description = COALESCE($2, description),
             status = COALESCE($3, status),
             priority = COALESCE($4, priority),
             start_date = COALESCE($5, start_date),
             end_date = COALESCE($6, end_date),
             budget = COALESCE($7, budget),
             updated_at = NOW()
         WHERE id = $8
         RETURNING {}",
        Project::COLUMNS
    ))
    .bind(&project_data.name)
    .bind(&project_data.description)
    .bind(project_data.status)
    .bind(project_data.priority)
    .bind(project_data.start_date)
    .bind(project_data.end_date)
    .bind(project_data.budget)
    .bind(project_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(project))
}

/// Deletes a project by its ID. Tasks keep existing but lose their project
/// link. Only the owner (or an admin) may delete it.
#[delete("/{id}")]
pub async fn delete_project(
    pool: web::Data<PgPool>,
    project_id: web::Path<i32>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let project_id = project_id.into_inner();

    let owner = sqlx::query_as::<_, (i32,)>("SELECT owner_id FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    if !auth.can_access(owner.0) {
        return Err(AppError::Forbidden("Not enough permissions".into()));
    }

    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(project_id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
