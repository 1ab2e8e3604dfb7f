use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{
        task::TaskStatus, Task, TaskInput, TaskQuery, TaskStats, TaskUpdate,
    },
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Computes the per-user task counters used by `/tasks/stats/me` and the
/// user profile endpoints.
pub(crate) async fn user_task_stats(pool: &PgPool, user_id: i32) -> Result<TaskStats, AppError> {
    let (total_tasks, completed_tasks, in_progress_tasks, todo_tasks) =
        sqlx::query_as::<_, (i64, i64, i64, i64)>(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE is_completed),
                    COUNT(*) FILTER (WHERE status = $2),
                    COUNT(*) FILTER (WHERE status = $3)
             FROM tasks WHERE owner_id = $1",
        )
        .bind(user_id)
        .bind(TaskStatus::InProgress)
        .bind(TaskStatus::Todo)
        .fetch_one(pool)
        .await?;

    Ok(TaskStats {
        total_tasks,
        completed_tasks,
        in_progress_tasks,
        todo_tasks,
    })
}

/// Retrieves a list of tasks owned by the authenticated user.
///
/// Supports filtering by `status`, `priority`, `project_id`, and a `search`
/// term matched case-insensitively against titles and descriptions, plus
/// `skip`/`limit` pagination. Tasks are ordered by creation date descending.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    query_params: web::Query<TaskQuery>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    // Base query scoped to the authenticated user; filter conditions are
    // dynamically appended with sequential bind positions.
    let mut sql = format!(
        "SELECT {} FROM tasks WHERE owner_id = $1",
        Task::COLUMNS
    );
    let mut param_count = 2;

    if query_params.status.is_some() {
        sql.push_str(&format!(" AND status = ${}", param_count));
        param_count += 1;
    }
    if query_params.priority.is_some() {
        sql.push_str(&format!(" AND priority = ${}", param_count));
        param_count += 1;
    }
    if query_params.project_id.is_some() {
        sql.push_str(&format!(" AND project_id = ${}", param_count));
        param_count += 1;
    }
    if query_params.search.is_some() {
        sql.push_str(&format!(
            " AND (title ILIKE ${} OR description ILIKE ${})",
            param_count,
            param_count + 1
        ));
        param_count += 2;
    }

    let skip = query_params.skip.max(0);
    let limit = query_params.limit.unwrap_or(100).clamp(1, 100);
    sql.push_str(&format!(
        " ORDER BY created_at DESC OFFSET ${} LIMIT ${}",
        param_count,
        param_count + 1
    ));

    let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(auth.id);

    if let Some(status) = query_params.status {
        query_builder = query_builder.bind(status);
    }
    if let Some(priority) = query_params.priority {
        query_builder = query_builder.bind(priority);
    }
    if let Some(project_id) = query_params.project_id {
        query_builder = query_builder.bind(project_id);
    }
    if let Some(search) = &query_params.search {
        let search_pattern = format!("%{}%", search);
        query_builder = query_builder.bind(search_pattern.clone());
        query_builder = query_builder.bind(search_pattern);
    }
    query_builder = query_builder.bind(skip).bind(limit);

    let tasks = query_builder.fetch_all(&**pool).await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// Tasks created directly in the `done` status are marked completed with a
/// completion timestamp.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    // Validate input
    task_data.validate()?;

    let is_completed = task_data.status == TaskStatus::Done;

    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (title, description, status, priority, due_date, estimated_hours,
                            actual_hours, is_completed, completion_date, owner_id, project_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CASE WHEN $8 THEN NOW() END, $9, $10)
         RETURNING {}",
        Task::COLUMNS
    ))
    .bind(&task_data.title)
    .bind(&task_data.description)
    .bind(task_data.status)
    .bind(task_data.priority)
    .bind(task_data.due_date)
    .bind(task_data.estimated_hours)
    .bind(task_data.actual_hours)
    .bind(is_completed)
    .bind(auth.id)
    .bind(task_data.project_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// The authenticated user must own the task; admins may read any task.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();

    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1",
        Task::COLUMNS
    ))
    .bind(task_id)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => {
            if !auth.can_access(task.owner_id) {
                Err(AppError::Forbidden("Not enough permissions".into()))
            } else {
                Ok(HttpResponse::Ok().json(task))
            }
        }
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Updates an existing task. Absent fields keep their current value.
///
/// Moving a task into the `done` status marks it completed and stamps the
/// completion date; moving it out of `done` clears both.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskUpdate>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task_id = task_id.into_inner();

    let existing = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1",
        Task::COLUMNS
    ))
    .bind(task_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    if !auth.can_access(existing.owner_id) {
        return Err(AppError::Forbidden("Not enough permissions".into()));
    }

    let new_status = task_data.status.unwrap_or(existing.status);

    // Keep is_completed/completion_date in sync with the status transition.
    let (is_completed, completion_date) = if new_status == TaskStatus::Done {
        if existing.is_completed {
            (true, existing.completion_date)
        } else {
            (true, Some(chrono::Utc::now()))
        }
    } else {
        (false, None)
    };

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = COALESCE($1, title),
             description = COALESCE($2, description),
             status = $3,
             priority = COALESCE($4, priority),
             due_date = COALESCE($5, due_date),
             estimated_hours = COALESCE($6, estimated_hours),
             actual_hours = COALESCE($7, actual_hours),
             project_id = COALESCE($8, project_id),
             is_completed = $9,
             completion_date = $10,
             updated_at = NOW()
         WHERE id = $11
         RETURNING {}",
        Task::COLUMNS
    ))
    .bind(&task_data.title)
    .bind(&task_data.description)
    .bind(new_status)
    .bind(task_data.priority)
    .bind(task_data.due_date)
    .bind(task_data.estimated_hours)
    .bind(task_data.actual_hours)
    .bind(task_data.project_id)
    .bind(is_completed)
    .bind(completion_date)
    .bind(task_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID. Only the owner (or an admin) may delete it.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();

    let owner = sqlx::query_as::<_, (i32,)>("SELECT owner_id FROM tasks WHERE id = $1")
        .bind(task_id)
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    if !auth.can_access(owner.0) {
        return Err(AppError::Forbidden("Not enough permissions".into()));
    }

    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(task_id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Returns the authenticated user's task counters.
#[get("/stats/me")]
pub async fn get_my_stats(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let stats = user_task_stats(&pool, auth.id).await?;
    Ok(HttpResponse::Ok().json(stats))
}
