use crate::{
    auth::{hash_password, AuthenticatedUser},
    error::AppError,
    models::{Pagination, User, UserCreate, UserUpdate, UserWithStats},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Retrieves the authenticated user's profile with task statistics.
#[get("/me")]
pub async fn get_me(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        User::COLUMNS
    ))
    .bind(auth.id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let stats = crate::routes::tasks::user_task_stats(&pool, auth.id).await?;

    Ok(HttpResponse::Ok().json(UserWithStats {
        user,
        total_tasks: stats.total_tasks,
        completed_tasks: stats.completed_tasks,
    }))
}

/// Lists all users (admin only), paginated with `skip`/`limit`.
#[get("")]
pub async fn list_users(
    pool: web::Data<PgPool>,
    pagination: web::Query<Pagination>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;

    let (skip, limit) = pagination.clamped();

    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users ORDER BY id OFFSET $1 LIMIT $2",
        User::COLUMNS
    ))
    .bind(skip)
    .bind(limit)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(users))
}

/// Creates a user with an explicit role and active flag (admin only).
#[post("")]
pub async fn create_user(
    pool: web::Data<PgPool>,
    user_data: web::Json<UserCreate>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;
    user_data.validate()?;

    let existing = sqlx::query_as::<_, (i32,)>(
        "SELECT id FROM users WHERE email = $1 OR username = $2",
    )
    .bind(&user_data.email)
    .bind(&user_data.username)
    .fetch_optional(&**pool)
    .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(
            "Email or username already registered".into(),
        ));
    }

    let password_hash = hash_password(&user_data.password)?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, username, full_name, password_hash, role, is_active)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {}",
        User::COLUMNS
    ))
    .bind(&user_data.email)
    .bind(&user_data.username)
    .bind(&user_data.full_name)
    .bind(&password_hash)
    .bind(user_data.role)
    .bind(user_data.is_active)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(user))
}

/// Retrieves a user by ID. Users can only see their own profile, unless
/// they are admins.
#[get("/{id}")]
pub async fn get_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<i32>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();

    if !auth.can_access(user_id) {
        return Err(AppError::Forbidden("Not enough permissions".into()));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        User::COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(&**pool)
    .await?;

    match user {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Updates a user. Users can only update their own profile, unless they are
/// admins; role and active-flag changes require admin privileges.
#[put("/{id}")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<i32>,
    user_data: web::Json<UserUpdate>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;
    let user_id = user_id.into_inner();

    if !auth.can_access(user_id) {
        return Err(AppError::Forbidden("Not enough permissions".into()));
    }

    // Changing role or deactivating accounts is an admin operation even on
    // one's own account; otherwise any user could grant themselves admin.
    if (user_data.role.is_some() || user_data.is_active.is_some()) && !auth.role.is_admin() {
        return Err(AppError::Forbidden(
            "Admin privileges required to change role or active status".into(),
        ));
    }

    // A new email or username must not collide with another account.
    if user_data.email.is_some() || user_data.username.is_some() {
        let conflict: Option<(i32,)> = sqlx::query_as(
            "SELECT id FROM users WHERE (email = $1 OR username = $2) AND id <> $3",
        )
        .bind(&user_data.email)
        .bind(&user_data.username)
        .bind(user_id)
        .fetch_optional(&**pool)
        .await?;

        if conflict.is_some() {
            return Err(AppError::BadRequest(
                "Email or username already registered".into(),
            ));
        }
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users
         SET email = COALESCE($1, email),
             username = COALESCE($2, username),
             full_name = COALESCE($3, full_name),
             is_active = COALESCE($4, is_active),
             role = COALESCE($5, role),
             updated_at = NOW()
         WHERE id = $6
         RETURNING {}",
        User::COLUMNS
    ))
    .bind(&user_data.email)
    .bind(&user_data.username)
    .bind(&user_data.full_name)
    .bind(user_data.is_active)
    .bind(user_data.role)
    .bind(user_id)
    .fetch_optional(&**pool)
    .await?;

    match user {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Deletes a user (admin only).
#[delete("/{id}")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<i32>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;
    let user_id = user_id.into_inner();

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
