use crate::{
    auth::{
        hash_password, verify_password, verify_refresh_token, AuthenticatedUser, LoginRequest,
        RefreshRequest, RegisterRequest, TokenPair,
    },
    error::AppError,
    models::{User, UserRole, UserWithStats},
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates an active account with the `user` role and returns its public
/// representation. Role assignment happens through the admin user endpoint.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;

    // Check if email already exists
    let existing_email = sqlx::query_as::<_, (i32,)>("SELECT id FROM users WHERE email = $1")
        .bind(&register_data.email)
        .fetch_optional(&**pool)
        .await?;
    if existing_email.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    // Check if username already exists
    let existing_username = sqlx::query_as::<_, (i32,)>("SELECT id FROM users WHERE username = $1")
        .bind(&register_data.username)
        .fetch_optional(&**pool)
        .await?;
    if existing_username.is_some() {
        return Err(AppError::BadRequest("Username already taken".into()));
    }

    // Hash password
    let password_hash = hash_password(&register_data.password)?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, username, full_name, password_hash, role, is_active)
         VALUES ($1, $2, $3, $4, $5, true)
         RETURNING {}",
        User::COLUMNS
    ))
    .bind(&register_data.email)
    .bind(&register_data.username)
    .bind(&register_data.full_name)
    .bind(&password_hash)
    .bind(UserRole::User)
    .fetch_one(&**pool)
    .await?;

    log::info!("Registered new user {} ({})", user.id, user.email);

    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Verifies credentials, records the login time, and returns an
/// access+refresh token pair.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    let user = sqlx::query_as::<_, (i32, String, UserRole, bool)>(
        "SELECT id, password_hash, role, is_active FROM users WHERE email = $1",
    )
    .bind(&login_data.email)
    .fetch_optional(&**pool)
    .await?;

    let (user_id, password_hash, role, is_active) = match user {
        Some(row) => row,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    if !verify_password(&login_data.password, &password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    if !is_active {
        return Err(AppError::BadRequest("Inactive user".into()));
    }

    sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(TokenPair::issue(user_id, role)?))
}

/// Refresh the token pair
///
/// Accepts a valid refresh token and rotates it: a new access+refresh pair
/// is issued, keyed to the user's current role. The subject must still
/// exist and be active.
#[post("/refresh")]
pub async fn refresh(
    pool: web::Data<PgPool>,
    refresh_data: web::Json<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    let claims = verify_refresh_token(&refresh_data.refresh_token)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".into()))?;

    let user = sqlx::query_as::<_, (i32, UserRole, bool)>(
        "SELECT id, role, is_active FROM users WHERE id = $1",
    )
    .bind(claims.sub)
    .fetch_optional(&**pool)
    .await?;

    match user {
        Some((user_id, role, true)) => Ok(HttpResponse::Ok().json(TokenPair::issue(user_id, role)?)),
        _ => Err(AppError::Unauthorized("Invalid refresh token".into())),
    }
}

/// Get current user
///
/// Returns the authenticated user's profile together with task counters.
#[get("/me")]
pub async fn me(
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

/// Logout user
///
/// Stateless acknowledgement; tokens stay valid until they expire since
/// there is no server-side denylist in this demo system.
#[post("/logout")]
pub async fn logout(auth: AuthenticatedUser) -> Result<impl Responder, AppError> {
    log::info!("User {} logged out", auth.id);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully logged out"
    })))
}
