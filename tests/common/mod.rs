#![allow(dead_code)]

use dotenv::dotenv;
use serde_json::json;
use sqlx::PgPool;

/// Connects to the test database, or returns `None` (skipping the test)
/// when no `DATABASE_URL` is configured in the environment.
pub async fn try_pool() -> Option<PgPool> {
    dotenv().ok();
    if std::env::var("JWT_SECRET").is_err() {
        std::env::set_var("JWT_SECRET", "integration_test_secret");
    }

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping: DATABASE_URL not set");
            return None;
        }
    };

    match PgPool::connect(&database_url).await {
        Ok(pool) => Some(pool),
        Err(e) => {
            eprintln!("skipping: failed to connect to test DB: {}", e);
            None
        }
    }
}

/// Removes a user and everything they own, so tests can re-register the
/// same fixture accounts.
pub async fn cleanup_user(pool: &PgPool, email: &str) {
    let user: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .unwrap_or(None);

    if let Some((user_id,)) = user {
        let _ = sqlx::query("DELETE FROM tasks WHERE owner_id = $1")
            .bind(user_id)
            .execute(pool)
            .await;
        let _ = sqlx::query("DELETE FROM projects WHERE owner_id = $1")
            .bind(user_id)
            .execute(pool)
            .await;
        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(pool)
            .await;
    }
}

/// Calls the service and returns the response status even when the request
/// is rejected by a middleware (which surfaces as a service error rather
/// than a response).
pub async fn call_status(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    req: actix_http::Request,
) -> actix_web::http::StatusCode {
    match actix_web::test::try_call_service(app, req).await {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().error_response().status(),
    }
}

// Helper struct to hold auth details
pub struct TestUser {
    pub id: i32,
    pub token: String,
    pub refresh_token: String,
}

/// Registers a fresh account and logs in, returning the user id and both
/// tokens.
pub async fn register_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    username: &str,
    password: &str,
) -> Result<TestUser, String> {
    use actix_web::test;

    // Register
    let req_register = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": email,
            "username": username,
            "full_name": "Integration Test User",
            "password": password
        }))
        .to_request();
    let resp_register = test::call_service(app, req_register).await;
    let register_status = resp_register.status();
    let register_bytes = test::read_body(resp_register).await;

    if !register_status.is_success() {
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            register_status,
            String::from_utf8_lossy(&register_bytes)
        ));
    }
    let registered: serde_json::Value = serde_json::from_slice(&register_bytes)
        .map_err(|e| format!("Failed to parse registration response: {}", e))?;
    let user_id = registered["id"]
        .as_i64()
        .ok_or("Registration response missing id")? as i32;

    // Login
    let req_login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": email,
            "password": password
        }))
        .to_request();
    let resp_login = test::call_service(app, req_login).await;
    let login_status = resp_login.status();
    let login_bytes = test::read_body(resp_login).await;

    if !login_status.is_success() {
        return Err(format!(
            "Failed to login user. Status: {}. Body: {}",
            login_status,
            String::from_utf8_lossy(&login_bytes)
        ));
    }
    let tokens: projecthub::auth::TokenPair = serde_json::from_slice(&login_bytes)
        .map_err(|e| format!("Failed to parse login response: {}", e))?;

    Ok(TestUser {
        id: user_id,
        token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    })
}
