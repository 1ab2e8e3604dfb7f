pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{
    generate_access_token, generate_refresh_token, verify_access_token, verify_refresh_token,
    Claims, TokenUse,
};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address. Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// User's password. Must be at least 8 characters long.
    #[validate(length(min = 8))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address for the new account.
    #[validate(email)]
    pub email: String,
    /// Desired username for the new account.
    /// Must be between 3 and 100 characters, alphanumeric, underscores, or hyphens.
    #[validate(
        length(min = 3, max = 100),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Display name for the new account.
    #[validate(length(min = 2, max = 255))]
    pub full_name: String,
    /// Password for the new account. Must be at least 8 characters long.
    #[validate(length(min = 8, max = 100))]
    pub password: String,
}

/// Represents the payload for a token refresh request.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response structure after successful authentication or token refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived JWT used as the bearer credential on API requests.
    pub access_token: String,
    /// Long-lived JWT accepted only by the refresh endpoint.
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenPair {
    /// Issues a fresh access+refresh pair for a user.
    pub fn issue(user_id: i32, role: crate::models::UserRole) -> Result<Self, crate::error::AppError> {
        Ok(Self {
            access_token: generate_access_token(user_id, role)?,
            refresh_token: generate_refresh_token(user_id, role)?,
            token_type: "bearer".to_string(),
        })
    }
}
