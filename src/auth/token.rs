use crate::error::AppError;
use crate::models::UserRole;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Distinguishes access tokens from refresh tokens inside the claims,
/// so a refresh token can never be used as a bearer credential.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token, the user's unique identifier.
    pub sub: i32,
    /// Role of the user at issuance time, used for authorization checks.
    pub role: UserRole,
    /// Whether this is an access or a refresh token.
    pub token_use: TokenUse,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
}

fn secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::InternalServerError("JWT_SECRET not set".into()))
}

fn access_ttl_minutes() -> i64 {
    std::env::var("ACCESS_TOKEN_TTL_MINUTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30)
}

fn refresh_ttl_days() -> i64 {
    std::env::var("REFRESH_TOKEN_TTL_DAYS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30)
}

fn generate(user_id: i32, role: UserRole, token_use: TokenUse) -> Result<String, AppError> {
    let ttl = match token_use {
        TokenUse::Access => chrono::Duration::minutes(access_ttl_minutes()),
        TokenUse::Refresh => chrono::Duration::days(refresh_ttl_days()),
    };
    let expiration = chrono::Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::InternalServerError("Token expiry overflow".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        role,
        token_use,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret()?.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Generates a short-lived access token for a user.
///
/// The TTL defaults to 30 minutes and can be overridden with
/// `ACCESS_TOKEN_TTL_MINUTES`. Requires `JWT_SECRET` to be set.
pub fn generate_access_token(user_id: i32, role: UserRole) -> Result<String, AppError> {
    generate(user_id, role, TokenUse::Access)
}

/// Generates a long-lived refresh token for a user.
///
/// The TTL defaults to 30 days and can be overridden with
/// `REFRESH_TOKEN_TTL_DAYS`. Requires `JWT_SECRET` to be set.
pub fn generate_refresh_token(user_id: i32, role: UserRole) -> Result<String, AppError> {
    generate(user_id, role, TokenUse::Refresh)
}

fn verify(token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret()?.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Verifies a bearer token and decodes its claims.
///
/// Rejects refresh tokens: only tokens issued as access tokens may
/// authenticate API requests.
///
/// # Returns
/// The decoded `Claims` if the token is valid.
/// `AppError::Unauthorized` if the token is malformed, expired, carries a
/// bad signature, or is a refresh token.
pub fn verify_access_token(token: &str) -> Result<Claims, AppError> {
    let claims = verify(token)?;
    if claims.token_use != TokenUse::Access {
        return Err(AppError::Unauthorized("Invalid token: wrong token use".into()));
    }
    Ok(claims)
}

/// Verifies a refresh token and decodes its claims.
///
/// Rejects access tokens presented to the refresh endpoint.
pub fn verify_refresh_token(token: &str) -> Result<Claims, AppError> {
    let claims = verify(token)?;
    if claims.token_use != TokenUse::Refresh {
        return Err(AppError::Unauthorized("Invalid refresh token".into()));
    }
    Ok(claims)
}
