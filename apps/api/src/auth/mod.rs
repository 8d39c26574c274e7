//! Credential issuance and verification.
//!
//! Bearer tokens are HS256 JWTs over a shared secret, encoding the user id
//! and role with a 7-hour expiry. The `AuthUser` extractor verifies the
//! token and resolves it to the current user row, so handlers always see a
//! live record (a deleted account cannot keep using an old token).

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Role, UserRecord};
use crate::state::AppState;

pub const TOKEN_TTL_HOURS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub role: Role,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

pub fn issue_token(user: &UserRecord, secret: &str) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id,
        role: user.role,
        exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("token signing failed: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
}

/// The authenticated caller, loaded fresh from storage on every request.
pub struct AuthUser(pub UserRecord);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("no token, access denied".to_string()))?;

        let claims = verify_token(token, &state.config.jwt_secret)?;

        let user = state
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(AuthUser(user))
    }
}
