use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::models::User;
use crate::AppState;

const INVALID_CREDENTIALS: &str = "Could not validate credentials";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Sign a bearer token for `user_id` that expires after the configured TTL.
pub fn issue_token(config: &AuthConfig, user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + config.token_ttl).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

fn verify_token(config: &AuthConfig, token: &str) -> Option<String> {
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            tracing::debug!(error = %e, "rejected bearer token");
            None
        }
    }
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hashed)
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
}

/// The active user named by the request's bearer token.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized("Not authenticated"))?;
        let user_id =
            verify_token(&state.auth, token).ok_or(AppError::Unauthorized(INVALID_CREDENTIALS))?;

        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(&user_id)
            .fetch_optional(&state.db)
            .await?;

        let user = user.ok_or(AppError::Unauthorized(INVALID_CREDENTIALS))?;
        if !user.is_active {
            return Err(AppError::Forbidden("Inactive user"));
        }
        Ok(AuthUser(user))
    }
}

/// An [`AuthUser`] holding the admin role.
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin privileges required"));
        }
        Ok(AdminUser(user))
    }
}
