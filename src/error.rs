use std::collections::HashMap;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Database(sqlx::Error),
    PasswordHash(bcrypt::BcryptError),
    Token(jsonwebtoken::errors::Error),
    NotFound(&'static str),
    Validation(HashMap<String, String>),
    Unauthorized(&'static str),
    Forbidden(&'static str),
    Conflict(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(what) => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": what }))).into_response()
            }
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": errors })),
            )
                .into_response(),
            AppError::Unauthorized(why) => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(json!({ "detail": why })),
            )
                .into_response(),
            AppError::Forbidden(why) => {
                (StatusCode::FORBIDDEN, Json(json!({ "detail": why }))).into_response()
            }
            AppError::Conflict(why) => {
                (StatusCode::CONFLICT, Json(json!({ "detail": why }))).into_response()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                internal_error()
            }
            AppError::PasswordHash(e) => {
                tracing::error!("Password hashing error: {e}");
                internal_error()
            }
            AppError::Token(e) => {
                tracing::error!("Token error: {e}");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "Internal server error" })),
    )
        .into_response()
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::PasswordHash(e)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::Token(e)
    }
}
