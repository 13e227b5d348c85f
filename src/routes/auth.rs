use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::auth::{hash_password, issue_token, verify_password, AuthUser};
use crate::error::AppError;
use crate::models::{Role, User, UserResponse};
use crate::AppState;

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 50;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_EMAIL_LEN: usize = 100;

const ALREADY_REGISTERED: &str = "Username or email already registered";

#[derive(Deserialize)]
pub struct RegisterForm {
    email: String,
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct TokenForm {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct Token {
    access_token: String,
    token_type: &'static str,
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn validate_register_form(form: &RegisterForm) -> HashMap<String, String> {
    let mut errors = HashMap::new();

    let username_len = form.username.trim().chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username_len) {
        errors.insert(
            "username".to_string(),
            format!("Username must be {MIN_USERNAME_LEN} to {MAX_USERNAME_LEN} characters"),
        );
    }

    if !looks_like_email(form.email.trim()) || form.email.len() > MAX_EMAIL_LEN {
        errors.insert("email".to_string(), "Email address is not valid".to_string());
    }

    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(
            "password".to_string(),
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }

    errors
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/token", post(token))
        .route("/users/me", get(me))
}

/// A concurrent registration can win between the check and the insert.
fn conflict_on_unique(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(ALREADY_REGISTERED.to_string())
        }
        other => AppError::Database(other),
    }
}

/// Insert a new account after checking username and email are free.
pub async fn create_account(
    db: &sqlx::SqlitePool,
    user: &User,
) -> Result<(), AppError> {
    let taken: Option<(String,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = ? OR email = ?")
            .bind(&user.username)
            .bind(&user.email)
            .fetch_optional(db)
            .await?;

    if taken.is_some() {
        return Err(AppError::Conflict(ALREADY_REGISTERED.to_string()));
    }

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, hashed_password, is_active, role, created_at, last_login)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.hashed_password)
    .bind(user.is_active)
    .bind(user.role)
    .bind(&user.created_at)
    .bind(&user.last_login)
    .execute(db)
    .await
    .map_err(conflict_on_unique)?;

    tracing::info!(user_id = %user.id, username = %user.username, "registered user");
    Ok(())
}

async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse, AppError> {
    let errors = validate_register_form(&form);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let hashed = hash_password(&form.password, state.auth.bcrypt_cost)?;
    let user = User::new(form.username.trim().to_string(), form.email, hashed, Role::User);
    create_account(&state.db, &user).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

async fn token(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<impl IntoResponse, AppError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(form.username.trim())
        .fetch_optional(&state.db)
        .await?;

    let Some(user) = user else {
        return Err(AppError::Unauthorized("Incorrect username or password"));
    };

    if !verify_password(&form.password, &user.hashed_password)? {
        return Err(AppError::Unauthorized("Incorrect username or password"));
    }
    if !user.is_active {
        return Err(AppError::Forbidden("Inactive user"));
    }

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(&now)
        .bind(&user.id)
        .execute(&state.db)
        .await?;

    let access_token = issue_token(&state.auth, &user.id)?;
    Ok(Json(Token {
        access_token,
        token_type: "bearer",
    }))
}

async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}
