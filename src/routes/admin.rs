use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::AdminUser;
use crate::error::AppError;
use crate::models::{Bookmark, BookmarkResponse, User, UserResponse};
use crate::AppState;

#[derive(Serialize)]
struct AdminUserView {
    #[serde(flatten)]
    user: UserResponse,
    bookmarks: Vec<BookmarkResponse>,
}

#[derive(Deserialize)]
pub struct StatusForm {
    is_active: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}/status", put(update_status))
}

async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let users: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY created_at ASC")
        .fetch_all(&state.db)
        .await?;

    let mut views = Vec::with_capacity(users.len());
    for user in users {
        let bookmarks: Vec<Bookmark> =
            sqlx::query_as("SELECT * FROM bookmarks WHERE user_id = ? ORDER BY created_at DESC")
                .bind(&user.id)
                .fetch_all(&state.db)
                .await?;

        let bookmarks = BookmarkResponse::load_owned(&state.db, &user, bookmarks).await?;
        views.push(AdminUserView {
            user: user.into(),
            bookmarks,
        });
    }

    Ok(Json(views))
}

async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(form): Json<StatusForm>,
) -> Result<impl IntoResponse, AppError> {
    let user: Option<User> =
        sqlx::query_as("UPDATE users SET is_active = ? WHERE id = ? RETURNING *")
            .bind(form.is_active)
            .bind(&id)
            .fetch_optional(&state.db)
            .await?;

    let user = user.ok_or(AppError::NotFound("User not found"))?;
    tracing::info!(admin_id = %admin.id, user_id = %user.id, is_active = user.is_active, "changed user status");

    Ok(Json(UserResponse::from(user)))
}
