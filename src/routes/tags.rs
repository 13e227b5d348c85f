use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{Bookmark, BookmarkResponse};
use crate::routes::bookmarks::validate_url;
use crate::tagging;
use crate::AppState;

#[derive(Serialize, FromRow)]
struct TagCount {
    name: String,
    count: i64,
}

#[derive(Deserialize)]
pub struct SuggestForm {
    url: String,
    title: Option<String>,
    description: Option<String>,
}

#[derive(Serialize)]
struct Suggestion {
    tags: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags/cloud", get(tag_cloud))
        .route("/tags/suggest", post(suggest))
        .route("/tags/{name}/bookmarks", get(bookmarks_for_tag))
}

async fn tag_cloud(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let tags: Vec<TagCount> = sqlx::query_as(
        r#"
        SELECT t.name, COUNT(bt.bookmark_id) as count
        FROM tags t
        JOIN bookmark_tags bt ON bt.tag_id = t.id
        JOIN bookmarks b ON b.id = bt.bookmark_id
        WHERE b.user_id = ?
        GROUP BY t.id
        ORDER BY t.name ASC
        "#,
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(tags))
}

async fn bookmarks_for_tag(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookmarks: Vec<Bookmark> = sqlx::query_as(
        r#"
        SELECT b.* FROM bookmarks b
        JOIN bookmark_tags bt ON bt.bookmark_id = b.id
        JOIN tags t ON t.id = bt.tag_id
        WHERE b.user_id = ? AND t.name = ?
        ORDER BY b.created_at DESC
        "#,
    )
    .bind(&user.id)
    .bind(name.trim().to_lowercase())
    .fetch_all(&state.db)
    .await?;

    let response = BookmarkResponse::load_owned(&state.db, &user, bookmarks).await?;
    Ok(Json(response))
}

/// Run the tag pipeline without saving anything.
async fn suggest(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Json(form): Json<SuggestForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut errors = HashMap::new();
    validate_url(&form.url, &mut errors);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let tags = tagging::suggest_tags(
        state.tagger.as_ref(),
        form.url.trim(),
        form.title.as_deref().unwrap_or(""),
        form.description.as_deref().unwrap_or(""),
    )
    .await;

    Ok(Json(Suggestion { tags }))
}
