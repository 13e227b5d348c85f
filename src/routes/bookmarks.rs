use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::tag::{attach_tags, normalize_names, replace_tags};
use crate::models::{Bookmark, BookmarkResponse};
use crate::tagging;
use crate::AppState;

pub(crate) const BOOKMARK_NOT_FOUND: &str = "Bookmark not found";

const MAX_URL_LEN: usize = 500;
const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 500;
const MIN_TAG_NAME_LEN: usize = 2;
const MAX_TAG_NAME_LEN: usize = 50;

const DEFAULT_POPULAR_LIMIT: i64 = 10;
const MAX_POPULAR_LIMIT: i64 = 50;

#[derive(Deserialize)]
pub struct BookmarkCreate {
    url: String,
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    is_private: bool,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct BookmarkUpdate {
    title: Option<String>,
    description: Option<String>,
    is_private: Option<bool>,
    archived: Option<bool>,
    tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    archived: Option<bool>,
}

#[derive(Deserialize)]
pub struct PopularQuery {
    limit: Option<i64>,
}

#[derive(Serialize, FromRow)]
struct PopularBookmark {
    id: String,
    title: Option<String>,
    url: String,
    clicks: i64,
}

pub(crate) fn validate_url(url: &str, errors: &mut HashMap<String, String>) {
    let url = url.trim();
    if url.is_empty() {
        errors.insert("url".to_string(), "URL is required".to_string());
    } else if url.chars().count() > MAX_URL_LEN {
        errors.insert("url".to_string(), format!("URL must be at most {MAX_URL_LEN} characters"));
    }
}

fn validate_text(
    title: Option<&str>,
    description: Option<&str>,
    errors: &mut HashMap<String, String>,
) {
    if title.is_some_and(|t| t.chars().count() > MAX_TITLE_LEN) {
        errors.insert("title".to_string(), format!("Title must be at most {MAX_TITLE_LEN} characters"));
    }
    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN) {
        errors.insert(
            "description".to_string(),
            format!("Description must be at most {MAX_DESCRIPTION_LEN} characters"),
        );
    }
}

/// Whether `name` fits the tag length limits accepted by the API.
pub(crate) fn valid_tag_name(name: &str) -> bool {
    (MIN_TAG_NAME_LEN..=MAX_TAG_NAME_LEN).contains(&name.chars().count())
}

fn validate_tag_names(names: &[String], errors: &mut HashMap<String, String>) {
    if !names.iter().all(|name| valid_tag_name(name)) {
        errors.insert(
            "tags".to_string(),
            format!("Tag names must be {MIN_TAG_NAME_LEN} to {MAX_TAG_NAME_LEN} characters"),
        );
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookmarks", get(list_bookmarks).post(create_bookmark))
        .route("/bookmarks/", get(list_bookmarks).post(create_bookmark))
        .route("/bookmarks/popular", get(popular_bookmarks))
        .route(
            "/bookmarks/{id}",
            get(get_bookmark).put(update_bookmark).delete(delete_bookmark),
        )
        .route("/bookmarks/{id}/click", post(increment_click))
}

/// The bookmark `id` if it belongs to `user_id`.
///
/// Every owner-scoped read and mutation goes through here, so a bookmark owned
/// by someone else is indistinguishable from a missing one.
pub(crate) async fn fetch_owned_bookmark(
    db: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Bookmark, AppError> {
    let bookmark: Option<Bookmark> =
        sqlx::query_as("SELECT * FROM bookmarks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(db)
            .await?;

    bookmark.ok_or(AppError::NotFound(BOOKMARK_NOT_FOUND))
}

async fn list_bookmarks(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let bookmarks: Vec<Bookmark> = sqlx::query_as(
        r#"
        SELECT * FROM bookmarks
        WHERE user_id = ? AND (? IS NULL OR archived = ?)
        ORDER BY created_at DESC
        "#,
    )
    .bind(&user.id)
    .bind(query.archived)
    .bind(query.archived)
    .fetch_all(&state.db)
    .await?;

    let response = BookmarkResponse::load_owned(&state.db, &user, bookmarks).await?;
    Ok(Json(response))
}

async fn get_bookmark(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookmark = fetch_owned_bookmark(&state.db, &id, &user.id).await?;
    Ok(Json(BookmarkResponse::load(&state.db, bookmark).await?))
}

async fn create_bookmark(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(form): Json<BookmarkCreate>,
) -> Result<impl IntoResponse, AppError> {
    let supplied = normalize_names(&form.tags);

    let mut errors = HashMap::new();
    validate_url(&form.url, &mut errors);
    validate_text(form.title.as_deref(), form.description.as_deref(), &mut errors);
    validate_tag_names(&supplied, &mut errors);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let bookmark = Bookmark::new(
        user.id.clone(),
        form.url.trim().to_string(),
        form.title,
        form.description,
        form.is_private,
    );

    let tag_names = if supplied.is_empty() {
        let suggested = tagging::suggest_tags(
            state.tagger.as_ref(),
            &bookmark.url,
            bookmark.title.as_deref().unwrap_or(""),
            bookmark.description.as_deref().unwrap_or(""),
        )
        .await;
        tracing::info!(bookmark_id = %bookmark.id, tags = ?suggested, "auto-tagged bookmark");
        suggested
    } else {
        supplied
    };

    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO bookmarks (id, user_id, url, title, description, is_private, clicks, archived, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&bookmark.id)
    .bind(&bookmark.user_id)
    .bind(&bookmark.url)
    .bind(&bookmark.title)
    .bind(&bookmark.description)
    .bind(bookmark.is_private)
    .bind(bookmark.clicks)
    .bind(bookmark.archived)
    .bind(&bookmark.created_at)
    .execute(&mut *tx)
    .await?;

    let tags = attach_tags(&mut tx, &bookmark.id, &tag_names).await?;
    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(BookmarkResponse::from_parts(bookmark, user, tags)),
    ))
}

async fn update_bookmark(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(form): Json<BookmarkUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let mut bookmark = fetch_owned_bookmark(&state.db, &id, &user.id).await?;

    let tag_names = form.tags.as_deref().map(normalize_names);

    let mut errors = HashMap::new();
    validate_text(form.title.as_deref(), form.description.as_deref(), &mut errors);
    if let Some(names) = &tag_names {
        validate_tag_names(names, &mut errors);
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if let Some(title) = form.title {
        bookmark.title = Some(title);
    }
    if let Some(description) = form.description {
        bookmark.description = Some(description);
    }
    if let Some(is_private) = form.is_private {
        bookmark.is_private = is_private;
    }
    if let Some(archived) = form.archived {
        bookmark.archived = archived;
    }

    let mut tx = state.db.begin().await?;

    sqlx::query(
        "UPDATE bookmarks SET title = ?, description = ?, is_private = ?, archived = ? WHERE id = ?",
    )
    .bind(&bookmark.title)
    .bind(&bookmark.description)
    .bind(bookmark.is_private)
    .bind(bookmark.archived)
    .bind(&bookmark.id)
    .execute(&mut *tx)
    .await?;

    if let Some(names) = &tag_names {
        replace_tags(&mut tx, &bookmark.id, names).await?;
    }
    tx.commit().await?;

    Ok(Json(BookmarkResponse::load(&state.db, bookmark).await?))
}

async fn delete_bookmark(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookmark = fetch_owned_bookmark(&state.db, &id, &user.id).await?;

    sqlx::query("DELETE FROM bookmarks WHERE id = ?")
        .bind(&bookmark.id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Public click counter. The increment is a single statement, so concurrent
/// clicks never overwrite each other.
async fn increment_click(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookmark: Option<Bookmark> =
        sqlx::query_as("UPDATE bookmarks SET clicks = clicks + 1 WHERE id = ? RETURNING *")
            .bind(&id)
            .fetch_optional(&state.db)
            .await?;

    let bookmark = bookmark.ok_or(AppError::NotFound(BOOKMARK_NOT_FOUND))?;
    Ok(Json(BookmarkResponse::load(&state.db, bookmark).await?))
}

async fn popular_bookmarks(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
        .clamp(1, MAX_POPULAR_LIMIT);

    let popular: Vec<PopularBookmark> = sqlx::query_as(
        r#"
        SELECT id, title, url, clicks FROM bookmarks
        WHERE is_private = 0 AND archived = 0
        ORDER BY clicks DESC, created_at DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(popular))
}
