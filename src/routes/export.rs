use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::tag::tags_for_bookmark;
use crate::models::Bookmark;
use crate::AppState;

/// One bookmark in the export file. `cli::import_bookmarks` reads the same shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportBookmark {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub clicks: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub exported_at: String,
    pub bookmarks: Vec<ExportBookmark>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/export", get(export_data))
}

async fn export_data(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookmarks: Vec<Bookmark> =
        sqlx::query_as("SELECT * FROM bookmarks WHERE user_id = ? ORDER BY created_at")
            .bind(&user.id)
            .fetch_all(&state.db)
            .await?;

    let mut exported = Vec::with_capacity(bookmarks.len());
    for bookmark in bookmarks {
        let tags = tags_for_bookmark(&state.db, &bookmark.id).await?;
        exported.push(ExportBookmark {
            url: bookmark.url,
            title: bookmark.title,
            description: bookmark.description,
            is_private: bookmark.is_private,
            archived: bookmark.archived,
            clicks: bookmark.clicks,
            created_at: Some(bookmark.created_at),
            tags: tags.into_iter().map(|t| t.name).collect(),
        });
    }

    let export = ExportData {
        exported_at: chrono::Utc::now().to_rfc3339(),
        bookmarks: exported,
    };

    let filename = format!("tagmark-export-{}.json", chrono::Local::now().format("%Y-%m-%d"));
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, Json(export)))
}
