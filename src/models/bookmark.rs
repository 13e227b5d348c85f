use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use super::tag::{tags_for_bookmark, Tag};
use super::user::{User, UserResponse};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_private: bool,
    pub clicks: i64,
    pub archived: bool,
    pub created_at: String,
}

impl Bookmark {
    pub fn new(
        user_id: String,
        url: String,
        title: Option<String>,
        description: Option<String>,
        is_private: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            url,
            title,
            description,
            is_private,
            clicks: 0,
            archived: false,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// A bookmark with its owner and tags resolved.
#[derive(Debug, Clone, Serialize)]
pub struct BookmarkResponse {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_private: bool,
    pub clicks: i64,
    pub archived: bool,
    pub created_at: String,
    pub user: UserResponse,
    pub tags: Vec<Tag>,
}

impl BookmarkResponse {
    pub fn from_parts(bookmark: Bookmark, user: User, tags: Vec<Tag>) -> Self {
        Self {
            id: bookmark.id,
            url: bookmark.url,
            title: bookmark.title,
            description: bookmark.description,
            is_private: bookmark.is_private,
            clicks: bookmark.clicks,
            archived: bookmark.archived,
            created_at: bookmark.created_at,
            user: user.into(),
            tags,
        }
    }

    /// Resolve owner and tags for `bookmark`.
    pub async fn load(db: &SqlitePool, bookmark: Bookmark) -> Result<Self, sqlx::Error> {
        let user: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(&bookmark.user_id)
            .fetch_one(db)
            .await?;
        let tags = tags_for_bookmark(db, &bookmark.id).await?;
        Ok(Self::from_parts(bookmark, user, tags))
    }

    /// Resolve tags for bookmarks that all belong to `owner`.
    pub async fn load_owned(
        db: &SqlitePool,
        owner: &User,
        bookmarks: Vec<Bookmark>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut out = Vec::with_capacity(bookmarks.len());
        for bookmark in bookmarks {
            let tags = tags_for_bookmark(db, &bookmark.id).await?;
            out.push(Self::from_parts(bookmark, owner.clone(), tags));
        }
        Ok(out)
    }
}
