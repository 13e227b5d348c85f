use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl Tag {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_lowercase().trim().to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Trim, lowercase and deduplicate caller-supplied tag names, keeping order.
pub fn normalize_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| name.as_ref().trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Link `names` to a bookmark, creating tag rows that do not exist yet.
///
/// Names must already be normalised. Returns the linked tags in input order.
pub async fn attach_tags(
    conn: &mut SqliteConnection,
    bookmark_id: &str,
    names: &[String],
) -> Result<Vec<Tag>, sqlx::Error> {
    let mut tags = Vec::with_capacity(names.len());

    for name in names {
        let candidate = Tag::new(name.clone());
        sqlx::query("INSERT OR IGNORE INTO tags (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&candidate.id)
            .bind(&candidate.name)
            .bind(&candidate.created_at)
            .execute(&mut *conn)
            .await?;

        let tag: Tag = sqlx::query_as("SELECT * FROM tags WHERE name = ?")
            .bind(&candidate.name)
            .fetch_one(&mut *conn)
            .await?;

        sqlx::query("INSERT OR IGNORE INTO bookmark_tags (bookmark_id, tag_id) VALUES (?, ?)")
            .bind(bookmark_id)
            .bind(&tag.id)
            .execute(&mut *conn)
            .await?;

        tags.push(tag);
    }

    Ok(tags)
}

/// Replace the whole tag set of a bookmark.
pub async fn replace_tags(
    conn: &mut SqliteConnection,
    bookmark_id: &str,
    names: &[String],
) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query("DELETE FROM bookmark_tags WHERE bookmark_id = ?")
        .bind(bookmark_id)
        .execute(&mut *conn)
        .await?;

    attach_tags(conn, bookmark_id, names).await
}

pub async fn tags_for_bookmark<'e, E>(executor: E, bookmark_id: &str) -> Result<Vec<Tag>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as(
        "SELECT t.* FROM tags t JOIN bookmark_tags bt ON bt.tag_id = t.id WHERE bt.bookmark_id = ? ORDER BY t.name",
    )
    .bind(bookmark_id)
    .fetch_all(executor)
    .await
}
