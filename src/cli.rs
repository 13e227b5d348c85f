use anyhow::{bail, Context};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::fs;

use crate::auth::hash_password;
use crate::models::tag::{attach_tags, normalize_names};
use crate::models::{Bookmark, Role, User};
use crate::routes::auth::create_account;
use crate::routes::bookmarks::valid_tag_name;
use crate::routes::export::{ExportBookmark, ExportData};
use crate::tagging::{self, TagSuggestionSource};

/// Accept either a full export file or a bare array of bookmarks.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Export(ExportData),
    Bare(Vec<ExportBookmark>),
}

impl ImportFile {
    fn into_bookmarks(self) -> Vec<ExportBookmark> {
        match self {
            ImportFile::Export(data) => data.bookmarks,
            ImportFile::Bare(bookmarks) => bookmarks,
        }
    }
}

/// Import bookmarks for `username` from a JSON file in one transaction.
///
/// With `tagger`, entries without tags are run through the tag pipeline.
pub async fn import_bookmarks(
    pool: &SqlitePool,
    file_path: &str,
    username: &str,
    tagger: Option<&dyn TagSuggestionSource>,
) -> anyhow::Result<usize> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    let Some(user) = user else {
        bail!("User '{username}' not found");
    };

    let content = fs::read_to_string(file_path).with_context(|| format!("reading {file_path}"))?;
    let entries = serde_json::from_str::<ImportFile>(&content)
        .with_context(|| format!("parsing {file_path}"))?
        .into_bookmarks();

    // Tags are settled before the write transaction opens.
    let mut prepared = Vec::with_capacity(entries.len());
    for entry in entries {
        let url = entry.url.trim().to_string();
        if url.is_empty() {
            tracing::warn!("skipping entry without url");
            continue;
        }

        let mut names: Vec<String> = normalize_names(&entry.tags)
            .into_iter()
            .filter(|name| {
                let keep = valid_tag_name(name);
                if !keep {
                    tracing::warn!(url = %url, tag = %name, "skipping tag outside length limits");
                }
                keep
            })
            .collect();

        if names.is_empty() {
            if let Some(tagger) = tagger {
                names = tagging::suggest_tags(
                    tagger,
                    &url,
                    entry.title.as_deref().unwrap_or(""),
                    entry.description.as_deref().unwrap_or(""),
                )
                .await;
            }
        }

        let mut bookmark =
            Bookmark::new(user.id.clone(), url, entry.title, entry.description, entry.is_private);
        bookmark.archived = entry.archived;
        bookmark.clicks = entry.clicks.max(0);
        if let Some(created_at) = entry.created_at {
            bookmark.created_at = created_at;
        }
        prepared.push((bookmark, names));
    }

    let mut tx = pool.begin().await?;
    for (bookmark, names) in &prepared {
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

        attach_tags(&mut tx, &bookmark.id, names).await?;
    }

    tx.commit().await?;

    let imported = prepared.len();
    tracing::info!(imported, username, "import finished");
    Ok(imported)
}

pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
    admin: bool,
    bcrypt_cost: u32,
) -> anyhow::Result<User> {
    let role = if admin { Role::Admin } else { Role::User };
    let hashed = hash_password(password, bcrypt_cost)?;
    let user = User::new(username.to_string(), email.to_string(), hashed, role);

    create_account(pool, &user)
        .await
        .map_err(|e| anyhow::anyhow!("could not create user: {e:?}"))?;

    println!("Created user:");
    println!("  ID: {}", user.id);
    println!("  Username: {}", user.username);
    println!("  Role: {}", user.role);

    Ok(user)
}
