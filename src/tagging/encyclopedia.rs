use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::policy::{is_stopword, LOOKUP_RESULTS};
use crate::config::LookupConfig;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

const USER_AGENT: &str = concat!("tagmark/", env!("CARGO_PKG_VERSION"));

/// An external reference service that can be searched for article titles.
///
/// Lookups are advisory: implementations return an empty list on any failure
/// instead of an error.
#[async_trait]
pub trait TagSuggestionSource: Send + Sync {
    /// Titles of the best matching articles for `query`, best first.
    async fn lookup(&self, query: &str) -> Vec<String>;
}

/// Source used when lookups are disabled.
pub struct NoLookup;

#[async_trait]
impl TagSuggestionSource for NoLookup {
    async fn lookup(&self, _query: &str) -> Vec<String> {
        Vec::new()
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
}

#[derive(Deserialize, Default)]
struct SearchResponse {
    #[serde(default)]
    query: SearchQuery,
}

#[derive(Deserialize, Default)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

/// MediaWiki full-text search (`action=query&list=search`).
pub struct WikipediaSource {
    client: Client,
    endpoint: String,
}

impl WikipediaSource {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, LookupError> {
        let limit = LOOKUP_RESULTS.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("srprop", ""),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status()));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .query
            .search
            .into_iter()
            .take(LOOKUP_RESULTS)
            .map(|hit| hit.title)
            .collect())
    }
}

#[async_trait]
impl TagSuggestionSource for WikipediaSource {
    async fn lookup(&self, query: &str) -> Vec<String> {
        match self.search(query).await {
            Ok(titles) => titles,
            Err(e) => {
                tracing::warn!(error = %e, query, "encyclopedia lookup failed");
                Vec::new()
            }
        }
    }
}

/// Words from encyclopedia articles matching `title` that relate to the
/// bookmark's own text.
///
/// An article counts when its title shares a content word with
/// `title`/`description`; it then contributes all of its content words.
pub async fn encyclopedia_tags(
    source: &dyn TagSuggestionSource,
    title: &str,
    description: &str,
) -> Vec<String> {
    if title.trim().is_empty() {
        return Vec::new();
    }

    let results = source.lookup(title).await;
    if results.is_empty() {
        return Vec::new();
    }

    let context_text = format!("{title} {description}").to_lowercase();
    let context: HashSet<&str> = content_words(&context_text).collect();

    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for result in results.iter().take(LOOKUP_RESULTS) {
        if result.contains("(disambiguation)") {
            continue;
        }

        let lower = result.to_lowercase();
        let words: Vec<&str> = content_words(&lower).collect();
        if !words.iter().any(|w| context.contains(w)) {
            continue;
        }

        for word in words {
            if seen.insert(word.to_string()) {
                tags.push(word.to_string());
            }
        }
    }
    tags
}

fn content_words(text: &str) -> impl Iterator<Item = &str> {
    WORD.find_iter(text)
        .map(|m| m.as_str())
        .filter(|w| !is_stopword(w))
}
