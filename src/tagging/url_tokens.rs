use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::policy::{is_url_stopword, MIN_URL_TOKEN_LEN};

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\w-]+").unwrap());
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\p{Ll})(\p{Lu})").unwrap());

/// Extract candidate tags from the path of `url`.
///
/// Query string and fragment are ignored. Digits are removed before the path
/// is segmented, so a purely numeric segment yields nothing.
pub fn extract_url_tags(url: &str) -> Vec<String> {
    let path = path_of(url);
    let path = DIGITS.replace_all(&path, "");

    let mut tags = Vec::new();
    for segment in SEGMENT.find_iter(&path) {
        let split = CAMEL_BOUNDARY.replace_all(segment.as_str(), "$1 $2");
        for word in split.split(|c: char| c == '-' || c == ' ') {
            let clean: String = word
                .chars()
                .filter(|c| c.is_alphabetic())
                .flat_map(char::to_lowercase)
                .collect();

            if clean.chars().count() > MIN_URL_TOKEN_LEN && !is_url_stopword(&clean) {
                tags.push(clean);
            }
        }
    }
    tags
}

/// Best-effort path extraction. Never fails: anything the URL parser rejects
/// is treated as a bare path after dropping a `scheme://host` prefix.
fn path_of(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url.trim()) {
        return parsed.path().to_string();
    }

    let raw = url.split(['?', '#']).next().unwrap_or_default();
    match raw.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or_default().to_string(),
        None => raw.to_string(),
    }
}
