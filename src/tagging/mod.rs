//! Automatic tag suggestion.
//!
//! Three sources feed the suggestion list, in priority order: words from the
//! URL path, keywords from the title and description, and related words from
//! an encyclopedia search. The union is cleaned through [`clean_tags`] and
//! capped at [`policy::MAX_TAGS`].

pub mod encyclopedia;
pub mod keywords;
pub mod policy;
pub mod rake;
pub mod url_tokens;

use std::collections::HashSet;

pub use encyclopedia::{encyclopedia_tags, NoLookup, TagSuggestionSource, WikipediaSource};
pub use keywords::{extract_keywords, extract_priority_terms};
pub use url_tokens::extract_url_tags;

use policy::{is_denylisted, MAX_TAGS, MAX_TAG_LEN, MIN_TAG_LEN};

/// Suggest up to [`MAX_TAGS`] lowercase, distinct tags for a bookmark.
///
/// Never fails. A failing encyclopedia lookup only removes that source's
/// contribution.
pub async fn suggest_tags(
    source: &dyn TagSuggestionSource,
    url: &str,
    title: &str,
    description: &str,
) -> Vec<String> {
    let url_tags = extract_url_tags(url);
    let keyword_tags = extract_keywords(&format!("{title} {description}"));
    let lookup_tags = encyclopedia_tags(source, title, description).await;

    tracing::debug!(
        url_tags = url_tags.len(),
        keyword_tags = keyword_tags.len(),
        lookup_tags = lookup_tags.len(),
        "collected tag candidates"
    );

    let mut tags = clean_tags(url_tags.into_iter().chain(keyword_tags).chain(lookup_tags));
    tags.truncate(MAX_TAGS);
    tags
}

/// Normalise and filter candidate tags, keeping first-occurrence order.
pub fn clean_tags<I, S>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|tag| tag.as_ref().trim().to_lowercase())
        .filter(|tag| is_acceptable(tag))
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

fn is_acceptable(tag: &str) -> bool {
    let len = tag.chars().count();
    if !(MIN_TAG_LEN..=MAX_TAG_LEN).contains(&len) {
        return false;
    }
    if is_denylisted(tag) || looks_like_url(tag) {
        return false;
    }
    if tag.chars().all(char::is_numeric) {
        return false;
    }

    // mostly non-alphabetic strings are noise: "4-2-1", "v1.2.3"
    let alphabetic = tag.chars().filter(|c| c.is_alphabetic()).count();
    alphabetic * 2 >= len
}

fn looks_like_url(tag: &str) -> bool {
    tag.starts_with("http://") || tag.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use proptest::prelude::*;

    struct Titles(Vec<&'static str>);

    #[async_trait]
    impl TagSuggestionSource for Titles {
        async fn lookup(&self, _query: &str) -> Vec<String> {
            self.0.iter().map(|t| t.to_string()).collect()
        }
    }

    #[test]
    fn clean_tags_applies_every_rule() {
        let tags = clean_tags([
            "Berlin", "hidden", "Hidden", "2024", "abc", "a-very-long-tag-that-goes-on", "https://x.io",
            "berlin", "16gb", "1-2-3", "rust",
        ]);
        assert_eq!(tags, vec!["berlin", "16gb", "rust"]);
    }

    #[test]
    fn clean_tags_length_bounds_are_inclusive() {
        let four = "abcd";
        let twenty_four = "abcdefghijklmnopqrstuvwx";
        let twenty_five = "abcdefghijklmnopqrstuvwxy";
        assert_eq!(clean_tags([four, twenty_four, twenty_five]), vec![four, twenty_four]);
    }

    #[tokio::test]
    async fn berlin_article() {
        let source = Titles(vec!["Berlin", "Berlin Wall", "Hidden Gems (film)"]);
        let tags = suggest_tags(
            &source,
            "https://example.com/The-Excursion-in-Berlin",
            "Exploring Berlin's Hidden Gems",
            "A comprehensive guide to the best walking tours and historical excursions in Germany's capital city Berlin",
        )
        .await;

        assert!(tags.contains(&"berlin".to_string()));
        assert!(!tags.contains(&"hidden".to_string()));
        assert!(tags.len() <= MAX_TAGS);
    }

    #[tokio::test]
    async fn output_is_bounded_and_distinct() {
        let source = Titles(vec!["Solar cell", "Perovskite solar cell", "Energy conversion efficiency"]);
        let tags = suggest_tags(
            &source,
            "https://bbc.com/Renewable-Energy-Breakthrough-Report/Solar-Panel-Efficiency-Record-Perovskite",
            "Solar Panel Efficiency Reaches New Record",
            "Scientists develop perovskite solar cells achieving 33.7% energy conversion efficiency in laboratory tests",
        )
        .await;

        assert!(tags.len() <= MAX_TAGS);
        let distinct: HashSet<String> = tags.iter().map(|t| t.to_lowercase()).collect();
        assert_eq!(distinct.len(), tags.len());
        for tag in &tags {
            assert_eq!(tag, &tag.to_lowercase());
            assert!(!is_denylisted(tag));
            assert!(!tag.chars().all(char::is_numeric));
            assert!((MIN_TAG_LEN..=MAX_TAG_LEN).contains(&tag.chars().count()));
        }
    }

    #[tokio::test]
    async fn url_tags_come_first() {
        let tags = suggest_tags(&NoLookup, "https://example.com/rust-async", "Tokio guide", "").await;
        assert_eq!(tags, vec!["rust", "async", "tokio guide"]);
    }

    #[tokio::test]
    async fn failed_lookup_still_yields_local_tags() {
        let tags = suggest_tags(&NoLookup, "https://example.com/sourdough-baking", "", "").await;
        assert_eq!(tags, vec!["sourdough", "baking"]);
    }

    #[tokio::test]
    async fn empty_input_yields_no_tags() {
        assert!(suggest_tags(&NoLookup, "", "", "").await.is_empty());
    }

    fn suggest_blocking(url: &str, title: &str, description: &str) -> Vec<String> {
        let source = Titles(vec!["Berlin Wall", "Rust (programming language)", "Test report"]);
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(suggest_tags(&source, url, title, description))
    }

    fn url_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "https?://[a-z]{1,12}\\.(com|org|io)(/[A-Za-z0-9_%-]{0,24}){0,6}(\\?[a-z=&0-9]{0,12})?",
            "\\PC{0,80}",
        ]
    }

    fn text_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "([A-Za-z0-9'-]{1,14}[ .,!?]{1,2}){0,30}",
            "(Berlin|Rust|TEST|hidden|16GB|use-case|2024|the|of|and|New|Wall| |\\.){0,40}",
            "\\PC{0,200}",
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn suggestions_are_bounded_and_distinct(
            url in url_strategy(),
            title in text_strategy(),
            description in text_strategy(),
        ) {
            let tags = suggest_blocking(&url, &title, &description);

            prop_assert!(tags.len() <= MAX_TAGS);
            let distinct: HashSet<String> = tags.iter().map(|t| t.to_lowercase()).collect();
            prop_assert_eq!(distinct.len(), tags.len());
        }

        #[test]
        fn suggestions_pass_every_filter(
            url in url_strategy(),
            title in text_strategy(),
            description in text_strategy(),
        ) {
            for tag in suggest_blocking(&url, &title, &description) {
                let len = tag.chars().count();
                prop_assert!((MIN_TAG_LEN..=MAX_TAG_LEN).contains(&len), "length {} for {:?}", len, tag);
                prop_assert!(!is_denylisted(&tag), "denylisted {:?}", tag);
                prop_assert!(!tag.chars().all(char::is_numeric), "numeric {:?}", tag);
            }
        }

        #[test]
        fn numeric_path_segments_add_nothing(
            host in "[a-z]{1,12}",
            segments in prop::collection::vec("[0-9]{1,8}", 0..6),
        ) {
            let url = format!("https://{host}.com/{}", segments.join("/"));
            prop_assert!(extract_url_tags(&url).is_empty());
        }
    }
}
