use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::policy::{MAX_PHRASE_WORDS, MIN_PHRASE_WORDS, PHRASE_CANDIDATES, PHRASE_SURVIVORS};
use super::rake::RakeRanker;

static PRIORITY_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // acronyms: AI, NASA
        Regex::new(r"\b[A-Z]{2,}\b").unwrap(),
        // sizes and units: 4k, 8gb, 512MB
        Regex::new(r"(?i)\b\d+(?:[kmgt]b?|b)\b").unwrap(),
        // hyphenated pairs: full-frame
        Regex::new(r"(?i)\b[a-z]+-[a-z]+\b").unwrap(),
    ]
});

/// Acronyms, size tokens and hyphenated pairs found in `text`, lowercased,
/// first occurrence first.
pub fn extract_priority_terms(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PRIORITY_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.find_iter(text))
        .map(|m| m.as_str().to_lowercase())
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

/// Priority terms followed by the best ranked phrases of `text`.
///
/// Phrases carrying an uppercase letter are kept as written; other phrases
/// are hyphen-joined.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords = extract_priority_terms(text);

    let ranker =
        RakeRanker::new(MIN_PHRASE_WORDS, MAX_PHRASE_WORDS).include_repeated_phrases(false);
    let phrases = ranker
        .ranked_phrases(text)
        .into_iter()
        .take(PHRASE_CANDIDATES)
        .filter_map(|ranked| {
            if ranked.phrase.chars().any(char::is_uppercase) {
                Some(ranked.phrase)
            } else if ranked.phrase.contains(' ') {
                Some(ranked.phrase.replace(' ', "-"))
            } else {
                None
            }
        })
        .take(PHRASE_SURVIVORS);

    keywords.extend(phrases);
    keywords
}
