//! Rapid Automatic Keyword Extraction.
//!
//! Candidate phrases are maximal runs of content words between stopwords and
//! punctuation. Each word is scored by degree over frequency, and a phrase
//! scores the sum of its words.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use super::policy::is_stopword;

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(?:\s+|$)|\n+").unwrap());
static WORD_OR_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)|[^\w\s]+").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct RankedPhrase {
    pub phrase: String,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct RakeRanker {
    min_words: usize,
    max_words: usize,
    include_repeated: bool,
}

/// A candidate phrase: lowercase words for scoring, surface words for output.
struct Candidate<'a> {
    words: Vec<String>,
    surface: Vec<&'a str>,
}

impl RakeRanker {
    pub fn new(min_words: usize, max_words: usize) -> Self {
        Self {
            min_words,
            max_words,
            include_repeated: true,
        }
    }

    pub fn include_repeated_phrases(mut self, include: bool) -> Self {
        self.include_repeated = include;
        self
    }

    /// Phrases of `text` ranked by descending score. Ties keep first-occurrence order.
    pub fn ranked_phrases(&self, text: &str) -> Vec<RankedPhrase> {
        let candidates = self.candidates(text);

        let mut frequency: HashMap<&str, f64> = HashMap::new();
        let mut degree: HashMap<&str, f64> = HashMap::new();
        for candidate in &candidates {
            let len = candidate.words.len() as f64;
            for word in &candidate.words {
                *frequency.entry(word.as_str()).or_default() += 1.0;
                *degree.entry(word.as_str()).or_default() += len;
            }
        }

        let mut ranked: Vec<RankedPhrase> = candidates
            .iter()
            .map(|candidate| {
                let score = candidate
                    .words
                    .iter()
                    .map(|w| degree[w.as_str()] / frequency[w.as_str()])
                    .sum();
                RankedPhrase {
                    phrase: candidate.surface.join(" "),
                    score,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    fn candidates<'a>(&self, text: &'a str) -> Vec<Candidate<'a>> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();

        for sentence in SENTENCE_BREAK.split(text) {
            let mut current = Candidate {
                words: Vec::new(),
                surface: Vec::new(),
            };

            for token in WORD_OR_PUNCT.captures_iter(sentence) {
                let word = token.get(1).map(|m| m.as_str());
                match word {
                    Some(word) if !is_stopword(&word.to_lowercase()) => {
                        current.words.push(word.to_lowercase());
                        current.surface.push(word);
                    }
                    _ => self.flush(&mut current, &mut out, &mut seen),
                }
            }
            self.flush(&mut current, &mut out, &mut seen);
        }
        out
    }

    fn flush<'a>(
        &self,
        current: &mut Candidate<'a>,
        out: &mut Vec<Candidate<'a>>,
        seen: &mut HashSet<String>,
    ) {
        let candidate = std::mem::replace(
            current,
            Candidate {
                words: Vec::new(),
                surface: Vec::new(),
            },
        );

        let len = candidate.words.len();
        if len < self.min_words || len > self.max_words {
            return;
        }
        if !self.include_repeated && !seen.insert(candidate.words.join(" ")) {
            return;
        }
        out.push(candidate);
    }
}
