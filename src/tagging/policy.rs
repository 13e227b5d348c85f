//! Tag filtering policy.
//!
//! Every list and bound the pipeline consults lives here so that a policy
//! change is a one-line diff.

/// URL path words that describe the page kind rather than its subject.
pub const URL_STOPLIST: &[&str] = &["watch", "video", "product", "article", "tag", "page"];

/// Words never emitted as a suggested tag, regardless of source.
pub const TAG_DENYLIST: &[&str] = &[
    "test", "report", "hidden", "secret", "howto", "page", "based", "new", "use", "basic",
];

/// Upper bound on the number of suggested tags.
pub const MAX_TAGS: usize = 10;

/// Shortest suggested tag, in characters (inclusive).
pub const MIN_TAG_LEN: usize = 4;

/// Longest suggested tag, in characters (inclusive).
pub const MAX_TAG_LEN: usize = 24;

/// URL tokens must be longer than this.
pub const MIN_URL_TOKEN_LEN: usize = 2;

/// Phrase length bounds for the ranked phrase pass, in words.
pub const MIN_PHRASE_WORDS: usize = 2;
pub const MAX_PHRASE_WORDS: usize = 3;

/// Ranked phrases considered before filtering, and kept after.
pub const PHRASE_CANDIDATES: usize = 7;
pub const PHRASE_SURVIVORS: usize = 5;

/// Encyclopedia search hits consulted per lookup.
pub const LOOKUP_RESULTS: usize = 3;

/// English stopwords (NLTK list). Used as phrase delimiters for the ranked
/// phrase pass and to drop filler words from encyclopedia titles.
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
    "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it", "it's",
    "its", "itself", "they", "them", "their", "theirs", "themselves", "what",
    "which", "who", "whom", "this", "that", "that'll", "these", "those", "am", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about",
    "against", "between", "into", "through", "during", "before", "after", "above",
    "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some",
    "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very",
    "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn",
    "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn",
    "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't",
    "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
    "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

pub fn is_stopword(word: &str) -> bool {
    ENGLISH_STOPWORDS.contains(&word)
}

pub fn is_denylisted(tag: &str) -> bool {
    TAG_DENYLIST.contains(&tag)
}

pub fn is_url_stopword(token: &str) -> bool {
    URL_STOPLIST.contains(&token)
}
