use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static NON_ALPHABETIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z\s]").expect("static pattern is valid"));

/// English stopword list used by the classifier's training data.
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren",
    "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn",
    "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

/// Classifier input for a posting: title and description, or the title
/// alone when the description is blank.
pub fn classification_input(title: &str, description: &str) -> String {
    if description.trim().is_empty() {
        title.to_string()
    } else {
        format!("{title} {description}")
    }
}

/// Lowercase, drop everything but ASCII letters and whitespace, tokenize on
/// whitespace, remove stopwords and rejoin with single spaces.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let letters_only = NON_ALPHABETIC.replace_all(&lowered, "");

    letters_only
        .split_whitespace()
        .filter(|token| !STOPWORD_SET.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}
