//! Token extraction for the derived indexes
//!
//! Three extractors feed the index maintainers:
//! - words: lowercase, split on anything but alphanumerics and `_`,
//!   keep tokens longer than 2 characters that do not start with a digit
//! - hashtags: as words but `#` is kept, tokens must start with `#` and carry
//!   a body of at least 3 characters that does not start with a digit
//! - mentions: `@` is kept, tokens must start with `@`, no further filter
//!
//! Every extractor deduplicates its output, keeping the first occurrence.
//! None of the produced tokens can contain the key separator.

use std::collections::HashSet;

fn split_lowercase(text: &str, keep: impl Fn(char) -> bool) -> impl Iterator<Item = String> {
    let lower = text.to_lowercase();
    lower
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || keep(c)))
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect::<Vec<_>>()
        .into_iter()
}

fn unique(tokens: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens.filter(|t| seen.insert(t.clone())).collect()
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_numeric())
}

/// Indexable words of a message, in first-occurrence order
///
/// # Example
///
/// ```
/// use forumdb_core::tokens::words;
///
/// assert_eq!(words("Hi there, 3rd World world!"), vec!["there", "world"]);
/// ```
pub fn words(text: &str) -> Vec<String> {
    unique(
        split_lowercase(text, |_| false)
            .filter(|w| w.chars().count() > 2 && !starts_with_digit(w)),
    )
}

/// Hashtags of a message (`#` included), in first-occurrence order
///
/// ```
/// use forumdb_core::tokens::hashtags;
///
/// assert_eq!(hashtags("#Rust and #go #2024 #rust"), vec!["#rust"]);
/// ```
pub fn hashtags(text: &str) -> Vec<String> {
    unique(split_lowercase(text, |c| c == '#').filter(|t| {
        t.strip_prefix('#')
            .is_some_and(|body| body.chars().count() >= 3 && !starts_with_digit(body))
    }))
}

/// Mentions of a message (`@` included), in first-occurrence order
pub fn mentions(text: &str) -> Vec<String> {
    unique(split_lowercase(text, |c| c == '@').filter(|t| t.starts_with('@')))
}

/// Search terms of a query string, using the word rules
///
/// Returns an empty list when the query holds no indexable word.
pub fn search_terms(text: &str) -> Vec<String> {
    words(text)
}
