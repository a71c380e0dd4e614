//! Full-text word index

use forumdb_core::{key, tokens, Post};

use super::IndexMaintainer;

/// One `word-<word>-<time>-<username>` entry per distinct word
#[derive(Debug, Clone, Copy, Default)]
pub struct WordIndex;

impl IndexMaintainer for WordIndex {
    fn name(&self) -> &'static str {
        "word"
    }

    fn index_keys(&self, post: &Post) -> Vec<String> {
        tokens::words(&post.message)
            .iter()
            .map(|word| key::word_key(word, post.time, &post.username))
            .collect()
    }
}
