//! Hashtag and mention index

use forumdb_core::{key, tokens, Post};

use super::IndexMaintainer;

/// One `<token>-<time>-<username>` entry per distinct hashtag, then per
/// distinct mention
#[derive(Debug, Clone, Copy, Default)]
pub struct HashtagMentionIndex;

impl IndexMaintainer for HashtagMentionIndex {
    fn name(&self) -> &'static str {
        "hashtag-mention"
    }

    fn index_keys(&self, post: &Post) -> Vec<String> {
        tokens::hashtags(&post.message)
            .into_iter()
            .chain(tokens::mentions(&post.message))
            .map(|token| key::tag_key(&token, post.time, &post.username))
            .collect()
    }
}
