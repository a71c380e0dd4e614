//! Per-author index

use forumdb_core::{key, Post};

use super::IndexMaintainer;

/// One `userpost-<username>-<time>` entry per post
#[derive(Debug, Clone, Copy, Default)]
pub struct UserPostIndex;

impl IndexMaintainer for UserPostIndex {
    fn name(&self) -> &'static str {
        "userpost"
    }

    fn index_keys(&self, post: &Post) -> Vec<String> {
        vec![key::user_post_key(&post.username, post.time)]
    }
}
