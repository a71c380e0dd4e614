//! Index maintainers
//!
//! Each maintainer derives back-pointer records from a post at write time.
//! A post save runs them in a fixed order after the primary record:
//!
//! 1. [`UserPostIndex`]: `userpost-<username>-<time>`
//! 2. [`HashtagMentionIndex`]: `<#tag>-<time>-<username>`, then `<@name>-...`
//! 3. [`WordIndex`]: `word-<word>-<time>-<username>`
//!
//! Entries are plain upserts holding an [`IndexRecord`]. Nothing here ever
//! deletes an entry; readers skip entries whose post is gone.

mod tag;
mod user_post;
mod word;

pub use tag::HashtagMentionIndex;
pub use user_post::UserPostIndex;
pub use word::WordIndex;

use forumdb_core::{IndexRecord, Post, Result};

use crate::database::WritePlan;

/// Derives index entries for one post
pub trait IndexMaintainer: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Index keys this maintainer derives from `post`, in write order
    fn index_keys(&self, post: &Post) -> Vec<String>;

    /// Append this maintainer's writes for `post` to `plan`
    fn plan(&self, post: &Post, post_key: &str, plan: &mut WritePlan) -> Result<()> {
        let record = IndexRecord::new(post_key);
        for key in self.index_keys(post) {
            plan.put(key, &record)?;
        }
        Ok(())
    }
}

/// Maintainers in write order
pub fn maintainers() -> [&'static dyn IndexMaintainer; 3] {
    [&UserPostIndex, &HashtagMentionIndex, &WordIndex]
}

/// Every index key a save of `post` writes, in write order
pub fn all_index_keys(post: &Post) -> Vec<String> {
    maintainers()
        .iter()
        .flat_map(|m| m.index_keys(post))
        .collect()
}
