//! Index and flag records

use serde::{Deserialize, Serialize};

/// Value of every derived index entry (user-post, word, hashtag, mention).
///
/// Only the back-pointer is stored; readers dereference it against the post
/// store and treat a miss as a skipped row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecord {
    /// Key of the indexed post
    pub post_key: String,
}

impl IndexRecord {
    /// Point at `post_key`
    pub fn new(post_key: impl Into<String>) -> Self {
        Self {
            post_key: post_key.into(),
        }
    }
}

/// Whether new accounts may register. Absent means open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Registration is open
    pub is_open: bool,
}

impl Default for Registration {
    fn default() -> Self {
        Self { is_open: true }
    }
}
