//! Forum post record
//!
//! A post without a parent is a subject (thread root). Replies point at their
//! root through `parent`, and the root keeps the ordered list of reply keys.

use serde::{Deserialize, Serialize};

use super::{is_false, is_zero};
use crate::clock::Clock;
use crate::error::Result;
use crate::key;

/// A post or reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Creation time in seconds
    pub time: i64,
    /// Author
    pub username: String,
    /// Body text
    pub message: String,
    /// Key of the thread root, `None` for subjects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Reply keys in arrival order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    /// Key of the post this one quotes
    #[serde(default, rename = "replyTo", skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    /// Thread closed for new replies
    #[serde(default, skip_serializing_if = "is_false")]
    pub closed: bool,
    /// Soft-deleted by a moderator
    #[serde(default, rename = "isDeleted", skip_serializing_if = "is_false")]
    pub is_deleted: bool,
    /// Private posts (and replies to them) are never indexed
    #[serde(default, rename = "isPrivate", skip_serializing_if = "is_false")]
    pub is_private: bool,
    /// Pinned subjects list first
    #[serde(default, skip_serializing_if = "is_false")]
    pub pinned: bool,
    /// Usernames that reported this post
    #[serde(default, rename = "reportedBy", skip_serializing_if = "Vec::is_empty")]
    pub reported_by: Vec<String>,
    /// View counter
    #[serde(default, rename = "numberOfViews", skip_serializing_if = "is_zero")]
    pub number_of_views: u64,
}

impl Post {
    /// Build a post stamped with the clock's current time.
    ///
    /// Fails with `InvalidInput` if `username` is empty or contains the key
    /// separator.
    pub fn create(clock: &dyn Clock, username: &str, message: &str) -> Result<Self> {
        key::validate_field(username)?;
        Ok(Self::at(clock.now(), username, message))
    }

    /// Build a post with an explicit time, skipping validation
    pub fn at(time: i64, username: &str, message: &str) -> Self {
        Self {
            time,
            username: username.to_string(),
            message: message.to_string(),
            parent: None,
            children: Vec::new(),
            reply_to: None,
            closed: false,
            is_deleted: false,
            is_private: false,
            pinned: false,
            reported_by: Vec::new(),
            number_of_views: 0,
        }
    }

    /// Primary key `post-<time>-<username>`
    pub fn key(&self) -> String {
        key::post_key(self.time, &self.username)
    }

    /// True for thread roots
    pub fn is_subject(&self) -> bool {
        self.parent.is_none()
    }

    /// Key of the thread this post belongs to
    pub fn thread_key(&self) -> String {
        self.parent.clone().unwrap_or_else(|| self.key())
    }

    /// Append a reply key unless already present. Returns true if added.
    pub fn add_child(&mut self, post_key: &str) -> bool {
        if self.children.iter().any(|c| c == post_key) {
            return false;
        }
        self.children.push(post_key.to_string());
        true
    }

    /// Drop a reply key. Returns true if it was present.
    pub fn remove_child(&mut self, post_key: &str) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c != post_key);
        self.children.len() != before
    }

    /// Position of the first occurrence of `post_key` among the replies
    pub fn child_index(&self, post_key: &str) -> Option<usize> {
        self.children.iter().position(|c| c == post_key)
    }

    /// Record a report. Returns false if `username` already reported.
    pub fn add_report(&mut self, username: &str) -> bool {
        if self.reported_by.iter().any(|u| u == username) {
            return false;
        }
        self.reported_by.push(username.to_string());
        true
    }

    /// Case-insensitive substring match on the body
    pub fn message_contains(&self, needle_lowercase: &str) -> bool {
        self.message.to_lowercase().contains(needle_lowercase)
    }
}
