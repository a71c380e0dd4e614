//! Shared test utilities for the forum integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use forumdb::{
    Forum, ForumConfig, ForumDb, ManualClock, MemoryStore, OrderedStore, Post, ScanRequest,
    UserStatus,
};
use tempfile::TempDir;

static INIT_TRACING: Once = Once::new();

/// Install a fmt subscriber that writes through the test harness.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Seconds used as the first timestamp of every test forum.
///
/// Ten digits, so every time a test produces sorts numerically.
pub const START_TIME: i64 = 1_700_000_000;

// ============================================================================
// TestForum - in-memory forum with a manual clock
// ============================================================================

/// In-memory forum whose clock only moves when a helper moves it
pub struct TestForum {
    pub forum: Forum,
    pub clock: Arc<ManualClock>,
}

impl TestForum {
    pub fn new() -> Self {
        init_tracing();
        let clock = Arc::new(ManualClock::new(START_TIME));
        let db = ForumDb::with_store(
            Arc::new(MemoryStore::new()),
            clock.clone(),
            ForumConfig::default(),
        );
        Self {
            forum: Forum::from_db(db),
            clock,
        }
    }

    /// Save a subject one second after the previous write
    pub fn post(&self, username: &str, message: &str) -> Post {
        self.clock.advance(1);
        let post = self.forum.posts().create(username, message).unwrap();
        let report = self.forum.posts().save(&post).unwrap();
        assert!(report.is_complete());
        post
    }

    /// Reply to `parent` one second after the previous write
    pub fn reply(&self, parent: &Post, username: &str, message: &str) -> Post {
        self.clock.advance(1);
        self.forum
            .posts()
            .reply(&parent.key(), username, message)
            .unwrap()
            .0
    }

    /// Register `username` if needed and set their status
    pub fn set_status(&self, username: &str, status: UserStatus) {
        let users = self.forum.users();
        if !users.username_exists(username) {
            users.register(username, "hash").unwrap();
        }
        users.set_status(username, status).unwrap();
    }

    /// Re-read a post, panicking if it is gone
    pub fn reload(&self, post: &Post) -> Post {
        self.forum.posts().get(&post.key()).unwrap()
    }
}

/// Every key currently in the store, in key order
pub fn all_keys(forum: &Forum) -> Vec<String> {
    forum
        .database()
        .store()
        .scan_keys(&ScanRequest::forward(""), usize::MAX)
        .unwrap()
}

/// Message bodies, for compact assertions
pub fn bodies(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.message.as_str()).collect()
}

/// On-disk forum in a fresh temp directory
pub fn disk_forum(config: ForumConfig) -> (Forum, TempDir) {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let forum = Forum::open_with_config(dir.path(), config).unwrap();
    (forum, dir)
}
