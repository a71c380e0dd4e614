//! Query engine
//!
//! Read-only queries over posts, messages and users. Every query walks a key
//! prefix in the ordered store, dereferences index entries against the
//! primary records and returns at most `count` results. Callers infer "has
//! more" from a short page.
//!
//! ## Edge policy
//!
//! - An index entry whose post is gone is skipped.
//! - A position outside a thread's reply list yields an empty page.
//! - Store and decode errors are logged and shorten the page.
//! - Posts by suspended authors never appear in results.
//! - Unbounded scans stop after `[query].max_scan` index rows.

mod search;
mod tags;
mod thread;
mod timeline;
mod users;

use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::debug;

use forumdb_core::{key, IndexRecord, Post, User, UserStatus};
use forumdb_storage::ScanRequest;

use crate::database::{config::DEFAULT_PAGE_SIZE, ForumDb};

/// Stateless query facade over a shared [`ForumDb`]
#[derive(Debug, Clone)]
pub struct ForumQueries {
    db: Arc<ForumDb>,
}

/// Parameters of [`ForumQueries::posts_with_search_text`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    /// Free text; empty lists subjects instead of searching
    pub search_text: String,
    /// Cursor time, `None` for the newest (or oldest) end
    pub time: Option<i64>,
    /// Walk towards older posts
    pub before: bool,
    /// List thread roots instead of individual posts
    pub parents_only: bool,
    /// Include private posts in subject listings
    pub include_private: bool,
    /// Maximum number of results
    pub count: usize,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            time: None,
            before: true,
            parents_only: false,
            include_private: false,
            count: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PostQuery {
    /// Newest-first query returning up to `count` posts
    pub fn new(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Search for posts containing every word of `text`
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    /// Continue from posts older than `time`
    pub fn before(mut self, time: i64) -> Self {
        self.time = Some(time);
        self.before = true;
        self
    }

    /// Continue from posts at or newer than `time`, oldest first
    pub fn after(mut self, time: i64) -> Self {
        self.time = Some(time);
        self.before = false;
        self
    }

    /// List thread roots only
    pub fn parents_only(mut self) -> Self {
        self.parents_only = true;
        self
    }

    /// Include private posts
    pub fn include_private(mut self) -> Self {
        self.include_private = true;
        self
    }
}

/// Memoized author status lookups for the duration of one query
pub(crate) struct Authors<'a> {
    db: &'a ForumDb,
    cache: HashMap<String, Option<UserStatus>>,
}

impl<'a> Authors<'a> {
    pub(crate) fn new(db: &'a ForumDb) -> Self {
        Self {
            db,
            cache: HashMap::new(),
        }
    }

    /// Status of `username`, `None` when no account exists
    pub(crate) fn status(&mut self, username: &str) -> Option<UserStatus> {
        if let Some(status) = self.cache.get(username) {
            return *status;
        }
        let status = self
            .db
            .get_record::<User>(&key::user_key(username))
            .map(|u| u.status);
        self.cache.insert(username.to_string(), status);
        status
    }

    pub(crate) fn is_suspended(&mut self, username: &str) -> bool {
        self.status(username) == Some(UserStatus::Suspended)
    }

    pub(crate) fn is_active(&mut self, username: &str) -> bool {
        self.status(username) == Some(UserStatus::Active)
    }
}

/// How [`ForumQueries::index_post_keys`] walks an index prefix
#[derive(Debug, Clone, Copy)]
pub(crate) struct IndexScan<'a> {
    pub prefix: &'a str,
    /// Inclusive seek position
    pub start: Option<&'a str>,
    /// Drop the entry stored exactly at `start`
    pub skip_start: bool,
    /// Keep only the first entry per post key
    pub dedup: bool,
    /// Stop after this many post keys
    pub limit: Option<usize>,
}

impl<'a> IndexScan<'a> {
    pub(crate) fn new(prefix: &'a str) -> Self {
        Self {
            prefix,
            start: None,
            skip_start: false,
            dedup: false,
            limit: None,
        }
    }
}

impl ForumQueries {
    /// Queries over `db`
    pub fn new(db: Arc<ForumDb>) -> Self {
        Self { db }
    }

    /// The shared database handle
    pub fn database(&self) -> &Arc<ForumDb> {
        &self.db
    }

    pub(crate) fn max_scan(&self) -> usize {
        self.db.config().query.max_scan.max(1)
    }

    /// Post under `key`, logging dangling references
    pub(crate) fn post(&self, key: &str) -> Option<Post> {
        let post = self.db.get_record::<Post>(key);
        if post.is_none() {
            debug!(target: "forumdb::query", key, "dangling post reference");
        }
        post
    }

    /// Walk an index prefix backward and collect the post keys it points at
    ///
    /// `keep` sees each index key and may reject it before deduplication.
    pub(crate) fn index_post_keys(
        &self,
        scan: &IndexScan<'_>,
        mut keep: impl FnMut(&str) -> bool,
    ) -> Vec<String> {
        let mut keys = Vec::new();
        if scan.limit == Some(0) {
            return keys;
        }
        let mut seen = HashSet::new();
        let mut scanned = 0usize;
        let max_scan = self.max_scan();
        let req = ScanRequest::backward(scan.prefix).starting_at(scan.start);

        self.db.scan_records::<IndexRecord>(&req, |index_key, record| {
            scanned += 1;
            let skipped = scan.skip_start && scan.start == Some(index_key);
            if !skipped
                && keep(index_key)
                && (!scan.dedup || seen.insert(record.post_key.clone()))
            {
                keys.push(record.post_key);
            }
            let full = scan.limit.is_some_and(|limit| keys.len() >= limit);
            if full || scanned >= max_scan {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        keys
    }
}

/// Lower-cased search text, `None` when blank
pub(crate) fn normalized_text(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Newest first; stable for equal times
pub(crate) fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.time.cmp(&a.time));
}


#[cfg(test)]
mod tests {
    use super::testing::Fixture;
    use super::*;

    #[test]
    fn test_post_query_builders() {
        let q = PostQuery::new(5).search("rust").after(10).parents_only();
        assert_eq!(q.count, 5);
        assert_eq!(q.search_text, "rust");
        assert_eq!(q.time, Some(10));
        assert!(!q.before);
        assert!(q.parents_only);
        assert!(!q.include_private);
        assert!(PostQuery::default().before);
    }

    #[test]
    fn test_normalized_text() {
        assert_eq!(normalized_text(Some("  Rust ")), Some("rust".to_string()));
        assert_eq!(normalized_text(Some("   ")), None);
        assert_eq!(normalized_text(None), None);
    }

    #[test]
    fn test_authors_cache() {
        let f = Fixture::new();
        f.suspend("mallory");
        let db = f.queries.database();
        let mut authors = Authors::new(db);
        assert!(authors.is_suspended("mallory"));
        assert!(!authors.is_active("mallory"));
        assert_eq!(authors.status("nobody"), None);
        assert!(!authors.is_suspended("nobody"));
    }

    #[test]
    fn test_index_post_keys_dedup_and_limit() {
        let f = Fixture::new();
        let db = f.queries.database();
        for (k, target) in [("#x-3-a", "p3"), ("#x-2-a", "p1"), ("#x-1-a", "p1")] {
            db.put_record(k, &IndexRecord::new(target)).unwrap();
        }
        let mut scan = IndexScan::new("#x-");
        assert_eq!(f.queries.index_post_keys(&scan, |_| true), vec!["p3", "p1", "p1"]);
        scan.dedup = true;
        assert_eq!(f.queries.index_post_keys(&scan, |_| true), vec!["p3", "p1"]);
        scan.limit = Some(1);
        assert_eq!(f.queries.index_post_keys(&scan, |_| true), vec!["p3"]);
        scan.limit = None;
        scan.start = Some("#x-3-a");
        scan.skip_start = true;
        assert_eq!(f.queries.index_post_keys(&scan, |_| true), vec!["p1"]);
    }
}
