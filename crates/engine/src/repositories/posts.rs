//! Post repository
//!
//! Saving a post writes the primary record and then every derived index
//! entry, in the order given by [`index::maintainers`]. Posts that are private,
//! or whose thread root is private, only get their primary record.
//!
//! Deleting a post removes its primary key. Deleting a thread root also
//! removes its replies; deleting a reply unlinks it from the root. Index
//! entries are left behind and skipped by readers.

use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::{debug, warn};

use forumdb_core::{key, Error, KeyKind, Post, Result};
use forumdb_storage::ScanRequest;

use crate::database::{ForumDb, WritePlan, WriteReport};
use crate::index;

/// Create, read, update and delete posts
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: Arc<ForumDb>,
}

impl PostRepository {
    /// Repository over `db`
    pub fn new(db: Arc<ForumDb>) -> Self {
        Self { db }
    }

    /// The shared database handle
    pub fn database(&self) -> &Arc<ForumDb> {
        &self.db
    }

    /// Build an unsaved post stamped with the current time.
    pub fn create(&self, username: &str, message: &str) -> Result<Post> {
        Post::create(self.db.clock(), username, message)
    }

    /// Post stored under `key`
    pub fn get(&self, key: &str) -> Option<Post> {
        self.db.get_record(key)
    }

    /// Post by time and author
    pub fn get_at(&self, time: i64, username: &str) -> Option<Post> {
        if !key::is_valid_field(username) {
            return None;
        }
        self.get(&key::post_key(time, username))
    }

    /// Thread root of a reply, `None` for subjects or a missing root
    pub fn parent_of(&self, post: &Post) -> Option<Post> {
        post.parent.as_deref().and_then(|k| self.get(k))
    }

    /// True if `post` must not appear in any index
    fn is_hidden(&self, post: &Post) -> bool {
        post.is_private || self.parent_of(post).is_some_and(|p| p.is_private)
    }

    /// Upsert `post` and its index entries.
    ///
    /// A failed store write stops the save; the report names the failing key
    /// and nothing already written is undone.
    pub fn save(&self, post: &Post) -> Result<WriteReport> {
        key::validate_field(&post.username)?;
        let post_key = post.key();

        let mut plan = WritePlan::new();
        plan.put(post_key.clone(), post)?;
        if self.is_hidden(post) {
            debug!(target: "forumdb::posts", key = %post_key, "private post, skipping indexes");
        } else {
            for maintainer in index::maintainers() {
                maintainer.plan(post, &post_key, &mut plan)?;
            }
        }

        let report = self.db.apply(plan);
        if !report.is_complete() {
            warn!(
                target: "forumdb::posts",
                key = %post_key,
                written = report.written,
                attempted = report.attempted,
                "post saved partially"
            );
        }
        self.db.backup_if_needed();
        Ok(report)
    }

    /// Remove a post.
    ///
    /// A thread root takes its replies with it. A reply is unlinked from its
    /// root, which is re-saved. Deleting a missing key is a no-op.
    pub fn delete(&self, key: &str) -> Result<()> {
        if let Some(post) = self.get(key) {
            match self.parent_of(&post) {
                None if post.is_subject() => {
                    for child in &post.children {
                        self.db.delete_key(child)?;
                    }
                }
                None => {
                    debug!(target: "forumdb::posts", key, "reply has no stored root");
                }
                Some(mut root) => {
                    if root.remove_child(key) {
                        self.save(&root)?;
                    }
                }
            }
        }
        self.db.delete_key(key)
    }

    /// Create and save a reply to `parent_key`, linking it into the thread.
    ///
    /// Replies always hang off the thread root. Replying to a reply records
    /// the quoted post in `reply_to`. Closed threads reject replies.
    pub fn reply(&self, parent_key: &str, username: &str, message: &str) -> Result<(Post, WriteReport)> {
        let parent = self
            .get(parent_key)
            .ok_or_else(|| Error::invalid_input(format!("no post {}", parent_key)))?;

        let mut root = match parent.parent.clone() {
            None => parent,
            Some(root_key) => self
                .get(&root_key)
                .ok_or_else(|| Error::invalid_input(format!("no thread root {}", root_key)))?,
        };
        if root.closed {
            return Err(Error::invalid_input(format!("thread {} is closed", root.key())));
        }

        let mut child = self.create(username, message)?;
        let root_key = root.key();
        if root_key != parent_key {
            child.reply_to = Some(parent_key.to_string());
        }
        child.parent = Some(root_key);

        let report = self.save(&child)?;
        root.add_child(&child.key());
        let report = report.merge(self.save(&root)?);
        Ok((child, report))
    }

    /// Append `child_key` to the replies of `parent_key` and save the parent.
    ///
    /// Returns `None` when the parent does not exist.
    pub fn add_child(&self, parent_key: &str, child_key: &str) -> Result<Option<WriteReport>> {
        let Some(mut parent) = self.get(parent_key) else {
            return Ok(None);
        };
        if !parent.add_child(child_key) {
            return Ok(Some(WriteReport::default()));
        }
        self.save(&parent).map(Some)
    }

    /// Load, mutate and store the primary record only.
    ///
    /// `mutate` returns false to skip the write. Returns the post as stored,
    /// or `None` when `key` is missing.
    fn update(&self, key: &str, mutate: impl FnOnce(&mut Post) -> bool) -> Result<Option<Post>> {
        let Some(mut post) = self.get(key) else {
            return Ok(None);
        };
        if mutate(&mut post) {
            self.db.put_record(key, &post)?;
        }
        Ok(Some(post))
    }

    /// Soft-delete a post
    pub fn mark_deleted(&self, key: &str) -> Result<Option<Post>> {
        self.update(key, |p| !std::mem::replace(&mut p.is_deleted, true))
    }

    /// Record a report by `by`
    pub fn report(&self, key: &str, by: &str) -> Result<Option<Post>> {
        self.update(key, |p| p.add_report(by))
    }

    /// Pin or unpin a subject
    pub fn set_pinned(&self, key: &str, pinned: bool) -> Result<Option<Post>> {
        self.update(key, |p| std::mem::replace(&mut p.pinned, pinned) != pinned)
    }

    /// Close or reopen a thread
    pub fn set_closed(&self, key: &str, closed: bool) -> Result<Option<Post>> {
        self.update(key, |p| std::mem::replace(&mut p.closed, closed) != closed)
    }

    /// Count one view
    pub fn record_view(&self, key: &str) -> Result<Option<Post>> {
        self.update(key, |p| {
            p.number_of_views = p.number_of_views.saturating_add(1);
            true
        })
    }

    /// Dereference `keys` in order, skipping misses
    pub fn posts_for_keys<S: AsRef<str>>(&self, keys: &[S]) -> Vec<Post> {
        keys.iter()
            .filter_map(|k| {
                let post = self.get(k.as_ref());
                if post.is_none() {
                    debug!(target: "forumdb::posts", key = k.as_ref(), "dangling post key");
                }
                post
            })
            .collect()
    }

    fn edge_key(&self, req: ScanRequest<'_>) -> Option<String> {
        let mut found = None;
        self.db.scan_raw(&req, |k, _| {
            found = Some(k.to_string());
            ControlFlow::Break(())
        });
        found
    }

    /// Key of the oldest post
    pub fn first_key(&self) -> Option<String> {
        self.edge_key(ScanRequest::forward(&KeyKind::Post.prefix()))
    }

    /// Key of the newest post
    pub fn last_key(&self) -> Option<String> {
        self.edge_key(ScanRequest::backward(&KeyKind::Post.prefix()))
    }

    /// Time of the oldest post
    pub fn first_post_time(&self) -> Option<i64> {
        self.first_key().map(|k| key::time_from_post_key(&k))
    }

    /// Time of the newest post
    pub fn last_post_time(&self) -> Option<i64> {
        self.last_key().map(|k| key::time_from_post_key(&k))
    }
}
