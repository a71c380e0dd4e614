//! Prefix timeline scans and per-user timelines

use std::ops::ControlFlow;

use serde::de::DeserializeOwned;

use forumdb_core::{key, KeyKind, Post};
use forumdb_storage::{Direction, ScanRequest};

use super::{normalized_text, sort_newest_first, Authors, ForumQueries, IndexScan};

impl ForumQueries {
    /// One page of records under `prefix`.
    ///
    /// Starts at `cursor` (inclusive seek) but never returns the record
    /// stored exactly at `cursor`, so passing the last key of a page yields
    /// the next page without overlap. Stops once `limit` records pass
    /// `accept`.
    pub fn scan_page<T: DeserializeOwned>(
        &self,
        prefix: &str,
        direction: Direction,
        cursor: Option<&str>,
        limit: usize,
        mut accept: impl FnMut(&str, &T) -> bool,
    ) -> Vec<(String, T)> {
        let mut page = Vec::new();
        if limit == 0 {
            return page;
        }
        let req = ScanRequest::new(prefix, direction).starting_at(cursor);
        self.db.scan_records::<T>(&req, |key, value| {
            if cursor != Some(key) && accept(key, &value) {
                page.push((key.to_string(), value));
            }
            if page.len() >= limit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        page
    }

    /// Page of posts in key order, resuming after `cursor`.
    ///
    /// Posts by suspended authors are skipped.
    pub fn post_timeline(&self, direction: Direction, cursor: Option<&str>, limit: usize) -> Vec<Post> {
        let mut authors = Authors::new(&self.db);
        self.scan_page::<Post>(&KeyKind::Post.prefix(), direction, cursor, limit, |_, post| {
            !authors.is_suspended(&post.username)
        })
        .into_iter()
        .map(|(_, post)| post)
        .collect()
    }

    /// Newest-first posts by `username`.
    ///
    /// `before` resumes below that post time, exclusively. With search text,
    /// every entry of the user is read and posts whose message contains the
    /// text are kept up to `count`. A suspended user has no timeline.
    pub fn posts_for_username(
        &self,
        username: &str,
        search_text: Option<&str>,
        before: Option<i64>,
        count: usize,
    ) -> Vec<Post> {
        if count == 0
            || !key::is_valid_field(username)
            || Authors::new(&self.db).is_suspended(username)
        {
            return Vec::new();
        }
        let prefix = key::user_post_prefix(username);
        let cursor = before.map(|t| key::user_post_key(username, t));
        let mut scan = IndexScan::new(&prefix);
        scan.start = cursor.as_deref();
        scan.skip_start = true;

        match normalized_text(search_text) {
            None => {
                scan.dedup = true;
                scan.limit = Some(count);
                let keys = self.index_post_keys(&scan, |_| true);
                keys.iter().filter_map(|k| self.post(k)).collect()
            }
            Some(text) => self
                .index_post_keys(&scan, |_| true)
                .iter()
                .filter_map(|k| self.post(k))
                .filter(|p| p.message_contains(&text))
                .take(count)
                .collect(),
        }
    }

    /// Posts by `username` together with posts mentioning them, newest first.
    ///
    /// Both sides are fetched with `count` and merged without deduplication.
    pub fn posts_for_username_or_mention(
        &self,
        username: &str,
        search_text: Option<&str>,
        count: usize,
    ) -> Vec<Post> {
        let mention = format!("@{}", username);
        let mut posts = self.posts_for_username(username, search_text, None, count);
        posts.extend(self.posts_with_hashtag_or_mention(&mention, search_text, None, count));
        sort_newest_first(&mut posts);
        posts.truncate(count);
        posts
    }
}
