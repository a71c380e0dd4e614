//! Full-text search and subject listings

use std::collections::HashSet;
use std::ops::ControlFlow;

use forumdb_core::{key, tokens, KeyKind, Post};
use forumdb_storage::{Direction, ScanRequest};

use super::{sort_newest_first, Authors, ForumQueries, IndexScan, PostQuery};

impl ForumQueries {
    /// Search posts, or list subjects when the query has no search words.
    ///
    /// With search words, candidates come from the word index of the first
    /// word (a prefix match, so `rust` also finds `rustacean`), optionally
    /// restricted to entries at or before (`before`) or at or after the
    /// query time. Every further word must occur in the message. Results are
    /// newest first. A post matching through several index entries appears
    /// once per entry.
    pub fn posts_with_search_text(&self, query: &PostQuery) -> Vec<Post> {
        if query.count == 0 {
            return Vec::new();
        }
        let terms = tokens::search_terms(&query.search_text);
        let Some((first, rest)) = terms.split_first() else {
            return self.subjects(query);
        };

        let prefix = key::word_prefix(first);
        let scan = IndexScan::new(&prefix);
        let keys = self.index_post_keys(&scan, |index_key| match query.time {
            None => true,
            Some(t) => {
                let entry_time = key::time_from_word_key(index_key);
                if query.before {
                    entry_time <= t
                } else {
                    entry_time >= t
                }
            }
        });

        let mut authors = Authors::new(&self.db);
        let mut posts: Vec<Post> = keys
            .iter()
            .filter_map(|k| self.post(k))
            .filter(|p| rest.iter().all(|term| p.message_contains(term)))
            .filter(|p| !authors.is_suspended(&p.username))
            .collect();
        sort_newest_first(&mut posts);
        posts.truncate(query.count);
        posts
    }

    /// Posts or thread roots in time order from the query time.
    ///
    /// With `parents_only`, distinct thread roots are collected from the
    /// scanned posts and listed pinned first, then newest first.
    fn subjects(&self, query: &PostQuery) -> Vec<Post> {
        let prefix = KeyKind::Post.prefix();
        let seek = query.time.map(key::post_seek);
        let direction = if query.before {
            Direction::Backward
        } else {
            Direction::Forward
        };
        let req = ScanRequest::new(&prefix, direction).starting_at(seek.as_deref());
        let max_scan = self.max_scan();
        let mut authors = Authors::new(&self.db);
        let mut scanned = 0usize;

        if !query.parents_only {
            let mut posts = Vec::new();
            self.db.scan_records::<Post>(&req, |_, post| {
                scanned += 1;
                if (query.include_private || !post.is_private)
                    && !authors.is_suspended(&post.username)
                {
                    posts.push(post);
                }
                if posts.len() >= query.count || scanned >= max_scan {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            });
            return posts;
        }

        let mut root_keys = Vec::new();
        let mut seen = HashSet::new();
        self.db.scan_records::<Post>(&req, |post_key, post| {
            scanned += 1;
            if query.include_private || !post.is_private {
                let root = post.parent.unwrap_or_else(|| post_key.to_string());
                if seen.insert(root.clone()) {
                    root_keys.push(root);
                }
            }
            if root_keys.len() >= query.count || scanned >= max_scan {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        let mut roots: Vec<Post> = root_keys
            .iter()
            .filter_map(|k| self.post(k))
            .filter(|p| query.include_private || !p.is_private)
            .filter(|p| !authors.is_suspended(&p.username))
            .collect();
        roots.sort_by(|a, b| b.pinned.cmp(&a.pinned).then(b.time.cmp(&a.time)));
        roots
    }
}
