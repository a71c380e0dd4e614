//! Thread windows and paged navigation

use std::collections::HashSet;

use forumdb_core::{tokens, Post};

use super::{sort_newest_first, Authors, ForumQueries, PostQuery};

impl ForumQueries {
    /// Up to `count` replies around `post` in its thread.
    ///
    /// For a reply, the window starts at the reply's position among the
    /// root's children (forward), or `count` positions earlier (`before`).
    /// A subject, or a reply whose root is missing, windows its own children
    /// from the start. With `active_users_only`, replies are kept only when
    /// written by the thread owner or by an active account. With search
    /// text, only word-search hits among those replies are returned, newest
    /// first.
    pub fn child_posts(
        &self,
        post: &Post,
        search_text: Option<&str>,
        count: usize,
        before: bool,
        active_users_only: bool,
    ) -> Vec<Post> {
        if count == 0 {
            return Vec::new();
        }
        let root = post.parent.as_deref().and_then(|k| self.post(k));
        let (children, owner, start) = match &root {
            Some(root) => {
                let Some(index) = root.child_index(&post.key()) else {
                    return Vec::new();
                };
                let start = if before {
                    index.saturating_sub(count)
                } else {
                    index
                };
                (&root.children, root.username.as_str(), start)
            }
            None => (&post.children, post.username.as_str(), 0),
        };
        let Some(window) = children.get(start..) else {
            return Vec::new();
        };

        let mut authors = Authors::new(&self.db);
        let mut keep = |p: &Post| {
            !active_users_only || p.username == owner || authors.is_active(&p.username)
        };

        let mut shown = Vec::new();
        for k in window {
            if shown.len() >= count {
                break;
            }
            if let Some(p) = self.post(k) {
                if keep(&p) {
                    shown.push(p);
                }
            }
        }

        let search_terms = search_text.map(tokens::search_terms).unwrap_or_default();
        if search_terms.is_empty() {
            return shown;
        }

        let in_window: HashSet<String> = shown.iter().map(Post::key).collect();
        let query = PostQuery {
            search_text: search_terms.join(" "),
            count: self.max_scan(),
            ..PostQuery::default()
        };
        let mut hits: Vec<Post> = self
            .posts_with_search_text(&query)
            .into_iter()
            .filter(|p| in_window.contains(&p.key()))
            .collect();
        sort_newest_first(&mut hits);
        hits.truncate(count);
        hits
    }

    /// First post of the page that should be shown for `post`.
    ///
    /// A reply resolves to the first post of the page holding its
    /// predecessor. A post with more than `page_size` replies resolves to the
    /// first post of the last page. Anything else resolves to itself.
    pub fn page_post(&self, post: &Post, page_size: usize) -> Post {
        let page_size = page_size.max(1);

        if !post.children.is_empty() {
            let len = post.children.len();
            if len <= page_size {
                return post.clone();
            }
            let on_last_page = match len % page_size {
                0 => page_size,
                rest => rest,
            };
            return self
                .post(&post.children[len - on_last_page])
                .unwrap_or_else(|| post.clone());
        }

        if let Some(root) = post.parent.as_deref().and_then(|k| self.post(k)) {
            if let Some(index) = root.child_index(&post.key()) {
                let page_number = index.saturating_sub(1) / page_size;
                if let Some(first) = root.children.get(page_number * page_size) {
                    if let Some(found) = self.post(first) {
                        return found;
                    }
                }
            }
        }
        post.clone()
    }

    /// [`page_post`](Self::page_post) with the configured page size
    pub fn page_post_default(&self, post: &Post) -> Post {
        self.page_post(post, self.db.config().query.default_page_size)
    }
}
