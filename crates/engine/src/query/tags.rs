//! Hashtag and mention lookups

use forumdb_core::{key, Post};

use super::{normalized_text, Authors, ForumQueries, IndexScan};

impl ForumQueries {
    /// Newest-first posts carrying a hashtag (`#tag`) or mention (`@name`).
    ///
    /// `before_post_time` resumes the scan at that time. Without search text
    /// the scan stops once `count` distinct posts are found. With search
    /// text every entry is read and posts whose message contains the text
    /// are kept up to `count`; entries are only deduplicated when a resume
    /// time is given.
    pub fn posts_with_hashtag_or_mention(
        &self,
        token: &str,
        search_text: Option<&str>,
        before_post_time: Option<i64>,
        count: usize,
    ) -> Vec<Post> {
        if count == 0 {
            return Vec::new();
        }
        let token = token.to_lowercase();
        let prefix = key::tag_prefix(&token);
        let seek = before_post_time.map(|t| key::tag_seek(&token, t));
        let text = normalized_text(search_text);

        let mut scan = IndexScan::new(&prefix);
        scan.start = seek.as_deref();
        match (&text, before_post_time) {
            (Some(_), Some(_)) => scan.dedup = true,
            (Some(_), None) => {}
            (None, _) => {
                scan.dedup = true;
                scan.limit = Some(count);
            }
        }

        let mut keys = self.index_post_keys(&scan, |_| true);
        keys.sort_unstable_by(|a, b| b.cmp(a));

        let mut authors = Authors::new(&self.db);
        keys.iter()
            .filter_map(|k| self.post(k))
            .filter(|p| text.as_deref().map_or(true, |t| p.message_contains(t)))
            .filter(|p| !authors.is_suspended(&p.username))
            .take(count)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{messages, Fixture};

    #[test]
    fn test_hashtag_lookup_newest_first() {
        let f = Fixture::new();
        f.post("alice", "learning #Rust");
        f.post("bob", "no tags");
        f.post("carol", "#rust #go");
        let hits = f.queries.posts_with_hashtag_or_mention("#RUST", None, None, 10);
        assert_eq!(messages(&hits), vec!["#rust #go", "learning #Rust"]);
        assert_eq!(f.queries.posts_with_hashtag_or_mention("#rust", None, None, 1).len(), 1);
    }

    #[test]
    fn test_mention_lookup_with_before_time() {
        let f = Fixture::new();
        f.post("alice", "hi @bob");
        let mid = f.post("carol", "yo @bob");
        f.post("dave", "hey @bob");
        let hits = f
            .queries
            .posts_with_hashtag_or_mention("@bob", None, Some(mid.time), 10);
        assert_eq!(messages(&hits), vec!["hi @bob"]);
    }

    #[test]
    fn test_lookup_with_search_text() {
        let f = Fixture::new();
        f.post("alice", "#rust async story");
        f.post("bob", "#rust sync story");
        f.post("carol", "#rust async again");
        let hits = f
            .queries
            .posts_with_hashtag_or_mention("#rust", Some("ASYNC"), None, 10);
        assert_eq!(messages(&hits), vec!["#rust async again", "#rust async story"]);
        let one = f
            .queries
            .posts_with_hashtag_or_mention("#rust", Some("async"), None, 1);
        assert_eq!(messages(&one), vec!["#rust async again"]);
    }

    #[test]
    fn test_lookup_skips_suspended_and_missing() {
        let f = Fixture::new();
        f.post("alice", "#news one");
        f.post("mallory", "#news spam");
        let gone = f.post("bob", "#news gone");
        f.suspend("mallory");
        f.posts.delete(&gone.key()).unwrap();
        let hits = f.queries.posts_with_hashtag_or_mention("#news", None, None, 10);
        assert_eq!(messages(&hits), vec!["#news one"]);
    }

    #[test]
    fn test_prefix_does_not_leak_between_tags() {
        let f = Fixture::new();
        f.post("alice", "#rust");
        f.post("bob", "#rustlang");
        let hits = f.queries.posts_with_hashtag_or_mention("#rust", None, None, 10);
        assert_eq!(messages(&hits), vec!["#rust"]);
    }
}
