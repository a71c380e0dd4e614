//! Property tests over the public API

use forumdb::{key, Forum, PostQuery};
use proptest::prelude::*;

use crate::common::TestForum;

fn username() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn post_key_round_trips(time in 1_000_000_000i64..9_999_999_999, user in username()) {
        let k = key::post_key(time, &user);
        prop_assert_eq!(key::time_from_post_key(&k), time);
        prop_assert_eq!(key::username_from_post_key(&k), user);
    }

    #[test]
    fn message_key_round_trips(
        time in 1_000_000_000i64..9_999_999_999,
        to in username(),
        from in username(),
    ) {
        let k = key::message_key(&to, time, &from);
        prop_assert_eq!(key::to_username_from_message_key(&k), to);
        prop_assert_eq!(key::time_from_message_key(&k), time);
        prop_assert_eq!(key::from_username_from_message_key(&k), from);
    }

    #[test]
    fn every_saved_post_is_found_by_each_of_its_words(
        words in prop::collection::vec("[a-z]{3,8}", 1..6),
    ) {
        let t = TestForum::new();
        let post = t.post("alice", &words.join(" "));
        for word in &words {
            let hits = t.forum.queries().posts_with_search_text(&PostQuery::new(10).search(word.as_str()));
            prop_assert!(hits.iter().any(|p| p.key() == post.key()), "{} not found", word);
        }
    }

    #[test]
    fn timeline_pages_partition_the_posts(n in 1usize..25, page in 1usize..7) {
        let t = TestForum::new();
        for i in 0..n {
            t.post("alice", &format!("p{}", i));
        }
        let forum: &Forum = &t.forum;
        let mut seen = Vec::new();
        let mut before = None;
        loop {
            let batch = forum.queries().posts_for_username("alice", None, before, page);
            prop_assert!(batch.len() <= page);
            seen.extend(batch.iter().map(|p| p.key()));
            if batch.len() < page {
                break;
            }
            before = batch.last().map(|p| p.time);
        }
        let mut deduped = seen.clone();
        deduped.dedup();
        prop_assert_eq!(seen.len(), n);
        prop_assert_eq!(deduped.len(), n);
    }
}
