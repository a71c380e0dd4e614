//! Full-text search and suspended-author filtering

use forumdb::{PostQuery, UserStatus};

use crate::common::{bodies, TestForum};

#[test]
fn all_words_must_match() {
    let t = TestForum::new();
    t.post("alice", "Rust makes systems programming fun");
    t.post("bob", "Rust compile times");
    t.post("carol", "Systems thinking");
    let q = t.forum.queries();

    let hits = q.posts_with_search_text(&PostQuery::new(10).search("systems rust"));
    assert_eq!(bodies(&hits), vec!["Rust makes systems programming fun"]);

    let hits = q.posts_with_search_text(&PostQuery::new(10).search("rust"));
    assert_eq!(hits.len(), 2);
    assert!(q
        .posts_with_search_text(&PostQuery::new(10).search("haskell"))
        .is_empty());
}

#[test]
fn search_is_case_insensitive() {
    let t = TestForum::new();
    t.post("alice", "Ferris the CRAB");
    let hits = t
        .forum
        .queries()
        .posts_with_search_text(&PostQuery::new(10).search("crab FERRIS"));
    assert_eq!(hits.len(), 1);
}

#[test]
fn search_results_are_newest_first_and_truncated() {
    let t = TestForum::new();
    for i in 0..6 {
        t.post("alice", &format!("update number {}", i));
    }
    let hits = t
        .forum
        .queries()
        .posts_with_search_text(&PostQuery::new(3).search("update"));
    assert_eq!(
        bodies(&hits),
        vec!["update number 5", "update number 4", "update number 3"]
    );
}

#[test]
fn suspended_authors_disappear_everywhere() {
    let t = TestForum::new();
    t.set_status("alice", UserStatus::Active);
    let root = t.post("alice", "welcome #intro");
    t.post("mallory", "buy now #intro @alice");
    t.reply(&root, "mallory", "spam reply");
    t.set_status("mallory", UserStatus::Suspended);

    let q = t.forum.queries();
    let search = q.posts_with_search_text(&PostQuery::new(10).search("intro"));
    assert_eq!(bodies(&search), vec!["welcome #intro"]);

    let tagged = q.posts_with_hashtag_or_mention("#intro", None, None, 10);
    assert_eq!(bodies(&tagged), vec!["welcome #intro"]);

    assert!(q.posts_with_hashtag_or_mention("@alice", None, None, 10).is_empty());
    assert!(q.posts_for_username("mallory", None, None, 10).is_empty());
    assert!(q.posts_for_username_or_mention("alice", None, 10).iter().all(|p| p.username == "alice"));

    let listing = q.posts_with_search_text(&PostQuery::new(10));
    assert!(listing.iter().all(|p| p.username != "mallory"));

    let replies = q.child_posts(&t.reload(&root), None, 10, false, true);
    assert!(replies.is_empty());

    assert!(t
        .forum
        .users()
        .users_with_username_prefix("", 10)
        .iter()
        .all(|u| u.username != "mallory"));

    // Reinstated users come back.
    t.set_status("mallory", UserStatus::Active);
    assert_eq!(q.posts_with_hashtag_or_mention("#intro", None, None, 10).len(), 2);
}
