//! Cursor pagination over timelines and subject listings

use forumdb::{Direction, PostQuery};

use crate::common::{bodies, TestForum};

#[test]
fn post_timeline_pages_never_overlap() {
    let t = TestForum::new();
    for i in 0..7 {
        t.post(if i % 2 == 0 { "alice" } else { "bob" }, &format!("m{}", i));
    }
    let q = t.forum.queries();

    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = q.post_timeline(Direction::Backward, cursor.as_deref(), 3);
        if page.is_empty() {
            break;
        }
        cursor = page.last().map(|p| p.key());
        pages.push(bodies(&page).into_iter().map(String::from).collect::<Vec<_>>());
    }
    assert_eq!(
        pages,
        vec![
            vec!["m6", "m5", "m4"],
            vec!["m3", "m2", "m1"],
            vec!["m0"],
        ]
    );
}

#[test]
fn subject_listing_pages_by_time() {
    let t = TestForum::new();
    let posts: Vec<_> = (0..5).map(|i| t.post("alice", &format!("s{}", i))).collect();
    let q = t.forum.queries();

    let first = q.posts_with_search_text(&PostQuery::new(2).parents_only());
    assert_eq!(bodies(&first), vec!["s4", "s3"]);

    let next = q.posts_with_search_text(&PostQuery::new(2).parents_only().before(first[1].time));
    assert_eq!(bodies(&next), vec!["s2", "s1"]);

    let oldest = q.posts_with_search_text(&PostQuery::new(10).after(posts[0].time));
    assert_eq!(bodies(&oldest), vec!["s0", "s1", "s2", "s3", "s4"]);
}

#[test]
fn parents_only_collapses_replies_into_roots() {
    let t = TestForum::new();
    let a = t.post("alice", "root a");
    let b = t.post("bob", "root b");
    t.reply(&a, "carol", "bump a");
    t.reply(&a, "dave", "bump a again");
    t.forum.posts().set_pinned(&b.key(), true).unwrap();

    let roots = t
        .forum
        .queries()
        .posts_with_search_text(&PostQuery::new(10).parents_only());
    assert_eq!(bodies(&roots), vec!["root b", "root a"]);
}

#[test]
fn hashtag_pages_resume_by_time() {
    let t = TestForum::new();
    let posts: Vec<_> = (0..5).map(|i| t.post("alice", &format!("#daily {}", i))).collect();
    let q = t.forum.queries();

    let first = q.posts_with_hashtag_or_mention("#daily", None, None, 2);
    assert_eq!(first, vec![posts[4].clone(), posts[3].clone()]);
    let next = q.posts_with_hashtag_or_mention("#daily", None, Some(first[1].time), 2);
    assert_eq!(next, vec![posts[2].clone(), posts[1].clone()]);
    let last = q.posts_with_hashtag_or_mention("#daily", None, Some(next[1].time), 2);
    assert_eq!(last, vec![posts[0].clone()]);
}
