//! Thread windows and paged navigation

use crate::common::{bodies, TestForum};

fn three_reply_thread(t: &TestForum) -> (forumdb::Post, Vec<forumdb::Post>) {
    let root = t.post("alice", "root");
    let replies = vec![
        t.reply(&root, "bob", "c1"),
        t.reply(&root, "carol", "c2"),
        t.reply(&root, "dave", "c3"),
    ];
    (t.reload(&root), replies)
}

#[test]
fn forward_window_from_a_reply() {
    let t = TestForum::new();
    let (_, replies) = three_reply_thread(&t);
    let window = t.forum.queries().child_posts(&replies[1], None, 2, false, false);
    assert_eq!(bodies(&window), vec!["c2", "c3"]);
}

#[test]
fn backward_window_from_a_reply() {
    let t = TestForum::new();
    let (_, replies) = three_reply_thread(&t);
    let window = t.forum.queries().child_posts(&replies[1], None, 1, true, false);
    assert_eq!(bodies(&window), vec!["c1"]);
}

#[test]
fn root_windows_its_replies_in_order() {
    let t = TestForum::new();
    let (root, _) = three_reply_thread(&t);
    let window = t.forum.queries().child_posts(&root, None, 2, false, false);
    assert_eq!(bodies(&window), vec!["c1", "c2"]);
}

#[test]
fn replies_to_replies_stay_in_the_root_thread() {
    let t = TestForum::new();
    let (root, replies) = three_reply_thread(&t);
    let nested = t.reply(&replies[0], "erin", "quoting c1");

    assert_eq!(nested.parent.as_deref(), Some(root.key().as_str()));
    assert_eq!(nested.reply_to.as_deref(), Some(replies[0].key().as_str()));
    assert_eq!(t.reload(&root).children.len(), 4);
}

#[test]
fn deleted_reply_leaves_the_window() {
    let t = TestForum::new();
    let (root, replies) = three_reply_thread(&t);
    t.forum.posts().delete(&replies[1].key()).unwrap();
    let root = t.reload(&root);
    assert_eq!(root.children, vec![replies[0].key(), replies[2].key()]);
    let window = t.forum.queries().child_posts(&root, None, 10, false, false);
    assert_eq!(bodies(&window), vec!["c1", "c3"]);
}

#[test]
fn page_post_navigation() {
    let t = TestForum::new();
    let root = t.post("alice", "root");
    let replies: Vec<_> = (0..7).map(|i| t.reply(&root, "bob", &format!("r{}", i))).collect();
    let root = t.reload(&root);
    let q = t.forum.queries();

    // pages of 3: [r0 r1 r2] [r3 r4 r5] [r6]
    assert_eq!(q.page_post(&root, 3).message, "r6");
    assert_eq!(q.page_post(&replies[4], 3).message, "r3");
    assert_eq!(q.page_post(&replies[3], 3).message, "r0");
    assert_eq!(q.page_post(&replies[6], 3).message, "r3");
    // 7 replies fit a page of 7
    assert_eq!(q.page_post(&root, 7).message, "root");
    assert_eq!(q.page_post(&root, 10).message, "root");
}
