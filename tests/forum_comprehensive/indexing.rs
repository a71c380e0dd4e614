//! Index completeness and idempotent saves

use forumdb::{key, tokens, IndexRecord};

use crate::common::{all_keys, TestForum};

#[test]
fn every_index_entry_points_at_the_post() {
    let t = TestForum::new();
    let post = t.post("alice", "Shipping #Rust_Lang today, thanks @Bob and @carol! rust rocks");
    let db = t.forum.database();

    let mut expected = vec![key::user_post_key("alice", post.time)];
    expected.extend(
        tokens::hashtags(&post.message)
            .iter()
            .chain(tokens::mentions(&post.message).iter())
            .map(|tok| key::tag_key(tok, post.time, "alice")),
    );
    expected.extend(
        tokens::words(&post.message)
            .iter()
            .map(|w| key::word_key(w, post.time, "alice")),
    );
    assert!(expected.contains(&"#rust_lang-1700000001-alice".to_string()));
    assert!(expected.contains(&"@bob-1700000001-alice".to_string()));

    for k in &expected {
        let record: IndexRecord = db.get_record(k).unwrap_or_else(|| panic!("missing {}", k));
        assert_eq!(record.post_key, post.key());
    }
    // primary + indexes, nothing else
    assert_eq!(all_keys(&t.forum).len(), expected.len() + 1);
}

#[test]
fn resaving_does_not_change_the_keyspace() {
    let t = TestForum::new();
    let mut post = t.post("alice", "hello #world");
    let before = all_keys(&t.forum);

    t.forum.posts().save(&post).unwrap();
    assert_eq!(all_keys(&t.forum), before);

    post.number_of_views = 3;
    t.forum.posts().save(&post).unwrap();
    assert_eq!(all_keys(&t.forum), before);
    assert_eq!(t.reload(&post).number_of_views, 3);
}

#[test]
fn editing_a_message_leaves_old_entries_behind() {
    let t = TestForum::new();
    let mut post = t.post("alice", "original wording");
    post.message = "edited text".to_string();
    t.forum.posts().save(&post).unwrap();

    let db = t.forum.database();
    assert!(db.contains_key(&key::word_key("original", post.time, "alice")));
    assert!(db.contains_key(&key::word_key("edited", post.time, "alice")));
}

#[test]
fn private_threads_are_never_indexed() {
    let t = TestForum::new();
    let mut root = t.forum.posts().create("alice", "secret #plans").unwrap();
    root.is_private = true;
    t.forum.posts().save(&root).unwrap();
    let reply = t.reply(&root, "bob", "more #plans");

    let keys = all_keys(&t.forum);
    assert_eq!(keys, vec![root.key(), reply.key()]);
    assert!(t
        .forum
        .queries()
        .posts_with_hashtag_or_mention("#plans", None, None, 10)
        .is_empty());
}

#[test]
fn deleting_never_sweeps_indexes() {
    let t = TestForum::new();
    let root = t.post("alice", "thread root");
    let reply = t.reply(&root, "bob", "reply body");
    t.forum.posts().delete(&root.key()).unwrap();

    let keys = all_keys(&t.forum);
    assert!(!keys.contains(&root.key()));
    assert!(!keys.contains(&reply.key()));
    assert!(keys.contains(&key::word_key("reply", reply.time, "bob")));
    assert!(keys.contains(&key::user_post_key("alice", root.time)));
}
