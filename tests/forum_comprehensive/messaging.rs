//! Direct messages, accounts and registration

use std::time::Duration;

use forumdb::{ProfileUpdate, Role, UserStatus, DEFAULT_READ_RETENTION};

use crate::common::TestForum;

#[test]
fn inbox_is_newest_first_and_isolated() {
    let t = TestForum::new();
    let m = t.forum.messages();
    for (from, to, body) in [
        ("alice", "bob", "first"),
        ("carol", "bob", "second"),
        ("bob", "alice", "reply"),
        ("alice", "bob", "third"),
    ] {
        t.clock.advance(1);
        let msg = m.create(from, to, body).unwrap();
        m.save(&msg).unwrap();
    }
    let inbox: Vec<_> = m
        .messages_to("bob", false, 10)
        .into_iter()
        .map(|msg| (msg.from_username, msg.message))
        .collect();
    assert_eq!(
        inbox,
        vec![
            ("alice".to_string(), "third".to_string()),
            ("carol".to_string(), "second".to_string()),
            ("alice".to_string(), "first".to_string()),
        ]
    );
    assert_eq!(m.messages_to("alice", false, 10).len(), 1);
}

#[test]
fn read_messages_expire() {
    let t = TestForum::new();
    let m = t.forum.messages();
    let msg = m.create("alice", "bob", "hello").unwrap();
    m.save(&msg).unwrap();

    m.mark_read(&msg.key()).unwrap();
    assert!(m.messages_to("bob", true, 10).is_empty());
    assert_eq!(m.delete_read_messages(DEFAULT_READ_RETENTION).unwrap(), 0);

    t.clock.advance(DEFAULT_READ_RETENTION.as_secs() as i64 + 1);
    assert_eq!(m.delete_read_messages(Duration::from_secs(3600)).unwrap(), 1);
    assert!(m.get(&msg.key()).is_none());
}

#[test]
fn registration_flag_gates_signups() {
    let t = TestForum::new();
    let users = t.forum.users();
    users.register("alice", "h").unwrap();

    t.forum.registration().change_registration(false).unwrap();
    assert!(users.register("bob", "h").is_err());
    t.forum.registration().change_registration(true).unwrap();
    users.register("bob", "h").unwrap();
    assert!(users.register("bob", "h").is_err());
}

#[test]
fn account_updates_round_trip() {
    let t = TestForum::new();
    let users = t.forum.users();
    users.register("alice", "h").unwrap();
    users.set_role("alice", Role::Admin).unwrap();
    users.set_status("alice", UserStatus::Pending).unwrap();
    users
        .update_profile(
            "alice",
            ProfileUpdate {
                fullname: Some("Alice Liddell".into()),
                url: Some("https://example.org".into()),
                ..Default::default()
            },
        )
        .unwrap();
    t.clock.advance(30);
    users.record_login("alice").unwrap();

    let alice = users.user_with("alice").unwrap();
    assert_eq!(alice.role, Role::Admin);
    assert_eq!(alice.status, UserStatus::Pending);
    assert_eq!(alice.fullname.as_deref(), Some("Alice Liddell"));
    assert_eq!(alice.time_loggedin, Some(alice.time_joined + 30));
}
