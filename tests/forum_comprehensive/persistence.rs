//! On-disk forums: reopen and backups

use forumdb::{Forum, ForumConfig, PostQuery};

use crate::common::{bodies, disk_forum};

#[test]
fn data_survives_reopen() {
    let (forum, dir) = disk_forum(ForumConfig::default());
    forum.users().register("alice", "h").unwrap();
    let root = forum.posts().create("alice", "persisted #thread").unwrap();
    forum.posts().save(&root).unwrap();
    forum.close().unwrap();
    drop(forum);

    let forum = Forum::open(dir.path()).unwrap();
    let hits = forum
        .queries()
        .posts_with_search_text(&PostQuery::new(10).search("persisted"));
    assert_eq!(bodies(&hits), vec!["persisted #thread"]);
    assert!(forum.users().username_exists("alice"));
}

#[test]
fn ci_profile_backs_up_on_every_save() {
    let mut config = ForumConfig {
        profile: "ci".to_string(),
        ..ForumConfig::default()
    };
    config.backup.rotate_weekly = false;
    let (forum, _dir) = disk_forum(config);

    let post = forum.posts().create("alice", "first").unwrap();
    forum.posts().save(&post).unwrap();
    forum.database().wait_for_background();
    let backups = forum.database().backups().unwrap();
    assert!(backups.latest_backup().is_some());
}
