//! Forum engine for forumdb
//!
//! This crate builds the forum on top of the ordered store:
//! - ForumDb: shared handle owning the store, clock, config and backups
//! - Repositories: posts, messages, users and the registration flag
//! - Index maintainers: user-post, hashtag/mention and word indexes
//! - ForumQueries: search, tag lookups, timelines and thread navigation
//! - BackupManager / BackgroundQueue: periodic copies and restore on open
//!
//! Nothing above this crate talks to the store directly.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod background;
pub mod backup;
pub mod database;
pub mod forum;
pub mod index;
pub mod query;
pub mod repositories;

pub use background::{BackgroundQueue, QueueStats, SubmitError};
pub use backup::BackupManager;
pub use database::{
    BackupConfig, ForumConfig, ForumDb, Profile, QueryConfig, WritePlan, WriteReport,
    CONFIG_FILE_NAME, DB_FILE_NAME,
};
pub use forum::Forum;
pub use index::{HashtagMentionIndex, IndexMaintainer, UserPostIndex, WordIndex};
pub use query::{ForumQueries, PostQuery};
pub use repositories::{
    MessageRepository, PostRepository, RegistrationRepository, UserRepository,
    DEFAULT_READ_RETENTION,
};
