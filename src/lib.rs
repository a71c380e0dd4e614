//! forumdb - forum content store over an ordered key-value store
//!
//! forumdb keeps posts, direct messages and user accounts in one flat,
//! ordered keyspace, and maintains denormalized secondary indexes (per-user
//! timelines, hashtags, mentions and words) at write time so that every
//! query is a bounded prefix scan.
//!
//! # Quick Start
//!
//! ```no_run
//! use forumdb::{Forum, PostQuery};
//!
//! # fn main() -> forumdb::Result<()> {
//! let forum = Forum::open("/var/lib/forum")?;
//! forum.users().register("alice", "password-hash")?;
//!
//! let post = forum.posts().create("alice", "Hello #rust, @bob!")?;
//! forum.posts().save(&post)?;
//!
//! let tagged = forum.queries().posts_with_hashtag_or_mention("#rust", None, None, 20);
//! let found = forum.queries().posts_with_search_text(&PostQuery::new(20).search("hello"));
//! assert_eq!(tagged.len(), found.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `forumdb-core`: records, key codec, tokenizers, clock, errors
//! - `forumdb-storage`: the `OrderedStore` contract with in-memory and redb
//!   implementations
//! - `forumdb-engine`: database handle, repositories, index maintainers,
//!   queries and backups

pub use forumdb_core::{
    key, tokens, Clock, Error, IndexRecord, ManualClock, Message, Post, ProfileUpdate,
    Registration, Result, Role, SystemClock, User, UserStatus,
};
pub use forumdb_engine::{
    BackupConfig, Forum, ForumConfig, ForumDb, ForumQueries, MessageRepository, PostQuery,
    PostRepository, Profile, QueryConfig, RegistrationRepository, UserRepository, WriteReport,
    DEFAULT_READ_RETENTION,
};
pub use forumdb_storage::{Direction, MemoryStore, OrderedStore, RedbStore, ScanRequest};
