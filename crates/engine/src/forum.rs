//! Forum: one handle bundling every repository and the query engine
//!
//! ```text
//! let forum = Forum::open("/var/lib/forum")?;
//! let post = forum.posts().create("alice", "Hello #rust")?;
//! forum.posts().save(&post)?;
//! let hits = forum.queries().posts_with_hashtag_or_mention("#rust", None, None, 20);
//! ```

use std::path::Path;
use std::sync::Arc;

use forumdb_core::Result;

use crate::database::{ForumConfig, ForumDb};
use crate::query::ForumQueries;
use crate::repositories::{MessageRepository, PostRepository, RegistrationRepository, UserRepository};

/// Repositories and queries over one shared [`ForumDb`]
#[derive(Debug, Clone)]
pub struct Forum {
    db: Arc<ForumDb>,
    posts: PostRepository,
    messages: MessageRepository,
    users: UserRepository,
    registration: RegistrationRepository,
    queries: ForumQueries,
}

impl Forum {
    /// Open the forum stored in directory `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_db(ForumDb::open(path)?))
    }

    /// Open with an explicit configuration, persisting it
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: ForumConfig) -> Result<Self> {
        Ok(Self::from_db(ForumDb::open_with_config(path, config)?))
    }

    /// In-memory forum without backups
    pub fn ephemeral() -> Self {
        Self::from_db(ForumDb::ephemeral())
    }

    /// Wrap an existing database handle
    pub fn from_db(db: Arc<ForumDb>) -> Self {
        Self {
            posts: PostRepository::new(Arc::clone(&db)),
            messages: MessageRepository::new(Arc::clone(&db)),
            users: UserRepository::new(Arc::clone(&db)),
            registration: RegistrationRepository::new(Arc::clone(&db)),
            queries: ForumQueries::new(Arc::clone(&db)),
            db,
        }
    }

    /// Shared database handle
    pub fn database(&self) -> &Arc<ForumDb> {
        &self.db
    }

    /// Posts and threads
    pub fn posts(&self) -> &PostRepository {
        &self.posts
    }

    /// Direct messages
    pub fn messages(&self) -> &MessageRepository {
        &self.messages
    }

    /// Accounts
    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    /// Registration flag
    pub fn registration(&self) -> &RegistrationRepository {
        &self.registration
    }

    /// Searches, listings and thread navigation
    pub fn queries(&self) -> &ForumQueries {
        &self.queries
    }

    /// Wait for background backups and flush the store
    pub fn close(&self) -> Result<()> {
        self.db.close()
    }
}
