//! Registration flag

use std::sync::Arc;

use tracing::info;

use forumdb_core::{Registration, Result, REGISTRATION_KEY};

use crate::database::ForumDb;

/// Reads and flips the forum-wide "registration open" flag
#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    db: Arc<ForumDb>,
}

impl RegistrationRepository {
    /// Repository over `db`
    pub fn new(db: Arc<ForumDb>) -> Self {
        Self { db }
    }

    /// True unless registration was explicitly closed
    pub fn is_registration_open(&self) -> bool {
        self.db
            .get_record::<Registration>(REGISTRATION_KEY)
            .unwrap_or_default()
            .is_open
    }

    /// Open or close registration
    pub fn change_registration(&self, is_open: bool) -> Result<()> {
        self.db.put_record(REGISTRATION_KEY, &Registration { is_open })?;
        info!(target: "forumdb::users", is_open, "registration changed");
        Ok(())
    }
}
