//! Direct message repository

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use forumdb_core::{key, Message, Result};
use forumdb_storage::ScanRequest;

use crate::database::ForumDb;

/// Read messages older than this are purged by
/// [`MessageRepository::delete_read_messages`] callers that have no policy of
/// their own.
pub const DEFAULT_READ_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Create, read and purge direct messages
#[derive(Debug, Clone)]
pub struct MessageRepository {
    db: Arc<ForumDb>,
}

impl MessageRepository {
    /// Repository over `db`
    pub fn new(db: Arc<ForumDb>) -> Self {
        Self { db }
    }

    /// Build an unsaved, unread message stamped with the current time.
    pub fn create(&self, from_username: &str, to_username: &str, message: &str) -> Result<Message> {
        Message::create(self.db.clock(), from_username, to_username, message)
    }

    /// Message stored under `key`
    pub fn get(&self, key: &str) -> Option<Message> {
        self.db.get_record(key)
    }

    /// Message by recipient, send time and sender
    pub fn get_at(&self, to_username: &str, time_sent: i64, from_username: &str) -> Option<Message> {
        if !key::is_valid_field(to_username) || !key::is_valid_field(from_username) {
            return None;
        }
        self.get(&key::message_key(to_username, time_sent, from_username))
    }

    /// Upsert `message`
    pub fn save(&self, message: &Message) -> Result<()> {
        key::validate_field(&message.from_username)?;
        key::validate_field(&message.to_username)?;
        self.db.put_record(&message.key(), message)
    }

    /// Remove a message. Removing a missing key is a no-op.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.db.delete_key(key)
    }

    /// Newest-first messages addressed to `username`, at most `count`
    pub fn messages_to(&self, username: &str, unread_only: bool, count: usize) -> Vec<Message> {
        let mut out = Vec::new();
        if count == 0 || !key::is_valid_field(username) {
            return out;
        }
        let prefix = key::message_prefix(username);
        self.db
            .scan_records::<Message>(&ScanRequest::backward(&prefix), |_, message| {
                if !(unread_only && message.is_read()) {
                    out.push(message);
                }
                if out.len() >= count {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            });
        out
    }

    /// Stamp the message under `key` as read now.
    ///
    /// Already-read messages keep their first read time. Returns `None` when
    /// the key is missing.
    pub fn mark_read(&self, key: &str) -> Result<Option<Message>> {
        let Some(mut message) = self.get(key) else {
            return Ok(None);
        };
        if message.time_read.is_none() {
            message.time_read = Some(self.db.now());
            self.db.put_record(key, &message)?;
        }
        Ok(Some(message))
    }

    /// Remove every message read more than `max_age` ago.
    ///
    /// Returns the number of messages removed.
    pub fn delete_read_messages(&self, max_age: Duration) -> Result<usize> {
        let now = self.db.now();
        let max_age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        let prefix = key::KeyKind::Message.prefix();

        let mut expired = Vec::new();
        self.db
            .scan_records::<Message>(&ScanRequest::forward(&prefix), |k, message| {
                if let Some(read) = message.time_read {
                    if now.saturating_sub(read) > max_age {
                        expired.push(k.to_string());
                    }
                }
                ControlFlow::Continue(())
            });

        for k in &expired {
            debug!(target: "forumdb::messages", key = %k, "purging read message");
            self.db.delete_key(k)?;
        }
        if !expired.is_empty() {
            info!(target: "forumdb::messages", removed = expired.len(), "purged read messages");
        }
        Ok(expired.len())
    }

    /// Dereference `keys` in order, skipping misses
    pub fn messages_for_keys<S: AsRef<str>>(&self, keys: &[S]) -> Vec<Message> {
        keys.iter().filter_map(|k| self.get(k.as_ref())).collect()
    }
}
