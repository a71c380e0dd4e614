//! Direct message record

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::Result;
use crate::key;

/// A private message between two users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Sender
    pub from_username: String,
    /// Recipient
    pub to_username: String,
    /// Body text
    pub message: String,
    /// Send time in seconds
    pub time_sent: i64,
    /// Read time, `None` while unread
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_read: Option<i64>,
}

impl Message {
    /// Build an unread message stamped with the clock's current time.
    pub fn create(clock: &dyn Clock, from_username: &str, to_username: &str, message: &str) -> Result<Self> {
        key::validate_field(from_username)?;
        key::validate_field(to_username)?;
        Ok(Self {
            from_username: from_username.to_string(),
            to_username: to_username.to_string(),
            message: message.to_string(),
            time_sent: clock.now(),
            time_read: None,
        })
    }

    /// Primary key `message-<to>-<time>-<from>`
    pub fn key(&self) -> String {
        key::message_key(&self.to_username, self.time_sent, &self.from_username)
    }

    /// True once the recipient opened it
    pub fn is_read(&self) -> bool {
        self.time_read.is_some()
    }
}
