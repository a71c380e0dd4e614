//! User account record

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::Result;
use crate::key;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Awaiting approval
    Pending,
    /// Normal account
    #[default]
    Active,
    /// Hidden from listings and search
    Suspended,
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular user
    #[default]
    Member,
    /// Can moderate posts
    Moderator,
    /// Full control
    Admin,
}

/// A forum account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique name, also the key field
    pub username: String,
    /// Opaque password hash, produced by the caller
    pub password_hash: String,
    /// Role
    #[serde(default)]
    pub role: Role,
    /// Status
    #[serde(default)]
    pub status: UserStatus,
    /// Registration time in seconds
    pub time_joined: i64,
    /// Last login time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_loggedin: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub fullname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub avatar: Option<String>,
    /// Usernames that reported this account
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reported_by: Vec<String>,
}

/// Optional profile fields, applied with [`User::apply_profile`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ProfileUpdate {
    pub fullname: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
    pub avatar: Option<String>,
}

impl User {
    /// Build an active member stamped with the clock's current time.
    pub fn create(clock: &dyn Clock, username: &str, password_hash: &str) -> Result<Self> {
        key::validate_field(username)?;
        Ok(Self {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role: Role::default(),
            status: UserStatus::default(),
            time_joined: clock.now(),
            time_loggedin: None,
            fullname: None,
            bio: None,
            location: None,
            url: None,
            avatar: None,
            reported_by: Vec::new(),
        })
    }

    /// Primary key `user-<username>`
    pub fn key(&self) -> String {
        key::user_key(&self.username)
    }

    /// True if the account is suspended
    pub fn is_suspended(&self) -> bool {
        self.status == UserStatus::Suspended
    }

    /// True if the account is active
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Overwrite the profile fields that are set in `update`
    pub fn apply_profile(&mut self, update: ProfileUpdate) {
        if let Some(v) = update.fullname {
            self.fullname = Some(v);
        }
        if let Some(v) = update.bio {
            self.bio = Some(v);
        }
        if let Some(v) = update.location {
            self.location = Some(v);
        }
        if let Some(v) = update.url {
            self.url = Some(v);
        }
        if let Some(v) = update.avatar {
            self.avatar = Some(v);
        }
    }

    /// Record `by`'s report. Returns false if already reported by them.
    pub fn add_report(&mut self, by: &str) -> bool {
        if self.reported_by.iter().any(|u| u == by) {
            return false;
        }
        self.reported_by.push(by.to_string());
        true
    }

    /// Withdraw `by`'s report. Returns false if there was none.
    pub fn remove_report(&mut self, by: &str) -> bool {
        let before = self.reported_by.len();
        self.reported_by.retain(|u| u != by);
        self.reported_by.len() != before
    }
}
