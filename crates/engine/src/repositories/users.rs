//! User repository

use std::sync::Arc;

use tracing::info;

use forumdb_core::{key, Error, ProfileUpdate, Result, Role, User, UserStatus};

use super::RegistrationRepository;
use crate::database::ForumDb;
use crate::query::ForumQueries;

/// Create, read and update accounts
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: Arc<ForumDb>,
}

impl UserRepository {
    /// Repository over `db`
    pub fn new(db: Arc<ForumDb>) -> Self {
        Self { db }
    }

    /// Build an unsaved active member stamped with the current time.
    pub fn create(&self, username: &str, password_hash: &str) -> Result<User> {
        User::create(self.db.clock(), username, password_hash)
    }

    /// Create and save a new account.
    ///
    /// Fails when registration is closed or the name is taken.
    pub fn register(&self, username: &str, password_hash: &str) -> Result<User> {
        key::validate_field(username)?;
        if !RegistrationRepository::new(Arc::clone(&self.db)).is_registration_open() {
            return Err(Error::invalid_input("registration is closed"));
        }
        if self.username_exists(username) {
            return Err(Error::invalid_input(format!("username '{}' is taken", username)));
        }
        let user = self.create(username, password_hash)?;
        self.save(&user)?;
        info!(target: "forumdb::users", username, "user registered");
        Ok(user)
    }

    /// User stored under `key`
    pub fn get(&self, key: &str) -> Option<User> {
        self.db.get_record(key)
    }

    /// User by name. Names that cannot be keys miss.
    pub fn user_with(&self, username: &str) -> Option<User> {
        if !key::is_valid_field(username) {
            return None;
        }
        self.get(&key::user_key(username))
    }

    /// True if an account named `username` exists
    pub fn username_exists(&self, username: &str) -> bool {
        key::is_valid_field(username) && self.db.contains_key(&key::user_key(username))
    }

    /// Upsert `user`
    pub fn save(&self, user: &User) -> Result<()> {
        key::validate_field(&user.username)?;
        self.db.put_record(&user.key(), user)
    }

    /// Remove an account. Their posts and index entries stay.
    pub fn delete(&self, username: &str) -> Result<()> {
        if !key::is_valid_field(username) {
            return Ok(());
        }
        self.db.delete_key(&key::user_key(username))
    }

    fn update(&self, username: &str, mutate: impl FnOnce(&mut User) -> bool) -> Result<Option<User>> {
        let Some(mut user) = self.user_with(username) else {
            return Ok(None);
        };
        if mutate(&mut user) {
            self.save(&user)?;
        }
        Ok(Some(user))
    }

    /// Change account status
    pub fn set_status(&self, username: &str, status: UserStatus) -> Result<Option<User>> {
        let updated = self.update(username, |u| std::mem::replace(&mut u.status, status) != status)?;
        if updated.is_some() {
            info!(target: "forumdb::users", username, ?status, "user status changed");
        }
        Ok(updated)
    }

    /// Change account role
    pub fn set_role(&self, username: &str, role: Role) -> Result<Option<User>> {
        self.update(username, |u| std::mem::replace(&mut u.role, role) != role)
    }

    /// Stamp the login time with now
    pub fn record_login(&self, username: &str) -> Result<Option<User>> {
        let now = self.db.now();
        self.update(username, |u| {
            u.time_loggedin = Some(now);
            true
        })
    }

    /// Overwrite the profile fields set in `update`
    pub fn update_profile(&self, username: &str, update: ProfileUpdate) -> Result<Option<User>> {
        self.update(username, |u| {
            u.apply_profile(update);
            true
        })
    }

    /// Record `by`'s report against `username`
    pub fn report(&self, username: &str, by: &str) -> Result<Option<User>> {
        self.update(username, |u| u.add_report(by))
    }

    /// Withdraw `by`'s report against `username`
    pub fn unreport(&self, username: &str, by: &str) -> Result<Option<User>> {
        self.update(username, |u| u.remove_report(by))
    }

    /// True if `username` exists and is suspended
    pub fn is_suspended(&self, username: &str) -> bool {
        self.user_with(username).is_some_and(|u| u.is_suspended())
    }

    /// Users whose name starts with `prefix`, in name order, suspended ones
    /// excluded
    pub fn users_with_username_prefix(&self, prefix: &str, limit: usize) -> Vec<User> {
        ForumQueries::new(Arc::clone(&self.db)).users_with_username_prefix(prefix, limit)
    }
}
