//! User listings

use std::ops::ControlFlow;

use forumdb_core::{key, User};
use forumdb_storage::ScanRequest;

use super::ForumQueries;

impl ForumQueries {
    /// Users whose name starts with `prefix`, in name order.
    ///
    /// Suspended accounts are skipped. An empty prefix lists everyone.
    pub fn users_with_username_prefix(&self, prefix: &str, limit: usize) -> Vec<User> {
        let mut users = Vec::new();
        if limit == 0 {
            return users;
        }
        let scan_prefix = key::user_prefix(prefix);
        self.db
            .scan_records::<User>(&ScanRequest::forward(&scan_prefix), |_, user| {
                if !user.is_suspended() {
                    users.push(user);
                }
                if users.len() >= limit {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            });
        users
    }
}
