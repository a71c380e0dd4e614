//! Persisted record types
//!
//! Primary entities (posts, messages, users) and the small index and flag
//! records stored alongside them. Repositories in the engine crate own the
//! read/write logic; these types only carry data, keys and in-place mutations.

pub mod index;
pub mod message;
pub mod post;
pub mod user;

pub use index::{IndexRecord, Registration};
pub use message::Message;
pub use post::Post;
pub use user::{ProfileUpdate, Role, User, UserStatus};

pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}

pub(crate) fn is_zero(n: &u64) -> bool {
    *n == 0
}
