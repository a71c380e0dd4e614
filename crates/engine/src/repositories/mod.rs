//! Entity repositories
//!
//! Stateless facades over a shared [`ForumDb`](crate::ForumDb), one per
//! record family. Reads never fail: a missing or undecodable record is `None`.
//! Writes return `Result` for invalid input and store failures.

mod messages;
mod posts;
mod registration;
mod users;

pub use messages::{MessageRepository, DEFAULT_READ_RETENTION};
pub use posts::PostRepository;
pub use registration::RegistrationRepository;
pub use users::UserRepository;
