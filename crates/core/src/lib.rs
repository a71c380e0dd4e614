//! Core types for forumdb
//!
//! This crate defines the foundational pieces shared by storage and engine:
//! - Error: error type and `Result` alias
//! - key: the composite key codec and typed key builders
//! - tokens: word, hashtag and mention extraction
//! - Clock: time source used to stamp new records
//! - records: Post, Message, User and index/flag records
//! - codec: JSON value encoding

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod codec;
pub mod error;
pub mod key;
pub mod records;
pub mod tokens;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use key::{DecodedKey, KeyError, KeyKind, REGISTRATION_KEY, SEPARATOR};
pub use records::{IndexRecord, Message, Post, ProfileUpdate, Registration, Role, User, UserStatus};
