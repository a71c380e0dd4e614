//! Storage layer for forumdb
//!
//! This crate provides the ordered key-value store the forum is built on:
//! - OrderedStore: point get/put/delete plus prefix scans in either direction
//! - ScanRequest / ScanBounds: prefix and seek position to key-range translation
//! - MemoryStore: BTreeMap behind a RwLock, for tests and ephemeral databases
//! - RedbStore: single-file redb database

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod redb_store;
pub mod scan;
pub mod traits;

pub use memory::MemoryStore;
pub use redb_store::{OpenError, RedbStore};
pub use scan::{prefix_successor, Direction, ScanBounds, ScanRequest};
pub use traits::{OrderedStore, ScanVisitor};
