//! Forum end-to-end suite
//!
//! Covers the observable contract of the public API: index completeness,
//! key round trips, idempotent saves, pagination, thread windows, search,
//! suspended-author filtering, dangling index tolerance, messaging and
//! persistence.

#[path = "../common/mod.rs"]
mod common;

mod indexing;
mod messaging;
mod pagination;
mod persistence;
mod properties;
mod search;
mod threads;
