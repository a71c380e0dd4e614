//! Ordered key-value store contract
//!
//! Everything above the storage layer talks to an `OrderedStore`: string keys,
//! opaque byte values, point operations and prefix scans in either direction.
//! Implementations serialize their own writes; callers add no locking.

use std::ops::ControlFlow;

use forumdb_core::Result;

use crate::scan::ScanRequest;

/// Visitor invoked for each key/value pair of a scan.
///
/// Return `ControlFlow::Break(())` to stop the scan early.
pub type ScanVisitor<'v> = dyn FnMut(&str, &[u8]) -> ControlFlow<()> + 'v;

/// A flat, ordered keyspace
pub trait OrderedStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or overwrite `key`
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// Visit keys under `req.prefix` in `req.direction`, starting at the
    /// inclusive seek position `req.start` if given.
    fn scan(&self, req: &ScanRequest<'_>, visitor: &mut ScanVisitor<'_>) -> Result<()>;

    /// Make prior writes durable
    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// True if the store holds at least one key
    fn has_data(&self) -> Result<bool> {
        let mut found = false;
        self.scan(&ScanRequest::forward(""), &mut |_, _| {
            found = true;
            ControlFlow::Break(())
        })?;
        Ok(found)
    }

    /// Collect up to `limit` keys of a scan, in scan order
    fn scan_keys(&self, req: &ScanRequest<'_>, limit: usize) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        if limit == 0 {
            return Ok(keys);
        }
        self.scan(req, &mut |key, _| {
            keys.push(key.to_string());
            if keys.len() >= limit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        Ok(keys)
    }
}
