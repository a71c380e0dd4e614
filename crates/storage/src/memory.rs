//! MemoryStore: in-process ordered store
//!
//! A `BTreeMap<String, Vec<u8>>` behind a `parking_lot::RwLock`. Scans copy
//! entries out in small batches and release the lock before calling the
//! visitor, so a visitor may read from or write to the same store.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use forumdb_core::Result;

use crate::scan::{Direction, ScanRequest};
use crate::traits::{OrderedStore, ScanVisitor};

const SCAN_BATCH: usize = 256;

/// Ordered store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True if no keys are stored
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl OrderedStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.data.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn scan(&self, req: &ScanRequest<'_>, visitor: &mut ScanVisitor<'_>) -> Result<()> {
        let Some(mut bounds) = req.bounds() else {
            return Ok(());
        };

        loop {
            let batch: Vec<(String, Vec<u8>)> = {
                let data = self.data.read();
                let range = data.range::<str, _>(bounds.as_str_bounds());
                match req.direction {
                    Direction::Forward => take_batch(range),
                    Direction::Backward => take_batch(range.rev()),
                }
            };

            let exhausted = batch.len() < SCAN_BATCH;
            for (key, value) in &batch {
                if !key.starts_with(req.prefix) {
                    continue;
                }
                if visitor(key.as_str(), value.as_slice()).is_break() {
                    return Ok(());
                }
            }

            match batch.last() {
                Some((last, _)) if !exhausted => bounds.resume_after(req.direction, last),
                _ => return Ok(()),
            }
            if !bounds.has_remaining() {
                return Ok(());
            }
        }
    }
}

fn take_batch<'a>(it: impl Iterator<Item = (&'a String, &'a Vec<u8>)>) -> Vec<(String, Vec<u8>)> {
    it.take(SCAN_BATCH)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
