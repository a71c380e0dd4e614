//! Time source for record keys
//!
//! Keys embed whole seconds since the Unix epoch. The system clock is clamped
//! so it never runs backwards within a process.

use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" in seconds since the Unix epoch
pub trait Clock: Send + Sync {
    /// Current time in seconds
    fn now(&self) -> i64;
}

/// Wall clock, non-decreasing across calls
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl SystemClock {
    /// Create a new system clock
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        let wall = chrono::Utc::now().timestamp();
        let prev = self.last.fetch_max(wall, Ordering::AcqRel);
        prev.max(wall)
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Clock frozen at `start`
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Set the current time
    pub fn set(&self, time: i64) {
        self.now.store(time, Ordering::SeqCst);
    }

    /// Move forward by `secs` and return the new time
    pub fn advance(&self, secs: i64) -> i64 {
        self.now.fetch_add(secs, Ordering::SeqCst) + secs
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
