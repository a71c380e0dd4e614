//! Background job queue.
//!
//! A single worker thread runs submitted jobs one at a time in submission
//! order. Foreground callers never wait on a job; `drain` exists for shutdown
//! and tests.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error};

use forumdb_core::Result;

/// Error returned when a job cannot be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The queue holds `max_queue_depth` jobs already
    Full,
    /// `shutdown` was called
    ShutDown,
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::Full => write!(f, "background queue is full"),
            SubmitError::ShutDown => write!(f, "background queue is shut down"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Queue metrics snapshot.
#[derive(Debug, Clone, Copy)]
pub struct QueueStats {
    /// Jobs waiting to run
    pub queue_depth: usize,
    /// Jobs running right now (0 or 1)
    pub active_jobs: usize,
    /// Jobs finished since creation, panicked ones included
    pub jobs_completed: u64,
}

struct Job {
    name: &'static str,
    work: Box<dyn FnOnce() + Send>,
}

struct QueueInner {
    jobs: Mutex<VecDeque<Job>>,
    work_ready: Condvar,
    drained: Condvar,
    shutdown: AtomicBool,
    active_jobs: AtomicUsize,
    jobs_completed: AtomicU64,
    max_queue_depth: usize,
}

/// Single-worker FIFO job queue
pub struct BackgroundQueue {
    inner: Arc<QueueInner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BackgroundQueue {
    /// Start the worker thread, named `forumdb-<name>`.
    pub fn new(name: &str, max_queue_depth: usize) -> Result<Self> {
        let inner = Arc::new(QueueInner {
            jobs: Mutex::new(VecDeque::new()),
            work_ready: Condvar::new(),
            drained: Condvar::new(),
            shutdown: AtomicBool::new(false),
            active_jobs: AtomicUsize::new(0),
            jobs_completed: AtomicU64::new(0),
            max_queue_depth,
        });

        let worker_inner = Arc::clone(&inner);
        let handle = std::thread::Builder::new()
            .name(format!("forumdb-{}", name))
            .spawn(move || worker_loop(&worker_inner))?;

        Ok(Self {
            inner,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Queue `work` behind every job submitted before it.
    pub fn submit(
        &self,
        name: &'static str,
        work: impl FnOnce() + Send + 'static,
    ) -> std::result::Result<(), SubmitError> {
        if self.inner.shutdown.load(Ordering::Acquire) {
            return Err(SubmitError::ShutDown);
        }
        {
            let mut jobs = self.inner.jobs.lock();
            if jobs.len() >= self.inner.max_queue_depth {
                return Err(SubmitError::Full);
            }
            jobs.push_back(Job {
                name,
                work: Box::new(work),
            });
        }
        debug!(job = name, "background job queued");
        self.inner.work_ready.notify_one();
        Ok(())
    }

    /// Block until every queued and running job has finished.
    pub fn drain(&self) {
        let mut jobs = self.inner.jobs.lock();
        while !jobs.is_empty() || self.inner.active_jobs.load(Ordering::Acquire) > 0 {
            self.inner.drained.wait(&mut jobs);
        }
    }

    /// Stop accepting jobs, run what is queued, and join the worker.
    ///
    /// Idempotent.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);
        {
            let _jobs = self.inner.jobs.lock();
            self.inner.work_ready.notify_all();
        }
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }

    /// Return a snapshot of queue metrics.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            queue_depth: self.inner.jobs.lock().len(),
            active_jobs: self.inner.active_jobs.load(Ordering::Relaxed),
            jobs_completed: self.inner.jobs_completed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for BackgroundQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Decrements `active_jobs` and wakes drain waiters, even if the job panicked.
struct ActiveJobGuard<'a> {
    inner: &'a QueueInner,
}

impl Drop for ActiveJobGuard<'_> {
    fn drop(&mut self) {
        self.inner.active_jobs.fetch_sub(1, Ordering::Release);
        self.inner.jobs_completed.fetch_add(1, Ordering::Relaxed);
        let _jobs = self.inner.jobs.lock();
        self.inner.drained.notify_all();
    }
}

fn worker_loop(inner: &QueueInner) {
    loop {
        let job = {
            let mut jobs = inner.jobs.lock();
            loop {
                if let Some(job) = jobs.pop_front() {
                    inner.active_jobs.fetch_add(1, Ordering::Release);
                    break job;
                }
                if inner.shutdown.load(Ordering::Acquire) {
                    return;
                }
                inner.work_ready.wait(&mut jobs);
            }
        };

        let _guard = ActiveJobGuard { inner };
        let name = job.name;
        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job.work)) {
            error!(
                job = name,
                "background job panicked: {:?}",
                e.downcast_ref::<&str>().copied().unwrap_or("(non-string panic)")
            );
        }
    }
}
