//! ForumDb: the shared database handle
//!
//! `ForumDb` owns the ordered store, the clock, the configuration and the
//! background queue used for backups. Repositories and queries are stateless
//! facades holding an `Arc<ForumDb>`.
//!
//! ## Opening
//!
//! 1. Create the data directory and `forum.toml` if missing.
//! 2. Open `forum.redb`. If the file is missing or corrupt, restore the
//!    newest backup and retry; if no usable backup exists a corrupt file is
//!    moved aside and a fresh database is created.
//! 3. If the store holds data, schedule a backup.
//!
//! A store that exists but cannot be used (held open by another handle,
//! permission or I/O errors) is returned as an error and never touched.
//!
//! ## Reads and writes
//!
//! Typed reads never fail: store and decode errors are logged and surface as
//! `None` or a shorter scan. Multi-key writes go through a [`WritePlan`]
//! executed in order, stopping at the first failure and reporting it in a
//! [`WriteReport`]. Nothing is rolled back.

pub mod config;

pub use config::{BackupConfig, ForumConfig, Profile, QueryConfig, CONFIG_FILE_NAME};

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use forumdb_core::{codec, Clock, Result, SystemClock};
use forumdb_storage::{MemoryStore, OpenError, OrderedStore, RedbStore, ScanRequest};

use crate::background::BackgroundQueue;
use crate::backup::BackupManager;

/// Database file name inside the data directory
pub const DB_FILE_NAME: &str = "forum.redb";

const BACKUP_QUEUE_DEPTH: usize = 16;

// ============================================================================
// Write plans
// ============================================================================

/// Ordered list of puts issued by one logical save
#[derive(Debug, Default)]
pub struct WritePlan {
    writes: Vec<(String, Vec<u8>)>,
}

impl WritePlan {
    /// Empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a put of an already-encoded value
    pub fn put_raw(&mut self, key: String, value: Vec<u8>) {
        self.writes.push((key, value));
    }

    /// Encode `value` and append a put
    pub fn put<T: Serialize>(&mut self, key: String, value: &T) -> Result<()> {
        self.writes.push((key, codec::encode(value)?));
        Ok(())
    }

    /// Keys in write order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.writes.iter().map(|(k, _)| k.as_str())
    }

    /// Number of planned writes
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// True if nothing is planned
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Outcome of executing a [`WritePlan`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Writes issued to the store, the failing one included
    pub attempted: usize,
    /// Writes the store accepted
    pub written: usize,
    /// Key of the write that failed; later writes were abandoned
    pub failed_key: Option<String>,
}

impl WriteReport {
    /// True if every planned write landed
    pub fn is_complete(&self) -> bool {
        self.failed_key.is_none()
    }

    /// Combine two reports of consecutive plans
    pub fn merge(mut self, other: WriteReport) -> Self {
        self.attempted += other.attempted;
        self.written += other.written;
        if self.failed_key.is_none() {
            self.failed_key = other.failed_key;
        }
        self
    }
}

// ============================================================================
// ForumDb
// ============================================================================

/// Shared handle over the forum's ordered store
pub struct ForumDb {
    store: Arc<dyn OrderedStore>,
    clock: Arc<dyn Clock>,
    config: ForumConfig,
    data_dir: Option<PathBuf>,
    queue: Option<Arc<BackgroundQueue>>,
    backup: Option<BackupManager>,
}

impl std::fmt::Debug for ForumDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForumDb")
            .field("data_dir", &self.data_dir)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ForumDb {
    /// Open the forum stored in directory `path`, reading `forum.toml`.
    ///
    /// # Example
    ///
    /// ```text
    /// let db = ForumDb::open("/var/lib/forum")?;
    /// let posts = PostRepository::new(Arc::clone(&db));
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Self>> {
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        ForumConfig::write_default_if_missing(&config_path)?;
        let cfg = ForumConfig::from_file(&config_path)?;

        Self::open_with_clock(data_dir, cfg, Arc::new(SystemClock::new()))
    }

    /// Open with an explicit configuration, persisting it to `forum.toml`.
    pub fn open_with_config<P: AsRef<Path>>(path: P, cfg: ForumConfig) -> Result<Arc<Self>> {
        cfg.validate()?;
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        cfg.write_to_file(&data_dir.join(CONFIG_FILE_NAME))?;
        Self::open_with_clock(data_dir, cfg, Arc::new(SystemClock::new()))
    }

    /// Open with an explicit configuration and time source.
    ///
    /// The configuration is used as given and not written to disk.
    pub fn open_with_clock<P: AsRef<Path>>(
        path: P,
        cfg: ForumConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<Self>> {
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        let db_path = data_dir.join(DB_FILE_NAME);

        let queue = Arc::new(BackgroundQueue::new("backup", BACKUP_QUEUE_DEPTH)?);
        let backup = BackupManager::new(
            db_path.clone(),
            &cfg.backup,
            cfg.backup_interval(),
            Arc::clone(&queue),
        );

        let store = Self::open_or_recover(&db_path, &backup)?;
        let has_data = store.has_data().unwrap_or_else(|e| {
            warn!(target: "forumdb::db", error = %e, "could not check store contents");
            false
        });

        info!(
            target: "forumdb::db",
            path = %db_path.display(),
            profile = %cfg.profile,
            has_data,
            "forum database opened"
        );

        let db = Arc::new(Self {
            store: Arc::new(store),
            clock,
            config: cfg,
            data_dir: Some(data_dir),
            queue: Some(queue),
            backup: Some(backup),
        });

        if has_data {
            db.backup_if_needed();
        }
        Ok(db)
    }

    fn open_or_recover(db_path: &Path, backup: &BackupManager) -> Result<RedbStore> {
        if !db_path.exists() && backup.latest_backup().is_none() {
            info!(target: "forumdb::db", path = %db_path.display(), "creating new forum database");
            return RedbStore::create(db_path);
        }

        let open_err = match RedbStore::open(db_path) {
            Ok(store) => return Ok(store),
            Err(OpenError::Unavailable(e)) => {
                error!(
                    target: "forumdb::db",
                    path = %db_path.display(),
                    error = %e,
                    "forum database is unavailable"
                );
                return Err(e);
            }
            Err(e) => e,
        };
        warn!(
            target: "forumdb::db",
            path = %db_path.display(),
            error = %open_err,
            "could not open forum database, trying backup"
        );

        match backup.restore() {
            Ok(_) => match RedbStore::open(db_path) {
                Ok(store) => return Ok(store),
                Err(OpenError::Unavailable(e)) => return Err(e),
                Err(e) => error!(
                    target: "forumdb::db",
                    error = %e,
                    "restored backup is unreadable"
                ),
            },
            Err(e) => info!(target: "forumdb::db", reason = %e, "no backup restored"),
        }

        if db_path.exists() {
            let aside = PathBuf::from(format!(
                "{}.unreadable-{}",
                db_path.display(),
                chrono::Utc::now().timestamp()
            ));
            match std::fs::rename(db_path, &aside) {
                Ok(()) => warn!(
                    target: "forumdb::db",
                    moved_to = %aside.display(),
                    "moved unreadable database aside"
                ),
                Err(e) => warn!(target: "forumdb::db", error = %e, "could not move unreadable database"),
            }
        }

        RedbStore::create(db_path)
    }

    /// In-memory forum with the system clock and no backups
    pub fn ephemeral() -> Arc<Self> {
        Self::with_store(
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock::new()),
            ForumConfig::default(),
        )
    }

    /// Forum over any store and clock, with no backups
    pub fn with_store(
        store: Arc<dyn OrderedStore>,
        clock: Arc<dyn Clock>,
        config: ForumConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            clock,
            config,
            data_dir: None,
            queue: None,
            backup: None,
        })
    }

    // ========== Accessors ==========

    /// The underlying ordered store
    pub fn store(&self) -> &dyn OrderedStore {
        self.store.as_ref()
    }

    /// The time source
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Current time in seconds
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Active configuration
    pub fn config(&self) -> &ForumConfig {
        &self.config
    }

    /// Data directory, `None` for in-memory forums
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Backup manager, `None` for in-memory forums
    pub fn backups(&self) -> Option<&BackupManager> {
        self.backup.as_ref()
    }

    /// Queue a backup if one is due. Returns true if one was scheduled.
    pub fn backup_if_needed(&self) -> bool {
        self.backup
            .as_ref()
            .map(BackupManager::backup_if_needed)
            .unwrap_or(false)
    }

    /// Wait for queued backups, then flush the store.
    pub fn close(&self) -> Result<()> {
        if let Some(queue) = &self.queue {
            queue.drain();
        }
        self.store.flush()?;
        info!(target: "forumdb::db", "forum database closed");
        Ok(())
    }

    /// Block until queued background jobs have finished
    pub fn wait_for_background(&self) {
        if let Some(queue) = &self.queue {
            queue.drain();
        }
    }

    // ========== Typed record access ==========

    /// Read and decode the record under `key`.
    ///
    /// Missing keys, store errors and undecodable values all yield `None`.
    pub fn get_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.store.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(target: "forumdb::db", key, error = %e, "read failed");
                return None;
            }
        };
        match codec::decode(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(target: "forumdb::db", key, error = %e, "undecodable record");
                None
            }
        }
    }

    /// True if `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        matches!(self.store.get(key), Ok(Some(_)))
    }

    /// Encode and store a single record
    pub fn put_record<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = codec::encode(value)?;
        self.store.put(key, &bytes)
    }

    /// Remove a key
    pub fn delete_key(&self, key: &str) -> Result<()> {
        self.store.delete(key)
    }

    /// Execute `plan` in order, stopping at the first failed write.
    pub fn apply(&self, plan: WritePlan) -> WriteReport {
        let mut report = WriteReport::default();
        for (key, value) in plan.writes {
            report.attempted += 1;
            match self.store.put(&key, &value) {
                Ok(()) => report.written += 1,
                Err(e) => {
                    warn!(
                        target: "forumdb::db",
                        key = %key,
                        written = report.written,
                        error = %e,
                        "write failed, abandoning remaining writes"
                    );
                    report.failed_key = Some(key);
                    break;
                }
            }
        }
        report
    }

    /// Scan raw keys and values. Store errors end the scan and are logged.
    pub fn scan_raw(
        &self,
        req: &ScanRequest<'_>,
        mut visitor: impl FnMut(&str, &[u8]) -> ControlFlow<()>,
    ) {
        if let Err(e) = self.store.scan(req, &mut visitor) {
            warn!(target: "forumdb::db", prefix = req.prefix, error = %e, "scan failed");
        }
    }

    /// Scan and decode records. Undecodable values are skipped.
    pub fn scan_records<T: DeserializeOwned>(
        &self,
        req: &ScanRequest<'_>,
        mut visitor: impl FnMut(&str, T) -> ControlFlow<()>,
    ) {
        self.scan_raw(req, |key, bytes| match codec::decode::<T>(bytes) {
            Ok(value) => visitor(key, value),
            Err(e) => {
                debug!(target: "forumdb::db", key, error = %e, "skipping undecodable record");
                ControlFlow::Continue(())
            }
        });
    }
}

impl Drop for ForumDb {
    fn drop(&mut self) {
        if let Some(queue) = &self.queue {
            queue.shutdown();
        }
        if let Err(e) = self.store.flush() {
            warn!(target: "forumdb::db", error = %e, "flush on drop failed");
        }
    }
}
