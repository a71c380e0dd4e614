//! RedbStore: file-backed ordered store
//!
//! One redb database file with a single `&str -> &[u8]` table. Each `put` and
//! `delete` is its own committed write transaction; scans run inside one read
//! transaction and therefore see a consistent snapshot.

use std::io;
use std::path::{Path, PathBuf};

use redb::{AccessGuard, Database, DatabaseError, ReadableTable, StorageError, TableDefinition};
use thiserror::Error as ThisError;
use tracing::debug;

use forumdb_core::{Error, Result};

use crate::scan::{Direction, ScanRequest};
use crate::traits::{OrderedStore, ScanVisitor};

const FORUM_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("forum");

/// Why an existing database file could not be opened
#[derive(Debug, ThisError)]
pub enum OpenError {
    /// No file at the path
    #[error("no database file at {0}")]
    Missing(PathBuf),

    /// The file exists but is not a readable redb database
    #[error("database file is corrupt: {0}")]
    Corrupt(String),

    /// The file may be fine but cannot be used now (locked, permissions, I/O)
    #[error(transparent)]
    Unavailable(#[from] Error),
}

impl From<OpenError> for Error {
    fn from(e: OpenError) -> Self {
        match e {
            OpenError::Unavailable(e) => e,
            other => Error::storage(other),
        }
    }
}

impl OpenError {
    fn classify(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Storage(StorageError::Corrupted(msg)) => OpenError::Corrupt(msg),
            DatabaseError::Storage(StorageError::Io(e))
                if matches!(
                    e.kind(),
                    io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
                ) =>
            {
                OpenError::Corrupt(e.to_string())
            }
            other => OpenError::Unavailable(Error::storage(other)),
        }
    }
}

/// Ordered store persisted in a redb file
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").field("path", &self.path).finish()
    }
}

impl RedbStore {
    /// Open an existing database file.
    ///
    /// A lock held by another handle is `Unavailable`, not `Corrupt`.
    pub fn open(path: impl AsRef<Path>) -> std::result::Result<Self, OpenError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(OpenError::Missing(path.to_path_buf()));
        }
        let db = Database::open(path).map_err(OpenError::classify)?;
        Ok(Self::init(db, path)?)
    }

    /// Open the database file, creating an empty one if needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path).map_err(Error::storage)?;
        Self::init(db, path)
    }

    fn init(db: Database, path: &Path) -> Result<Self> {
        let txn = db.begin_write().map_err(Error::storage)?;
        txn.open_table(FORUM_TABLE).map_err(Error::storage)?;
        txn.commit().map_err(Error::storage)?;
        debug!(path = %path.display(), "redb store ready");
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OrderedStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(Error::storage)?;
        let table = txn.open_table(FORUM_TABLE).map_err(Error::storage)?;
        let value = table.get(key).map_err(Error::storage)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let txn = self.db.begin_write().map_err(Error::storage)?;
        {
            let mut table = txn.open_table(FORUM_TABLE).map_err(Error::storage)?;
            table.insert(key, value).map_err(Error::storage)?;
        }
        txn.commit().map_err(Error::storage)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let txn = self.db.begin_write().map_err(Error::storage)?;
        {
            let mut table = txn.open_table(FORUM_TABLE).map_err(Error::storage)?;
            table.remove(key).map_err(Error::storage)?;
        }
        txn.commit().map_err(Error::storage)
    }

    fn scan(&self, req: &ScanRequest<'_>, visitor: &mut ScanVisitor<'_>) -> Result<()> {
        let Some(bounds) = req.bounds() else {
            return Ok(());
        };
        let txn = self.db.begin_read().map_err(Error::storage)?;
        let table = txn.open_table(FORUM_TABLE).map_err(Error::storage)?;
        let range = table
            .range::<&str>(bounds.as_str_bounds())
            .map_err(Error::storage)?;

        match req.direction {
            Direction::Forward => visit_entries(range, req.prefix, visitor),
            Direction::Backward => visit_entries(range.rev(), req.prefix, visitor),
        }
    }
}

type Entry<'a> = std::result::Result<
    (AccessGuard<'a, &'static str>, AccessGuard<'a, &'static [u8]>),
    StorageError,
>;

fn visit_entries<'a>(
    entries: impl Iterator<Item = Entry<'a>>,
    prefix: &str,
    visitor: &mut ScanVisitor<'_>,
) -> Result<()> {
    for entry in entries {
        let (k, v) = entry.map_err(Error::storage)?;
        let key = k.value();
        if !key.starts_with(prefix) {
            continue;
        }
        if visitor(key, v.value()).is_break() {
            break;
        }
    }
    Ok(())
}
