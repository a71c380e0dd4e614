//! Backup and restore of the database file
//!
//! ## Slots
//!
//! Backups live next to the database (or in `[backup].dir`) as
//! `<file_name>-<slot>`. With weekly rotation the slot is the ISO weekday
//! (1 = Monday .. 7 = Sunday), so a week of daily copies is kept; without it
//! the slot is always `1`.
//!
//! ## Backup
//!
//! `backup_if_needed` claims the `last_backup` timestamp with a
//! compare-and-swap, then queues a job on the background queue. The job copies
//! the live file to `<slot>.temp`, removes the old slot, and renames the temp
//! copy into place. Failures are logged and dropped.
//!
//! ## Restore
//!
//! `restore` copies the newest existing slot to `<live>.temp`, removes the live
//! path, and renames the temp copy into place. It runs synchronously while
//! the database is being opened.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Local};
use tracing::{debug, info, warn};

use forumdb_core::{Error, Result};

use crate::background::BackgroundQueue;
use crate::database::config::BackupConfig;

const TEMP_SUFFIX: &str = ".temp";

/// Schedules backups of one live database path and restores from them
pub struct BackupManager {
    live_path: PathBuf,
    backup_dir: PathBuf,
    rotate_weekly: bool,
    enabled: bool,
    interval_ms: u64,
    /// Milliseconds since the epoch of the last scheduled backup, 0 = never
    last_backup_ms: AtomicU64,
    queue: Arc<BackgroundQueue>,
}

impl BackupManager {
    /// Manage backups of `live_path`.
    ///
    /// `interval` is the effective minimum time between two backups, already
    /// resolved against the deployment profile.
    pub fn new(
        live_path: PathBuf,
        config: &BackupConfig,
        interval: Duration,
        queue: Arc<BackgroundQueue>,
    ) -> Self {
        let backup_dir = config.dir.clone().unwrap_or_else(|| {
            live_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        });
        Self {
            live_path,
            backup_dir,
            rotate_weekly: config.rotate_weekly,
            enabled: config.enabled,
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            last_backup_ms: AtomicU64::new(0),
            queue,
        }
    }

    /// Path being backed up
    pub fn live_path(&self) -> &Path {
        &self.live_path
    }

    /// Slot a backup taken now would go to
    pub fn current_slot(&self) -> u32 {
        if self.rotate_weekly {
            Local::now().weekday().number_from_monday()
        } else {
            1
        }
    }

    /// Every slot this manager may write
    pub fn slots(&self) -> Vec<u32> {
        if self.rotate_weekly {
            (1..=7).collect()
        } else {
            vec![1]
        }
    }

    /// Location of backup slot `slot`
    pub fn backup_path(&self, slot: u32) -> PathBuf {
        let file_name = self
            .live_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "forum".to_string());
        self.backup_dir.join(format!("{}-{}", file_name, slot))
    }

    /// The most recently written backup, if any slot exists
    pub fn latest_backup(&self) -> Option<PathBuf> {
        self.slots()
            .into_iter()
            .map(|slot| self.backup_path(slot))
            .filter_map(|path| {
                let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
                Some((modified, path))
            })
            .max_by_key(|(modified, _)| *modified)
            .map(|(_, path)| path)
    }

    /// Queue a backup if the interval since the last one has elapsed.
    ///
    /// Returns true if this call scheduled a job. Never blocks on the copy.
    pub fn backup_if_needed(&self) -> bool {
        if !self.enabled {
            return false;
        }
        let now = now_ms();
        let last = self.last_backup_ms.load(Ordering::Acquire);
        if last != 0 && now.saturating_sub(last) < self.interval_ms {
            return false;
        }
        if self
            .last_backup_ms
            .compare_exchange(last, now.max(1), Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let live = self.live_path.clone();
        let backup = self.backup_path(self.current_slot());
        let job_backup = backup.clone();
        let submitted = self.queue.submit("backup", move || {
            match copy_into_place(&live, &job_backup) {
                Ok(()) => info!(backup = %job_backup.display(), "backup complete"),
                Err(e) => warn!(backup = %job_backup.display(), error = %e, "backup failed"),
            }
        });

        match submitted {
            Ok(()) => {
                debug!(backup = %backup.display(), "backup scheduled");
                true
            }
            Err(e) => {
                warn!(error = %e, "could not schedule backup");
                let _ = self.last_backup_ms.compare_exchange(
                    now.max(1),
                    last,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
                false
            }
        }
    }

    /// Copy the live path into the current slot, synchronously.
    pub fn backup_now(&self) -> Result<PathBuf> {
        let backup = self.backup_path(self.current_slot());
        copy_into_place(&self.live_path, &backup)?;
        self.last_backup_ms.store(now_ms().max(1), Ordering::Release);
        Ok(backup)
    }

    /// Replace the live path with the newest backup.
    ///
    /// Returns the slot path restored from.
    pub fn restore(&self) -> Result<PathBuf> {
        let backup = self.latest_backup().ok_or_else(|| {
            Error::storage(format!(
                "no backup of {} found in {}",
                self.live_path.display(),
                self.backup_dir.display()
            ))
        })?;
        copy_into_place(&backup, &self.live_path)?;
        info!(
            from = %backup.display(),
            to = %self.live_path.display(),
            "restored database from backup"
        );
        Ok(backup)
    }
}

/// Copy `src` to `dst` through a temp sibling of `dst`.
///
/// The previous `dst` is only removed once the temp copy is complete.
fn copy_into_place(src: &Path, dst: &Path) -> io::Result<()> {
    let temp = with_suffix(dst, TEMP_SUFFIX);
    remove_path(&temp)?;
    copy_recursively(src, &temp)?;
    remove_path(dst)?;
    fs::rename(&temp, dst)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

fn copy_recursively(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        fs::create_dir_all(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_recursively(&entry.path(), &dst.join(entry.file_name()))?;
        }
    } else {
        if let Some(parent) = dst.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::copy(src, dst)?;
    }
    Ok(())
}

fn remove_path(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
