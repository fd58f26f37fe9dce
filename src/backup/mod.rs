//! Discovery of backup copies of the event store.
//!
//! Every function here is best-effort: a missing directory, a permission
//! problem or a failed copy yields `None` instead of an error.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Extension a file needs to count as a backup candidate.
pub const BACKUP_EXTENSION: &str = "db";

const BOOTSTRAP_PREFIX: &str = "app-bootstrap-";

/// BackupFile is a backup artifact found in, or written to, the backup directory.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl BackupFile {
    fn from_path(path: PathBuf) -> Option<Self> {
        let meta = fs::metadata(&path).ok()?;
        if !meta.is_file() {
            return None;
        }
        let modified = meta.modified().ok()?;
        Some(Self { path, modified })
    }

    /// Returns the file name without its directory.
    ///
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Returns whole seconds elapsed between modification and `now`, zero if
    /// the modification time lies in the future.
    ///
    pub fn age_seconds(&self, now: SystemTime) -> u64 {
        now.duration_since(self.modified)
            .unwrap_or_default()
            .as_secs()
    }

    // Newer mtime wins, equal mtimes fall back to the greater name.
    fn is_newer_than(&self, other: &BackupFile) -> bool {
        (self.modified, self.path.file_name()) > (other.modified, other.path.file_name())
    }
}

fn is_candidate(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(true);
    !hidden && path.extension().is_some_and(|ext| ext == BACKUP_EXTENSION)
}

/// Returns the most recently modified backup in `dir`.
/// Only regular, non-hidden files ending in `.db` are considered, so dot-files
/// and directories named `*.db` are skipped.
///
pub fn latest(dir: &Path) -> Option<BackupFile> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "backup directory not readable");
            return None;
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_candidate(path))
        .filter_map(BackupFile::from_path)
        .fold(None, |best: Option<BackupFile>, file| match best {
            Some(b) if !file.is_newer_than(&b) => Some(b),
            _ => Some(file),
        })
}

/// Builds the bootstrap file name for the given moment, like `app-bootstrap-1700000000.db`.
///
pub fn bootstrap_name(now: SystemTime) -> String {
    let secs = now
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{}{}.{}", BOOTSTRAP_PREFIX, secs, BACKUP_EXTENSION)
}

/// Copies the store at `db_path` into `dir` as a bootstrap backup.
/// Returns `None` when the store does not exist or any filesystem step fails.
///
pub fn bootstrap(db_path: &Path, dir: &Path, now: SystemTime) -> Option<BackupFile> {
    if let Err(e) = fs::create_dir_all(dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "cannot create backup directory");
        return None;
    }
    if !db_path.is_file() {
        tracing::debug!(db = %db_path.display(), "no store file to bootstrap a backup from");
        return None;
    }

    let target = dir.join(bootstrap_name(now));
    if let Err(e) = fs::copy(db_path, &target) {
        tracing::warn!(target = %target.display(), error = %e, "bootstrap backup failed");
        return None;
    }

    tracing::info!(target = %target.display(), "created bootstrap backup");
    BackupFile::from_path(target)
}

/// Finds the newest backup in `dir`, creating a bootstrap copy of the store
/// when the directory holds none.
///
pub fn locate_or_bootstrap(db_path: &Path, dir: &Path) -> Option<BackupFile> {
    latest(dir).or_else(|| bootstrap(db_path, dir, SystemTime::now()))
}
