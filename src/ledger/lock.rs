// ABOUTME: Exclusive lock beside the ledger file to prevent concurrent orchestrator runs.
// ABOUTME: Created with create_new for atomicity; stale after one hour or breakable with force.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::LedgerError;
use super::sibling;

/// Information about who holds a ledger lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    /// `deploy` or `upgrade`.
    pub operation: String,
}

impl LockInfo {
    /// Lock info for the current process.
    pub fn new(operation: &str) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            operation: operation.to_string(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }

    /// Lock file path for a ledger.
    pub fn lock_path(ledger: &Path) -> PathBuf {
        sibling(ledger, "lock")
    }
}

/// A held ledger lock. Removed on `release`, or on drop if never released.
#[derive(Debug)]
pub struct LedgerLock {
    path: PathBuf,
    released: bool,
}

impl LedgerLock {
    /// Acquire the lock for the ledger at `ledger`.
    ///
    /// Stale locks are broken automatically; live ones only with `force`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::LockHeld` if another process holds a live lock.
    pub fn acquire(ledger: &Path, operation: &str, force: bool) -> Result<Self, LedgerError> {
        let path = LockInfo::lock_path(ledger);
        let info = LockInfo::new(operation);
        let json = serde_json::to_string(&info)
            .map_err(|e| LedgerError::Lock(format!("failed to serialize lock: {e}")))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| LedgerError::Lock(format!("failed to create lock directory: {e}")))?;
        }

        if try_create(&path, &json)? {
            return Ok(Self {
                path,
                released: false,
            });
        }

        if !should_break(&path, force)? {
            let existing = std::fs::read_to_string(&path)
                .ok()
                .and_then(|s| serde_json::from_str::<LockInfo>(&s).ok());
            return Err(match existing {
                Some(existing) => LedgerError::LockHeld {
                    holder: existing.holder,
                    pid: existing.pid,
                    started_at: existing.started_at,
                },
                None => LedgerError::Lock("lock held by another process".to_string()),
            });
        }

        tracing::debug!("Removing stale/forced lock at {}", path.display());
        let _ = std::fs::remove_file(&path);

        if !try_create(&path, &json)? {
            return Err(LedgerError::Lock(
                "lock acquired by another process during break".to_string(),
            ));
        }

        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Lock` if the lock file could not be removed.
    pub fn release(mut self) -> Result<(), LedgerError> {
        self.released = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LedgerError::Lock(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Create the lock file if it does not exist. `Ok(false)` means it already did.
fn try_create(path: &Path, json: &str) -> Result<bool, LedgerError> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            writeln!(file, "{json}")
                .map_err(|e| LedgerError::Lock(format!("failed to write lock: {e}")))?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(LedgerError::Lock(format!("failed to acquire lock: {e}"))),
    }
}

/// Check if an existing lock should be broken (stale, forced, or corrupted).
fn should_break(path: &Path, force: bool) -> Result<bool, LedgerError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(LedgerError::Lock(format!("failed to read lock info: {e}"))),
    };

    match serde_json::from_str::<LockInfo>(&content) {
        Ok(existing) if force => {
            tracing::warn!(
                "Breaking lock held by {} (pid {}) since {}",
                existing.holder,
                existing.pid,
                existing.started_at
            );
            Ok(true)
        }
        Ok(existing) if existing.is_stale() => {
            tracing::warn!(
                "Auto-breaking stale lock held by {} (pid {}) since {}",
                existing.holder,
                existing.pid,
                existing.started_at
            );
            Ok(true)
        }
        Ok(_) => Ok(false),
        Err(_) => {
            tracing::warn!("Lock info corrupted, breaking lock");
            Ok(true)
        }
    }
}
