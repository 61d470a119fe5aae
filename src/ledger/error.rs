// ABOUTME: Error types for reading, writing, and locking the address ledger.
// ABOUTME: Persistence failures are fatal to the current run.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::types::ComponentName;

/// Errors raised by the ledger store and its lock.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to read ledger {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger {} is neither a ledger nor a flat name-to-address map: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write ledger {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize ledger: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("ledger has no entry for '{0}'")]
    MissingEntry(ComponentName),

    #[error("ledger belongs to network '{recorded}', not '{requested}'")]
    NetworkMismatch { recorded: String, requested: String },

    #[error("ledger is locked by {holder} (pid {pid}) since {started_at}; use --force to override")]
    LockHeld {
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    #[error("ledger lock error: {0}")]
    Lock(String),
}
