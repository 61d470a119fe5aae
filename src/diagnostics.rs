// ABOUTME: Diagnostics accumulator for non-fatal warnings during a run.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be shown to users.

/// Collects non-fatal warnings during deploy and upgrade runs.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a lock release warning.
    pub fn lock_release(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LockRelease,
            message: message.into(),
        }
    }

    /// Create a warning for a seed phase that was not run.
    pub fn seed_skipped(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::SeedSkipped,
            message: message.into(),
        }
    }

    /// Create a warning for a ledger read in the legacy flat format.
    pub fn legacy_ledger(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LegacyLedger,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Failed to release the ledger lock (lock file may remain).
    LockRelease,
    /// Seed steps are configured but were not run.
    SeedSkipped,
    /// Ledger was converted from the legacy flat format.
    LegacyLedger,
}
