// ABOUTME: Error types for deployment, wiring, seeding, and upgrade transitions.
// ABOUTME: Every error maps to a kind that tells the operator whether a re-run can resume.

use std::fmt;

use crate::backend::BackendError;
use crate::ledger::LedgerError;
use crate::plan::PlanError;
use crate::seed::SeedError;
use crate::types::ComponentName;

/// Which step issued a failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Deploy,
    Wire,
    Seed,
    Upgrade,
    Verify,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Deploy => "deploy",
            Phase::Wire => "wire",
            Phase::Seed => "seed",
            Phase::Upgrade => "upgrade",
            Phase::Verify => "verify",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a `DeployError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// Malformed registry, unresolvable argument, cycle. Nothing was sent.
    Configuration,
    /// A call failed or timed out. The ledger holds every completed step.
    Transport,
    /// A component is missing from the ledger.
    UnknownComponent,
    /// The target rejected an encoded seed payload.
    SchemaMismatch,
    /// The ledger could not be persisted or locked.
    Ledger,
}

/// Errors that can occur during deployment state transitions.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("{owner}: {detail}")]
    Configuration { owner: String, detail: String },

    #[error(transparent)]
    Payload(#[from] SeedError),

    #[error("{phase} of {target} failed: {source}")]
    Call {
        phase: Phase,
        target: String,
        #[source]
        source: BackendError,
    },

    #[error("component '{0}' has no ledger entry; run a full deploy first")]
    UnknownComponent(ComponentName),

    #[error("{target} rejected the seed payload (schema mismatch?): {reason}")]
    SchemaMismatch { target: String, reason: String },

    #[error("refusing to seed: {0}; rerun with --skip-seed")]
    SeedNotSafe(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Plan(_)
            | DeployError::Configuration { .. }
            | DeployError::Payload(_)
            | DeployError::SeedNotSafe(_) => DeployErrorKind::Configuration,
            DeployError::Call { .. } => DeployErrorKind::Transport,
            DeployError::UnknownComponent(_) => DeployErrorKind::UnknownComponent,
            DeployError::SchemaMismatch { .. } => DeployErrorKind::SchemaMismatch,
            DeployError::Ledger(_) => DeployErrorKind::Ledger,
        }
    }

    pub(crate) fn configuration(owner: impl Into<String>, detail: impl Into<String>) -> Self {
        DeployError::Configuration {
            owner: owner.into(),
            detail: detail.into(),
        }
    }
}

/// Attach phase and target to a failed backend call.
pub trait CallErrorExt<T> {
    fn context_call(self, phase: Phase, target: impl fmt::Display) -> Result<T, DeployError>;
}

impl<T> CallErrorExt<T> for Result<T, BackendError> {
    fn context_call(self, phase: Phase, target: impl fmt::Display) -> Result<T, DeployError> {
        self.map_err(|source| DeployError::Call {
            phase,
            target: target.to_string(),
            source,
        })
    }
}
