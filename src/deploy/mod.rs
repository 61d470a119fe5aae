// ABOUTME: Phased deployment and upgrade orchestration using the type state pattern.
// ABOUTME: Exports state markers, the Deployment struct, reports, and verification.

mod args;
mod deployment;
mod error;
mod state;
mod transitions;
mod upgrade;
mod verify;

pub use deployment::{
    DEFAULT_CALL_TIMEOUT, Deployment, RunSummary, SeedSafety, WireCall, WireReport,
};
pub use error::{CallErrorExt, DeployError, DeployErrorKind, Phase};
pub use state::{Deploying, Done, Rewiring, Seeding, Upgrading, Wiring};
pub use transitions::TransitionResult;
pub use verify::{CheckOutcome, VerifyReport, verify_links};
