// ABOUTME: Errors reported by backends for individual calls and for connection setup.
// ABOUTME: Calls fail either in transport or by execution rejection.

use snafu::Snafu;
use std::time::Duration;

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The request never produced an answer (I/O, HTTP, malformed response).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The network executed the call and rejected it (revert, bad arguments).
    #[error("call rejected: {0}")]
    Rejected(String),

    /// No acknowledgement within the configured limit.
    #[error("no response after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl BackendError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, BackendError::Rejected(_))
    }
}

/// Failure to set up a backend from configuration.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConnectError {
    #[snafu(display("invalid gateway URL '{url}': {reason}"))]
    InvalidUrl { url: String, reason: String },

    #[snafu(display("unsupported gateway scheme '{scheme}' (only http is supported)"))]
    UnsupportedScheme { scheme: String },
}
