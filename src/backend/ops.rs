// ABOUTME: Composable capability traits for the proxy mechanism and contract calls.
// ABOUTME: Defines ProxyOps, CallOps, and the Backend umbrella trait.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use super::call_arg::CallArg;
use super::error::BackendError;
use super::sealed::Sealed;
use crate::plan::ProxyKind;
use crate::types::{Address, ImplementationId, TxHash};

/// Result of creating a new proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedProxy {
    pub address: Address,
    pub implementation: ImplementationId,
}

/// Upgradeable proxy lifecycle. The backend owns the actual mechanism.
#[async_trait]
pub trait ProxyOps: Sealed + Send + Sync {
    /// Deploy the implementation and a proxy in front of it, running the
    /// initializer with `init_args`. Returns once the proxy is final.
    async fn deploy_proxy(
        &self,
        contract: &str,
        kind: ProxyKind,
        init_args: &[CallArg],
    ) -> Result<DeployedProxy, BackendError>;

    /// Make the current build of `contract` available as an implementation
    /// for `proxy` and return its identifier. Idempotent for an unchanged build.
    async fn prepare_upgrade(
        &self,
        proxy: Address,
        contract: &str,
    ) -> Result<ImplementationId, BackendError>;

    /// Point `proxy` at `implementation`, keeping its address and storage.
    async fn upgrade_proxy(
        &self,
        proxy: Address,
        implementation: &ImplementationId,
    ) -> Result<(), BackendError>;
}

/// State-changing and read-only calls through a proxy.
#[async_trait]
pub trait CallOps: Sealed + Send + Sync {
    /// Submit a transaction and wait for it to be final.
    async fn send(
        &self,
        target: Address,
        method: &str,
        args: &[CallArg],
    ) -> Result<TxHash, BackendError>;

    /// Run a view call.
    async fn call(
        &self,
        target: Address,
        method: &str,
        args: &[CallArg],
    ) -> Result<serde_json::Value, BackendError>;
}

/// Everything the orchestrator needs. Auto-implemented.
pub trait Backend: ProxyOps + CallOps {}

impl<T: ProxyOps + CallOps> Backend for T {}

/// Await a backend call, failing with `BackendError::Timeout` after `limit`.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_elapsed) => Err(BackendError::Timeout(limit)),
    }
}
