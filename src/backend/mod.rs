// ABOUTME: Network collaborators consumed by the orchestrator.
// ABOUTME: Capability traits plus JSON-RPC and simulated implementations.

mod call_arg;
mod error;
mod ops;
mod rpc;
pub(crate) mod sealed;
mod simulated;

pub use call_arg::CallArg;
pub use error::{BackendError, ConnectError};
pub use ops::{Backend, CallOps, DeployedProxy, ProxyOps, with_timeout};
pub use rpc::RpcBackend;
pub use simulated::{BackendOp, Failure, SimulatedBackend};
