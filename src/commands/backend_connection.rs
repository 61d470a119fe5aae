// ABOUTME: Shared helper for building the configured backend.
// ABOUTME: Used by deploy, upgrade, and verify.

use proxyforge::backend::{Backend, RpcBackend, SimulatedBackend};
use proxyforge::config::{BackendKind, Config};
use proxyforge::error::{Error, Result};
use proxyforge::ledger::AddressLedger;
use proxyforge::output::Output;
use proxyforge::plan::Registry;
use proxyforge::types::ImplementationId;

/// Connect to the backend named in the network config.
///
/// The simulated backend starts empty in every process, so it adopts the
/// proxies already recorded in the ledger to make upgrades dry-runnable.
pub fn connect_backend(
    config: &Config,
    registry: &Registry,
    ledger: &AddressLedger,
    output: &Output,
) -> Result<Box<dyn Backend>> {
    match config.network.backend {
        BackendKind::Rpc => {
            let url = config.network.rpc_url.as_deref().ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "network '{}' has no rpc_url",
                    config.network.name
                ))
            })?;
            let backend = RpcBackend::connect(url)?;
            output.progress(&format!("  → Using gateway at {}", backend.endpoint()));
            Ok(Box::new(backend))
        }
        BackendKind::Simulated => {
            output.progress("  → Using simulated backend (dry run)");
            let backend = SimulatedBackend::new();
            for (name, entry) in ledger.iter() {
                let contract = entry
                    .contract
                    .clone()
                    .or_else(|| registry.get(name).map(|s| s.contract().to_string()))
                    .unwrap_or_else(|| name.to_string());
                let implementation = entry
                    .implementation
                    .clone()
                    .unwrap_or_else(|| ImplementationId::new("unknown"));
                backend.adopt(entry.address, &contract, implementation);
            }
            Ok(Box::new(backend))
        }
    }
}
