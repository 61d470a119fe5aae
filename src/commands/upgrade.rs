// ABOUTME: Upgrade command implementation.
// ABOUTME: Swaps implementations behind the recorded proxies, then re-runs the links.

use super::backend_connection::connect_backend;
use proxyforge::config::Config;
use proxyforge::deploy::{Deployment, RunSummary, Upgrading};
use proxyforge::diagnostics::{Diagnostics, Warning};
use proxyforge::error::Result;
use proxyforge::ledger::{LedgerLock, LedgerStore};
use proxyforge::output::Output;
use proxyforge::plan::Registry;
use std::path::Path;

/// Upgrade every component recorded in the ledger.
pub async fn upgrade(config: &Config, cwd: &Path, force: bool, mut output: Output) -> Result<()> {
    output.start_timer();
    let registry = config.preflight()?;
    let ledger_path = config.ledger_path(cwd);
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Upgrading {} component(s) on {}",
        registry.len(),
        config.network.name
    ));

    output.progress("  → Acquiring ledger lock...");
    let lock = LedgerLock::acquire(&ledger_path, "upgrade", force)?;
    let result = upgrade_locked(config, registry, &ledger_path, &output, &mut diag).await;

    if let Err(e) = lock.release() {
        diag.warn(Warning::lock_release(format!("ledger lock not released: {e}")));
    }

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    let summary = result?;
    output.data(
        "summary",
        &serde_json::json!({
            "upgraded": summary.upgraded,
            "unchanged": summary.unchanged,
        }),
    );
    output.success(&format!(
        "Upgrade complete: {} upgraded, {} unchanged",
        summary.upgraded.len(),
        summary.unchanged.len()
    ));
    Ok(())
}

async fn upgrade_locked(
    config: &Config,
    registry: Registry,
    ledger_path: &Path,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<RunSummary> {
    let mut store = LedgerStore::open(ledger_path)?;
    if store.was_legacy() {
        diag.warn(Warning::legacy_ledger(format!(
            "{} uses the legacy flat format; it will be rewritten",
            ledger_path.display()
        )));
    }
    store.bind_network(&config.network.name)?;

    let backend = connect_backend(config, &registry, store.ledger(), output)?;

    let deployment =
        Deployment::<Upgrading>::new(registry, store)?.with_call_timeout(config.network.call_timeout);

    output.progress("  → Upgrading implementations...");
    let deployment = match deployment.upgrade_components(&*backend).await {
        Ok(d) => d,
        Err((failed, e)) => {
            output.progress(&format!(
                "  ✗ Stopped after {} upgrade(s). Re-run to resume.",
                failed.summary().upgraded.len()
            ));
            return Err(e.into());
        }
    };
    for name in &deployment.summary().upgraded {
        output.progress(&format!("    ✓ {name} upgraded"));
    }
    for name in &deployment.summary().unchanged {
        output.progress(&format!("    = {name} already current"));
    }

    output.progress("  → Re-wiring links...");
    let deployment = deployment
        .rewire(&*backend)
        .await
        .map_err(|(_, e)| e)?;
    output.progress(&format!(
        "    ✓ {} link call(s) issued",
        deployment.wire_report().len()
    ));

    let (_, summary) = deployment.finish();
    Ok(summary)
}
