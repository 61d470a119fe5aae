// ABOUTME: Deploy command implementation.
// ABOUTME: Runs Deploy -> Wire -> Seed under the ledger lock.

use super::backend_connection::connect_backend;
use proxyforge::config::Config;
use proxyforge::deploy::{Deploying, Deployment, RunSummary, SeedSafety};
use proxyforge::diagnostics::{Diagnostics, Warning};
use proxyforge::error::Result;
use proxyforge::ledger::{LedgerLock, LedgerStore};
use proxyforge::output::Output;
use proxyforge::plan::Registry;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct DeployOptions {
    pub skip_seed: bool,
    pub force: bool,
}

/// Deploy every missing component of the configured registry.
pub async fn deploy(
    config: &Config,
    cwd: &Path,
    options: DeployOptions,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let registry = config.preflight()?;
    let ledger_path = config.ledger_path(cwd);
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Deploying {} component(s) to {}",
        registry.len(),
        config.network.name
    ));

    // Run deployment with lock held; the lock is removed on drop if we bail out early
    output.progress("  → Acquiring ledger lock...");
    let lock = LedgerLock::acquire(&ledger_path, "deploy", options.force)?;
    let result = deploy_locked(config, registry, &ledger_path, options, &output, &mut diag).await;

    if let Err(e) = lock.release() {
        diag.warn(Warning::lock_release(format!("ledger lock not released: {e}")));
    }

    // Emit collected warnings
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    let summary = result?;
    output.data("summary", &summary_json(&summary));
    output.success(&format!(
        "Deployment complete: {} deployed, {} already present{}",
        summary.deployed.len(),
        summary.skipped.len(),
        if summary.seeded { ", seeded" } else { "" }
    ));
    Ok(())
}

/// Inner deployment logic (runs while holding lock).
async fn deploy_locked(
    config: &Config,
    registry: Registry,
    ledger_path: &Path,
    options: DeployOptions,
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

    let deployment = Deployment::<Deploying>::new(registry, store)?
        .with_seed(config.seed.clone())?
        .with_call_timeout(config.network.call_timeout);

    output.progress(&format!("  → Plan: {}", deployment.plan()));
    if deployment.is_resumed() {
        output.progress(&format!(
            "  → Resuming: {} of {} component(s) already in the ledger",
            deployment.ledger().len(),
            deployment.plan().len()
        ));
    }

    // Deploy
    output.progress("  → Deploying components...");
    let deployment = match deployment.deploy_components(&*backend).await {
        Ok(d) => d,
        Err((failed, e)) => {
            output.progress(&format!(
                "  ✗ Stopped; the ledger holds {} component(s). Re-run to resume.",
                failed.ledger().len()
            ));
            return Err(e.into());
        }
    };
    for name in &deployment.summary().deployed {
        if let Some(address) = deployment.ledger().address(name) {
            output.progress(&format!("    ✓ {name} at {address}"));
        }
    }

    // Wire
    output.progress("  → Wiring links...");
    let deployment = deployment
        .wire(&*backend)
        .await
        .map_err(|(_, e)| e)?;
    output.progress(&format!(
        "    ✓ {} link call(s) issued",
        deployment.wire_report().len()
    ));

    // Seed
    let has_steps = !deployment.seed_steps().is_empty();
    let deployment = if options.skip_seed {
        if has_steps {
            diag.warn(Warning::seed_skipped("seed steps skipped (--skip-seed)"));
        }
        deployment.skip_seed()
    } else if deployment.seed_safety() == SeedSafety::AlreadySeeded {
        if has_steps {
            diag.warn(Warning::seed_skipped(
                "seed steps skipped: the ledger records a completed seed",
            ));
        }
        deployment.skip_seed()
    } else {
        if has_steps {
            output.progress(&format!(
                "  → Seeding ({} step(s))...",
                deployment.seed_steps().len()
            ));
        }
        deployment.seed(&*backend).await.map_err(|(_, e)| e)?
    };

    let (store, summary) = deployment.finish();
    if let Some(path) = store.path() {
        output.progress(&format!("  ✓ Ledger written to {}", path.display()));
    }
    Ok(summary)
}

fn summary_json(summary: &RunSummary) -> serde_json::Value {
    serde_json::json!({
        "deployed": summary.deployed,
        "skipped": summary.skipped,
        "seeded": summary.seeded,
    })
}
