// ABOUTME: Verify command implementation.
// ABOUTME: Reads every configured link back from the chain and reports mismatches.

use super::backend_connection::connect_backend;
use proxyforge::config::Config;
use proxyforge::deploy::verify_links;
use proxyforge::error::{Error, Result};
use proxyforge::ledger::LedgerStore;
use proxyforge::output::Output;
use std::path::Path;

/// Check that the post-construction links are in place.
pub async fn verify(config: &Config, cwd: &Path, mut output: Output) -> Result<()> {
    output.start_timer();
    let registry = config.preflight()?;
    let store = LedgerStore::open(config.ledger_path(cwd))?;

    let backend = connect_backend(config, &registry, store.ledger(), &output)?;

    output.progress("  → Checking links...");
    let report = verify_links(
        &registry,
        store.ledger(),
        &*backend,
        config.network.call_timeout,
    )
    .await?;

    for check in &report.checks {
        let mark = if check.passed() { "✓" } else { "✗" };
        let detail = match (&check.observed, &check.error) {
            (_, Some(error)) => format!(" ({error})"),
            (Some(observed), None) if !check.passed() => {
                format!(" (expected {}, got {observed})", check.expected)
            }
            _ => String::new(),
        };
        output.line(&format!(
            "  {mark} {}.{} via {}{detail}",
            check.component, check.link, check.getter
        ));
    }
    output.data("verify", &report);

    let failed = report.failures().count();
    if failed > 0 {
        return Err(Error::LinkChecksFailed(failed));
    }
    output.success(&format!("All {} link check(s) passed", report.checks.len()));
    Ok(())
}
