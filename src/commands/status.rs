// ABOUTME: Status command implementation.
// ABOUTME: Compares the address ledger with the configured registry.

use chrono::{DateTime, Utc};
use proxyforge::config::Config;
use proxyforge::error::Result;
use proxyforge::ledger::LedgerStore;
use proxyforge::output::Output;
use proxyforge::types::{Address, ComponentName, ImplementationId};
use serde::Serialize;

#[derive(Serialize)]
struct ComponentStatus<'a> {
    name: &'a ComponentName,
    contract: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    implementation: Option<&'a ImplementationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upgraded_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    ledger: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed_started_at: Option<DateTime<Utc>>,
    seeded_at: Option<DateTime<Utc>>,
    components: Vec<ComponentStatus<'a>>,
    /// Ledger entries with no component in the current config.
    untracked: Vec<&'a ComponentName>,
}

/// Show which components the ledger already holds.
pub fn status(config: &Config, cwd: &std::path::Path, output: &Output) -> Result<()> {
    let registry = config.registry()?;
    let path = config.ledger_path(cwd);
    let store = LedgerStore::open(&path)?;
    let ledger = store.ledger();

    let components = registry
        .iter()
        .map(|spec| {
            let entry = ledger.get(&spec.name);
            ComponentStatus {
                name: &spec.name,
                contract: spec.contract(),
                address: entry.map(|e| e.address),
                implementation: entry.and_then(|e| e.implementation.as_ref()),
                upgraded_at: entry.and_then(|e| e.upgraded_at),
            }
        })
        .collect::<Vec<_>>();

    let untracked = ledger
        .iter()
        .filter(|(name, _)| registry.get(name).is_none())
        .map(|(name, _)| name)
        .collect::<Vec<_>>();

    let report = StatusReport {
        ledger: path.display().to_string(),
        network: ledger.network.as_deref(),
        seed_started_at: ledger.seed_started_at,
        seeded_at: ledger.seeded_at,
        components,
        untracked,
    };

    let deployed = report.components.iter().filter(|c| c.address.is_some()).count();
    output.line(&format!(
        "{}: {deployed} of {} component(s) deployed{}",
        report.ledger,
        report.components.len(),
        report
            .network
            .map(|n| format!(" on {n}"))
            .unwrap_or_default()
    ));
    for component in &report.components {
        match component.address {
            Some(address) => output.line(&format!(
                "  ✓ {:<20} {address}  {}",
                component.name.as_str(),
                component
                    .implementation
                    .map(|i| format!("impl {i}"))
                    .unwrap_or_default()
            )),
            None => output.line(&format!(
                "  ✗ {:<20} not deployed",
                component.name.as_str()
            )),
        }
    }
    for name in &report.untracked {
        output.line(&format!("  ? {name} is in the ledger but not in the config"));
    }
    match (report.seeded_at, report.seed_started_at) {
        (Some(at), _) => output.line(&format!("Seeded at {at}")),
        (None, Some(at)) => output.line(&format!(
            "Seed started at {at} but did not complete; it will not be retried"
        )),
        (None, None) => output.line("Not seeded"),
    }

    output.data("status", &report);
    Ok(())
}
