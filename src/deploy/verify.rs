// ABOUTME: Read-back verification of post-construction links.
// ABOUTME: Calls each configured getter and compares the result with the expected argument.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::backend::{CallArg, CallOps, with_timeout};
use crate::ledger::AddressLedger;
use crate::plan::Registry;
use crate::types::ComponentName;

use super::args::resolve_args;
use super::error::DeployError;

/// Outcome of one link check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub component: ComponentName,
    pub link: String,
    pub getter: String,
    pub expected: CallArg,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.error.is_none()
            && self
                .observed
                .as_ref()
                .is_some_and(|observed| self.expected.matches(observed))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    pub checks: Vec<CheckOutcome>,
}

impl VerifyReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(CheckOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed())
    }
}

/// Run every link check in registry order.
///
/// A failing getter call is recorded in the report rather than aborting, so
/// one run shows every broken link.
///
/// # Errors
///
/// Returns `DeployError::UnknownComponent` if a checked component or a
/// referenced address is missing from the ledger.
pub async fn verify_links<B: CallOps + ?Sized>(
    registry: &Registry,
    ledger: &AddressLedger,
    backend: &B,
    call_timeout: Duration,
) -> Result<VerifyReport, DeployError> {
    let mut report = VerifyReport::default();

    for spec in registry.iter() {
        for link in &spec.post_links {
            if link.checks.is_empty() {
                continue;
            }
            let target = ledger
                .address(&spec.name)
                .ok_or_else(|| DeployError::UnknownComponent(spec.name.clone()))?;

            for check in &link.checks {
                let owner = format!("{}.{}", spec.name, check.getter);
                let args = resolve_args(&owner, &check.args, ledger)?.args;
                let expected = resolve_args(&owner, std::slice::from_ref(&check.expect), ledger)?
                    .args
                    .remove(0);

                let (observed, error) =
                    match with_timeout(call_timeout, backend.call(target, &check.getter, &args))
                        .await
                    {
                        Ok(value) => (Some(value), None),
                        Err(e) => (None, Some(e.to_string())),
                    };

                let outcome = CheckOutcome {
                    component: spec.name.clone(),
                    link: link.method.clone(),
                    getter: check.getter.clone(),
                    expected,
                    observed,
                    error,
                };
                if outcome.passed() {
                    tracing::debug!(check = %owner, "link verified");
                } else {
                    tracing::warn!(check = %owner, "link check failed");
                }
                report.checks.push(outcome);
            }
        }
    }

    Ok(report)
}
