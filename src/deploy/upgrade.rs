// ABOUTME: Upgrade transitions: swap implementations in place, then re-run Wire.
// ABOUTME: Proxy addresses never change; the ledger tracks the implementation per component.

use crate::backend::{CallOps, ProxyOps, with_timeout};

use super::Deployment;
use super::error::{CallErrorExt, DeployError, Phase};
use super::state::{Done, Rewiring, Upgrading};
use super::transitions::TransitionResult;

// =============================================================================
// Upgrading -> Rewiring
// =============================================================================

impl Deployment<Upgrading> {
    /// Point every proxy at the current build of its contract, in plan order.
    ///
    /// Components already running the target implementation are skipped, so
    /// an interrupted upgrade resumes where it stopped.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::UnknownComponent` before any call if a component
    /// has no ledger entry; otherwise the first call or ledger failure.
    pub async fn upgrade_components<B: ProxyOps + ?Sized>(
        mut self,
        backend: &B,
    ) -> TransitionResult<Rewiring, Upgrading> {
        match self.run_upgrade(backend).await {
            Ok(()) => Ok(self.transition(Rewiring)),
            Err(e) => Err((self, e)),
        }
    }

    async fn run_upgrade<B: ProxyOps + ?Sized>(&mut self, backend: &B) -> Result<(), DeployError> {
        if let Some(missing) = self.plan.iter().find(|n| !self.store.ledger().contains(n)) {
            return Err(DeployError::UnknownComponent(missing.clone()));
        }

        for name in self.plan.iter() {
            let Some(spec) = self.registry.get(name) else {
                return Err(DeployError::UnknownComponent(name.clone()));
            };
            let Some(entry) = self.store.ledger().get(name) else {
                return Err(DeployError::UnknownComponent(name.clone()));
            };
            let proxy = entry.address;
            let current = entry.implementation.clone();

            let target = with_timeout(
                self.call_timeout,
                backend.prepare_upgrade(proxy, spec.contract()),
            )
            .await
            .context_call(Phase::Upgrade, name)?;

            if current.as_ref() == Some(&target) {
                tracing::debug!(component = %name, implementation = %target, "already current");
                self.summary.unchanged.push(name.clone());
                continue;
            }

            with_timeout(self.call_timeout, backend.upgrade_proxy(proxy, &target))
                .await
                .context_call(Phase::Upgrade, name)?;

            self.store.record_upgrade(name, target.clone())?;
            tracing::info!(component = %name, %proxy, implementation = %target, "upgraded");
            self.summary.upgraded.push(name.clone());
        }
        Ok(())
    }
}

// =============================================================================
// Rewiring -> Done
// =============================================================================

impl Deployment<Rewiring> {
    /// Re-issue every post-construction link against the unchanged addresses.
    ///
    /// # Errors
    ///
    /// Returns the engine, still in `Rewiring`, with the first failure.
    pub async fn rewire<B: CallOps + ?Sized>(
        mut self,
        backend: &B,
    ) -> TransitionResult<Done, Rewiring> {
        match self.run_wire(backend).await {
            Ok(report) => {
                self.wire_report = report;
                Ok(self.transition(Done))
            }
            Err(e) => Err((self, e)),
        }
    }
}
