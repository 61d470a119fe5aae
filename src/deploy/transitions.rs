// ABOUTME: State transition methods for the deploy, wire, and seed phases.
// ABOUTME: Each method consumes self and returns the next state, or itself with the error.

use crate::backend::{CallOps, ProxyOps, with_timeout};

use super::Deployment;
use super::args::resolve_args;
use super::deployment::{WireCall, WireReport};
use super::error::{CallErrorExt, DeployError, Phase};
use super::state::{Deploying, Done, Seeding, Wiring};

/// Result type for transitions that hand the engine back on failure.
pub type TransitionResult<T, S> = Result<Deployment<T>, (Deployment<S>, DeployError)>;

// =============================================================================
// Internal Helpers
// =============================================================================

impl<S> Deployment<S> {
    /// Internal helper to transition to a new state.
    pub(crate) fn transition<T>(self, state: T) -> Deployment<T> {
        Deployment {
            registry: self.registry,
            plan: self.plan,
            store: self.store,
            seed: self.seed,
            call_timeout: self.call_timeout,
            resumed: self.resumed,
            summary: self.summary,
            wire_report: self.wire_report,
            state,
        }
    }

    /// Issue every post-link in registry order against the current ledger.
    pub(crate) async fn run_wire<B: CallOps + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<WireReport, DeployError> {
        let mut report = WireReport::default();
        let ledger = self.store.ledger();

        for spec in self.registry.iter().filter(|s| !s.post_links.is_empty()) {
            let target = ledger
                .address(&spec.name)
                .ok_or_else(|| DeployError::UnknownComponent(spec.name.clone()))?;

            for link in &spec.post_links {
                let owner = format!("{}.{}", spec.name, link.method);
                let resolved = resolve_args(&owner, &link.args, ledger)?;

                let tx = with_timeout(
                    self.call_timeout,
                    backend.send(target, &link.method, &resolved.args),
                )
                .await
                .context_call(Phase::Wire, &owner)?;

                tracing::info!(component = %spec.name, method = %link.method, %tx, "linked");
                report.push(WireCall {
                    component: spec.name.clone(),
                    method: link.method.clone(),
                    target,
                    args: resolved.args,
                    tx,
                });
            }
        }

        Ok(report)
    }
}

// =============================================================================
// Deploying -> Wiring
// =============================================================================

impl Deployment<Deploying> {
    /// Deploy every component that is not in the ledger yet, in plan order.
    ///
    /// Each address is persisted before the next component is constructed, so
    /// on failure the ledger holds exactly the deployed prefix and a re-run
    /// continues from there.
    ///
    /// # Errors
    ///
    /// Returns the engine, still in `Deploying`, with the first failure.
    pub async fn deploy_components<B: ProxyOps + ?Sized>(
        mut self,
        backend: &B,
    ) -> TransitionResult<Wiring, Deploying> {
        match self.run_deploy(backend).await {
            Ok(()) => Ok(self.transition(Wiring)),
            Err(e) => Err((self, e)),
        }
    }

    async fn run_deploy<B: ProxyOps + ?Sized>(&mut self, backend: &B) -> Result<(), DeployError> {
        for name in self.plan.iter() {
            if self.store.ledger().contains(name) {
                tracing::debug!(component = %name, "already deployed, skipping");
                self.summary.skipped.push(name.clone());
                continue;
            }

            let Some(spec) = self.registry.get(name) else {
                return Err(DeployError::UnknownComponent(name.clone()));
            };
            let owner = format!("component '{name}'");
            let resolved = resolve_args(&owner, &spec.init_args, self.store.ledger())?;

            let proxy = with_timeout(
                self.call_timeout,
                backend.deploy_proxy(spec.contract(), spec.kind, &resolved.args),
            )
            .await
            .context_call(Phase::Deploy, name)?;

            self.store.record_deployed(
                name,
                spec.contract(),
                proxy.address,
                proxy.implementation,
            )?;
            tracing::info!(component = %name, address = %proxy.address, "deployed");
            self.summary.deployed.push(name.clone());
        }
        Ok(())
    }
}

// =============================================================================
// Wiring -> Seeding
// =============================================================================

impl Deployment<Wiring> {
    /// Issue every post-construction link. Links are safe to re-issue.
    ///
    /// # Errors
    ///
    /// Returns the engine, still in `Wiring`, with the first failure.
    pub async fn wire<B: CallOps + ?Sized>(
        mut self,
        backend: &B,
    ) -> TransitionResult<Seeding, Wiring> {
        match self.run_wire(backend).await {
            Ok(report) => {
                self.wire_report = report;
                Ok(self.transition(Seeding))
            }
            Err(e) => Err((self, e)),
        }
    }
}

// =============================================================================
// Seeding -> Done
// =============================================================================

impl Deployment<Seeding> {
    /// Run the seed steps in order. Only allowed on a fresh deployment.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::SeedNotSafe` if the run resumed a partial ledger,
    /// the ledger already records a seed, or an earlier attempt stopped partway, and `DeployError::SchemaMismatch`
    /// if the target rejects a call carrying an encoded payload.
    pub async fn seed<B: CallOps + ?Sized>(
        mut self,
        backend: &B,
    ) -> TransitionResult<Done, Seeding> {
        match self.run_seed(backend).await {
            Ok(()) => Ok(self.transition(Done)),
            Err(e) => Err((self, e)),
        }
    }

    /// Move on without seeding.
    pub fn skip_seed(self) -> Deployment<Done> {
        if !self.seed.is_empty() {
            tracing::info!(steps = self.seed.len(), "seed phase skipped");
        }
        self.transition(Done)
    }

    async fn run_seed<B: CallOps + ?Sized>(&mut self, backend: &B) -> Result<(), DeployError> {
        if self.seed.is_empty() {
            return Ok(());
        }
        if let Some(at) = self.store.ledger().seeded_at {
            return Err(DeployError::SeedNotSafe(format!(
                "ledger records a completed seed at {at}"
            )));
        }
        if let Some(at) = self.store.ledger().seed_started_at {
            return Err(DeployError::SeedNotSafe(format!(
                "an earlier seed attempt started at {at} did not complete"
            )));
        }
        if self.resumed {
            return Err(DeployError::SeedNotSafe(
                "this run resumed a partially deployed ledger".to_string(),
            ));
        }

        self.store.record_seed_started()?;

        for step in &self.seed {
            let owner = format!("{}.{}", step.component, step.method);
            let ledger = self.store.ledger();
            let target = ledger
                .address(&step.component)
                .ok_or_else(|| DeployError::UnknownComponent(step.component.clone()))?;
            let resolved = resolve_args(&owner, &step.args, ledger)?;

            let result = with_timeout(
                self.call_timeout,
                backend.send(target, &step.method, &resolved.args),
            )
            .await;

            let tx = match result {
                Err(e) if resolved.carries_payload && e.is_rejection() => {
                    return Err(DeployError::SchemaMismatch {
                        target: owner,
                        reason: e.to_string(),
                    });
                }
                other => other.context_call(Phase::Seed, &owner)?,
            };
            tracing::info!(component = %step.component, method = %step.method, %tx, "seeded");
        }

        self.store.record_seeded()?;
        self.summary.seeded = true;
        Ok(())
    }
}
