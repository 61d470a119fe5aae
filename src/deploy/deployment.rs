// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: Owns the registry, the computed plan, and the ledger for the whole run.

use std::time::Duration;

use crate::backend::CallArg;
use crate::ledger::{AddressLedger, LedgerStore};
use crate::plan::{DeploymentPlan, Registry, SeedStep, resolve};
use crate::types::{Address, ComponentName, TxHash};

use super::error::DeployError;
use super::state::{Deploying, Done, Seeding, Upgrading};

/// Default limit for a single backend call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// A deployment or upgrade in progress, parameterized by its current phase.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) registry: Registry,
    pub(crate) plan: DeploymentPlan,
    pub(crate) store: LedgerStore,
    pub(crate) seed: Vec<SeedStep>,
    pub(crate) call_timeout: Duration,
    /// The ledger already held entries when the run started.
    pub(crate) resumed: bool,
    pub(crate) summary: RunSummary,
    pub(crate) wire_report: WireReport,
    pub(crate) state: S,
}

/// What a run did to each component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub deployed: Vec<ComponentName>,
    /// Already in the ledger at the start of the run.
    pub skipped: Vec<ComponentName>,
    pub upgraded: Vec<ComponentName>,
    /// Already running the target implementation.
    pub unchanged: Vec<ComponentName>,
    pub seeded: bool,
}

/// One linking call issued during Wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireCall {
    pub component: ComponentName,
    pub method: String,
    pub target: Address,
    pub args: Vec<CallArg>,
    pub tx: TxHash,
}

/// Every linking call issued during Wire, in issue order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireReport {
    calls: Vec<WireCall>,
}

impl WireReport {
    pub(crate) fn push(&mut self, call: WireCall) {
        self.calls.push(call);
    }

    pub fn calls(&self) -> &[WireCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// `(component, method, args)` triples, ignoring transaction hashes.
    pub fn signature(&self) -> Vec<(&ComponentName, &str, &[CallArg])> {
        self.calls
            .iter()
            .map(|c| (&c.component, c.method.as_str(), c.args.as_slice()))
            .collect()
    }
}

/// Whether seeding this deployment could duplicate records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSafety {
    /// Everything was deployed by this run.
    Fresh,
    /// The run resumed a partially populated ledger.
    Resumed,
    /// An earlier seed attempt stopped partway; some records may exist.
    Interrupted,
    /// The ledger records a completed seed.
    AlreadySeeded,
}

impl Deployment<Deploying> {
    /// Start a deployment: validate the plan against the registry.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Plan` if the construction graph has a cycle.
    pub fn new(registry: Registry, store: LedgerStore) -> Result<Self, DeployError> {
        let resumed = !store.ledger().is_empty();
        Self::build(registry, store, resumed, Deploying)
    }

    /// Seed steps to run after wiring.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Plan` if a step targets an undeclared component.
    pub fn with_seed(mut self, steps: Vec<SeedStep>) -> Result<Self, DeployError> {
        self.registry.check_seed(&steps)?;
        self.seed = steps;
        Ok(self)
    }
}

impl Deployment<Upgrading> {
    /// Start an upgrade of an existing deployment.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Plan` if the construction graph has a cycle.
    pub fn new(registry: Registry, store: LedgerStore) -> Result<Self, DeployError> {
        Self::build(registry, store, true, Upgrading)
    }
}

impl<S> Deployment<S> {
    fn build(
        registry: Registry,
        store: LedgerStore,
        resumed: bool,
        state: S,
    ) -> Result<Self, DeployError> {
        let plan = resolve(&registry)?;
        Ok(Deployment {
            registry,
            plan,
            store,
            seed: Vec::new(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            resumed,
            summary: RunSummary::default(),
            wire_report: WireReport::default(),
            state,
        })
    }

    /// Limit for every individual backend call.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn plan(&self) -> &DeploymentPlan {
        &self.plan
    }

    pub fn ledger(&self) -> &AddressLedger {
        self.store.ledger()
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn is_resumed(&self) -> bool {
        self.resumed
    }
}

impl Deployment<Seeding> {
    pub fn seed_safety(&self) -> SeedSafety {
        let ledger = self.store.ledger();
        if ledger.is_seeded() {
            SeedSafety::AlreadySeeded
        } else if ledger.seed_interrupted() {
            SeedSafety::Interrupted
        } else if self.resumed {
            SeedSafety::Resumed
        } else {
            SeedSafety::Fresh
        }
    }

    pub fn seed_steps(&self) -> &[SeedStep] {
        &self.seed
    }

    pub fn wire_report(&self) -> &WireReport {
        &self.wire_report
    }
}

impl Deployment<Done> {
    pub fn wire_report(&self) -> &WireReport {
        &self.wire_report
    }

    /// End the run, handing back the ledger store.
    pub fn finish(self) -> (LedgerStore, RunSummary) {
        (self.store, self.summary)
    }
}
