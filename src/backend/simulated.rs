// ABOUTME: In-process chain simulation for dry runs and tests.
// ABOUTME: Deterministic proxy addresses, versioned builds, journaled calls, and failure injection.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::call_arg::CallArg;
use super::error::BackendError;
use super::ops::{CallOps, DeployedProxy, ProxyOps};
use super::sealed::Sealed;
use crate::plan::ProxyKind;
use crate::types::{Address, ImplementationId, TxHash};
use alloy_primitives::{address, keccak256};

/// First account of the default local development mnemonic.
const DEFAULT_DEPLOYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// How an armed failure manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Transport,
    Rejected,
    /// Never answers; only a timeout gets the caller out.
    Hang,
}

/// One entry in the journal of everything the backend was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOp {
    DeployProxy {
        contract: String,
        address: Address,
        init_args: Vec<CallArg>,
    },
    PrepareUpgrade {
        proxy: Address,
        contract: String,
    },
    UpgradeProxy {
        proxy: Address,
        implementation: ImplementationId,
    },
    Send {
        target: Address,
        method: String,
        args: Vec<CallArg>,
    },
    Call {
        target: Address,
        method: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FailPoint {
    Deploy(String),
    Upgrade(String),
    Send(String),
}

#[derive(Debug)]
struct SimProxy {
    contract: String,
    implementation: ImplementationId,
}

#[derive(Debug, Default)]
struct SimState {
    nonce: u64,
    tx_count: u64,
    revisions: HashMap<String, u64>,
    proxies: HashMap<Address, SimProxy>,
    storage: HashMap<(Address, String), Vec<CallArg>>,
    views: HashMap<(String, String), (String, usize)>,
    armed: Vec<(FailPoint, Failure)>,
    journal: Vec<BackendOp>,
}

impl SimState {
    fn revision(&mut self, contract: &str) -> u64 {
        *self.revisions.entry(contract.to_string()).or_insert(1)
    }

    fn implementation(&mut self, contract: &str) -> ImplementationId {
        let revision = self.revision(contract);
        let digest = keccak256(format!("{contract}#{revision}"));
        ImplementationId::new(Address::from_word(digest).to_string())
    }

    /// Disarm and return the failure armed for `point`, if any.
    fn take_failure(&mut self, point: &FailPoint) -> Option<Failure> {
        let pos = self.armed.iter().position(|(p, _)| p == point)?;
        Some(self.armed.remove(pos).1)
    }

    fn proxy_contract(&self, proxy: Address) -> Result<String, BackendError> {
        self.proxies
            .get(&proxy)
            .map(|p| p.contract.clone())
            .ok_or_else(|| BackendError::Rejected(format!("no proxy deployed at {proxy}")))
    }
}

/// A deterministic stand-in for the network and the proxy plugin.
#[derive(Debug)]
pub struct SimulatedBackend {
    deployer: Address,
    state: Mutex<SimState>,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::with_deployer(DEFAULT_DEPLOYER)
    }

    pub fn with_deployer(deployer: Address) -> Self {
        Self {
            deployer,
            state: Mutex::new(SimState::default()),
        }
    }

    /// Simulate a new build of `contract`; later upgrades will target it.
    pub fn publish(&self, contract: &str) {
        let mut state = self.state.lock();
        let revision = state.revision(contract);
        state.revisions.insert(contract.to_string(), revision + 1);
    }

    /// Simulate a new build of every contract seen so far.
    pub fn publish_all(&self) {
        let mut state = self.state.lock();
        for revision in state.revisions.values_mut() {
            *revision += 1;
        }
    }

    /// Register a proxy that already exists, e.g. one recorded in a ledger.
    pub fn adopt(&self, address: Address, contract: &str, implementation: ImplementationId) {
        self.state.lock().proxies.insert(
            address,
            SimProxy {
                contract: contract.to_string(),
                implementation,
            },
        );
    }

    /// Make `getter` on `contract` return argument `index` of the last `setter` call.
    pub fn expose_view(&self, contract: &str, getter: &str, setter: &str, index: usize) {
        self.state.lock().views.insert(
            (contract.to_string(), getter.to_string()),
            (setter.to_string(), index),
        );
    }

    /// Fail the next deployment of `contract`.
    pub fn fail_deploy(&self, contract: &str, failure: Failure) {
        self.arm(FailPoint::Deploy(contract.to_string()), failure);
    }

    /// Fail the next upgrade of a proxy running `contract`.
    pub fn fail_upgrade(&self, contract: &str, failure: Failure) {
        self.arm(FailPoint::Upgrade(contract.to_string()), failure);
    }

    /// Fail the next transaction calling `method`.
    pub fn fail_send(&self, method: &str, failure: Failure) {
        self.arm(FailPoint::Send(method.to_string()), failure);
    }

    fn arm(&self, point: FailPoint, failure: Failure) {
        self.state.lock().armed.push((point, failure));
    }

    pub fn journal(&self) -> Vec<BackendOp> {
        self.state.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }

    /// Contracts deployed, in order.
    pub fn deployments(&self) -> Vec<String> {
        self.state
            .lock()
            .journal
            .iter()
            .filter_map(|op| match op {
                BackendOp::DeployProxy { contract, .. } => Some(contract.clone()),
                _ => None,
            })
            .collect()
    }

    /// Transactions sent, in order.
    pub fn sent(&self) -> Vec<(Address, String, Vec<CallArg>)> {
        self.state
            .lock()
            .journal
            .iter()
            .filter_map(|op| match op {
                BackendOp::Send {
                    target,
                    method,
                    args,
                } => Some((*target, method.clone(), args.clone())),
                _ => None,
            })
            .collect()
    }

    /// Proxies that received an upgrade, in order.
    pub fn upgraded(&self) -> Vec<Address> {
        self.state
            .lock()
            .journal
            .iter()
            .filter_map(|op| match op {
                BackendOp::UpgradeProxy { proxy, .. } => Some(*proxy),
                _ => None,
            })
            .collect()
    }

    pub fn implementation_of(&self, proxy: Address) -> Option<ImplementationId> {
        self.state
            .lock()
            .proxies
            .get(&proxy)
            .map(|p| p.implementation.clone())
    }

    pub fn proxy_count(&self) -> usize {
        self.state.lock().proxies.len()
    }
}

impl Sealed for SimulatedBackend {}

/// Turn an armed failure into an error, or wait forever for `Hang`.
async fn trip(failure: Failure, what: String) -> BackendError {
    match failure {
        Failure::Transport => BackendError::Transport(format!("simulated outage during {what}")),
        Failure::Rejected => BackendError::Rejected(format!("simulated revert in {what}")),
        Failure::Hang => std::future::pending::<BackendError>().await,
    }
}

#[async_trait]
impl ProxyOps for SimulatedBackend {
    async fn deploy_proxy(
        &self,
        contract: &str,
        _kind: ProxyKind,
        init_args: &[CallArg],
    ) -> Result<DeployedProxy, BackendError> {
        let armed = self
            .state
            .lock()
            .take_failure(&FailPoint::Deploy(contract.to_string()));
        if let Some(failure) = armed {
            return Err(trip(failure, format!("deploy of {contract}")).await);
        }

        let mut state = self.state.lock();
        let address = loop {
            let candidate = self.deployer.create(state.nonce);
            state.nonce += 1;
            if !state.proxies.contains_key(&candidate) {
                break candidate;
            }
        };

        let implementation = state.implementation(contract);
        state.proxies.insert(
            address,
            SimProxy {
                contract: contract.to_string(),
                implementation: implementation.clone(),
            },
        );
        state
            .storage
            .insert((address, "initialize".to_string()), init_args.to_vec());
        state.journal.push(BackendOp::DeployProxy {
            contract: contract.to_string(),
            address,
            init_args: init_args.to_vec(),
        });

        Ok(DeployedProxy {
            address,
            implementation,
        })
    }

    async fn prepare_upgrade(
        &self,
        proxy: Address,
        contract: &str,
    ) -> Result<ImplementationId, BackendError> {
        let mut state = self.state.lock();
        state.proxy_contract(proxy)?;
        state.journal.push(BackendOp::PrepareUpgrade {
            proxy,
            contract: contract.to_string(),
        });
        Ok(state.implementation(contract))
    }

    async fn upgrade_proxy(
        &self,
        proxy: Address,
        implementation: &ImplementationId,
    ) -> Result<(), BackendError> {
        let armed = {
            let mut state = self.state.lock();
            let contract = state.proxy_contract(proxy)?;
            state.take_failure(&FailPoint::Upgrade(contract))
        };
        if let Some(failure) = armed {
            return Err(trip(failure, format!("upgrade of {proxy}")).await);
        }

        let mut state = self.state.lock();
        if let Some(p) = state.proxies.get_mut(&proxy) {
            p.implementation = implementation.clone();
        }
        state.journal.push(BackendOp::UpgradeProxy {
            proxy,
            implementation: implementation.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl CallOps for SimulatedBackend {
    async fn send(
        &self,
        target: Address,
        method: &str,
        args: &[CallArg],
    ) -> Result<TxHash, BackendError> {
        let armed = {
            let mut state = self.state.lock();
            state.proxy_contract(target)?;
            state.take_failure(&FailPoint::Send(method.to_string()))
        };
        if let Some(failure) = armed {
            return Err(trip(failure, format!("{method} on {target}")).await);
        }

        let mut state = self.state.lock();
        state.tx_count += 1;
        let hash = keccak256(state.tx_count.to_be_bytes());
        state
            .storage
            .insert((target, method.to_string()), args.to_vec());
        state.journal.push(BackendOp::Send {
            target,
            method: method.to_string(),
            args: args.to_vec(),
        });
        Ok(TxHash::new(hash.to_string()))
    }

    async fn call(
        &self,
        target: Address,
        method: &str,
        _args: &[CallArg],
    ) -> Result<serde_json::Value, BackendError> {
        let mut state = self.state.lock();
        let contract = state.proxy_contract(target)?;
        state.journal.push(BackendOp::Call {
            target,
            method: method.to_string(),
        });

        let (setter, index) = state
            .views
            .get(&(contract.clone(), method.to_string()))
            .cloned()
            .ok_or_else(|| BackendError::Rejected(format!("{contract} has no view {method}")))?;

        let value = state
            .storage
            .get(&(target, setter))
            .and_then(|args| args.get(index))
            .cloned()
            .unwrap_or(CallArg::Address(Address::ZERO));

        serde_json::to_value(value).map_err(|e| BackendError::Transport(e.to_string()))
    }
}
