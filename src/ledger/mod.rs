// ABOUTME: Persisted record of deployed proxies, the single source of truth across runs.
// ABOUTME: Loads current and legacy flat formats; every mutation is written atomically.

mod error;
mod lock;

pub use error::LedgerError;
pub use lock::{LedgerLock, LockInfo};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::{Address, ComponentName, ImplementationId};

/// What the ledger knows about one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub address: Address,

    /// Absent for entries imported from the legacy flat format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<ImplementationId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgraded_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            implementation: None,
            contract: None,
            deployed_at: None,
            upgraded_at: None,
        }
    }
}

/// Component name to proxy address, plus the last applied implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddressLedger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    /// Set before the first seed call is issued. A ledger with this but no
    /// `seeded_at` holds a partial seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_started_at: Option<DateTime<Utc>>,

    /// Set once the seed phase completed; seeding is never repeated afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeded_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub components: BTreeMap<ComponentName, LedgerEntry>,
}

impl AddressLedger {
    pub fn get(&self, name: &ComponentName) -> Option<&LedgerEntry> {
        self.components.get(name)
    }

    pub fn address(&self, name: &ComponentName) -> Option<Address> {
        self.components.get(name).map(|e| e.address)
    }

    pub fn contains(&self, name: &ComponentName) -> bool {
        self.components.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentName, &LedgerEntry)> {
        self.components.iter()
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded_at.is_some()
    }

    /// A seed phase started but never completed.
    pub fn seed_interrupted(&self) -> bool {
        self.seed_started_at.is_some() && self.seeded_at.is_none()
    }
}

/// On-disk shapes the ledger can be read from.
#[derive(Deserialize)]
#[serde(untagged)]
enum LedgerFile {
    Current(AddressLedger),
    /// `{ "governance": "0x...", ... }` as written by the old deploy script.
    Legacy(BTreeMap<ComponentName, Address>),
}

/// A ledger bound to its file. In-memory stores never touch the filesystem.
#[derive(Debug)]
pub struct LedgerStore {
    path: Option<PathBuf>,
    ledger: AddressLedger,
    legacy: bool,
}

impl LedgerStore {
    /// Load the ledger at `path`, or start empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Read` or `LedgerError::Parse` if an existing file
    /// cannot be used.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no ledger yet, starting empty");
                return Ok(Self {
                    path: Some(path),
                    ledger: AddressLedger::default(),
                    legacy: false,
                });
            }
            Err(source) => return Err(LedgerError::Read { path, source }),
        };

        let (ledger, legacy) = match serde_json::from_str::<LedgerFile>(&content) {
            Ok(LedgerFile::Current(ledger)) => (ledger, false),
            Ok(LedgerFile::Legacy(flat)) => (from_flat(flat), true),
            Err(source) => return Err(LedgerError::Parse { path, source }),
        };

        tracing::debug!(
            path = %path.display(),
            components = ledger.len(),
            legacy,
            "loaded ledger"
        );

        Ok(Self {
            path: Some(path),
            ledger,
            legacy,
        })
    }

    pub fn in_memory() -> Self {
        Self::from_ledger(AddressLedger::default())
    }

    /// An in-memory store starting from an existing ledger.
    pub fn from_ledger(ledger: AddressLedger) -> Self {
        Self {
            path: None,
            ledger,
            legacy: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn ledger(&self) -> &AddressLedger {
        &self.ledger
    }

    pub fn into_ledger(self) -> AddressLedger {
        self.ledger
    }

    /// True if the file was in the legacy flat format. It is rewritten in the
    /// current format on the next persist.
    pub fn was_legacy(&self) -> bool {
        self.legacy
    }

    /// Tie the ledger to a network, refusing to mix networks in one file.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NetworkMismatch` if the ledger already records a
    /// different network.
    pub fn bind_network(&mut self, network: &str) -> Result<(), LedgerError> {
        match &self.ledger.network {
            Some(recorded) if recorded != network => Err(LedgerError::NetworkMismatch {
                recorded: recorded.clone(),
                requested: network.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.ledger.network = Some(network.to_string());
                Ok(())
            }
        }
    }

    /// Record a freshly deployed proxy and persist before returning.
    pub fn record_deployed(
        &mut self,
        name: &ComponentName,
        contract: &str,
        address: Address,
        implementation: ImplementationId,
    ) -> Result<(), LedgerError> {
        self.ledger.components.insert(
            name.clone(),
            LedgerEntry {
                address,
                implementation: Some(implementation),
                contract: Some(contract.to_string()),
                deployed_at: Some(Utc::now()),
                upgraded_at: None,
            },
        );
        self.persist()
    }

    /// Record a new implementation behind an existing proxy and persist.
    pub fn record_upgrade(
        &mut self,
        name: &ComponentName,
        implementation: ImplementationId,
    ) -> Result<(), LedgerError> {
        let entry = self
            .ledger
            .components
            .get_mut(name)
            .ok_or_else(|| LedgerError::MissingEntry(name.clone()))?;
        entry.implementation = Some(implementation);
        entry.upgraded_at = Some(Utc::now());
        self.persist()
    }

    /// Mark the seed phase as started and persist before any seed call.
    pub fn record_seed_started(&mut self) -> Result<(), LedgerError> {
        self.ledger.seed_started_at = Some(Utc::now());
        self.persist()
    }

    pub fn record_seeded(&mut self) -> Result<(), LedgerError> {
        self.ledger.seeded_at = Some(Utc::now());
        self.persist()
    }

    /// Write the ledger through a temp file and rename, so a crash never
    /// leaves a truncated ledger behind.
    pub fn persist(&self) -> Result<(), LedgerError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.ledger).map_err(LedgerError::Serialize)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LedgerError::Write {
                path: path.clone(),
                source,
            })?;
        }

        let tmp = sibling(path, "tmp");
        std::fs::write(&tmp, format!("{json}\n")).map_err(|source| LedgerError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, path).map_err(|source| LedgerError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), components = self.ledger.len(), "ledger persisted");
        Ok(())
    }
}

fn from_flat(flat: BTreeMap<ComponentName, Address>) -> AddressLedger {
    AddressLedger {
        network: None,
        seed_started_at: None,
        seeded_at: None,
        components: flat
            .into_iter()
            .map(|(name, address)| (name, LedgerEntry::new(address)))
            .collect(),
    }
}

/// `deployed-addresses.json` -> `deployed-addresses.json.<suffix>`
pub(crate) fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
