// ABOUTME: Configuration types and parsing for deploy.yml.
// ABOUTME: Handles YAML parsing, destination merging, and preflight checks before any call.

mod deserialize;
mod init;

pub use init::{init_config, template_yaml};

use deserialize::deserialize_components;

use crate::error::{Error, Result};
use crate::plan::{ArgSpec, ComponentSpec, Registry, SeedStep};
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "deploy.yml";
pub const CONFIG_FILENAME_ALT: &str = "deploy.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".proxyforge/config.yml";

pub const DEFAULT_LEDGER: &str = "deployed-addresses.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    /// Ledger file, relative to the directory the config was found in.
    #[serde(default = "default_ledger")]
    pub ledger: PathBuf,

    #[serde(deserialize_with = "deserialize_components")]
    pub components: NonEmpty<ComponentSpec>,

    #[serde(default)]
    pub seed: Vec<SeedStep>,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,
}

/// Which backend carries the calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON-RPC deployment gateway.
    #[default]
    Rpc,
    /// In-process simulated chain, for dry runs.
    Simulated,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    #[serde(default = "default_network_name")]
    pub name: String,

    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub rpc_url: Option<String>,

    #[serde(default = "default_call_timeout", with = "humantime_serde")]
    pub call_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network_name(),
            backend: BackendKind::default(),
            rpc_url: None,
            call_timeout: default_call_timeout(),
        }
    }
}

/// Per-network overrides, selected with `--destination`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Destination {
    #[serde(default)]
    pub network: Option<NetworkOverride>,

    #[serde(default)]
    pub ledger: Option<PathBuf>,

    #[serde(default)]
    pub seed: Option<Vec<SeedStep>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct NetworkOverride {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub backend: Option<BackendKind>,

    #[serde(default)]
    pub rpc_url: Option<String>,

    #[serde(default, with = "humantime_serde")]
    pub call_timeout: Option<Duration>,
}

fn default_network_name() -> String {
    "localhost".to_string()
}

fn default_call_timeout() -> Duration {
    crate::deploy::DEFAULT_CALL_TIMEOUT
}

fn default_ledger() -> PathBuf {
    PathBuf::from(DEFAULT_LEDGER)
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "using config");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(ref network) = dest.network {
            if let Some(ref n) = network.name {
                merged.network.name = n.clone();
            }
            if let Some(backend) = network.backend {
                merged.network.backend = backend;
            }
            if network.rpc_url.is_some() {
                merged.network.rpc_url = network.rpc_url.clone();
            }
            if let Some(timeout) = network.call_timeout {
                merged.network.call_timeout = timeout;
            }
        }

        if let Some(ref ledger) = dest.ledger {
            merged.ledger = ledger.clone();
        }

        // Replace seed steps if destination specifies them
        if let Some(ref seed) = dest.seed {
            merged.seed = seed.clone();
        }

        Ok(merged)
    }

    /// Ledger path resolved against `base` when relative.
    pub fn ledger_path(&self, base: &Path) -> PathBuf {
        if self.ledger.is_absolute() {
            self.ledger.clone()
        } else {
            base.join(&self.ledger)
        }
    }

    /// Build and validate the component registry.
    pub fn registry(&self) -> Result<Registry> {
        let registry = Registry::new(self.components.iter().cloned().collect())?;
        registry.check_seed(&self.seed)?;
        Ok(registry)
    }

    /// Everything that can be checked without talking to the network: the
    /// registry, the seed steps, the gateway URL, and required env variables.
    pub fn preflight(&self) -> Result<Registry> {
        let registry = self.registry()?;

        if self.network.backend == BackendKind::Rpc && self.network.rpc_url.is_none() {
            return Err(Error::InvalidConfig(format!(
                "network '{}' uses the rpc backend but has no rpc_url",
                self.network.name
            )));
        }

        let seed_env = self
            .seed
            .iter()
            .flat_map(|step| step.args.iter())
            .filter_map(ArgSpec::required_env);

        for var in registry.required_env().into_iter().chain(seed_env) {
            if std::env::var(var).is_err() {
                return Err(Error::MissingEnvVar(var.to_string()));
            }
        }

        Ok(registry)
    }
}
