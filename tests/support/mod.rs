// ABOUTME: Test support utilities.
// ABOUTME: Provides the tournament registry fixture and a simulated backend wired for link checks.

use proxyforge::backend::SimulatedBackend;
use proxyforge::config::{Config, template_yaml};
use proxyforge::plan::{ComponentSpec, Registry, SeedStep};
use proxyforge::types::ComponentName;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("proxyforge=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub fn name(s: &str) -> ComponentName {
    ComponentName::new(s).unwrap()
}

/// The four-component tournament platform from the starter template.
#[allow(dead_code)]
pub fn tournament_config() -> Config {
    Config::from_yaml(&template_yaml("localhost", None)).unwrap()
}

#[allow(dead_code)]
pub fn tournament_registry() -> Registry {
    tournament_config().registry().unwrap()
}

#[allow(dead_code)]
pub fn tournament_seed() -> Vec<SeedStep> {
    tournament_config().seed
}

/// A simulated backend whose getters read back what the links set.
#[allow(dead_code)]
pub fn wired_backend() -> SimulatedBackend {
    let backend = SimulatedBackend::new();
    backend.expose_view("PlatformGovernance", "fencerContract", "initAddress", 0);
    backend.expose_view("PlatformGovernance", "tournamentContract", "initAddress", 1);
    backend.expose_view("Tournament", "achievementSBT", "setAchievementSBT", 0);
    backend
}

/// A linear chain `a <- b <- c ...` of components with no links.
#[allow(dead_code)]
pub fn chain_registry(names: &[&str]) -> Registry {
    let mut specs = Vec::new();
    for (i, n) in names.iter().enumerate() {
        let mut spec = ComponentSpec::new(name(n));
        if i > 0 {
            spec = spec.with_dependency(name(names[i - 1]));
        }
        specs.push(spec);
    }
    Registry::new(specs).unwrap()
}
