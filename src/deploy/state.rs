// ABOUTME: Deployment state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce the phase order at compile time.

/// Constructing proxies in plan order.
/// Available actions: `deploy_components()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Deploying;

/// Every component has an address.
/// Available actions: `wire()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Wiring;

/// Links are in place.
/// Available actions: `seed()`, `skip_seed()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Seeding;

/// Replacing implementations behind existing proxies.
/// Available actions: `upgrade_components()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Upgrading;

/// Every proxy runs the target implementation.
/// Available actions: `rewire()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Rewiring;

/// Run finished.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Done;
