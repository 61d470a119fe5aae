// ABOUTME: Compile-fail test verifying an upgrade run can never reach the seed phase.
// ABOUTME: This test should fail to compile, validating that upgrades never seed.

use proxyforge::backend::SimulatedBackend;
use proxyforge::deploy::{Deployment, Rewiring};

async fn try_seed_after_upgrade(deployment: Deployment<Rewiring>, backend: &SimulatedBackend) {
    // ERROR: seed() method doesn't exist on Deployment<Rewiring>
    let _ = deployment.seed(backend).await;
}

fn main() {}
