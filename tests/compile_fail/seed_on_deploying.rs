// ABOUTME: Compile-fail test verifying seed cannot be called before components exist.
// ABOUTME: This test should fail to compile, validating phase ordering.

use proxyforge::backend::SimulatedBackend;
use proxyforge::deploy::{Deploying, Deployment};

async fn try_early_seed(deployment: Deployment<Deploying>, backend: &SimulatedBackend) {
    // ERROR: seed() method doesn't exist on Deployment<Deploying>
    let _ = deployment.seed(backend).await;
}

fn main() {}
