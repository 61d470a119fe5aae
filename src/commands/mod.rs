// ABOUTME: Command module aggregator for the proxyforge CLI.
// ABOUTME: Re-exports plan, deploy, upgrade, verify, and status handlers.

mod backend_connection;
mod deploy;
mod plan;
mod status;
mod upgrade;
mod verify;

pub use deploy::{DeployOptions, deploy};
pub use plan::plan;
pub use status::status;
pub use upgrade::upgrade;
pub use verify::verify;
