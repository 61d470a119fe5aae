// ABOUTME: Component registry and dependency graph resolution.
// ABOUTME: Splits construction-time edges (must be a DAG) from post-construction links.

mod args;
mod error;
mod registry;
mod resolve;

pub use args::{ArgSpec, ComponentRef, EnvArg, PayloadArg};
pub use error::{CycleError, PlanError};
pub use registry::{ComponentSpec, CyclicLink, LinkCheck, PostLink, ProxyKind, Registry, SeedStep};
pub use resolve::{DeploymentPlan, resolve};
