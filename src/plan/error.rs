// ABOUTME: Configuration errors raised while validating a registry or computing a plan.
// ABOUTME: All of these are fatal and detected before any call is issued.

use crate::types::ComponentName;

/// Errors in the static shape of the registry.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("duplicate component name: {0}")]
    DuplicateComponent(ComponentName),

    #[error("{owner} references unknown component '{reference}'")]
    UnknownReference {
        owner: String,
        reference: ComponentName,
    },

    #[error("component '{0}' depends on itself")]
    SelfDependency(ComponentName),

    #[error("{owner} has a malformed argument: {detail}")]
    MalformedArgument { owner: String, detail: String },

    #[error(transparent)]
    Cycle(#[from] CycleError),
}

/// The construction-time graph is not a DAG.
///
/// `involved` lists every component sitting on a cycle, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("dependency cycle among components: {}", join_names(.involved))]
pub struct CycleError {
    pub involved: Vec<ComponentName>,
}

fn join_names(names: &[ComponentName]) -> String {
    names
        .iter()
        .map(ComponentName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
