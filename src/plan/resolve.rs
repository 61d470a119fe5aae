// ABOUTME: Stable topological ordering of the construction-time dependency graph.
// ABOUTME: Ties are broken by registry declaration order; cycles are reported by SCC.

use std::collections::BTreeSet;
use std::fmt;

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use super::error::{CycleError, PlanError};
use super::registry::Registry;
use crate::types::ComponentName;

/// Components in an order where every construction dependency comes first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeploymentPlan {
    order: Vec<ComponentName>,
}

impl DeploymentPlan {
    pub fn iter(&self) -> impl Iterator<Item = &ComponentName> {
        self.order.iter()
    }

    pub fn as_slice(&self) -> &[ComponentName] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, name: &ComponentName) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }
}

impl fmt::Display for DeploymentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.order.iter().map(ComponentName::as_str).collect();
        write!(f, "{}", names.join(" → "))
    }
}

/// Compute the deployment order for a validated registry.
///
/// Only construction-time edges (`depends_on` plus `init_args` references)
/// participate. Post-construction links never do, so intentional cycles
/// expressed through them are fine.
///
/// # Errors
///
/// Returns `PlanError::Cycle` if the construction-time graph is not a DAG.
pub fn resolve(registry: &Registry) -> Result<DeploymentPlan, PlanError> {
    // Node i is the i-th declared component.
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(registry.len(), 0);
    for i in 0..registry.len() {
        graph.add_node(i);
    }

    for (i, spec) in registry.iter().enumerate() {
        for dep in spec.construction_dependencies() {
            if let Some(d) = registry.position(dep) {
                graph.add_edge(NodeIndex::new(d), NodeIndex::new(i), ());
            }
        }
    }

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();

    // Ready set ordered by declaration index, so the earliest declared
    // component always goes next.
    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, deg)| **deg == 0)
        .map(|(i, _)| i)
        .collect();

    let names: Vec<&ComponentName> = registry.iter().map(|s| &s.name).collect();
    let mut order = Vec::with_capacity(registry.len());

    while let Some(i) = ready.pop_first() {
        order.push(names[i].clone());
        for next in graph.neighbors_directed(NodeIndex::new(i), Direction::Outgoing) {
            let j = next.index();
            in_degree[j] = in_degree[j].saturating_sub(1);
            if in_degree[j] == 0 {
                ready.insert(j);
            }
        }
    }

    if order.len() != registry.len() {
        return Err(cycle_error(&graph, &names).into());
    }

    tracing::debug!(plan = %DeploymentPlan { order: order.clone() }, "resolved deployment plan");
    Ok(DeploymentPlan { order })
}

fn cycle_error(graph: &DiGraph<usize, ()>, names: &[&ComponentName]) -> CycleError {
    let mut involved: Vec<usize> = tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || scc.iter().any(|&n| graph.contains_edge(n, n)))
        .flatten()
        .map(NodeIndex::index)
        .collect();
    involved.sort_unstable();

    CycleError {
        involved: involved.into_iter().map(|i| names[i].clone()).collect(),
    }
}
