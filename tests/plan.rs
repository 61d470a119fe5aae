// ABOUTME: Property and scenario tests for dependency resolution.
// ABOUTME: Random DAGs must yield dependency-respecting, deterministic orders.

mod support;

use proptest::prelude::*;
use proxyforge::plan::{ArgSpec, ComponentSpec, PlanError, Registry, resolve};
use support::{chain_registry, name, tournament_registry};

/// A random DAG over `n` components, declared in a shuffled order.
///
/// Edges only ever point from a lower to a higher topological rank, so the
/// graph is acyclic; the shuffle makes declaration order differ from rank.
fn arb_dag() -> impl Strategy<Value = Vec<ComponentSpec>> {
    (1usize..12)
        .prop_flat_map(|n| {
            let edges = prop::collection::vec(prop::bool::weighted(0.3), n * n);
            let as_init_arg = prop::collection::vec(any::<bool>(), n * n);
            (Just(n), edges, as_init_arg, Just((0..n).collect::<Vec<_>>()).prop_shuffle())
        })
        .prop_map(|(n, edges, as_init_arg, declared)| {
            let mut specs: Vec<ComponentSpec> = (0..n)
                .map(|rank| ComponentSpec::new(name(&format!("c{rank}"))))
                .collect();
            for to in 0..n {
                for from in 0..to {
                    if !edges[from * n + to] {
                        continue;
                    }
                    let dep = name(&format!("c{from}"));
                    let spec = specs[to].clone();
                    specs[to] = if as_init_arg[from * n + to] {
                        spec.with_init_arg(ArgSpec::component(dep))
                    } else {
                        spec.with_dependency(dep)
                    };
                }
            }
            declared.into_iter().map(|rank| specs[rank].clone()).collect()
        })
}

/// `ring` components that each depend on the next, plus one outsider,
/// declared in a shuffled order.
fn arb_ring() -> impl Strategy<Value = (usize, Vec<ComponentSpec>)> {
    (2usize..10)
        .prop_flat_map(|ring| (Just(ring), Just((0..=ring).collect::<Vec<_>>()).prop_shuffle()))
        .prop_map(|(ring, declared)| {
            let specs: Vec<ComponentSpec> = (0..=ring)
                .map(|i| {
                    let spec = ComponentSpec::new(name(&format!("c{i}")));
                    if i < ring {
                        spec.with_dependency(name(&format!("c{}", (i + 1) % ring)))
                    } else {
                        spec
                    }
                })
                .collect();
            (ring, declared.into_iter().map(|i| specs[i].clone()).collect())
        })
}

proptest! {
    #[test]
    fn cycles_are_reported_with_their_members((ring, specs) in arb_ring()) {
        let registry = Registry::new(specs).unwrap();
        let err = resolve(&registry).unwrap_err();
        let PlanError::Cycle(cycle) = err else {
            return Err(TestCaseError::fail("expected a cycle error"));
        };
        prop_assert_eq!(cycle.involved.len(), ring);
        let outside = name(&format!("c{ring}"));
        prop_assert!(!cycle.involved.contains(&outside));
    }

    #[test]
    fn order_respects_every_construction_edge(specs in arb_dag()) {
        let registry = Registry::new(specs).unwrap();
        let plan = resolve(&registry).unwrap();

        prop_assert_eq!(plan.len(), registry.len());
        for spec in registry.iter() {
            let at = plan.position(&spec.name).unwrap();
            for dep in spec.construction_dependencies() {
                prop_assert!(plan.position(dep).unwrap() < at);
            }
        }
    }

    #[test]
    fn resolution_is_deterministic(specs in arb_dag()) {
        let first = resolve(&Registry::new(specs.clone()).unwrap()).unwrap();
        let second = resolve(&Registry::new(specs).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn tournament_platform_orders_governance_first() {
    let registry = tournament_registry();
    let plan = resolve(&registry).unwrap();
    assert_eq!(
        plan.to_string(),
        "governance → fencer → tournament → achievementSBT"
    );
}

#[test]
fn tournament_cycles_are_expressed_as_post_links() {
    let registry = tournament_registry();
    let links: Vec<(String, String)> = registry
        .cyclic_links()
        .into_iter()
        .map(|l| (l.from.to_string(), l.to.to_string()))
        .collect();

    assert_eq!(
        links,
        [
            ("governance".to_string(), "fencer".to_string()),
            ("governance".to_string(), "tournament".to_string()),
            ("tournament".to_string(), "achievementSBT".to_string()),
        ]
    );
}

#[test]
fn long_chain_resolves_in_dependency_order() {
    let registry = chain_registry(&["a", "b", "c", "d", "e"]);
    let plan = resolve(&registry).unwrap();
    let order: Vec<&str> = plan.iter().map(|n| n.as_str()).collect();
    assert_eq!(order, ["a", "b", "c", "d", "e"]);
}

#[test]
fn construction_cycle_names_every_member() {
    let registry = Registry::new(vec![
        ComponentSpec::new(name("outside")),
        ComponentSpec::new(name("a")).with_dependency(name("c")),
        ComponentSpec::new(name("b")).with_init_arg(ArgSpec::component(name("a"))),
        ComponentSpec::new(name("c")).with_dependency(name("b")),
    ])
    .unwrap();

    let cycle = match resolve(&registry).unwrap_err() {
        PlanError::Cycle(cycle) => cycle,
        other => panic!("expected a cycle error, got {other:?}"),
    };
    assert_eq!(cycle.involved, [name("a"), name("b"), name("c")]);
}

#[test]
fn unknown_reference_is_caught_before_planning() {
    let err = Registry::new(vec![
        ComponentSpec::new(name("tournament")).with_init_arg(ArgSpec::component(name("ghost"))),
    ])
    .unwrap_err();
    assert!(matches!(err, PlanError::UnknownReference { ref reference, .. } if *reference == name("ghost")));
}
