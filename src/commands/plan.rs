// ABOUTME: Plan command implementation.
// ABOUTME: Prints the deployment order and deferred links without touching the network.

use proxyforge::config::Config;
use proxyforge::error::Result;
use proxyforge::output::Output;
use proxyforge::plan::{CyclicLink, resolve};
use proxyforge::types::ComponentName;
use serde::Serialize;

#[derive(Serialize)]
struct PlannedComponent<'a> {
    step: usize,
    name: &'a ComponentName,
    contract: &'a str,
    depends_on: Vec<&'a ComponentName>,
}

#[derive(Serialize)]
struct PlanReport<'a> {
    network: &'a str,
    order: Vec<PlannedComponent<'a>>,
    deferred_links: Vec<CyclicLink>,
    seed_steps: usize,
}

/// Show what `deploy` would do, in order.
pub fn plan(config: &Config, output: &Output) -> Result<()> {
    let registry = config.registry()?;
    let plan = resolve(&registry)?;

    let order = plan
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            let spec = registry.get(name)?;
            Some(PlannedComponent {
                step: i + 1,
                name: &spec.name,
                contract: spec.contract(),
                depends_on: spec.construction_dependencies(),
            })
        })
        .collect::<Vec<_>>();

    let report = PlanReport {
        network: &config.network.name,
        order,
        deferred_links: registry.cyclic_links(),
        seed_steps: config.seed.len(),
    };

    output.line(&format!(
        "Deployment plan for {} ({} component(s))",
        report.network,
        report.order.len()
    ));
    for component in &report.order {
        let deps = if component.depends_on.is_empty() {
            String::new()
        } else {
            let names: Vec<&str> = component.depends_on.iter().map(|n| n.as_str()).collect();
            format!(" after {}", names.join(", "))
        };
        output.line(&format!(
            "  {}. {} ({}){deps}",
            component.step, component.name, component.contract
        ));
    }

    if !report.deferred_links.is_empty() {
        output.line("Deferred links (wired after every component exists):");
        for link in &report.deferred_links {
            output.line(&format!("  {}.{} -> {}", link.from, link.method, link.to));
        }
    }
    if report.seed_steps > 0 {
        output.line(&format!("Seed steps: {}", report.seed_steps));
    }

    output.data("plan", &report);
    Ok(())
}
