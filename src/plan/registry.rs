// ABOUTME: Static description of deployable components and their links.
// ABOUTME: Validates names and references before any plan is computed.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::args::ArgSpec;
use super::error::PlanError;
use crate::types::ComponentName;

/// Proxy pattern used when the component is first deployed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    #[default]
    Uups,
    Transparent,
}

/// One deployable component: a proxy plus its implementation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
    pub name: ComponentName,

    /// Contract artifact name; defaults to the component name.
    #[serde(default)]
    pub contract: Option<String>,

    #[serde(default)]
    pub kind: ProxyKind,

    #[serde(default)]
    pub init_args: Vec<ArgSpec>,

    #[serde(default)]
    pub depends_on: Vec<ComponentName>,

    #[serde(default)]
    pub post_links: Vec<PostLink>,
}

/// A call issued after every component exists, used to close reference cycles.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostLink {
    pub method: String,

    #[serde(default)]
    pub args: Vec<ArgSpec>,

    /// Read-back checks run by `verify`.
    #[serde(default)]
    pub checks: Vec<LinkCheck>,
}

/// A view call whose result must equal `expect` once wiring is done.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkCheck {
    pub getter: String,

    #[serde(default)]
    pub args: Vec<ArgSpec>,

    pub expect: ArgSpec,
}

/// An initial-state call issued once, right after a fresh deployment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedStep {
    pub component: ComponentName,
    pub method: String,

    #[serde(default)]
    pub args: Vec<ArgSpec>,
}

impl SeedStep {
    pub fn new(component: ComponentName, method: impl Into<String>, args: Vec<ArgSpec>) -> Self {
        Self {
            component,
            method: method.into(),
            args,
        }
    }
}

/// A post-construction edge: `from` learns the address of `to` via `method`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CyclicLink {
    pub from: ComponentName,
    pub to: ComponentName,
    pub method: String,
}

impl ComponentSpec {
    pub fn new(name: ComponentName) -> Self {
        Self {
            name,
            contract: None,
            kind: ProxyKind::default(),
            init_args: Vec::new(),
            depends_on: Vec::new(),
            post_links: Vec::new(),
        }
    }

    pub fn with_contract(mut self, contract: impl Into<String>) -> Self {
        self.contract = Some(contract.into());
        self
    }

    pub fn with_init_arg(mut self, arg: ArgSpec) -> Self {
        self.init_args.push(arg);
        self
    }

    pub fn with_dependency(mut self, name: ComponentName) -> Self {
        self.depends_on.push(name);
        self
    }

    pub fn with_post_link(mut self, method: impl Into<String>, args: Vec<ArgSpec>) -> Self {
        self.post_links.push(PostLink {
            method: method.into(),
            args,
            checks: Vec::new(),
        });
        self
    }

    pub fn contract(&self) -> &str {
        self.contract.as_deref().unwrap_or(self.name.as_str())
    }

    /// Components that must have an address before this one is constructed:
    /// the declared `depends_on` plus every reference inside `init_args`.
    pub fn construction_dependencies(&self) -> Vec<&ComponentName> {
        let mut seen = HashSet::new();
        self.depends_on
            .iter()
            .chain(self.init_args.iter().filter_map(ArgSpec::referenced))
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

/// The validated set of components, in declaration order.
#[derive(Debug, Clone)]
pub struct Registry {
    components: Vec<ComponentSpec>,
    index: HashMap<ComponentName, usize>,
}

impl Registry {
    /// Validate and index the components.
    ///
    /// # Errors
    ///
    /// Returns `PlanError` for duplicate names, self-dependencies, malformed
    /// arguments, or references to components that are not declared.
    pub fn new(components: Vec<ComponentSpec>) -> Result<Self, PlanError> {
        let mut index = HashMap::with_capacity(components.len());
        for (i, spec) in components.iter().enumerate() {
            if index.insert(spec.name.clone(), i).is_some() {
                return Err(PlanError::DuplicateComponent(spec.name.clone()));
            }
        }

        let registry = Self { components, index };

        for spec in &registry.components {
            let owner = format!("component '{}'", spec.name);

            for dep in spec.construction_dependencies() {
                if *dep == spec.name {
                    return Err(PlanError::SelfDependency(spec.name.clone()));
                }
                registry.ensure_known(&owner, dep)?;
            }
            registry.check_args(&owner, &spec.init_args)?;

            for link in &spec.post_links {
                let owner = format!("link {}.{}", spec.name, link.method);
                registry.check_args(&owner, &link.args)?;
                for check in &link.checks {
                    registry.check_args(&owner, &check.args)?;
                    registry.check_args(&owner, std::slice::from_ref(&check.expect))?;
                }
            }
        }

        Ok(registry)
    }

    /// Check that every reference inside `args` names a declared component.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::UnknownReference` or `PlanError::MalformedArgument`.
    pub fn check_args(&self, owner: &str, args: &[ArgSpec]) -> Result<(), PlanError> {
        for arg in args {
            if let Some(detail) = arg.malformed_reference() {
                return Err(PlanError::MalformedArgument {
                    owner: owner.to_string(),
                    detail,
                });
            }
            if let Some(name) = arg.referenced() {
                self.ensure_known(owner, name)?;
            }
        }
        Ok(())
    }

    /// Check that every seed step targets a declared component with valid arguments.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::UnknownReference` or `PlanError::MalformedArgument`.
    pub fn check_seed(&self, steps: &[SeedStep]) -> Result<(), PlanError> {
        for (i, step) in steps.iter().enumerate() {
            let owner = format!("seed step {} ({}.{})", i + 1, step.component, step.method);
            self.ensure_known(&owner, &step.component)?;
            self.check_args(&owner, &step.args)?;
        }
        Ok(())
    }

    fn ensure_known(&self, owner: &str, name: &ComponentName) -> Result<(), PlanError> {
        if self.index.contains_key(name) {
            Ok(())
        } else {
            Err(PlanError::UnknownReference {
                owner: owner.to_string(),
                reference: name.clone(),
            })
        }
    }

    pub fn get(&self, name: &ComponentName) -> Option<&ComponentSpec> {
        self.index.get(name).map(|&i| &self.components[i])
    }

    /// Declaration index of a component.
    pub fn position(&self, name: &ComponentName) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentSpec> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Every post-link edge that points at another component.
    pub fn cyclic_links(&self) -> Vec<CyclicLink> {
        self.components
            .iter()
            .flat_map(|spec| {
                spec.post_links.iter().flat_map(move |link| {
                    link.args.iter().filter_map(ArgSpec::referenced).map(move |to| CyclicLink {
                        from: spec.name.clone(),
                        to: to.clone(),
                        method: link.method.clone(),
                    })
                })
            })
            .collect()
    }

    /// Environment variables that must be set for the registry's arguments to resolve.
    pub fn required_env(&self) -> Vec<&str> {
        self.components
            .iter()
            .flat_map(|spec| {
                spec.init_args
                    .iter()
                    .chain(spec.post_links.iter().flat_map(|l| l.args.iter()))
            })
            .filter_map(ArgSpec::required_env)
            .collect()
    }
}
