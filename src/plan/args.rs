// ABOUTME: Argument descriptors for initializer, link, and seed calls.
// ABOUTME: Handles literals, component references, env lookups, and encoded seed payloads.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::seed::SeedPayload;
use crate::types::ComponentName;

/// One positional argument of a contract call, before resolution.
///
/// Only a map can be a keyed form (`ref`, `env`, `payload`); lists and
/// scalars are always literals.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgSpec {
    /// `{ ref: governance }`, resolved to that component's proxy address.
    Ref(ComponentRef),
    /// `{ env: ADMIN, default: "0x..." }`
    Env(EnvArg),
    /// `{ payload: { schema: nominations, records: [...] } }`
    Payload(PayloadArg),
    Literal(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentRef {
    #[serde(rename = "ref")]
    pub component: ComponentName,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvArg {
    pub env: String,
    #[serde(default)]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PayloadArg {
    pub payload: SeedPayload,
}

impl<'de> Deserialize<'de> for ArgSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let Value::Object(map) = &value else {
            return Ok(ArgSpec::Literal(value));
        };

        if map.contains_key("ref") {
            // An invalid name stays a literal so the registry can report it
            // with the owning component.
            return Ok(serde_json::from_value(value.clone())
                .map(ArgSpec::Ref)
                .unwrap_or(ArgSpec::Literal(value)));
        }
        if map.contains_key("env") {
            return serde_json::from_value(value)
                .map(ArgSpec::Env)
                .map_err(|e| D::Error::custom(format!("invalid env argument: {e}")));
        }
        if map.contains_key("payload") {
            return serde_json::from_value(value)
                .map(ArgSpec::Payload)
                .map_err(|e| D::Error::custom(format!("invalid payload argument: {e}")));
        }
        Ok(ArgSpec::Literal(value))
    }
}

impl ArgSpec {
    pub fn component(name: ComponentName) -> Self {
        ArgSpec::Ref(ComponentRef { component: name })
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        ArgSpec::Literal(value.into())
    }

    /// The component whose address this argument needs, if any.
    pub fn referenced(&self) -> Option<&ComponentName> {
        match self {
            ArgSpec::Ref(r) => Some(&r.component),
            _ => None,
        }
    }

    /// Name of the environment variable this argument requires with no fallback.
    pub fn required_env(&self) -> Option<&str> {
        match self {
            ArgSpec::Env(EnvArg { env, default: None }) => Some(env),
            _ => None,
        }
    }

    /// A literal object carrying a `ref` key is almost certainly a reference
    /// that failed name validation and fell through to `Literal`.
    pub(crate) fn malformed_reference(&self) -> Option<String> {
        match self {
            ArgSpec::Literal(Value::Object(map)) if map.contains_key("ref") => Some(format!(
                "invalid component reference {}",
                Value::Object(map.clone())
            )),
            _ => None,
        }
    }
}

impl EnvArg {
    /// Read the variable, falling back to the default.
    pub fn resolve(&self) -> Option<Value> {
        match std::env::var(&self.env) {
            Ok(val) => Some(Value::String(val)),
            Err(_) => self.default.clone(),
        }
    }
}
