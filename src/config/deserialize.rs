// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Enforces a non-empty component list.

use nonempty::NonEmpty;
use serde::Deserialize;

use crate::plan::ComponentSpec;

pub fn deserialize_components<'de, D>(deserializer: D) -> Result<NonEmpty<ComponentSpec>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let components: Vec<ComponentSpec> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(components)
        .ok_or_else(|| serde::de::Error::custom("at least one component is required"))
}
