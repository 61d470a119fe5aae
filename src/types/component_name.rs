// ABOUTME: Validated logical component names used as registry and ledger keys.
// ABOUTME: Letters first, then ASCII alphanumerics, hyphens or underscores.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

const MAX_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComponentNameError {
    #[error("component name cannot be empty")]
    Empty,

    #[error("component name exceeds maximum length of 64 characters")]
    TooLong,

    #[error("component name must start with a letter")]
    InvalidStart,

    #[error("invalid character in component name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentName(String);

impl ComponentName {
    pub fn new(value: &str) -> Result<Self, ComponentNameError> {
        let mut chars = value.chars();

        let first = chars.next().ok_or(ComponentNameError::Empty)?;

        if value.len() > MAX_LEN {
            return Err(ComponentNameError::TooLong);
        }

        if !first.is_ascii_alphabetic() {
            return Err(ComponentNameError::InvalidStart);
        }

        for c in chars {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
                return Err(ComponentNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ComponentName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ComponentName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ComponentName::new(&s).map_err(serde::de::Error::custom)
    }
}
