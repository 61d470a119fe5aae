// ABOUTME: Seed record schemas addressable by name from configuration.
// ABOUTME: Each schema is a sol! struct whose layout mirrors the contract's decoder.

use std::fmt;

use alloy_sol_types::sol;
use serde::Deserialize;

use super::{SeedError, encode};
use crate::types::Bytes;

sol! {
    /// Tournament nomination as decoded by `Tournament.createTournament`.
    #[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    struct Nomination {
        uint8 nameId;
        uint8 max;
        address[] participants;
        address[] winners;
        string badgeURI;
        uint8 weaponId;
        uint8 gender;
    }
}

/// Named payload schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedSchema {
    /// `tuple(uint8 nameId, uint8 max, address[] participants, address[] winners,
    /// string badgeURI, uint8 weaponId, uint8 gender)[]`
    Nominations,
}

impl SeedSchema {
    /// Deserialize JSON records into the schema's struct and encode them.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::InvalidRecords` if a record is missing a field or a
    /// value does not fit its type.
    pub fn encode_json(&self, records: &serde_json::Value) -> Result<Bytes, SeedError> {
        match self {
            SeedSchema::Nominations => {
                let typed: Vec<Nomination> = serde_json::from_value(records.clone())
                    .map_err(|source| SeedError::InvalidRecords {
                        schema: *self,
                        source,
                    })?;
                Ok(encode(&typed))
            }
        }
    }
}

impl fmt::Display for SeedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedSchema::Nominations => write!(f, "nominations"),
        }
    }
}
