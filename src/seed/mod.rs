// ABOUTME: Seed payload encoding for structured initial-state arguments.
// ABOUTME: ABI tuple-array encoding matching the target contract's decoding schema.

mod schema;

pub use schema::{Nomination, SeedSchema};

use alloy_sol_types::{SolType, SolValue, sol_data};
use serde::Deserialize;

use crate::types::Bytes;

/// Errors while turning configured seed records into a payload.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seed records do not match schema '{schema}': {source}")]
    InvalidRecords {
        schema: SeedSchema,
        #[source]
        source: serde_json::Error,
    },

    #[error("payload does not decode as the expected schema: {0}")]
    Decode(#[from] alloy_sol_types::Error),
}

/// A payload argument as written in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedPayload {
    pub schema: SeedSchema,
    pub records: serde_json::Value,
}

impl SeedPayload {
    /// # Errors
    ///
    /// Returns `SeedError::InvalidRecords` if the records do not fit the schema.
    pub fn encode(&self) -> Result<Bytes, SeedError> {
        self.schema.encode_json(&self.records)
    }
}

/// Encode records as a single ABI `T[]` value.
///
/// The output equals ethers' `AbiCoder.encode(['tuple(...)[]'], [records])`:
/// an offset word, then the array length, then the element encodings. The
/// encoder performs no schema validation of its own; a mismatch with the
/// receiving contract shows up only as a rejected call.
pub fn encode<T>(records: &[T]) -> Bytes
where
    T: SolValue + Clone,
{
    Bytes::from(records.to_vec().abi_encode())
}

/// Decode a payload produced by [`encode`] with strict validation.
///
/// # Errors
///
/// Returns `SeedError::Decode` if the bytes are not a valid `T[]` encoding.
pub fn decode<T>(payload: &[u8]) -> Result<Vec<T::RustType>, SeedError>
where
    T: SolType,
{
    Ok(<sol_data::Array<T> as SolType>::abi_decode(payload, true)?)
}
