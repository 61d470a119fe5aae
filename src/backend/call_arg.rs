// ABOUTME: Resolved call arguments as sent over the wire.
// ABOUTME: Addresses and byte payloads keep their types; everything else is JSON.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::types::{Address, Bytes};

/// A positional argument after references, env lookups and payloads are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CallArg {
    Address(Address),
    Bytes(Bytes),
    Value(Value),
}

impl CallArg {
    /// The address carried by this argument, if it is one.
    pub fn as_address(&self) -> Option<Address> {
        match self {
            CallArg::Address(a) => Some(*a),
            CallArg::Value(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    /// Compare against a value read back from a view call.
    ///
    /// Addresses compare by value, so checksum casing does not matter.
    pub fn matches(&self, observed: &Value) -> bool {
        match self {
            CallArg::Address(expected) => observed
                .as_str()
                .and_then(|s| s.parse::<Address>().ok())
                .is_some_and(|a| a == *expected),
            CallArg::Bytes(expected) => observed
                .as_str()
                .and_then(|s| s.parse::<Bytes>().ok())
                .is_some_and(|b| b == *expected),
            CallArg::Value(expected) => expected == observed,
        }
    }
}

impl From<Address> for CallArg {
    fn from(address: Address) -> Self {
        CallArg::Address(address)
    }
}

impl fmt::Display for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallArg::Address(a) => write!(f, "{a}"),
            CallArg::Bytes(b) if b.len() > 32 => write!(f, "<{} bytes>", b.len()),
            CallArg::Bytes(b) => write!(f, "{b}"),
            CallArg::Value(v) => write!(f, "{v}"),
        }
    }
}
