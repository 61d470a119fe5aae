// ABOUTME: Resolves argument descriptors into call arguments against the ledger.
// ABOUTME: References become addresses, env lookups are read, payloads are ABI-encoded.

use serde_json::Value;

use crate::backend::CallArg;
use crate::ledger::AddressLedger;
use crate::plan::ArgSpec;
use crate::types::Address;

use super::error::DeployError;

/// Arguments ready to send.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolvedArgs {
    pub args: Vec<CallArg>,
    /// At least one argument is an encoded seed payload.
    pub carries_payload: bool,
}

pub(crate) fn resolve_args(
    owner: &str,
    specs: &[ArgSpec],
    ledger: &AddressLedger,
) -> Result<ResolvedArgs, DeployError> {
    let mut resolved = ResolvedArgs::default();
    for spec in specs {
        let arg = match spec {
            ArgSpec::Ref(r) => ledger
                .address(&r.component)
                .map(CallArg::Address)
                .ok_or_else(|| DeployError::UnknownComponent(r.component.clone()))?,
            ArgSpec::Env(env) => env.resolve().map(from_value).ok_or_else(|| {
                DeployError::configuration(
                    owner,
                    format!("environment variable {} is not set", env.env),
                )
            })?,
            ArgSpec::Payload(p) => {
                resolved.carries_payload = true;
                CallArg::Bytes(p.payload.encode()?)
            }
            ArgSpec::Literal(value) => from_value(value.clone()),
        };
        resolved.args.push(arg);
    }
    Ok(resolved)
}

/// Strings that are exactly an address keep the address type, so they
/// compare by value when links are verified.
fn from_value(value: Value) -> CallArg {
    match &value {
        Value::String(s) if s.len() == 42 && s.starts_with("0x") => match s.parse::<Address>() {
            Ok(address) => CallArg::Address(address),
            Err(_) => CallArg::Value(value),
        },
        _ => CallArg::Value(value),
    }
}
