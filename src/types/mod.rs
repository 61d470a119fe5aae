// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod component_name;
mod id;

pub use alloy_primitives::{Address, Bytes};
pub use component_name::{ComponentName, ComponentNameError};
pub use id::{Id, ImplementationId, TxHash};
