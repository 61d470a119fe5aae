// ABOUTME: Library root for proxyforge - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod backend;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod ledger;
pub mod output;
pub mod plan;
pub mod seed;
pub mod types;
