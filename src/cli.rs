// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "proxyforge")]
#[command(about = "Staged deployment and upgrade of upgradeable contract proxies")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// JSON lines output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Target destination (defined in config)
    #[arg(short, long, global = true)]
    pub destination: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new deploy.yml configuration file
    Init {
        /// Network name recorded in the ledger
        #[arg(long)]
        network: Option<String>,

        /// Deployment gateway URL (omit for a simulated dry-run setup)
        #[arg(long)]
        rpc_url: Option<String>,

        /// Overwrite an existing deploy.yml
        #[arg(short, long)]
        force: bool,
    },

    /// Show the deployment order and deferred links
    Plan,

    /// Deploy missing components, wire links, and seed a fresh deployment
    Deploy {
        /// Do not run the seed steps
        #[arg(long)]
        skip_seed: bool,

        /// Break an existing ledger lock
        #[arg(short, long)]
        force: bool,
    },

    /// Upgrade every component in place and re-wire links
    Upgrade {
        /// Break an existing ledger lock
        #[arg(short, long)]
        force: bool,
    },

    /// Read back every configured link and compare with the ledger
    Verify,

    /// Show what the ledger records for each component
    Status,
}
