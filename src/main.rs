// ABOUTME: Entry point for the proxyforge CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use proxyforge::config::{self, CONFIG_FILENAME, Config};
use proxyforge::error::Result;
use proxyforge::output::{Output, OutputMode};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, Output::new(mode)).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let destination = cli.destination.as_deref();

    match cli.command {
        Commands::Init {
            network,
            rpc_url,
            force,
        } => {
            config::init_config(&cwd, network.as_deref(), rpc_url.as_deref(), force)?;
            output.success(&format!("Created {CONFIG_FILENAME}"));
            Ok(())
        }
        Commands::Plan => commands::plan(&load_config(&cwd, destination)?, &output),
        Commands::Deploy { skip_seed, force } => {
            let config = load_config(&cwd, destination)?;
            let options = commands::DeployOptions { skip_seed, force };
            commands::deploy(&config, &cwd, options, output).await
        }
        Commands::Upgrade { force } => {
            let config = load_config(&cwd, destination)?;
            commands::upgrade(&config, &cwd, force, output).await
        }
        Commands::Verify => {
            let config = load_config(&cwd, destination)?;
            commands::verify(&config, &cwd, output).await
        }
        Commands::Status => commands::status(&load_config(&cwd, destination)?, &cwd, &output),
    }
}

/// Discover the config and apply destination overrides if specified.
fn load_config(cwd: &Path, destination: Option<&str>) -> Result<Config> {
    let config = Config::discover(cwd)?;
    match destination {
        Some(dest) => config.for_destination(dest),
        None => Ok(config),
    }
}
