// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gramgate - Telegram transport bridge for a CRM unified inbox.
//!
//! Binary entry point: parses the CLI, loads and validates configuration,
//! and dispatches to the serve loop.

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gramgate_config::GramgateConfig;
use gramgate_core::GramgateError;

/// Gramgate - Telegram transport bridge for a CRM unified inbox.
#[derive(Parser, Debug)]
#[command(name = "gramgate", version, about, long_about = None)]
struct Cli {
    /// Path to a configuration file (overrides the XDG hierarchy).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bridge: startup reconciliation sweep, then the HTTP server.
    Serve,
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

fn load_config(cli: &Cli) -> Result<GramgateConfig, GramgateError> {
    let config = match &cli.config {
        Some(path) => gramgate_config::load_config_from_path(path)
            .map_err(|e| GramgateError::Config(e.to_string()))?,
        None => gramgate_config::load_config().map_err(|e| GramgateError::Config(e.to_string()))?,
    };
    gramgate_config::validation::validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("gramgate: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::CheckConfig) => {
            println!("gramgate: configuration ok (host={})", config.server.host);
        }
        Some(Commands::Serve) | None => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("gramgate: {e}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads_and_validates() {
        let cli = Cli {
            config: None,
            command: None,
        };
        let config = load_config(&cli).expect("default config should be valid");
        assert!(!config.server.host.is_empty());
    }
}
