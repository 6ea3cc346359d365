//! macropadctl - MacroPad configuration CLI
//!
//! Reads, writes and resets the configuration of a USB-connected MacroPad
//! and exposes the raw payload log for troubleshooting.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod output;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::ConfigCommands;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "macropadctl")]
#[command(about = "MacroPad Control CLI - Read and write MacroPad configuration over USB")]
#[command(version)]
#[command(long_about = "
macropadctl talks to a MacroPad over its USB bulk configuration interface.
It can show device information, read and write the button, settings and
widget configuration, reset it to factory defaults and reboot the device.

Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Settings file (YAML)
    #[arg(long, global = true, env = "MACROPAD_CONFIG")]
    config: Option<PathBuf>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true, env = "MACROPAD_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Send and receive unframed JSON
    #[arg(long, global = true)]
    raw: bool,

    /// Report replies to earlier commands as a correlation mismatch
    #[arg(long, global = true)]
    verify_correlation: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the connected device
    Info,

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Reboot the device
    Reboot,

    /// Read the configuration and show the raw payload log
    Log,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("macropadctl={0},macropad_client={0},macropad_transport={0}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let result = execute_command(&cli).await;

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            std::process::exit(exit_code);
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    let settings = settings::load(
        cli.config.as_deref(),
        settings::Overrides {
            timeout_ms: cli.timeout_ms,
            raw: cli.raw,
            verify_correlation: cli.verify_correlation,
        },
    )?;

    match &cli.command {
        Commands::Info => commands::device::info(&settings, cli.json).await,
        Commands::Config(cmd) => commands::config::execute(cmd, &settings, cli.json).await,
        Commands::Reboot => commands::device::reboot(&settings, cli.json).await,
        Commands::Log => commands::log::execute(&settings, cli.json).await,
    }
}
