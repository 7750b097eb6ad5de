//! Vesting schedule CLI.
//!
//! Features:
//! - Config via file, environment (VESTING__*) and flags.
//! - Structured logging (tracing) on stderr, text or JSON.
//! - JSON results on stdout: computed schedules, durations, release counts,
//!   vested/claimable amounts at an instant.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

mod commands;
mod config;
mod telemetry;

use commands::Command;
use telemetry::LoggingConfig;

#[derive(Debug, Parser)]
#[command(name = "vesting-cli", author, version, about)]
struct Cli {
    /// Config file (toml, yaml or json).
    #[arg(long, env = "VESTING_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, overrides the config file, e.g. debug or warn,vesting_cli=trace
    #[arg(long, env = "VESTING_LOG")]
    log_filter: Option<String>,

    /// Single-line JSON output.
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(filter) = cli.log_filter {
        cfg.telemetry.log_filter = filter;
    }
    if cli.compact {
        cfg.output.pretty = false;
    }

    telemetry::init(LoggingConfig::from(&cfg.telemetry)).context("initialising logging")?;
    debug!(?cfg, "configuration loaded");

    let out = commands::run(&cli.command, &cfg.output)?;
    println!("{out}");
    Ok(())
}
