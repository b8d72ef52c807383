// Path: crates/cli/src/main.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # netrunner
//!
//! Runs a local blockchain network for development and tests.

use anyhow::Result;
use clap::{Parser, Subcommand};
use netrunner_telemetry::{init_tracing, LogFormat};

mod commands;

use commands::*;

#[derive(Parser, Debug)]
#[clap(
    name = "netrunner",
    version,
    about = "Starts and supervises a local network of blockchain nodes.",
    long_about = "netrunner validates a network configuration, launches one process per node, waits for the network to become healthy and keeps it running until interrupted."
)]
struct Cli {
    /// Log output format.
    #[clap(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the network described by a configuration file.
    Run(run::RunArgs),

    /// Runs the default five node network.
    Default(default::DefaultArgs),

    /// Checks a configuration file without starting anything.
    Validate(validate::ValidateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    match cli.command {
        Commands::Run(args) => run::run(args).await,
        Commands::Default(args) => default::run(args).await,
        Commands::Validate(args) => validate::run(args),
    }
}
