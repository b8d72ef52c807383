// Path: crates/cli/src/commands/default.rs

use super::run::serve;
use anyhow::Result;
use clap::Parser;
use netrunner_cli::default_network_config;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
pub struct DefaultArgs {
    /// The node binary every node runs.
    #[clap(long)]
    pub binary_path: PathBuf,

    /// Seconds to wait for every node to report healthy.
    #[clap(long, default_value = "120")]
    pub health_timeout: u64,
}

/// Runs the default five node network.
pub async fn run(args: DefaultArgs) -> Result<()> {
    let config = default_network_config(&args.binary_path)?;
    serve(config, Duration::from_secs(args.health_timeout)).await
}
