// Path: crates/cli/src/commands/validate.rs

use anyhow::{Context, Result};
use clap::Parser;
use netrunner_cli::local::validate_network;
use netrunner_cli::NetworkConfig;
use netrunner_types::ErrorCode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Network configuration file (.json or .toml).
    #[clap(long)]
    pub config: PathBuf,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let config = NetworkConfig::from_file(&args.config)?;
    let validated = validate_network(&config)
        .map_err(|e| anyhow::anyhow!("[{}] {}", e.code(), e))
        .with_context(|| format!("{} is not a valid network config", args.config.display()))?;

    println!("✅ {} is valid", args.config.display());
    println!("   • Network ID: {}", validated.network_id);
    for (name, node) in validated.names.iter().zip(&config.node_configs) {
        println!("   • {}{}", name, if node.is_beacon { " (beacon)" } else { "" });
    }
    Ok(())
}
