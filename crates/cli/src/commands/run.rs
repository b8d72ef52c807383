// Path: crates/cli/src/commands/run.rs

use anyhow::{Context, Result};
use clap::Parser;
use netrunner_cli::{LocalNetwork, NetworkConfig};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tokio::time::Instant;

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Network configuration file (.json or .toml).
    #[clap(long)]
    pub config: PathBuf,

    /// Seconds to wait for every node to report healthy.
    #[clap(long, default_value = "120")]
    pub health_timeout: u64,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config = NetworkConfig::from_file(&args.config)?;
    serve(config, Duration::from_secs(args.health_timeout)).await
}

/// Starts the network, waits for it to become healthy, and keeps it running
/// until Ctrl+C.
pub async fn serve(config: NetworkConfig, health_timeout: Duration) -> Result<()> {
    println!("Starting local network...");
    println!("   • Name:   {}", display_or(&config.name, "(unnamed)"));
    println!("   • Nodes:  {}", config.node_configs.len());

    let network = LocalNetwork::builder(config)
        .build()
        .await
        .context("Failed to create local network")?;

    if let Err(e) = network.healthy(Instant::now() + health_timeout).await {
        let _ = network.stop().await;
        return Err(e).context("Local network did not become healthy");
    }

    println!("\nNetwork {} is healthy.", network.network_id());
    println!("---------------------------------------------------------");
    for (name, node) in network.get_all_nodes().await? {
        println!("{}{}:", name, if node.is_beacon() { " (beacon)" } else { "" });
        println!("  Node ID:   {}", node.node_id());
        println!("  API:       {}", node.url());
        println!("  Staking:   {}", node.staking_port());
        println!("  Logs:      {}", node.log_dir().display());
    }
    println!("---------------------------------------------------------");
    println!("Press Ctrl+C to stop.\n");

    signal::ctrl_c().await?;
    println!("\nShutting down network...");
    network.stop().await?;
    println!("Bye!");
    Ok(())
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
