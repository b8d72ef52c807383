// Path: crates/cli/src/local/node.rs

use super::process::NodeProcess;
use crate::api::ApiClient;
use anyhow::Result;
use netrunner_types::{NodeConfig, NodeId};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a started node listens and keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEndpoints {
    pub address: String,
    pub http_port: u16,
    pub staking_port: u16,
    pub dir: PathBuf,
    pub db_dir: PathBuf,
    pub log_dir: PathBuf,
}

/// A registered, running node.
///
/// Owned by the network registry and handed out as `Arc<LocalNode>`. The
/// process handle and API client belong to this node alone.
pub struct LocalNode {
    name: String,
    node_id: NodeId,
    config: NodeConfig,
    endpoints: NodeEndpoints,
    client: Arc<dyn ApiClient>,
    process: Box<dyn NodeProcess>,
}

impl LocalNode {
    pub(crate) fn new(
        name: String,
        node_id: NodeId,
        config: NodeConfig,
        endpoints: NodeEndpoints,
        client: Arc<dyn ApiClient>,
        process: Box<dyn NodeProcess>,
    ) -> Self {
        Self {
            name,
            node_id,
            config,
            endpoints,
            client,
            process,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// The config the node was started with: resolved name, merged flags and
    /// the staking pair actually in use.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn is_beacon(&self) -> bool {
        self.config.is_beacon
    }

    pub fn api_client(&self) -> Arc<dyn ApiClient> {
        Arc::clone(&self.client)
    }

    /// The base URL of the node's HTTP API.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.endpoints.address, self.endpoints.http_port)
    }

    pub fn http_port(&self) -> u16 {
        self.endpoints.http_port
    }

    pub fn staking_port(&self) -> u16 {
        self.endpoints.staking_port
    }

    pub fn dir(&self) -> &Path {
        &self.endpoints.dir
    }

    pub fn db_dir(&self) -> &Path {
        &self.endpoints.db_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.endpoints.log_dir
    }

    /// Blocks until the node's process exits.
    pub async fn wait(&self) -> Result<()> {
        self.process.wait().await
    }

    /// Closes the API client, then asks the process to stop.
    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.client.close().await;
        self.process.stop().await
    }
}

impl fmt::Debug for LocalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalNode")
            .field("name", &self.name)
            .field("node_id", &self.node_id)
            .field("is_beacon", &self.config.is_beacon)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}
