// Path: crates/cli/src/local/network.rs

//! The network orchestrator: owns the node registry and drives every node
//! through validation, naming, flag merging, process start and registration.

use super::flags::{self, merge_flags};
use super::health::{self, HealthTarget, DEFAULT_HEALTH_CHECK_INTERVAL};
use super::names;
use super::node::{LocalNode, NodeEndpoints};
use super::process::{local_process_factory, NewNodeProcessFn};
use super::staking::StakingIdentity;
use super::validation::{self, ValidatedNode};
use crate::api::{http_client_factory, NewApiClientFn};
use futures_util::future::join_all;
use netrunner_types::config::{
    DB_DIR_KEY, HTTP_PORT_KEY, LOG_DIR_KEY, NETWORK_ID_KEY, STAKING_PORT_KEY,
};
use netrunner_types::{Flags, NetworkConfig, NetworkError, NodeConfig, NodeId, ValidationError};
use anyhow::Context;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::{oneshot, Mutex};
use tokio::time::Instant;

/// The address every local node listens on.
pub const LOCALHOST: &str = "127.0.0.1";
/// The per-request timeout handed to the API client factory.
pub const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const GENESIS_FILE: &str = "genesis.json";
const CONFIG_FILE: &str = "config.json";
const STAKING_KEY_FILE: &str = "staking.key";
const STAKING_CERT_FILE: &str = "staking.crt";
const DB_DIR: &str = "db";
const LOG_DIR: &str = "logs";
const PORT_PICK_ATTEMPTS: usize = 16;

#[derive(Debug, Clone)]
struct Beacon {
    name: String,
    node_id: NodeId,
    staking_port: u16,
}

#[derive(Default)]
struct NetworkState {
    nodes: BTreeMap<String, Arc<LocalNode>>,
    beacons: Vec<Beacon>,
    /// Ports held by registered nodes, explicit or picked.
    ports: BTreeSet<u16>,
    next_node_suffix: usize,
    stopped: bool,
}

/// A running local network.
///
/// Every operation takes the registry lock for its whole duration, so callers
/// never observe a half-started or half-removed node. Once [`LocalNetwork::stop`]
/// succeeds every later operation fails with [`NetworkError::Stopped`].
pub struct LocalNetwork {
    name: String,
    state: Mutex<NetworkState>,
    genesis: String,
    network_id: u32,
    flags: Flags,
    root_dir: TempDir,
    new_api_client: NewApiClientFn,
    new_process: NewNodeProcessFn,
    health_check_interval: Duration,
}

/// Builds a [`LocalNetwork`], optionally swapping its collaborators.
pub struct LocalNetworkBuilder {
    config: NetworkConfig,
    new_api_client: Option<NewApiClientFn>,
    new_process: Option<NewNodeProcessFn>,
    health_check_interval: Duration,
}

impl LocalNetworkBuilder {
    /// A builder using the HTTP API client, the local process supervisor and
    /// the default health check interval.
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            new_api_client: None,
            new_process: None,
            health_check_interval: DEFAULT_HEALTH_CHECK_INTERVAL,
        }
    }

    /// Replaces the factory that builds each node's API client.
    pub fn with_api_client_factory(mut self, factory: NewApiClientFn) -> Self {
        self.new_api_client = Some(factory);
        self
    }

    /// Replaces the factory that builds each node's process.
    pub fn with_process_factory(mut self, factory: NewNodeProcessFn) -> Self {
        self.new_process = Some(factory);
        self
    }

    /// Sets the pause between two health polling rounds.
    pub fn with_health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    /// Validates the configuration and starts every node in order.
    pub async fn build(self) -> Result<LocalNetwork, NetworkError> {
        LocalNetwork::create(
            self.config,
            self.new_api_client.unwrap_or_else(http_client_factory),
            self.new_process.unwrap_or_else(local_process_factory),
            self.health_check_interval,
        )
        .await
    }
}

impl LocalNetwork {
    /// Shorthand for [`LocalNetworkBuilder::new`].
    pub fn builder(config: NetworkConfig) -> LocalNetworkBuilder {
        LocalNetworkBuilder::new(config)
    }

    /// Validates `config` and starts its nodes in configuration order.
    ///
    /// The first start failure aborts creation. Nodes started before it are
    /// not stopped explicitly; dropping their handles terminates them.
    pub async fn new(
        config: NetworkConfig,
        new_api_client: NewApiClientFn,
        new_process: NewNodeProcessFn,
    ) -> Result<Self, NetworkError> {
        Self::create(
            config,
            new_api_client,
            new_process,
            DEFAULT_HEALTH_CHECK_INTERVAL,
        )
        .await
    }

    async fn create(
        config: NetworkConfig,
        new_api_client: NewApiClientFn,
        new_process: NewNodeProcessFn,
        health_check_interval: Duration,
    ) -> Result<Self, NetworkError> {
        let validated = validation::validate_network(&config)?;
        let root_dir = tempfile::Builder::new().prefix("netrunner-").tempdir()?;

        tracing::info!(
            target: "netrunner",
            network = %config.name,
            network_id = validated.network_id,
            nodes = config.node_configs.len(),
            root = %root_dir.path().display(),
            "Creating local network"
        );

        let flags = config.effective_flags();
        let network = Self {
            name: config.name,
            state: Mutex::new(NetworkState {
                next_node_suffix: validated.generated_names,
                ..Default::default()
            }),
            genesis: config.genesis,
            network_id: validated.network_id,
            flags,
            root_dir,
            new_api_client,
            new_process,
            health_check_interval,
        };

        {
            let mut state = network.state.lock().await;
            let nodes = config
                .node_configs
                .into_iter()
                .zip(validated.names)
                .zip(validated.nodes);
            for ((node_config, name), validated_node) in nodes {
                if let Err(e) = network
                    .start_node(&mut state, node_config, name, validated_node)
                    .await
                {
                    tracing::error!(
                        target: "netrunner",
                        network = %network.name,
                        started = state.nodes.len(),
                        error = %e,
                        "Failed to create local network"
                    );
                    return Err(e);
                }
            }
        }

        tracing::info!(target: "netrunner", network = %network.name, "Local network created");
        Ok(network)
    }

    /// The network id read from the genesis document.
    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    /// The genesis document every node is launched with.
    pub fn genesis(&self) -> &str {
        &self.genesis
    }

    /// The directory holding every node's working directory. Removed when the
    /// network is dropped.
    pub fn root_dir(&self) -> &Path {
        self.root_dir.path()
    }

    /// Validates, starts and registers one more node.
    ///
    /// An unnamed node gets the next free `node-<n>` name. A node that fails
    /// to start is never registered.
    pub async fn add_node(&self, config: NodeConfig) -> Result<Arc<LocalNode>, NetworkError> {
        let mut state = self.state.lock().await;
        if state.stopped {
            return Err(NetworkError::Stopped);
        }

        let label = if config.name.is_empty() {
            "(unnamed)".to_string()
        } else {
            config.name.clone()
        };
        let effective_flags = merge_flags(&self.flags, &config.flags);
        let validated =
            validation::validate_node(&config, &label, &effective_flags, self.network_id)?;

        let name = if config.name.is_empty() {
            let NetworkState {
                nodes,
                next_node_suffix,
                ..
            } = &mut *state;
            names::next_free_name(next_node_suffix, |candidate| nodes.contains_key(candidate))
        } else {
            config.name.clone()
        };
        if state.nodes.contains_key(&name) {
            return Err(ValidationError::DuplicateName(name).into());
        }

        self.start_node(&mut state, config, name, validated).await
    }

    /// Closes the node's API client, stops its process and unregisters it.
    /// The name can be reused afterwards.
    pub async fn remove_node(&self, name: &str) -> Result<(), NetworkError> {
        let mut state = self.state.lock().await;
        if state.stopped {
            return Err(NetworkError::Stopped);
        }
        let node = state
            .nodes
            .remove(name)
            .ok_or_else(|| NetworkError::NodeNotFound(name.to_string()))?;
        state.beacons.retain(|beacon| beacon.name != name);
        state.ports.remove(&node.http_port());
        state.ports.remove(&node.staking_port());

        if let Err(e) = node.shutdown().await {
            tracing::warn!(target: "netrunner", node = %name, error = %e, "Failed to stop node");
        }
        tracing::info!(target: "netrunner", node = %name, "Node removed");
        Ok(())
    }

    /// Looks up a registered node by name.
    pub async fn get_node(&self, name: &str) -> Result<Arc<LocalNode>, NetworkError> {
        let state = self.state.lock().await;
        if state.stopped {
            return Err(NetworkError::Stopped);
        }
        state
            .nodes
            .get(name)
            .cloned()
            .ok_or_else(|| NetworkError::NodeNotFound(name.to_string()))
    }

    /// The names of every registered node, sorted.
    pub async fn get_node_names(&self) -> Result<Vec<String>, NetworkError> {
        let state = self.state.lock().await;
        if state.stopped {
            return Err(NetworkError::Stopped);
        }
        Ok(state.nodes.keys().cloned().collect())
    }

    /// A snapshot of the registry, keyed by node name.
    pub async fn get_all_nodes(&self) -> Result<BTreeMap<String, Arc<LocalNode>>, NetworkError> {
        let state = self.state.lock().await;
        if state.stopped {
            return Err(NetworkError::Stopped);
        }
        Ok(state.nodes.clone())
    }

    /// Waits until every registered node reports healthy, or fails with
    /// [`NetworkError::HealthTimeout`] once `deadline` passes.
    ///
    /// Each polling round covers the nodes registered when it starts. An
    /// empty network is healthy.
    pub async fn healthy(&self, deadline: Instant) -> Result<(), NetworkError> {
        if self.state.lock().await.stopped {
            return Err(NetworkError::Stopped);
        }
        tracing::info!(target: "netrunner", network = %self.name, "Waiting for network to become healthy");
        health::await_healthy(
            || self.health_targets(),
            deadline,
            self.health_check_interval,
        )
        .await
    }

    /// Runs [`LocalNetwork::healthy`] in the background. The receiver resolves
    /// exactly once with its outcome.
    pub fn spawn_healthy(
        self: &Arc<Self>,
        deadline: Instant,
    ) -> oneshot::Receiver<Result<(), NetworkError>> {
        let (tx, rx) = oneshot::channel();
        let network = Arc::clone(self);
        tokio::spawn(async move {
            let _ = tx.send(network.healthy(deadline).await);
        });
        rx
    }

    /// Stops every node and marks the network stopped.
    ///
    /// Per-node failures are logged and do not prevent the transition. A
    /// second call fails with [`NetworkError::Stopped`].
    pub async fn stop(&self) -> Result<(), NetworkError> {
        let mut state = self.state.lock().await;
        if state.stopped {
            return Err(NetworkError::Stopped);
        }

        let nodes = std::mem::take(&mut state.nodes);
        state.beacons.clear();
        state.ports.clear();
        let results = join_all(
            nodes
                .values()
                .map(|node| async move { (node.name(), node.shutdown().await) }),
        )
        .await;
        let failed = results
            .into_iter()
            .filter_map(|(name, result)| result.err().map(|e| (name, e)))
            .inspect(|(name, e)| {
                tracing::warn!(target: "netrunner", node = %name, error = %e, "Failed to stop node");
            })
            .count();

        state.stopped = true;
        tracing::info!(
            target: "netrunner",
            network = %self.name,
            nodes = nodes.len(),
            failed,
            "Local network stopped"
        );
        Ok(())
    }

    async fn health_targets(&self) -> Result<Vec<HealthTarget>, NetworkError> {
        let state = self.state.lock().await;
        if state.stopped {
            return Err(NetworkError::Stopped);
        }
        Ok(state
            .nodes
            .values()
            .map(|node| HealthTarget {
                name: node.name().to_string(),
                client: node.api_client(),
            })
            .collect())
    }

    /// Prepares the node's directory, starts its process, attaches its API
    /// client and registers it. Nothing is registered on failure.
    async fn start_node(
        &self,
        state: &mut NetworkState,
        mut config: NodeConfig,
        name: String,
        validated: ValidatedNode,
    ) -> Result<Arc<LocalNode>, NetworkError> {
        let start_error = |source: anyhow::Error| NetworkError::Start {
            node: name.clone(),
            source,
        };

        config.name = name.clone();
        config.flags = merge_flags(&self.flags, &config.flags);

        let staking = match validated.staking {
            Some(identity) => identity,
            None => {
                let identity = StakingIdentity::generate().map_err(start_error)?;
                config.staking_key = identity.key_pem.clone();
                config.staking_cert = identity.cert_pem.clone();
                identity
            }
        };

        let settings = validated.settings;
        let dir = self.root_dir.path().join(&name);
        let http_port = match settings.http_port {
            Some(port) => port,
            None => pick_port(|port| {
                state.ports.contains(&port) || settings.staking_port == Some(port)
            })
            .map_err(start_error)?,
        };
        let staking_port = match settings.staking_port {
            Some(port) => port,
            None => pick_port(|port| state.ports.contains(&port) || port == http_port)
                .map_err(start_error)?,
        };
        let endpoints = NodeEndpoints {
            address: LOCALHOST.to_string(),
            http_port,
            staking_port,
            db_dir: settings
                .db_dir
                .map(PathBuf::from)
                .unwrap_or_else(|| dir.join(DB_DIR)),
            log_dir: settings
                .log_dir
                .map(PathBuf::from)
                .unwrap_or_else(|| dir.join(LOG_DIR)),
            dir,
        };
        let files = self
            .write_node_files(&config, &staking, &endpoints)
            .map_err(start_error)?;

        let bootstrap: Vec<&Beacon> = state
            .beacons
            .iter()
            .filter(|beacon| beacon.name != name)
            .collect();
        let bootstrap_count = bootstrap.len();
        let args = flags::to_args(&self.launch_flags(&config, &endpoints, &files, &bootstrap));

        let process = (self.new_process)(&config, &args).map_err(start_error)?;
        process.start().await.map_err(start_error)?;

        let client = match (self.new_api_client)(
            &endpoints.address,
            endpoints.http_port,
            API_REQUEST_TIMEOUT,
        ) {
            Ok(client) => client,
            Err(e) => {
                if let Err(stop_err) = process.stop().await {
                    tracing::warn!(target: "netrunner", node = %name, error = %stop_err, "Failed to stop node");
                }
                return Err(start_error(e));
            }
        };

        if config.is_beacon {
            state.beacons.push(Beacon {
                name: name.clone(),
                node_id: staking.node_id,
                staking_port: endpoints.staking_port,
            });
        }

        tracing::info!(
            target: "netrunner",
            node = %name,
            node_id = %staking.node_id,
            http_port = endpoints.http_port,
            staking_port = endpoints.staking_port,
            beacon = config.is_beacon,
            bootstrap = bootstrap_count,
            "Node started"
        );

        let node = Arc::new(LocalNode::new(
            name.clone(),
            staking.node_id,
            config,
            endpoints,
            client,
            process,
        ));
        state.ports.insert(http_port);
        state.ports.insert(staking_port);
        state.nodes.insert(name, Arc::clone(&node));
        Ok(node)
    }

    fn write_node_files(
        &self,
        config: &NodeConfig,
        staking: &StakingIdentity,
        endpoints: &NodeEndpoints,
    ) -> anyhow::Result<NodeFiles> {
        for dir in [&endpoints.dir, &endpoints.db_dir, &endpoints.log_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let files = NodeFiles {
            genesis: endpoints.dir.join(GENESIS_FILE),
            staking_key: endpoints.dir.join(STAKING_KEY_FILE),
            staking_cert: endpoints.dir.join(STAKING_CERT_FILE),
            config: config
                .config_file()
                .map(|_| endpoints.dir.join(CONFIG_FILE)),
        };
        let write = |path: &Path, contents: &str| {
            std::fs::write(path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))
        };
        write(&files.genesis, &self.genesis)?;
        write(&files.staking_key, &staking.key_pem)?;
        write(&files.staking_cert, &staking.cert_pem)?;
        if let (Some(path), Some(contents)) = (&files.config, config.config_file()) {
            write(path, contents)?;
        }
        Ok(files)
    }

    /// The node's effective flags plus everything the orchestrator resolved.
    fn launch_flags(
        &self,
        config: &NodeConfig,
        endpoints: &NodeEndpoints,
        files: &NodeFiles,
        bootstrap: &[&Beacon],
    ) -> Flags {
        let path = |p: &Path| Value::String(p.to_string_lossy().into_owned());

        let mut launch = config.flags.clone();
        launch.insert(NETWORK_ID_KEY.to_string(), Value::from(self.network_id));
        launch.insert(DB_DIR_KEY.to_string(), path(&endpoints.db_dir));
        launch.insert(LOG_DIR_KEY.to_string(), path(&endpoints.log_dir));
        launch.insert(HTTP_PORT_KEY.to_string(), Value::from(endpoints.http_port));
        launch.insert(STAKING_PORT_KEY.to_string(), Value::from(endpoints.staking_port));
        launch.insert("genesis".to_string(), path(&files.genesis));
        launch.insert("staking-tls-key-file".to_string(), path(&files.staking_key));
        launch.insert("staking-tls-cert-file".to_string(), path(&files.staking_cert));
        if let Some(config_file) = &files.config {
            launch.insert("config-file".to_string(), path(config_file));
        }

        let ips: Vec<String> = bootstrap
            .iter()
            .map(|beacon| format!("{}:{}", LOCALHOST, beacon.staking_port))
            .collect();
        let ids: Vec<String> = bootstrap
            .iter()
            .map(|beacon| beacon.node_id.to_string())
            .collect();
        launch.insert("bootstrap-ips".to_string(), Value::String(ips.join(",")));
        launch.insert("bootstrap-ids".to_string(), Value::String(ids.join(",")));
        launch
    }
}

impl std::fmt::Debug for LocalNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalNetwork")
            .field("name", &self.name)
            .field("network_id", &self.network_id)
            .field("root_dir", &self.root_dir.path())
            .finish_non_exhaustive()
    }
}

struct NodeFiles {
    genesis: PathBuf,
    staking_key: PathBuf,
    staking_cert: PathBuf,
    config: Option<PathBuf>,
}

/// Picks a free port the OS reports unused and `taken` does not claim.
fn pick_port(taken: impl Fn(u16) -> bool) -> anyhow::Result<u16> {
    (0..PORT_PICK_ATTEMPTS)
        .filter_map(|_| portpicker::pick_unused_port())
        .find(|port| !taken(*port))
        .ok_or_else(|| anyhow::anyhow!("No free port available"))
}
