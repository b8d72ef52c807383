// Path: crates/cli/tests/local_network.rs

//! Drives `LocalNetwork` end to end with in-memory process and API client fakes.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use netrunner_cli::local::DEFAULT_NETWORK_ID;
use netrunner_cli::{
    default_network_config, ApiClient, LocalNetwork, NetworkConfig, NetworkError, NewApiClientFn,
    NewNodeProcessFn, NodeConfig, NodeProcess, StakingIdentity,
};
use netrunner_types::{genesis, ErrorCode, Flags, LocalNodeConfig};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

// --- Fakes ---

/// Everything the fake processes were asked to do, keyed by node name.
#[derive(Default)]
struct ProcessLog {
    started: Mutex<Vec<String>>,
    stopped: Mutex<Vec<String>>,
    args: Mutex<BTreeMap<String, Vec<String>>>,
}

impl ProcessLog {
    fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    fn stopped(&self) -> Vec<String> {
        self.stopped.lock().unwrap().clone()
    }

    fn args(&self, node: &str) -> Vec<String> {
        self.args.lock().unwrap().get(node).cloned().unwrap_or_default()
    }

    /// The value of `--<key>=` in the arguments a node was launched with.
    fn arg(&self, node: &str, key: &str) -> Option<String> {
        let prefix = format!("--{}=", key);
        self.args(node)
            .into_iter()
            .find_map(|arg| arg.strip_prefix(&prefix).map(str::to_string))
    }
}

struct FakeProcess {
    name: String,
    fail_start: bool,
    fail_stop: bool,
    log: Arc<ProcessLog>,
}

#[async_trait]
impl NodeProcess for FakeProcess {
    async fn start(&self) -> Result<()> {
        if self.fail_start {
            return Err(anyhow!("fake process for {} refuses to start", self.name));
        }
        self.log.started.lock().unwrap().push(self.name.clone());
        Ok(())
    }

    async fn wait(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.log.stopped.lock().unwrap().push(self.name.clone());
        if self.fail_stop {
            return Err(anyhow!("fake process for {} refuses to stop", self.name));
        }
        Ok(())
    }
}

fn process_factory(
    log: Arc<ProcessLog>,
    fail_start: fn(&str) -> bool,
    fail_stop: fn(&str) -> bool,
) -> NewNodeProcessFn {
    Arc::new(move |config: &NodeConfig, args: &[String]| {
        log.args
            .lock()
            .unwrap()
            .insert(config.name.clone(), args.to_vec());
        let process: Box<dyn NodeProcess> = Box::new(FakeProcess {
            name: config.name.clone(),
            fail_start: fail_start(&config.name),
            fail_stop: fail_stop(&config.name),
            log: Arc::clone(&log),
        });
        Ok(process)
    })
}

/// Shared by every fake client a factory hands out.
#[derive(Default)]
struct ApiState {
    unhealthy: AtomicBool,
    closed: AtomicUsize,
}

struct FakeApiClient {
    state: Arc<ApiState>,
}

#[async_trait]
impl ApiClient for FakeApiClient {
    async fn check_health(&self) -> Result<bool> {
        Ok(!self.state.unhealthy.load(Ordering::SeqCst))
    }

    async fn close(&self) {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
    }
}

fn api_factory(state: Arc<ApiState>) -> NewApiClientFn {
    Arc::new(move |_address: &str, _port: u16, _timeout: Duration| {
        let client: Arc<dyn ApiClient> = Arc::new(FakeApiClient {
            state: Arc::clone(&state),
        });
        Ok(client)
    })
}

fn never(_: &str) -> bool {
    false
}

fn always(_: &str) -> bool {
    true
}

// --- Harness ---

struct Harness {
    processes: Arc<ProcessLog>,
    api: Arc<ApiState>,
}

impl Harness {
    fn new() -> Self {
        Self {
            processes: Arc::new(ProcessLog::default()),
            api: Arc::new(ApiState::default()),
        }
    }

    async fn build(&self, config: NetworkConfig) -> Result<LocalNetwork, NetworkError> {
        self.build_failing(config, never).await
    }

    async fn build_failing(
        &self,
        config: NetworkConfig,
        fail_start: fn(&str) -> bool,
    ) -> Result<LocalNetwork, NetworkError> {
        self.build_with(config, fail_start, never).await
    }

    async fn build_with(
        &self,
        config: NetworkConfig,
        fail_start: fn(&str) -> bool,
        fail_stop: fn(&str) -> bool,
    ) -> Result<LocalNetwork, NetworkError> {
        LocalNetwork::builder(config)
            .with_api_client_factory(api_factory(Arc::clone(&self.api)))
            .with_process_factory(process_factory(
                Arc::clone(&self.processes),
                fail_start,
                fail_stop,
            ))
            .with_health_check_interval(Duration::from_millis(10))
            .build()
            .await
    }
}

fn impl_config() -> Option<String> {
    Some(LocalNodeConfig::raw_for_binary("/usr/local/bin/fake-node"))
}

fn node_config(name: &str, is_beacon: bool) -> NodeConfig {
    let identity = StakingIdentity::generate().unwrap();
    NodeConfig {
        name: name.to_string(),
        is_beacon,
        staking_key: identity.key_pem,
        staking_cert: identity.cert_pem,
        impl_specific_config: impl_config(),
        ..Default::default()
    }
}

/// Three nodes, the first one a beacon, all unnamed.
fn test_network_config() -> NetworkConfig {
    NetworkConfig {
        name: "test".to_string(),
        genesis: genesis::local_genesis(0),
        node_configs: vec![
            node_config("", true),
            node_config("", false),
            node_config("", false),
        ],
        ..Default::default()
    }
}

fn deadline_in(duration: Duration) -> Instant {
    Instant::now() + duration
}

fn flags(pairs: &[(&str, &str)]) -> Flags {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect()
}

// --- Creation ---

#[tokio::test]
async fn test_new_network_empty() {
    let harness = Harness::new();
    let config = NetworkConfig {
        genesis: genesis::local_genesis(0),
        ..Default::default()
    };
    let network = harness.build(config).await.unwrap();

    assert!(network.get_node_names().await.unwrap().is_empty());
    network
        .healthy(deadline_in(Duration::from_secs(1)))
        .await
        .unwrap();
    network.stop().await.unwrap();
    assert!(harness.processes.started().is_empty());
}

#[tokio::test]
async fn test_new_network_one_node() {
    let harness = Harness::new();
    let node = node_config("node0", true);
    let expected_id = StakingIdentity::from_pem(&node.staking_key, &node.staking_cert)
        .unwrap()
        .node_id;
    let config = NetworkConfig {
        genesis: genesis::local_genesis(0),
        node_configs: vec![node],
        ..Default::default()
    };
    let network = harness.build(config).await.unwrap();

    assert_eq!(network.get_node_names().await.unwrap(), vec!["node0"]);
    let node = network.get_node("node0").await.unwrap();
    assert_eq!(node.name(), "node0");
    assert!(node.is_beacon());
    assert_eq!(node.node_id(), expected_id);
    assert_eq!(node.url(), format!("http://127.0.0.1:{}", node.http_port()));
    assert!(node.dir().join("staking.crt").exists());
    assert!(node.dir().join("genesis.json").exists());
    assert!(node.db_dir().is_dir());
    assert!(node.log_dir().is_dir());

    assert_eq!(harness.processes.started(), vec!["node0"]);
    let processes = &harness.processes;
    assert_eq!(processes.arg("node0", "network-id").as_deref(), Some("0"));
    assert_eq!(
        processes.arg("node0", "http-port"),
        Some(node.http_port().to_string())
    );
    assert_eq!(processes.arg("node0", "bootstrap-ips").as_deref(), Some(""));

    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_new_network_fail_to_start_node() {
    let harness = Harness::new();
    let err = harness
        .build_failing(test_network_config(), always)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NETWORK_NODE_START_FAILED");
    assert!(harness.processes.started().is_empty());
}

#[tokio::test]
async fn test_create_stops_at_first_failed_start() {
    fn second(name: &str) -> bool {
        name == "node-1"
    }
    let harness = Harness::new();
    let err = harness
        .build_failing(test_network_config(), second)
        .await
        .unwrap_err();
    match err {
        NetworkError::Start { node, .. } => assert_eq!(node, "node-1"),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(harness.processes.started(), vec!["node-0"]);
}

#[tokio::test]
async fn test_wrong_network_configs() {
    let reference = test_network_config();
    let valid = reference.node_configs[0].clone();
    let other = reference.node_configs[1].clone();
    let with = |edit: &dyn Fn(&mut NodeConfig)| {
        let mut node = valid.clone();
        edit(&mut node);
        node
    };
    let network = |genesis: &str, nodes: Vec<NodeConfig>| NetworkConfig {
        genesis: genesis.to_string(),
        node_configs: nodes,
        ..Default::default()
    };
    let genesis = r#"{"networkID": 0}"#;

    let cases: Vec<(&str, NetworkConfig, &str)> = vec![
        (
            "no impl specific config",
            network(genesis, vec![with(&|n| n.impl_specific_config = None)]),
            "VALIDATION_MISSING_IMPL_CONFIG",
        ),
        (
            "invalid impl specific config",
            network(
                genesis,
                vec![with(&|n| n.impl_specific_config = Some("nonempty".into()))],
            ),
            "VALIDATION_IMPL_CONFIG_PARSE",
        ),
        (
            "config file unmarshal",
            network(genesis, vec![with(&|n| n.config_file = Some("nonempty".into()))]),
            "VALIDATION_CONFIG_FILE_PARSE",
        ),
        (
            "wrong network id type in config file",
            network(
                genesis,
                vec![with(&|n| n.config_file = Some(r#"{"network-id": "0"}"#.into()))],
            ),
            "VALIDATION_FIELD_TYPE",
        ),
        (
            "wrong db dir type in config file",
            network(
                genesis,
                vec![with(&|n| n.config_file = Some(r#"{"db-dir": 0}"#.into()))],
            ),
            "VALIDATION_FIELD_TYPE",
        ),
        (
            "wrong log dir type in config file",
            network(
                genesis,
                vec![with(&|n| n.config_file = Some(r#"{"log-dir": 0}"#.into()))],
            ),
            "VALIDATION_FIELD_TYPE",
        ),
        (
            "wrong http port type in config file",
            network(
                genesis,
                vec![with(&|n| n.config_file = Some(r#"{"http-port": "0"}"#.into()))],
            ),
            "VALIDATION_FIELD_TYPE",
        ),
        (
            "wrong staking port type in config file",
            network(
                genesis,
                vec![with(&|n| n.config_file = Some(r#"{"staking-port": "0"}"#.into()))],
            ),
            "VALIDATION_FIELD_TYPE",
        ),
        (
            "network id mismatch",
            network(
                genesis,
                vec![with(&|n| n.config_file = Some(r#"{"network-id": 1}"#.into()))],
            ),
            "VALIDATION_NETWORK_ID_MISMATCH",
        ),
        (
            "genesis unmarshal",
            network("nonempty", vec![valid.clone()]),
            "VALIDATION_GENESIS_PARSE",
        ),
        (
            "no network id in genesis",
            network("{}", vec![valid.clone()]),
            "VALIDATION_MISSING_NETWORK_ID",
        ),
        (
            "wrong network id type in genesis",
            network(r#"{"networkID": "0"}"#, vec![valid.clone()]),
            "VALIDATION_GENESIS_NETWORK_ID_TYPE",
        ),
        (
            "no genesis",
            network("", vec![valid.clone()]),
            "VALIDATION_MISSING_GENESIS",
        ),
        (
            "staking key but no staking cert",
            network(genesis, vec![with(&|n| n.staking_cert.clear())]),
            "VALIDATION_STAKING_KEY_WITHOUT_CERT",
        ),
        (
            "staking cert but no staking key",
            network(genesis, vec![with(&|n| n.staking_key.clear())]),
            "VALIDATION_STAKING_CERT_WITHOUT_KEY",
        ),
        (
            "invalid staking cert/key",
            network(
                genesis,
                vec![with(&|n| {
                    n.staking_key = "nonempty".into();
                    n.staking_cert = "nonempty".into();
                })],
            ),
            "VALIDATION_INVALID_STAKING_PAIR",
        ),
        (
            "mismatched staking cert/key",
            network(
                genesis,
                vec![with(&|n| n.staking_cert = other.staking_cert.clone())],
            ),
            "VALIDATION_INVALID_STAKING_PAIR",
        ),
        (
            "no beacon node",
            network(genesis, vec![with(&|n| n.is_beacon = false)]),
            "VALIDATION_NO_BEACON",
        ),
        (
            "repeated name",
            network(
                genesis,
                vec![
                    with(&|n| n.name = "node0".into()),
                    NodeConfig {
                        name: "node0".into(),
                        ..other.clone()
                    },
                ],
            ),
            "VALIDATION_DUPLICATE_NAME",
        ),
    ];

    for (label, config, expected) in cases {
        let harness = Harness::new();
        let err = harness.build(config).await.unwrap_err();
        assert!(
            matches!(err, NetworkError::Validation(_)),
            "{}: expected a validation error, got {}",
            label,
            err
        );
        assert_eq!(err.code(), "NETWORK_INVALID_CONFIG", "{}", label);
        if let NetworkError::Validation(inner) = &err {
            assert_eq!(inner.code(), expected, "{}: {}", label, inner);
        }
        assert!(harness.processes.started().is_empty(), "{}", label);
    }
}

#[tokio::test]
async fn test_generated_nodes_names() {
    let harness = Harness::new();
    let mut config = test_network_config();
    config.node_configs.push(node_config("", false));
    config.node_configs.push(node_config("", false));
    let network = harness.build(config).await.unwrap();

    let names = network.get_node_names().await.unwrap();
    assert_eq!(names, vec!["node-0", "node-1", "node-2", "node-3", "node-4"]);
    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_generate_default_network() {
    let harness = Harness::new();
    let config = default_network_config(Path::new("/usr/local/bin/fake-node")).unwrap();
    let network = harness.build(config).await.unwrap();

    assert_eq!(network.network_id(), DEFAULT_NETWORK_ID);
    let nodes = network.get_all_nodes().await.unwrap();
    assert_eq!(nodes.len(), 5);
    for (i, (name, node)) in nodes.iter().enumerate() {
        assert_eq!(name, &format!("node-{}", i));
        assert!(node.is_beacon());
    }

    // Later nodes bootstrap from the beacons started before them.
    let first = &nodes["node-0"];
    let ids = harness.processes.arg("node-4", "bootstrap-ids").unwrap();
    assert_eq!(ids.split(',').count(), 4);
    assert!(ids.contains(&first.node_id().to_string()));
    let ips = harness.processes.arg("node-4", "bootstrap-ips").unwrap();
    assert!(ips.contains(&format!("127.0.0.1:{}", first.staking_port())));

    network
        .healthy(deadline_in(Duration::from_secs(5)))
        .await
        .unwrap();
    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_generated_identity_is_recorded() {
    let harness = Harness::new();
    let mut config = test_network_config();
    config.node_configs[1].staking_key.clear();
    config.node_configs[1].staking_cert.clear();
    let network = harness.build(config).await.unwrap();

    let node = network.get_node("node-1").await.unwrap();
    let resolved = node.config();
    let identity = StakingIdentity::from_pem(&resolved.staking_key, &resolved.staking_cert).unwrap();
    assert_eq!(identity.node_id, node.node_id());
    network.stop().await.unwrap();
}

// --- Health ---

#[tokio::test]
async fn test_unhealthy_network() {
    let harness = Harness::new();
    harness.api.unhealthy.store(true, Ordering::SeqCst);
    let network = harness.build(test_network_config()).await.unwrap();

    let started = std::time::Instant::now();
    let err = network
        .healthy(deadline_in(Duration::from_millis(300)))
        .await
        .unwrap_err();
    assert!(matches!(err, NetworkError::HealthTimeout));
    assert!(started.elapsed() < Duration::from_secs(5));
    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_spawn_healthy_resolves_once_nodes_recover() {
    let harness = Harness::new();
    harness.api.unhealthy.store(true, Ordering::SeqCst);
    let network = Arc::new(harness.build(test_network_config()).await.unwrap());

    let completion = network.spawn_healthy(deadline_in(Duration::from_secs(5)));
    tokio::time::sleep(Duration::from_millis(50)).await;
    harness.api.unhealthy.store(false, Ordering::SeqCst);

    completion.await.unwrap().unwrap();
    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_healthy_follows_membership_changes() {
    let harness = Harness::new();
    harness.api.unhealthy.store(true, Ordering::SeqCst);
    let network = Arc::new(harness.build(test_network_config()).await.unwrap());

    let mut completion = network.spawn_healthy(deadline_in(Duration::from_secs(5)));
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Membership changes while rounds are in flight.
    network.add_node(node_config("late", false)).await.unwrap();
    network.remove_node("node-1").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(completion.try_recv().is_err());

    harness.api.unhealthy.store(false, Ordering::SeqCst);
    tokio::time::timeout(Duration::from_secs(2), completion)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(
        network.get_node_names().await.unwrap(),
        vec!["late", "node-0", "node-2"]
    );
    network.stop().await.unwrap();
}

// --- Node operations ---

#[tokio::test]
async fn test_network_node_ops() {
    let harness = Harness::new();
    let network = harness.build(test_network_config()).await.unwrap();

    let added = network.add_node(node_config("new", false)).await.unwrap();
    assert_eq!(added.name(), "new");
    assert_eq!(network.get_node("new").await.unwrap().name(), "new");

    let unnamed = network.add_node(node_config("", false)).await.unwrap();
    assert_eq!(unnamed.name(), "node-3");
    assert_eq!(network.get_node_names().await.unwrap().len(), 5);

    network.remove_node("new").await.unwrap();
    assert!(matches!(
        network.get_node("new").await,
        Err(NetworkError::NodeNotFound(_))
    ));
    assert_eq!(harness.processes.stopped(), vec!["new"]);
    assert_eq!(harness.api.closed.load(Ordering::SeqCst), 1);

    // A removed name can be reused.
    network.add_node(node_config("new", false)).await.unwrap();
    assert_eq!(network.get_node_names().await.unwrap().len(), 5);

    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_add_node_rejects_duplicates_and_bad_configs() {
    let harness = Harness::new();
    let network = harness.build(test_network_config()).await.unwrap();

    let err = network.add_node(node_config("node-0", false)).await.unwrap_err();
    assert_eq!(err.code(), "NETWORK_INVALID_CONFIG");

    let mut mismatched = node_config("other", false);
    mismatched.flags.insert("network-id".into(), json!(5));
    let err = network.add_node(mismatched).await.unwrap_err();
    assert_eq!(err.code(), "NETWORK_INVALID_CONFIG");

    let mut missing = node_config("other", false);
    missing.impl_specific_config = None;
    assert!(network.add_node(missing).await.is_err());

    assert_eq!(network.get_node_names().await.unwrap().len(), 3);
    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_add_node_start_failure_is_not_registered() {
    fn bad(name: &str) -> bool {
        name == "bad"
    }
    let harness = Harness::new();
    let network = harness
        .build_failing(test_network_config(), bad)
        .await
        .unwrap();

    let err = network.add_node(node_config("bad", false)).await.unwrap_err();
    assert_eq!(err.code(), "NETWORK_NODE_START_FAILED");
    assert!(matches!(
        network.get_node("bad").await,
        Err(NetworkError::NodeNotFound(_))
    ));
    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_add_node_directory_failure_is_a_start_failure() {
    let harness = Harness::new();
    let network = harness.build(test_network_config()).await.unwrap();

    let blocker = tempfile::NamedTempFile::new().unwrap();
    let mut config = node_config("bad", false);
    config.flags.insert(
        "db-dir".into(),
        json!(blocker.path().join("db").to_string_lossy()),
    );

    let err = network.add_node(config).await.unwrap_err();
    assert_eq!(err.code(), "NETWORK_NODE_START_FAILED");
    assert!(matches!(
        network.get_node("bad").await,
        Err(NetworkError::NodeNotFound(_))
    ));
    assert_eq!(harness.processes.started().len(), 3);
    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_failed_stops_do_not_block_removal_or_stop() {
    let harness = Harness::new();
    let network = harness
        .build_with(test_network_config(), never, always)
        .await
        .unwrap();

    network.remove_node("node-0").await.unwrap();
    assert!(matches!(
        network.get_node("node-0").await,
        Err(NetworkError::NodeNotFound(_))
    ));
    assert_eq!(harness.processes.stopped(), vec!["node-0"]);
    assert_eq!(harness.api.closed.load(Ordering::SeqCst), 1);

    network.stop().await.unwrap();
    assert_eq!(harness.processes.stopped().len(), 3);
    assert!(network.get_node_names().await.unwrap_err().is_stopped());
    assert!(network.stop().await.unwrap_err().is_stopped());
}

#[tokio::test]
async fn test_nodes_get_distinct_ports() {
    let harness = Harness::new();
    let network = harness.build(test_network_config()).await.unwrap();
    network.add_node(node_config("", false)).await.unwrap();

    let nodes = network.get_all_nodes().await.unwrap();
    let ports: std::collections::BTreeSet<u16> = nodes
        .values()
        .flat_map(|node| [node.http_port(), node.staking_port()])
        .collect();
    assert_eq!(ports.len(), nodes.len() * 2);
    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_removed_beacon_leaves_bootstrap_list() {
    let harness = Harness::new();
    let config = NetworkConfig {
        genesis: genesis::local_genesis(0),
        node_configs: vec![node_config("a", true), node_config("b", true)],
        ..Default::default()
    };
    let network = harness.build(config).await.unwrap();
    let b = network.get_node("b").await.unwrap();

    network.remove_node("a").await.unwrap();
    network.add_node(node_config("c", false)).await.unwrap();

    assert_eq!(
        harness.processes.arg("c", "bootstrap-ips"),
        Some(format!("127.0.0.1:{}", b.staking_port()))
    );
    assert_eq!(
        harness.processes.arg("c", "bootstrap-ids"),
        Some(b.node_id().to_string())
    );
    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_node_not_found() {
    let harness = Harness::new();
    let network = harness.build(test_network_config()).await.unwrap();

    assert!(matches!(
        network.get_node("missing").await,
        Err(NetworkError::NodeNotFound(_))
    ));
    assert!(matches!(
        network.remove_node("missing").await,
        Err(NetworkError::NodeNotFound(_))
    ));

    network.remove_node("node-1").await.unwrap();
    assert!(matches!(
        network.remove_node("node-1").await,
        Err(NetworkError::NodeNotFound(_))
    ));
    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_stopped_network() {
    let harness = Harness::new();
    let network = Arc::new(harness.build(test_network_config()).await.unwrap());
    assert!(!network.get_node_names().await.unwrap().is_empty());

    network.stop().await.unwrap();
    assert_eq!(harness.processes.stopped().len(), 3);
    assert_eq!(harness.api.closed.load(Ordering::SeqCst), 3);

    assert!(network.stop().await.unwrap_err().is_stopped());
    assert!(network
        .add_node(node_config("new", false))
        .await
        .unwrap_err()
        .is_stopped());
    assert!(network.remove_node("node-0").await.unwrap_err().is_stopped());
    assert!(network.get_node("node-0").await.unwrap_err().is_stopped());
    assert!(network.get_node_names().await.unwrap_err().is_stopped());
    assert!(network.get_all_nodes().await.unwrap_err().is_stopped());
    assert!(network
        .healthy(deadline_in(Duration::from_secs(1)))
        .await
        .unwrap_err()
        .is_stopped());
    let completion = network.spawn_healthy(deadline_in(Duration::from_secs(1)));
    assert!(completion.await.unwrap().unwrap_err().is_stopped());
}

#[tokio::test]
async fn test_get_all_nodes() {
    let harness = Harness::new();
    let network = harness.build(test_network_config()).await.unwrap();

    let nodes = network.get_all_nodes().await.unwrap();
    let names = network.get_node_names().await.unwrap();
    assert_eq!(nodes.keys().cloned().collect::<Vec<_>>(), names);
    for (name, node) in &nodes {
        assert_eq!(node.name(), name);
    }
    network.stop().await.unwrap();
}

// --- Flags ---

#[tokio::test]
async fn test_flags() {
    let node_flags = flags(&[
        ("test-node-config-flag", "node"),
        ("test2-node-config-flag", "config"),
        ("common-config-flag", "this should be added"),
    ]);

    // Network and node flags: the node wins on the shared key.
    let mut config = test_network_config();
    config.flags = flags(&[
        ("test-network-config-flag", "something"),
        ("common-config-flag", "should not be added"),
    ]);
    for node in &mut config.node_configs {
        node.flags = node_flags.clone();
    }
    let network = Harness::new().build(config).await.unwrap();
    for node in network.get_all_nodes().await.unwrap().values() {
        let resolved = &node.config().flags;
        assert_eq!(resolved.len(), 4);
        assert_eq!(resolved["test-network-config-flag"], json!("something"));
        assert_eq!(resolved["common-config-flag"], json!("this should be added"));
        assert_eq!(resolved["test-node-config-flag"], json!("node"));
        assert_eq!(resolved["test2-node-config-flag"], json!("config"));
    }
    network.stop().await.unwrap();

    // Node flags only.
    let mut config = test_network_config();
    for node in &mut config.node_configs {
        node.flags = node_flags.clone();
    }
    let network = Harness::new().build(config).await.unwrap();
    for node in network.get_all_nodes().await.unwrap().values() {
        let resolved = &node.config().flags;
        assert_eq!(resolved.len(), 3);
        assert!(!resolved.contains_key("test-network-config-flag"));
        assert_eq!(resolved["common-config-flag"], json!("this should be added"));
    }
    network.stop().await.unwrap();

    // Network flags only.
    let mut config = test_network_config();
    config.flags = flags(&[
        ("test-network-config-flag", "something"),
        ("common-config-flag", "else"),
    ]);
    let harness = Harness::new();
    let network = harness.build(config).await.unwrap();
    for node in network.get_all_nodes().await.unwrap().values() {
        let resolved = &node.config().flags;
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved["common-config-flag"], json!("else"));
    }
    assert_eq!(
        harness.processes.arg("node-0", "common-config-flag").as_deref(),
        Some("else")
    );
    network.stop().await.unwrap();
}

#[tokio::test]
async fn test_log_level_is_the_weakest_flag() {
    let harness = Harness::new();
    let mut config = test_network_config();
    config.log_level = Some("DEBUG".to_string());
    config.node_configs[1]
        .flags
        .insert("log-level".into(), json!("TRACE"));
    let network = harness.build(config).await.unwrap();

    let processes = &harness.processes;
    assert_eq!(processes.arg("node-0", "log-level").as_deref(), Some("DEBUG"));
    assert_eq!(processes.arg("node-1", "log-level").as_deref(), Some("TRACE"));
    network.stop().await.unwrap();
}
