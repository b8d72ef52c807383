// Path: crates/cli/src/local/default.rs

use super::staking::StakingIdentity;
use anyhow::Result;
use netrunner_types::{genesis, LocalNodeConfig, NetworkConfig, NodeConfig};
use std::path::Path;

/// The network id of the default local network.
pub const DEFAULT_NETWORK_ID: u32 = 1337;
/// The number of nodes in the default local network.
pub const DEFAULT_NODE_COUNT: usize = 5;

/// A ready-to-run configuration of [`DEFAULT_NODE_COUNT`] beacon nodes named
/// `node-0` to `node-4`, each with its own freshly generated staking identity,
/// all running `binary_path`.
pub fn default_network_config(binary_path: &Path) -> Result<NetworkConfig> {
    let impl_specific_config = LocalNodeConfig::raw_for_binary(binary_path);
    let node_configs = (0..DEFAULT_NODE_COUNT)
        .map(|_| -> Result<NodeConfig> {
            let identity = StakingIdentity::generate()?;
            Ok(NodeConfig {
                is_beacon: true,
                staking_key: identity.key_pem,
                staking_cert: identity.cert_pem,
                impl_specific_config: Some(impl_specific_config.clone()),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(NetworkConfig {
        name: "default".to_string(),
        log_level: Some("INFO".to_string()),
        genesis: genesis::local_genesis(DEFAULT_NETWORK_ID),
        node_configs,
        flags: Default::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::validation::validate_network;

    #[test]
    fn default_config_is_valid() {
        let config = default_network_config(Path::new("/usr/local/bin/node")).unwrap();
        let validated = validate_network(&config).unwrap();
        assert_eq!(validated.network_id, DEFAULT_NETWORK_ID);
        assert_eq!(
            validated.names,
            vec!["node-0", "node-1", "node-2", "node-3", "node-4"]
        );
        assert!(config.node_configs.iter().all(|n| n.is_beacon));
        let binary = validated.nodes[0].local.binary_path.clone().unwrap();
        assert_eq!(binary, Path::new("/usr/local/bin/node"));
    }
}
