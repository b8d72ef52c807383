// Path: crates/cli/src/local/validation.rs

//! Configuration checks run before any node process is started.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. the genesis document yields a network id;
//! 2. every node carries an implementation-specific config;
//! 3. that config parses and its fields are well typed;
//! 4. the node's config file, when present, parses and is well typed, as are
//!    the node's effective flags;
//! 5. every network id a node declares equals the genesis network id;
//! 6. staking key and certificate come as a valid pair or not at all;
//! 7. a non-empty network has at least one beacon;
//! 8. resolved node names are unique.
//!
//! Steps 2 to 6 are also what [`validate_node`] runs for a node added to a
//! running network.

use super::flags::merge_flags;
use super::names;
use super::staking::StakingIdentity;
use netrunner_types::{
    genesis, Flags, LocalNodeConfig, NetworkConfig, NodeConfig, NodeSettings, ValidationError,
};

/// A node configuration that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedNode {
    /// The parsed implementation-specific document.
    pub local: LocalNodeConfig,
    /// Settings resolved across flags, config file and implementation-specific
    /// config, in that order of precedence.
    pub settings: NodeSettings,
    /// The staking identity, when the node brings its own.
    pub staking: Option<StakingIdentity>,
}

/// A network configuration that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedNetwork {
    /// The network id read from the genesis document.
    pub network_id: u32,
    /// The resolved name of every node, in configuration order.
    pub names: Vec<String>,
    /// How many of `names` were generated.
    pub generated_names: usize,
    /// The validated nodes, in configuration order.
    pub nodes: Vec<ValidatedNode>,
}

/// Validates a whole network configuration. Has no side effects.
pub fn validate_network(config: &NetworkConfig) -> Result<ValidatedNetwork, ValidationError> {
    let network_id = genesis::network_id(&config.genesis)?;
    let network_flags = config.effective_flags();

    let nodes = config
        .node_configs
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let flags = merge_flags(&network_flags, &node.flags);
            validate_node(node, &node.label(index), &flags, network_id)
        })
        .collect::<Result<Vec<_>, _>>()?;

    if !config.node_configs.is_empty() && !config.node_configs.iter().any(|n| n.is_beacon) {
        return Err(ValidationError::NoBeacon);
    }

    let (names, generated_names) = names::resolve_names(&config.node_configs);
    names::ensure_unique(&names)?;

    Ok(ValidatedNetwork {
        network_id,
        names,
        generated_names,
        nodes,
    })
}

/// Validates one node against an already-resolved genesis network id.
///
/// `flags` must be the node's effective flags (network flags merged with the
/// node's own).
pub fn validate_node(
    config: &NodeConfig,
    label: &str,
    flags: &Flags,
    genesis_network_id: u32,
) -> Result<ValidatedNode, ValidationError> {
    let raw = config
        .impl_specific_config
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| ValidationError::MissingImplSpecificConfig {
            node: label.to_string(),
        })?;
    let local = LocalNodeConfig::parse(raw, label)?;

    let from_file = match config.config_file() {
        Some(raw) => NodeSettings::from_config_file(raw, label)?,
        None => NodeSettings::default(),
    };
    let from_flags = NodeSettings::from_flags(flags, label)?;

    let declared = [from_flags.network_id, from_file.network_id, local.settings.network_id];
    if let Some(mismatch) = declared
        .into_iter()
        .flatten()
        .find(|id| *id != genesis_network_id)
    {
        return Err(ValidationError::NetworkIdMismatch {
            node: label.to_string(),
            genesis: genesis_network_id,
            declared: mismatch,
        });
    }

    let staking = staking_identity(config, label)?;
    let settings = from_flags.over(from_file).over(local.settings.clone());

    Ok(ValidatedNode {
        local,
        settings,
        staking,
    })
}

/// Checks the staking key and certificate of a node. Both absent is fine and
/// yields `None`.
pub fn staking_identity(
    config: &NodeConfig,
    label: &str,
) -> Result<Option<StakingIdentity>, ValidationError> {
    let node = label.to_string();
    match (config.staking_key.is_empty(), config.staking_cert.is_empty()) {
        (true, true) => Ok(None),
        (false, true) => Err(ValidationError::StakingKeyWithoutCert { node }),
        (true, false) => Err(ValidationError::StakingCertWithoutKey { node }),
        (false, false) => StakingIdentity::from_pem(&config.staking_key, &config.staking_cert)
            .map(Some)
            .map_err(|e| ValidationError::InvalidStakingPair {
                node,
                reason: e.to_string(),
            }),
    }
}
