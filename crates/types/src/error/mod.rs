// Path: crates/types/src/error/mod.rs
//! Error types for configuration validation and network orchestration.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// A configuration problem detected before any node process is started.
///
/// The `node` fields carry a human readable label: the node's name when it has
/// one, otherwise its position in the configuration (e.g. `#2`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The network configuration has no genesis document.
    #[error("Genesis document is missing")]
    MissingGenesis,
    /// The genesis document is not a valid JSON object.
    #[error("Failed to parse genesis document: {0}")]
    GenesisParse(String),
    /// The genesis document has no `networkID` field.
    #[error("Genesis document has no networkID")]
    MissingNetworkId,
    /// The genesis `networkID` is not an unsigned 32-bit number.
    #[error("Genesis networkID must be an unsigned 32-bit number, got {0}")]
    GenesisNetworkIdType(String),
    /// A node has no implementation-specific configuration.
    #[error("Node {node}: implementation-specific config is missing")]
    MissingImplSpecificConfig {
        /// The node label.
        node: String,
    },
    /// A node's implementation-specific configuration is not a JSON object.
    #[error("Node {node}: failed to parse implementation-specific config: {reason}")]
    ImplSpecificConfigParse {
        /// The node label.
        node: String,
        /// The parser's description of the problem.
        reason: String,
    },
    /// A node's config file is not a JSON object.
    #[error("Node {node}: failed to parse config file: {reason}")]
    ConfigFileParse {
        /// The node label.
        node: String,
        /// The parser's description of the problem.
        reason: String,
    },
    /// A settings field has the wrong type.
    #[error("Node {node}: field '{field}' in {source_name} must be {expected}")]
    FieldType {
        /// The node label.
        node: String,
        /// The document the field came from (flags, config file, ...).
        source_name: &'static str,
        /// The offending field.
        field: &'static str,
        /// A description of the expected type.
        expected: &'static str,
    },
    /// A node declares a network id different from the genesis one.
    #[error("Node {node}: network id {declared} does not match genesis network id {genesis}")]
    NetworkIdMismatch {
        /// The node label.
        node: String,
        /// The network id from the genesis document.
        genesis: u32,
        /// The network id declared by the node.
        declared: u32,
    },
    /// A node has a staking key but no staking certificate.
    #[error("Node {node}: staking key given without a staking certificate")]
    StakingKeyWithoutCert {
        /// The node label.
        node: String,
    },
    /// A node has a staking certificate but no staking key.
    #[error("Node {node}: staking certificate given without a staking key")]
    StakingCertWithoutKey {
        /// The node label.
        node: String,
    },
    /// The staking key and certificate do not form a valid pair.
    #[error("Node {node}: invalid staking key/certificate pair: {reason}")]
    InvalidStakingPair {
        /// The node label.
        node: String,
        /// Why the pair was rejected.
        reason: String,
    },
    /// A non-empty network has no beacon node.
    #[error("Network has nodes but none of them is a beacon")]
    NoBeacon,
    /// Two nodes resolve to the same name.
    #[error("Repeated node name '{0}'")]
    DuplicateName(String),
}

impl ErrorCode for ValidationError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingGenesis => "VALIDATION_MISSING_GENESIS",
            Self::GenesisParse(_) => "VALIDATION_GENESIS_PARSE",
            Self::MissingNetworkId => "VALIDATION_MISSING_NETWORK_ID",
            Self::GenesisNetworkIdType(_) => "VALIDATION_GENESIS_NETWORK_ID_TYPE",
            Self::MissingImplSpecificConfig { .. } => "VALIDATION_MISSING_IMPL_CONFIG",
            Self::ImplSpecificConfigParse { .. } => "VALIDATION_IMPL_CONFIG_PARSE",
            Self::ConfigFileParse { .. } => "VALIDATION_CONFIG_FILE_PARSE",
            Self::FieldType { .. } => "VALIDATION_FIELD_TYPE",
            Self::NetworkIdMismatch { .. } => "VALIDATION_NETWORK_ID_MISMATCH",
            Self::StakingKeyWithoutCert { .. } => "VALIDATION_STAKING_KEY_WITHOUT_CERT",
            Self::StakingCertWithoutKey { .. } => "VALIDATION_STAKING_CERT_WITHOUT_KEY",
            Self::InvalidStakingPair { .. } => "VALIDATION_INVALID_STAKING_PAIR",
            Self::NoBeacon => "VALIDATION_NO_BEACON",
            Self::DuplicateName(_) => "VALIDATION_DUPLICATE_NAME",
        }
    }
}

/// Errors returned by the network orchestrator.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The configuration was rejected before any process was started.
    #[error("Invalid network configuration: {0}")]
    Validation(#[from] ValidationError),
    /// A node's working directory, process or API client could not be set up.
    #[error("Failed to start node {node}: {source}")]
    Start {
        /// The name of the node that failed.
        node: String,
        /// The underlying failure reported by the collaborator.
        #[source]
        source: anyhow::Error,
    },
    /// The named node is not registered in the network.
    #[error("Node {0} not found in network")]
    NodeNotFound(String),
    /// The network has already been stopped.
    #[error("Network stopped")]
    Stopped,
    /// The deadline elapsed before every node reported healthy.
    #[error("Timed out waiting for the network to become healthy")]
    HealthTimeout,
    /// Creating the network's root directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetworkError {
    /// Returns true if this is the stopped sentinel.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl ErrorCode for NetworkError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "NETWORK_INVALID_CONFIG",
            Self::Start { .. } => "NETWORK_NODE_START_FAILED",
            Self::NodeNotFound(_) => "NETWORK_NODE_NOT_FOUND",
            Self::Stopped => "NETWORK_STOPPED",
            Self::HealthTimeout => "NETWORK_HEALTH_TIMEOUT",
            Self::Io(_) => "NETWORK_IO_ERROR",
        }
    }
}
