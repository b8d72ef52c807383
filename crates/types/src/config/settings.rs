// Path: crates/types/src/config/settings.rs

//! A typed, optional-field view over the settings a node can declare in its
//! flags, its config file, or its implementation-specific document.
//!
//! Each field is decoded independently so a type mismatch names the exact
//! field and document it came from. Values are never coerced: a port written
//! as `"9650"` is rejected, not parsed.

use super::Flags;
use crate::error::ValidationError;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// The key under which a node declares its network id.
pub const NETWORK_ID_KEY: &str = "network-id";
/// The key under which a node declares its database directory.
pub const DB_DIR_KEY: &str = "db-dir";
/// The key under which a node declares its log directory.
pub const LOG_DIR_KEY: &str = "log-dir";
/// The key under which a node declares its HTTP API port.
pub const HTTP_PORT_KEY: &str = "http-port";
/// The key under which a node declares its staking (P2P) port.
pub const STAKING_PORT_KEY: &str = "staking-port";
/// The key of the node binary in the implementation-specific document.
pub const BINARY_PATH_KEY: &str = "binaryPath";

/// The document a settings field was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    /// The node's effective (merged) flags.
    Flags,
    /// The node's config file.
    ConfigFile,
    /// The node's implementation-specific document.
    ImplSpecificConfig,
}

impl SettingsSource {
    /// A short name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flags => "flags",
            Self::ConfigFile => "config file",
            Self::ImplSpecificConfig => "implementation-specific config",
        }
    }
}

/// Optional node settings, each independently typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSettings {
    /// The network id the node will join.
    pub network_id: Option<u32>,
    /// The node's database directory.
    pub db_dir: Option<String>,
    /// The node's log directory.
    pub log_dir: Option<String>,
    /// The node's HTTP API port.
    pub http_port: Option<u16>,
    /// The node's staking (P2P) port.
    pub staking_port: Option<u16>,
}

impl NodeSettings {
    /// Decodes the settings held in a node's effective flags.
    pub fn from_flags(flags: &Flags, node: &str) -> Result<Self, ValidationError> {
        Self::decode(|key| flags.get(key), SettingsSource::Flags, node)
    }

    /// Decodes the settings held in a JSON object.
    pub fn from_object(
        doc: &Map<String, Value>,
        source: SettingsSource,
        node: &str,
    ) -> Result<Self, ValidationError> {
        Self::decode(|key| doc.get(key), source, node)
    }

    /// Parses a raw config file and decodes its settings.
    pub fn from_config_file(raw: &str, node: &str) -> Result<Self, ValidationError> {
        let parse_error = |reason: String| ValidationError::ConfigFileParse {
            node: node.to_string(),
            reason,
        };
        match serde_json::from_str::<Value>(raw).map_err(|e| parse_error(e.to_string()))? {
            Value::Object(doc) => Self::from_object(&doc, SettingsSource::ConfigFile, node),
            other => Err(parse_error(format!("expected a JSON object, got {}", other))),
        }
    }

    /// Layers `self` over `lower`: every field set here wins.
    pub fn over(self, lower: NodeSettings) -> NodeSettings {
        NodeSettings {
            network_id: self.network_id.or(lower.network_id),
            db_dir: self.db_dir.or(lower.db_dir),
            log_dir: self.log_dir.or(lower.log_dir),
            http_port: self.http_port.or(lower.http_port),
            staking_port: self.staking_port.or(lower.staking_port),
        }
    }

    fn decode<'a>(
        get: impl Fn(&str) -> Option<&'a Value>,
        source: SettingsSource,
        node: &str,
    ) -> Result<Self, ValidationError> {
        let mismatch = |field: &'static str, expected: &'static str| ValidationError::FieldType {
            node: node.to_string(),
            source_name: source.as_str(),
            field,
            expected,
        };
        let string = |field: &'static str| match get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(mismatch(field, "a string")),
        };
        let number = |field: &'static str, expected: &'static str, max: u64| match get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .filter(|n| *n <= max)
                .map(Some)
                .ok_or_else(|| mismatch(field, expected)),
        };

        let network_id = number(NETWORK_ID_KEY, "an unsigned 32-bit number", u32::MAX as u64)?
            .and_then(|n| u32::try_from(n).ok());
        let db_dir = string(DB_DIR_KEY)?;
        let log_dir = string(LOG_DIR_KEY)?;
        let http_port = number(HTTP_PORT_KEY, "a port number", u16::MAX as u64)?
            .and_then(|n| u16::try_from(n).ok());
        let staking_port = number(STAKING_PORT_KEY, "a port number", u16::MAX as u64)?
            .and_then(|n| u16::try_from(n).ok());

        Ok(Self {
            network_id,
            db_dir,
            log_dir,
            http_port,
            staking_port,
        })
    }
}

/// The implementation-specific document understood by the local process
/// supervisor: `{"binaryPath": "...", ...settings}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalNodeConfig {
    /// The node binary to launch.
    pub binary_path: Option<PathBuf>,
    /// Settings declared alongside the binary path.
    pub settings: NodeSettings,
}

impl LocalNodeConfig {
    /// Builds the raw implementation-specific document for a node binary.
    pub fn raw_for_binary(binary_path: impl AsRef<std::path::Path>) -> String {
        serde_json::json!({ BINARY_PATH_KEY: binary_path.as_ref().to_string_lossy() }).to_string()
    }

    /// Parses and type-checks a raw implementation-specific document.
    pub fn parse(raw: &str, node: &str) -> Result<Self, ValidationError> {
        let parse_error = |reason: String| ValidationError::ImplSpecificConfigParse {
            node: node.to_string(),
            reason,
        };
        let doc = match serde_json::from_str::<Value>(raw).map_err(|e| parse_error(e.to_string()))? {
            Value::Object(doc) => doc,
            other => return Err(parse_error(format!("expected a JSON object, got {}", other))),
        };
        let binary_path = match doc.get(BINARY_PATH_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(path)) => Some(PathBuf::from(path)),
            Some(_) => {
                return Err(ValidationError::FieldType {
                    node: node.to_string(),
                    source_name: SettingsSource::ImplSpecificConfig.as_str(),
                    field: BINARY_PATH_KEY,
                    expected: "a string",
                })
            }
        };
        let settings = NodeSettings::from_object(&doc, SettingsSource::ImplSpecificConfig, node)?;
        Ok(Self {
            binary_path,
            settings,
        })
    }
}
