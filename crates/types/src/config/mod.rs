// Path: crates/types/src/config/mod.rs

//! Configuration documents describing a local network before it is started.
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The typed view over loosely-typed node settings documents.
pub mod settings;
pub use settings::*;

/// Command line flags handed to a node, keyed by flag name.
pub type Flags = BTreeMap<String, serde_json::Value>;

/// Describes a whole network before startup.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// A free-form label for the network, used in logs.
    #[serde(default)]
    pub name: String,
    /// The default log level for every node, passed as the `log-level` flag
    /// unless a node or network flag overrides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// The genesis document shared by every node. Must expose a numeric `networkID`.
    #[serde(default, deserialize_with = "raw_document::string")]
    pub genesis: String,
    /// The nodes to start, in order.
    #[serde(default)]
    pub node_configs: Vec<NodeConfig>,
    /// Network-wide default flags. Node flags win on conflict.
    #[serde(default)]
    pub flags: Flags,
}

impl NetworkConfig {
    /// Loads a network configuration from a `.json` or `.toml` file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read network config {}", path.display()))?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config {}", path.display()))?,
            _ => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config {}", path.display()))?,
        };
        Ok(config)
    }

    /// Returns the network-level flags with `logLevel` folded in as the
    /// lowest-precedence `log-level` entry.
    pub fn effective_flags(&self) -> Flags {
        let mut flags = self.flags.clone();
        if let Some(level) = &self.log_level {
            flags
                .entry("log-level".to_string())
                .or_insert_with(|| serde_json::Value::String(level.clone()));
        }
        flags
    }
}

/// Describes one node before startup.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    /// The node's name. Generated as `node-<n>` when empty.
    #[serde(default)]
    pub name: String,
    /// Whether other nodes bootstrap from this one.
    #[serde(default)]
    pub is_beacon: bool,
    /// PEM encoded staking private key. Must come with `staking_cert`.
    #[serde(default)]
    pub staking_key: String,
    /// PEM encoded staking certificate. Must come with `staking_key`.
    #[serde(default)]
    pub staking_cert: String,
    /// Raw implementation-specific document, see [`LocalNodeConfig`].
    #[serde(
        default,
        deserialize_with = "raw_document::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub impl_specific_config: Option<String>,
    /// Raw config file contents handed to the node.
    #[serde(
        default,
        deserialize_with = "raw_document::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub config_file: Option<String>,
    /// Node-specific flags.
    #[serde(default)]
    pub flags: Flags,
}

impl NodeConfig {
    /// A label for log and error messages: the name if set, else `#<index>`.
    pub fn label(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("#{}", index)
        } else {
            self.name.clone()
        }
    }

    /// The config file contents, treating an empty document as absent.
    pub fn config_file(&self) -> Option<&str> {
        self.config_file.as_deref().filter(|raw| !raw.is_empty())
    }
}

/// Raw documents may be written either as strings or as nested objects in a
/// configuration file. Nested values are kept in their serialized form so that
/// validation sees exactly what the caller provided.
mod raw_document {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(super) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => raw,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub(super) fn optional<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(raw),
            Some(other) => Some(other.to_string()),
        })
    }
}
