// Path: crates/types/src/genesis.rs

use crate::error::ValidationError;
use serde_json::Value;

/// The genesis field holding the network identifier.
pub const NETWORK_ID_FIELD: &str = "networkID";

/// Extracts the network identifier from a genesis document.
///
/// Only the `networkID` field is interpreted; the rest of the document is
/// opaque and handed to the nodes untouched.
pub fn network_id(genesis: &str) -> Result<u32, ValidationError> {
    if genesis.trim().is_empty() {
        return Err(ValidationError::MissingGenesis);
    }
    let doc = match serde_json::from_str::<Value>(genesis)
        .map_err(|e| ValidationError::GenesisParse(e.to_string()))?
    {
        Value::Object(doc) => doc,
        other => {
            return Err(ValidationError::GenesisParse(format!(
                "expected a JSON object, got {}",
                other
            )))
        }
    };
    let value = doc
        .get(NETWORK_ID_FIELD)
        .ok_or(ValidationError::MissingNetworkId)?;
    value
        .as_u64()
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| ValidationError::GenesisNetworkIdType(value.to_string()))
}

/// Builds a minimal genesis document for a local network.
pub fn local_genesis(network_id: u32) -> String {
    serde_json::json!({
        NETWORK_ID_FIELD: network_id,
        "allocations": [],
        "startTime": 1_630_987_200u64,
        "initialStakeDuration": 31_536_000u64,
        "initialStakeDurationOffset": 5_400u64,
        "message": "netrunner local genesis",
    })
    .to_string()
}
