// Path: crates/cli/src/local/flags.rs

use netrunner_types::Flags;
use serde_json::Value;

/// Merges network-wide and node flags. Node flags win on key conflict.
pub fn merge_flags(network: &Flags, node: &Flags) -> Flags {
    let mut merged = network.clone();
    merged.extend(node.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Renders a flag value the way a node binary expects it on the command line.
/// Strings are passed verbatim, everything else as its JSON text.
pub fn flag_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders flags as `--key=value` arguments, ordered by key.
pub fn to_args(flags: &Flags) -> Vec<String> {
    flags
        .iter()
        .map(|(key, value)| format!("--{}={}", key, flag_value(value)))
        .collect()
}
