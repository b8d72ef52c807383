// Path: crates/cli/src/local/names.rs

//! Node name allocation.

use netrunner_types::{NodeConfig, ValidationError};
use std::collections::BTreeSet;

/// The prefix of generated node names.
pub const GENERATED_NAME_PREFIX: &str = "node-";

/// The name given to the `index`-th unnamed node.
pub fn generated_name(index: usize) -> String {
    format!("{}{}", GENERATED_NAME_PREFIX, index)
}

/// Resolves the name of every node in order. Unnamed nodes are numbered by
/// their position among the unnamed nodes, so `[a, "", b, ""]` yields
/// `[a, node-0, b, node-1]`.
///
/// Returns the names and the number of generated names.
pub fn resolve_names(configs: &[NodeConfig]) -> (Vec<String>, usize) {
    let mut generated = 0;
    let names = configs
        .iter()
        .map(|config| {
            if config.name.is_empty() {
                generated += 1;
                generated_name(generated - 1)
            } else {
                config.name.clone()
            }
        })
        .collect();
    (names, generated)
}

/// Fails on the first name that appears twice.
pub fn ensure_unique(names: &[String]) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ValidationError::DuplicateName(name.clone()));
        }
    }
    Ok(())
}

/// Picks the next generated name not already taken, advancing `next_suffix`
/// past it.
pub fn next_free_name(next_suffix: &mut usize, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let name = generated_name(*next_suffix);
        *next_suffix += 1;
        if !taken(&name) {
            return name;
        }
    }
}
