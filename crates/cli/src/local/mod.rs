// Path: crates/cli/src/local/mod.rs

//! The local network runner: node processes on this machine, orchestrated as
//! one network.

pub mod default;
pub mod flags;
pub mod health;
pub mod names;
pub mod network;
pub mod node;
pub mod process;
pub mod staking;
pub mod validation;

pub use default::{default_network_config, DEFAULT_NETWORK_ID, DEFAULT_NODE_COUNT};
pub use network::{LocalNetwork, LocalNetworkBuilder};
pub use node::{LocalNode, NodeEndpoints};
pub use process::{local_process_factory, LocalProcess, NewNodeProcessFn, NodeProcess};
pub use staking::StakingIdentity;
pub use validation::{validate_network, validate_node, ValidatedNetwork, ValidatedNode};
