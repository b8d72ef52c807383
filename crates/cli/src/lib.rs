// Path: crates/cli/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # netrunner CLI Library
//!
//! Starts and supervises a local network of blockchain node processes for
//! tests and development.
//!
//! A caller describes the network with a [`NetworkConfig`]: a genesis document,
//! network-wide flags and one [`NodeConfig`] per node. [`LocalNetwork`] validates
//! the whole configuration before any process runs, then starts the nodes in
//! order, attaches an API client to each and keeps them in a registry guarded
//! by a single lock. The registry can grow and shrink while the network runs,
//! report aggregate health, and be stopped exactly once.
//!
//! Both collaborators are seams:
//! - [`NodeProcess`] runs a node. [`local_process_factory`] launches the
//!   configured binary as a child process.
//! - [`ApiClient`] talks to a node. [`http_client_factory`] speaks JSON-RPC
//!   over HTTP.
//!
//! Tests substitute in-memory fakes for both through [`LocalNetwork::builder`].

pub mod api;
pub mod local;

pub use api::{http_client_factory, ApiClient, HttpApiClient, NewApiClientFn};
pub use local::{
    default_network_config, local_process_factory, LocalNetwork, LocalNetworkBuilder, LocalNode,
    NewNodeProcessFn, NodeProcess, StakingIdentity,
};
pub use netrunner_types::{NetworkConfig, NetworkError, NodeConfig, ValidationError};
