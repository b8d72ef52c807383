// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
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

//! # netrunner Types
//!
//! The foundational crate of the netrunner workspace. It holds the documents a
//! caller uses to describe a local network (`NetworkConfig`, `NodeConfig`), the
//! typed view over the loosely-typed node settings documents, genesis inspection,
//! node identifiers, and the error taxonomy shared by the orchestrator.
//!
//! Nothing in here performs I/O beyond loading a configuration file, so these
//! types can be used to build and validate configurations without starting a
//! single process.

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::NetworkError> = std::result::Result<T, E>;

/// Network and node configuration documents.
pub mod config;
/// The error taxonomy for validation and orchestration.
pub mod error;
/// Helpers for inspecting the genesis document.
pub mod genesis;
/// Node identifiers derived from staking certificates.
pub mod node_id;

pub use config::{Flags, LocalNodeConfig, NetworkConfig, NodeConfig, NodeSettings};
pub use error::{ErrorCode, NetworkError, ValidationError};
pub use node_id::NodeId;
