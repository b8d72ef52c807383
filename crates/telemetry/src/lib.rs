// Path: crates/telemetry/src/lib.rs
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

//! # netrunner Telemetry
//!
//! Structured logging initialization shared by netrunner binaries. Libraries in
//! the workspace only emit `tracing` events; installing the subscriber is left
//! to the binary that owns the process.

/// The initialization routine for global structured logging.
pub mod init;

pub use init::{init_tracing, LogFormat};
