// Path: crates/cli/src/api/mod.rs

//! The node API seam. The orchestrator only needs health checks and cleanup,
//! so that is all [`ApiClient`] exposes.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub mod http;

pub use http::HttpApiClient;

/// A client bound to one node's API.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Asks the node whether it considers itself healthy.
    async fn check_health(&self) -> Result<bool>;

    /// Releases the client's resources. Idempotent.
    async fn close(&self);
}

/// Builds a client for the API at `address:port`, with a per-request timeout.
pub type NewApiClientFn =
    Arc<dyn Fn(&str, u16, Duration) -> Result<Arc<dyn ApiClient>> + Send + Sync>;

/// The factory used by default: a JSON-RPC client over HTTP.
pub fn http_client_factory() -> NewApiClientFn {
    Arc::new(|address: &str, port: u16, timeout: Duration| {
        let client: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(address, port, timeout)?);
        Ok(client)
    })
}
