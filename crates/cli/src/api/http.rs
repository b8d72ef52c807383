// Path: crates/cli/src/api/http.rs

use super::ApiClient;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// The path of the node's health endpoint.
pub const HEALTH_ENDPOINT: &str = "/ext/health";
/// The JSON-RPC method answering health queries.
pub const HEALTH_METHOD: &str = "health.health";

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct HealthReply {
    healthy: bool,
}

/// Talks to a node's HTTP JSON-RPC API.
#[derive(Debug)]
pub struct HttpApiClient {
    client: reqwest::Client,
    health_url: String,
    closed: AtomicBool,
}

impl HttpApiClient {
    pub fn new(address: &str, port: u16, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            health_url: format!("http://{}:{}{}", address, port, HEALTH_ENDPOINT),
            closed: AtomicBool::new(false),
        })
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn check_health(&self) -> Result<bool> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(anyhow!("API client for {} is closed", self.health_url));
        }
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": HEALTH_METHOD,
            "params": {},
        });
        let response = self
            .client
            .post(&self.health_url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Health request to {} failed", self.health_url))?;

        // Unhealthy nodes answer 503 with a regular JSON-RPC body.
        let status = response.status();
        let reply: JsonRpcResponse<HealthReply> = response
            .json()
            .await
            .with_context(|| format!("Unexpected health response ({})", status))?;

        match (reply.result, reply.error) {
            (Some(result), _) => Ok(result.healthy),
            (None, Some(error)) => Err(anyhow!(
                "{} failed with code {}: {}",
                HEALTH_METHOD,
                error.code,
                error.message
            )),
            (None, None) => Err(anyhow!("Empty health response ({})", status)),
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
