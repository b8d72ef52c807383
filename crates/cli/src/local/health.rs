// Path: crates/cli/src/local/health.rs

//! Cluster health aggregation.

use crate::api::ApiClient;
use futures_util::future::join_all;
use netrunner_types::NetworkError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};

/// The pause between two polling rounds.
pub const DEFAULT_HEALTH_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// A node to poll, captured at the start of a round.
pub(crate) struct HealthTarget {
    pub name: String,
    pub client: Arc<dyn ApiClient>,
}

/// Polls in rounds until every target reports healthy or `deadline` passes.
///
/// `targets` is called at the start of every round, so nodes added or removed
/// meanwhile are picked up by the next round. The checks of a round run
/// concurrently. A failed check counts as unhealthy.
pub(crate) async fn await_healthy<F, Fut>(
    mut targets: F,
    deadline: Instant,
    interval: Duration,
) -> Result<(), NetworkError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<HealthTarget>, NetworkError>>,
{
    let poll = async {
        let mut round: u64 = 0;
        loop {
            round += 1;
            let targets = targets().await?;
            let checks = targets.iter().map(|target| async move {
                match target.client.check_health().await {
                    Ok(healthy) => healthy,
                    Err(e) => {
                        tracing::debug!(target: "netrunner", node = %target.name, error = %e, "Health check failed");
                        false
                    }
                }
            });
            let results = join_all(checks).await;
            let unhealthy = results.iter().filter(|healthy| !**healthy).count();
            if unhealthy == 0 {
                tracing::info!(target: "netrunner", nodes = targets.len(), round, "Network is healthy");
                return Ok(());
            }
            tracing::debug!(target: "netrunner", unhealthy, nodes = targets.len(), round, "Network not healthy yet");
            sleep(interval).await;
        }
    };

    match timeout_at(deadline, poll).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(target: "netrunner", "Timed out waiting for the network to become healthy");
            Err(NetworkError::HealthTimeout)
        }
    }
}
