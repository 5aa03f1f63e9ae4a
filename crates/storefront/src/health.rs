//! Backend health monitoring.
//!
//! A background task probes the API on a fixed interval and publishes the
//! result through a `watch` channel, so any number of consumers can show a
//! "backend unavailable" state without polling themselves.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::HealthConfig;

/// Last known backend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    /// First probe still in flight.
    #[default]
    Checking,
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Probes the commerce API.
#[derive(Debug, Clone)]
pub struct HealthMonitor {
    api: ApiClient,
    config: HealthConfig,
}

impl HealthMonitor {
    #[must_use]
    pub const fn new(api: ApiClient, config: HealthConfig) -> Self {
        Self { api, config }
    }

    /// Run one probe. Healthy iff the API answers 2xx within the timeout.
    pub async fn check(&self) -> HealthStatus {
        match self.api.probe(self.config.timeout).await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = %e, "Backend health check failed");
                HealthStatus::Unhealthy
            }
        }
    }

    /// Start probing in the background: once immediately, then every
    /// `interval`. Must be called within a tokio runtime.
    #[must_use]
    pub fn spawn(self) -> HealthHandle {
        let (tx, rx) = watch::channel(HealthStatus::Checking);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                // The first tick completes immediately.
                ticker.tick().await;
                let status = self.check().await;
                let changed = tx.send_if_modified(|current| {
                    let changed = *current != status;
                    *current = status;
                    changed
                });
                if changed {
                    info!(status = ?status, "Backend health changed");
                }
                if tx.is_closed() {
                    break;
                }
            }
        });
        HealthHandle { rx, task }
    }
}

/// Handle to a running health monitor. Dropping it stops the monitor.
#[derive(Debug)]
pub struct HealthHandle {
    rx: watch::Receiver<HealthStatus>,
    task: JoinHandle<()>,
}

impl HealthHandle {
    /// The most recent status.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        *self.rx.borrow()
    }

    /// A receiver that wakes on every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<HealthStatus> {
        self.rx.clone()
    }

    /// Wait until the first probe has finished and return its result.
    pub async fn first_result(&mut self) -> HealthStatus {
        match self
            .rx
            .wait_for(|status| *status != HealthStatus::Checking)
            .await
        {
            Ok(status) => *status,
            Err(_) => HealthStatus::Unhealthy,
        }
    }
}

impl Drop for HealthHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::{Json, Router, routing::get};
    use url::Url;

    use super::*;

    async fn mock_backend() -> Url {
        let app = Router::new().route(
            "/api/products",
            get(|| async { Json(serde_json::json!({ "success": true, "data": [] })) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/api")).unwrap()
    }

    async fn dead_backend() -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Url::parse(&format!("http://{addr}/api")).unwrap()
    }

    fn monitor(url: &Url) -> HealthMonitor {
        HealthMonitor::new(
            ApiClient::new(url, None).unwrap(),
            HealthConfig {
                interval: Duration::from_secs(30),
                timeout: Duration::from_secs(2),
            },
        )
    }

    #[tokio::test]
    async fn test_check_healthy() {
        let url = mock_backend().await;
        assert_eq!(monitor(&url).check().await, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_check_unreachable() {
        let url = dead_backend().await;
        assert_eq!(monitor(&url).check().await, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_non_success_status_is_unhealthy() {
        // Backend is up but has no /api/products route.
        let app = Router::new();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let url = Url::parse(&format!("http://{addr}/api")).unwrap();
        assert_eq!(monitor(&url).check().await, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_spawn_publishes_first_result() {
        let url = mock_backend().await;
        let mut handle = monitor(&url).spawn();
        assert_eq!(handle.first_result().await, HealthStatus::Healthy);
        assert!(handle.status().is_healthy());
    }
}
