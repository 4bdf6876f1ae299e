//! HTTP server for the Prometheus metrics endpoint.

use super::WireguardCollector;
use crate::fetch::StatusSource;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Errors that can occur during metrics server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not bind its address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// Underlying socket error.
        source: std::io::Error,
    },

    /// The server stopped with an error.
    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
    /// Path the metrics are served on.
    pub metrics_path: String,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], 9101).into(),
            metrics_path: "/metrics".to_string(),
        }
    }
}

impl MetricsServerConfig {
    /// Creates a config with a custom port.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
            ..Default::default()
        }
    }
}

/// HTTP server exposing WireGuard metrics.
///
/// Every request to the metrics path triggers a fresh collection.
pub struct MetricsServer<S> {
    config: MetricsServerConfig,
    collector: Arc<WireguardCollector<S>>,
}

impl<S: StatusSource> MetricsServer<S> {
    /// Creates a new metrics server.
    pub fn new(config: MetricsServerConfig, collector: WireguardCollector<S>) -> Self {
        Self {
            config,
            collector: Arc::new(collector),
        }
    }

    /// Builds the router; exposed separately so it can be driven in tests.
    pub fn router(&self) -> Router {
        Router::new()
            .route(&self.config.metrics_path, get(metrics_handler::<S>))
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&self.collector))
    }

    /// Starts the HTTP server.
    ///
    /// Runs until `shutdown` resolves. Failing to bind is returned as
    /// [`ServerError::Bind`].
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<(), ServerError> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.config.bind_addr,
                source,
            })?;

        tracing::info!(
            addr = %self.config.bind_addr,
            path = %self.config.metrics_path,
            "Metrics server listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Handler for the metrics endpoint.
async fn metrics_handler<S: StatusSource>(
    State(collector): State<Arc<WireguardCollector<S>>>,
) -> impl IntoResponse {
    match collector.scrape().await {
        Ok(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
