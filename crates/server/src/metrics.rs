//! Prometheus metrics.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `http_requests_total{method,path,status}` - Requests served
//! - `pvz_created_total` - Pickup points created
//! - `receptions_created_total` - Receptions opened
//! - `products_created_total` - Products added
//!
//! ## Histograms
//! - `http_request_duration_seconds{method,path}` - Request latency

use std::future::Future;
use std::net::SocketAddr;

use axum::{Router, routing::get};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const PVZ_CREATED_TOTAL: &str = "pvz_created_total";
pub const RECEPTIONS_CREATED_TOTAL: &str = "receptions_created_total";
pub const PRODUCTS_CREATED_TOTAL: &str = "products_created_total";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
    /// Failed to bind HTTP server
    #[error("Failed to bind metrics server: {0}")]
    Bind(#[from] std::io::Error),
}

/// Prometheus metrics server.
///
/// Exposes metrics on `/metrics` for Prometheus scraping.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Register metric descriptions and install the global recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed. A recorder
    /// that is already installed is not an error.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(addr = %self.addr, "metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Serve `/metrics` until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Bind` if the listener cannot be bound or fails.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), MetricsError> {
        let handle = self.handle;
        let app = Router::new().route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move { exposition(handle.as_ref()) }
            }),
        );

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("metrics listening on http://{}/metrics", self.addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

/// Prometheus text for `/metrics`; empty until the recorder is installed.
fn exposition(handle: Option<&PrometheusHandle>) -> String {
    handle.map(PrometheusHandle::render).unwrap_or_default()
}

fn register_metrics() {
    describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request processing time in seconds"
    );
    describe_counter!(PVZ_CREATED_TOTAL, "Total number of pickup points created");
    describe_counter!(
        RECEPTIONS_CREATED_TOTAL,
        "Total number of receptions opened"
    );
    describe_counter!(PRODUCTS_CREATED_TOTAL, "Total number of products added");
}

pub fn record_pvz_created() {
    metrics::counter!(PVZ_CREATED_TOTAL).increment(1);
}

pub fn record_reception_created() {
    metrics::counter!(RECEPTIONS_CREATED_TOTAL).increment(1);
}

pub fn record_product_created() {
    metrics::counter!(PRODUCTS_CREATED_TOTAL).increment(1);
}

/// Record one served request.
pub fn record_request(method: &str, path: &str, status: u16, seconds: f64) {
    metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(seconds);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposition_before_start_is_empty() {
        assert!(exposition(None).is_empty());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_pvz_created();
        record_request("GET", "/pvz", 200, 0.01);
    }
}
