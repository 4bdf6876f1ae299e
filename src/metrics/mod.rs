//! Prometheus exporter for WireGuard peer statistics.
//!
//! Collection is synchronous with the scrape: every request to the metrics
//! endpoint runs the status command, parses its output and encodes a
//! freshly built registry. Nothing is kept between scrapes.
//!
//! # Metrics Exposed
//!
//! All metrics carry the labels `interface`, `public_key` and `allowed_ips`.
//!
//! - `wireguard_latest_handshake_age_seconds` (gauge) - Seconds since the latest handshake
//! - `wireguard_transfer_rx_bytes` (counter) - Bytes received from the peer
//! - `wireguard_transfer_tx_bytes` (counter) - Bytes sent to the peer
//!
//! # Example
//!
//! ```no_run
//! use wireguard_exporter::fetch::WgCommand;
//! use wireguard_exporter::metrics::{MetricsServer, MetricsServerConfig, WireguardCollector};
//! use wireguard_exporter::parse::DumpOptions;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let collector = WireguardCollector::new(WgCommand::default(), DumpOptions::default());
//! let server = MetricsServer::new(MetricsServerConfig::default(), collector);
//! server.run(std::future::pending()).await?;
//! # Ok(())
//! # }
//! ```

mod collector;
mod sample;
mod server;

pub use collector::{MetricsError, ScrapeRegistry, ScrapeSummary, WireguardCollector};
pub use sample::{emit_samples, PeerLabels, Sample, SampleSink};
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
