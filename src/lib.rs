//! WireGuard Prometheus Exporter Library
//!
//! Exposes WireGuard peer statistics to Prometheus by running
//! `wg show all dump` on every scrape and translating its tab-separated
//! output into labeled metrics.
//!
//! # Architecture
//!
//! Each scrape follows the same path; nothing is cached in between:
//!
//! ```text
//! fetch (wg show all dump) → parse (records) → metrics (samples → registry → text)
//! ```
//!
//! # Error Handling
//!
//! - **Per scrape**: a failing `wg` invocation yields an empty, valid response
//! - **Per record**: a line with the wrong number of fields is skipped
//! - **Per field**: an unparsable number only drops that metric
//!
//! # Example
//!
//! ```no_run
//! use wireguard_exporter::{
//!     fetch::WgCommand,
//!     metrics::WireguardCollector,
//!     parse::DumpOptions,
//! };
//!
//! # async fn run() -> Result<(), wireguard_exporter::metrics::MetricsError> {
//! let collector = WireguardCollector::new(WgCommand::default(), DumpOptions::default());
//! let exposition = collector.scrape().await?;
//! println!("{}", exposition);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod fetch;
pub mod metrics;
pub mod parse;

// Re-export commonly used types at crate root
pub use config::{ConfigError, FileConfig};
pub use fetch::{FetchError, StatusSource, WgCommand};
pub use metrics::{MetricsServer, MetricsServerConfig, WireguardCollector};
pub use parse::{parse_record, ParsedStat, RecordError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
