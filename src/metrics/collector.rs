//! Per-scrape metrics collection and encoding.

use super::sample::{emit_samples, PeerLabels, Sample, SampleSink};
use crate::fetch::StatusSource;
use crate::parse::{parse_dump, DumpOptions};
use prometheus::proto::{Counter, LabelPair, Metric, MetricFamily, MetricType};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::BTreeMap;
use thiserror::Error;

const NAMESPACE: &str = "wireguard";

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus registry holding the samples of a single scrape.
///
/// A fresh registry is built for every scrape, so concurrent scrapes never
/// share metric state. Transfer totals are reported as read from `wg`, so
/// they are kept outside the registry and encoded as counter families with
/// their values set directly.
pub struct ScrapeRegistry {
    registry: Registry,
    latest_handshake_age: GaugeVec,
    transfer_rx: BTreeMap<PeerLabels, f64>,
    transfer_tx: BTreeMap<PeerLabels, f64>,
}

impl ScrapeRegistry {
    /// Creates an empty registry with the WireGuard metric families registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let latest_handshake_age = GaugeVec::new(
            Opts::new(
                "latest_handshake_age_seconds",
                "Time in seconds since the latest handshake.",
            )
            .namespace(NAMESPACE),
            &PeerLabels::NAMES,
        )?;

        registry.register(Box::new(latest_handshake_age.clone()))?;

        Ok(Self {
            registry,
            latest_handshake_age,
            transfer_rx: BTreeMap::new(),
            transfer_tx: BTreeMap::new(),
        })
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let mut metric_families = self.registry.gather();
        metric_families.extend(counter_family(
            "transfer_rx_bytes",
            "Number of received bytes.",
            &self.transfer_rx,
        ));
        metric_families.extend(counter_family(
            "transfer_tx_bytes",
            "Number of sent bytes.",
            &self.transfer_tx,
        ));
        metric_families.sort_by(|a, b| a.get_name().cmp(b.get_name()));

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl SampleSink for ScrapeRegistry {
    fn record(&mut self, sample: Sample) {
        match sample {
            Sample::Handshake {
                labels,
                age_seconds,
            } => {
                self.latest_handshake_age
                    .with_label_values(&labels.values())
                    .set(age_seconds);
            }
            Sample::Rx { labels, bytes } => {
                *self.transfer_rx.entry(labels).or_insert(0.0) += bytes;
            }
            Sample::Tx { labels, bytes } => {
                *self.transfer_tx.entry(labels).or_insert(0.0) += bytes;
            }
        }
    }
}

/// Builds a counter family holding `values` verbatim, or `None` if empty.
fn counter_family(
    name: &str,
    help: &str,
    values: &BTreeMap<PeerLabels, f64>,
) -> Option<MetricFamily> {
    if values.is_empty() {
        return None;
    }

    let mut family = MetricFamily::default();
    family.set_name(format!("{}_{}", NAMESPACE, name));
    family.set_help(help.to_string());
    family.set_field_type(MetricType::COUNTER);

    for (labels, value) in values {
        let mut metric = Metric::default();
        // Exposition expects label pairs sorted by name.
        let mut pairs: Vec<(&str, &str)> = PeerLabels::NAMES
            .iter()
            .copied()
            .zip(labels.values())
            .collect();
        pairs.sort_by_key(|(label_name, _)| *label_name);
        for (label_name, label_value) in pairs {
            let mut pair = LabelPair::default();
            pair.set_name(label_name.to_string());
            pair.set_value(label_value.to_string());
            metric.mut_label().push(pair);
        }

        let mut counter = Counter::default();
        counter.set_value(*value);
        metric.set_counter(counter);
        family.mut_metric().push(metric);
    }

    Some(family)
}

/// Counts from one scrape, logged at debug level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    /// Whether the status command succeeded.
    pub fetched: bool,
    /// Peer records parsed.
    pub records: usize,
    /// Lines rejected as malformed.
    pub malformed: usize,
    /// Samples written to the registry.
    pub samples: usize,
}

/// Collects WireGuard statistics from a [`StatusSource`] on demand.
pub struct WireguardCollector<S> {
    source: S,
    options: DumpOptions,
}

impl<S: StatusSource> WireguardCollector<S> {
    /// Creates a collector reading from `source`.
    pub fn new(source: S, options: DumpOptions) -> Self {
        Self { source, options }
    }

    /// Runs the status command and fills `sink` with the resulting samples.
    ///
    /// A failed fetch is logged and leaves `sink` untouched.
    pub async fn collect_into(&self, now: i64, sink: &mut impl SampleSink) -> ScrapeSummary {
        let raw = match self.source.fetch().await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "Error while calling wg");
                return ScrapeSummary::default();
            }
        };

        let report = parse_dump(&raw, self.options);
        let mut samples = 0;
        for stat in &report.stats {
            samples += emit_samples(stat, now, &mut *sink);
        }

        ScrapeSummary {
            fetched: true,
            records: report.stats.len(),
            malformed: report.malformed,
            samples,
        }
    }

    /// Performs a full scrape and returns the encoded exposition text.
    pub async fn scrape(&self) -> Result<String, MetricsError> {
        let mut registry = ScrapeRegistry::new()?;
        let now = chrono::Utc::now().timestamp();
        let summary = self.collect_into(now, &mut registry).await;

        tracing::debug!(
            fetched = summary.fetched,
            records = summary.records,
            malformed = summary.malformed,
            samples = summary.samples,
            "Scrape complete"
        );

        registry.encode()
    }
}
