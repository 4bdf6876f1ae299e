//! Typed metric samples derived from parsed peer records.

use crate::parse::ParsedStat;

/// Label set shared by every WireGuard metric.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerLabels {
    /// WireGuard interface name.
    pub interface: String,
    /// Peer public key.
    pub public_key: String,
    /// Peer allowed IPs, as printed by `wg`.
    pub allowed_ips: String,
}

impl PeerLabels {
    /// Label names, in the order of [`PeerLabels::values`].
    pub const NAMES: [&'static str; 3] = ["interface", "public_key", "allowed_ips"];

    /// Builds the label set of a parsed peer record.
    pub fn from_stat(stat: &ParsedStat) -> Self {
        Self {
            interface: stat.interface_name.clone(),
            public_key: stat.public_key.clone(),
            allowed_ips: stat.allowed_ips.clone(),
        }
    }

    /// Label values, in the order of [`PeerLabels::NAMES`].
    pub fn values(&self) -> [&str; 3] {
        [
            self.interface.as_str(),
            self.public_key.as_str(),
            self.allowed_ips.as_str(),
        ]
    }
}

/// One metric value for one peer.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// Seconds since the latest handshake.
    Handshake {
        /// Peer the sample belongs to.
        labels: PeerLabels,
        /// Current time minus the handshake epoch.
        age_seconds: f64,
    },
    /// Total bytes received.
    Rx {
        /// Peer the sample belongs to.
        labels: PeerLabels,
        /// Value of the transfer-rx column.
        bytes: f64,
    },
    /// Total bytes sent.
    Tx {
        /// Peer the sample belongs to.
        labels: PeerLabels,
        /// Value of the transfer-tx column.
        bytes: f64,
    },
}

impl Sample {
    /// Labels of the peer this sample describes.
    pub fn labels(&self) -> &PeerLabels {
        match self {
            Sample::Handshake { labels, .. }
            | Sample::Rx { labels, .. }
            | Sample::Tx { labels, .. } => labels,
        }
    }

    /// Numeric value of the sample.
    pub fn value(&self) -> f64 {
        match self {
            Sample::Handshake { age_seconds, .. } => *age_seconds,
            Sample::Rx { bytes, .. } | Sample::Tx { bytes, .. } => *bytes,
        }
    }
}

/// Receiver of metric samples.
pub trait SampleSink {
    /// Accepts one sample.
    fn record(&mut self, sample: Sample);
}

impl SampleSink for Vec<Sample> {
    fn record(&mut self, sample: Sample) {
        self.push(sample);
    }
}

/// Emits one sample per parsed numeric field of `stat`.
///
/// `now` is the current unix time in seconds. Returns the number of samples
/// emitted.
pub fn emit_samples(stat: &ParsedStat, now: i64, sink: &mut impl SampleSink) -> usize {
    let labels = PeerLabels::from_stat(stat);
    let mut emitted = 0;

    if let Some(epoch) = stat.latest_handshake_epoch {
        sink.record(Sample::Handshake {
            labels: labels.clone(),
            age_seconds: now.saturating_sub(epoch) as f64,
        });
        emitted += 1;
    }

    if let Some(bytes) = stat.transfer_rx_bytes {
        sink.record(Sample::Rx {
            labels: labels.clone(),
            bytes,
        });
        emitted += 1;
    }

    if let Some(bytes) = stat.transfer_tx_bytes {
        sink.record(Sample::Tx { labels, bytes });
        emitted += 1;
    }

    emitted
}
