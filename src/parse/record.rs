//! Peer record parsing.
//!
//! `wg show all dump` prints one tab-separated line per peer, prefixed with
//! the interface name:
//!
//! ```text
//! interface  public-key  preshared-key  endpoint  allowed-ips  latest-handshake  transfer-rx  transfer-tx  persistent-keepalive
//! ```

use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Number of tab-separated fields in a peer record.
pub const PEER_FIELD_COUNT: usize = 9;

const INTERFACE: usize = 0;
const PUBLIC_KEY: usize = 1;
const ENDPOINT: usize = 3;
const ALLOWED_IPS: usize = 4;
const LATEST_HANDSHAKE: usize = 5;
const TRANSFER_RX: usize = 6;
const TRANSFER_TX: usize = 7;

/// Errors that reject a whole record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The line does not have exactly nine fields.
    #[error("unexpected number of fields: {found} (expected 9)")]
    FieldCount {
        /// Number of fields observed.
        found: usize,
    },
}

/// A numeric field that could not be converted.
///
/// Only the affected field is dropped; the rest of the record is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// An integer column failed to parse.
    #[error("invalid {field} '{raw}': {source}")]
    Integer {
        /// Column name.
        field: &'static str,
        /// Text found in the column.
        raw: String,
        /// Underlying parse error.
        source: ParseIntError,
    },
    /// A floating-point column failed to parse.
    #[error("invalid {field} '{raw}': {source}")]
    Float {
        /// Column name.
        field: &'static str,
        /// Text found in the column.
        raw: String,
        /// Underlying parse error.
        source: ParseFloatError,
    },
}

/// Statistics extracted from one peer record.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStat {
    /// WireGuard interface the peer belongs to.
    pub interface_name: String,
    /// Peer public key (base64, as printed by `wg`).
    pub public_key: String,
    /// Peer endpoint (`host:port` or `(none)`).
    pub endpoint: String,
    /// Comma-separated allowed IPs.
    pub allowed_ips: String,
    /// Unix time of the latest handshake, 0 if none happened yet.
    pub latest_handshake_epoch: Option<i64>,
    /// Bytes received from the peer.
    pub transfer_rx_bytes: Option<f64>,
    /// Bytes sent to the peer.
    pub transfer_tx_bytes: Option<f64>,
}

/// Parses a single peer record.
///
/// String fields are copied verbatim. Numeric fields that fail to parse are
/// logged and left as `None`.
pub fn parse_record(line: &str) -> Result<ParsedStat, RecordError> {
    if line.is_empty() {
        return Err(RecordError::FieldCount { found: 0 });
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != PEER_FIELD_COUNT {
        return Err(RecordError::FieldCount {
            found: fields.len(),
        });
    }

    Ok(ParsedStat {
        interface_name: fields[INTERFACE].to_string(),
        public_key: fields[PUBLIC_KEY].to_string(),
        endpoint: fields[ENDPOINT].to_string(),
        allowed_ips: fields[ALLOWED_IPS].to_string(),
        latest_handshake_epoch: logged(parse_int("latest handshake", fields[LATEST_HANDSHAKE])),
        transfer_rx_bytes: logged(parse_float("transfer rx", fields[TRANSFER_RX])),
        transfer_tx_bytes: logged(parse_float("transfer tx", fields[TRANSFER_TX])),
    })
}

fn parse_int(field: &'static str, raw: &str) -> Result<i64, FieldError> {
    raw.parse::<i64>().map_err(|source| FieldError::Integer {
        field,
        raw: raw.to_string(),
        source,
    })
}

fn parse_float(field: &'static str, raw: &str) -> Result<f64, FieldError> {
    raw.parse::<f64>().map_err(|source| FieldError::Float {
        field,
        raw: raw.to_string(),
        source,
    })
}

fn logged<T>(result: Result<T, FieldError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "skipping unparsable field");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn line(fields: &[&str]) -> String {
        fields.join("\t")
    }

    #[test]
    fn test_parse_peer_record() {
        let stat = parse_record(
            "eth0\tpubkey123\tpsk\t10.0.0.1:51820\t10.0.0.0/24\t1000000000\t512\t1024\t25",
        )
        .unwrap();

        assert_eq!(stat.interface_name, "eth0");
        assert_eq!(stat.public_key, "pubkey123");
        assert_eq!(stat.endpoint, "10.0.0.1:51820");
        assert_eq!(stat.allowed_ips, "10.0.0.0/24");
        assert_eq!(stat.latest_handshake_epoch, Some(1_000_000_000));
        assert_eq!(stat.transfer_rx_bytes, Some(512.0));
        assert_eq!(stat.transfer_tx_bytes, Some(1024.0));
    }

    #[test]
    fn test_endpoint_read_from_endpoint_column() {
        let input = line(&[
            "wg0",
            "key",
            "psk",
            "198.51.100.7:51820",
            "10.0.0.2/32",
            "0",
            "0",
            "0",
            "off",
        ]);
        let stat = parse_record(&input).unwrap();

        assert_eq!(stat.endpoint, "198.51.100.7:51820");
        assert_eq!(stat.allowed_ips, "10.0.0.2/32");
        assert_ne!(stat.endpoint, stat.allowed_ips);
    }

    #[test]
    fn test_empty_line_rejected() {
        assert_eq!(
            parse_record(""),
            Err(RecordError::FieldCount { found: 0 })
        );
    }

    #[test]
    fn test_eight_fields_rejected() {
        let input = line(&["1", "2", "3", "4", "5", "6", "7", "8"]);
        assert_eq!(
            parse_record(&input),
            Err(RecordError::FieldCount { found: 8 })
        );
    }

    #[test]
    fn test_interface_record_rejected() {
        let input = line(&["wg0", "privkey", "pubkey", "51820", "off"]);
        assert!(matches!(
            parse_record(&input),
            Err(RecordError::FieldCount { found: 5 })
        ));
    }

    #[test]
    fn test_strings_copied_verbatim() {
        let input = line(&[
            " wg0 ",
            "key=",
            "(none)",
            "(none)",
            "10.0.0.2/32,fd00::2/128",
            "0",
            "0",
            "0",
            "off",
        ]);
        let stat = parse_record(&input).unwrap();

        assert_eq!(stat.interface_name, " wg0 ");
        assert_eq!(stat.public_key, "key=");
        assert_eq!(stat.endpoint, "(none)");
        assert_eq!(stat.allowed_ips, "10.0.0.2/32,fd00::2/128");
        assert_eq!(stat.latest_handshake_epoch, Some(0));
    }

    #[test]
    fn test_bad_handshake_keeps_transfer() {
        let input = line(&[
            "wg0", "key", "psk", "1.2.3.4:5", "10.0.0.2/32", "notanumber", "100", "200", "off",
        ]);
        let stat = parse_record(&input).unwrap();

        assert_eq!(stat.latest_handshake_epoch, None);
        assert_eq!(stat.transfer_rx_bytes, Some(100.0));
        assert_eq!(stat.transfer_tx_bytes, Some(200.0));
    }

    #[test]
    fn test_all_numeric_fields_invalid() {
        let input = line(&["wg0", "key", "psk", "ep", "ips", "x", "y", "z", "off"]);
        let stat = parse_record(&input).unwrap();

        assert_eq!(stat.latest_handshake_epoch, None);
        assert_eq!(stat.transfer_rx_bytes, None);
        assert_eq!(stat.transfer_tx_bytes, None);
        assert_eq!(stat.public_key, "key");
    }

    #[test]
    fn test_field_error_message() {
        let err = parse_int("latest handshake", "abc").unwrap_err();
        assert!(err.to_string().starts_with("invalid latest handshake 'abc'"));
    }

    proptest! {
        #[test]
        fn prop_wrong_field_count_rejected(
            fields in prop::collection::vec("[^\t\n]{0,8}", 1..20usize)
                .prop_filter("not a peer record", |f| f.len() != PEER_FIELD_COUNT)
        ) {
            let input = fields.join("\t");
            prop_assert!(parse_record(&input).is_err());
        }

        #[test]
        fn prop_nine_fields_parse_verbatim(
            fields in prop::collection::vec("[^\t\n]{0,12}", PEER_FIELD_COUNT)
        ) {
            let input = fields.join("\t");
            let stat = parse_record(&input).unwrap();
            prop_assert_eq!(&stat.interface_name, &fields[0]);
            prop_assert_eq!(&stat.public_key, &fields[1]);
            prop_assert_eq!(&stat.allowed_ips, &fields[4]);
        }

        #[test]
        fn prop_parse_is_idempotent(
            fields in prop::collection::vec("[0-9a-f.:/]{0,10}", PEER_FIELD_COUNT)
        ) {
            let input = fields.join("\t");
            prop_assert_eq!(parse_record(&input), parse_record(&input));
        }
    }
}
