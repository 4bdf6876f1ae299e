//! Splitting of the full `wg show all dump` output into peer records.

use super::record::{parse_record, ParsedStat};

/// Options controlling how dump output is split.
#[derive(Debug, Clone, Copy)]
pub struct DumpOptions {
    /// Drop the first line of output before parsing.
    pub skip_first_line: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            skip_first_line: true,
        }
    }
}

/// Result of parsing one dump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DumpReport {
    /// Successfully parsed peer records, in output order.
    pub stats: Vec<ParsedStat>,
    /// Non-empty lines rejected as malformed.
    pub malformed: usize,
}

/// Parses every peer record in `raw`.
///
/// Empty lines are skipped. Malformed lines are logged and counted but never
/// abort the parse.
pub fn parse_dump(raw: &str, options: DumpOptions) -> DumpReport {
    let skip = usize::from(options.skip_first_line);
    let mut report = DumpReport::default();

    for line in raw.split('\n').skip(skip) {
        if line.is_empty() {
            continue;
        }

        match parse_record(line) {
            Ok(stat) => report.stats.push(stat),
            Err(e) => {
                tracing::warn!(line = %line, error = %e, "skipping malformed record");
                report.malformed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "wg0\tcHJpdmF0ZQ==\tcHVibGlj\t51820\toff\n\
        wg0\tcGVlcjE=\t(none)\t203.0.113.5:51820\t10.0.0.2/32\t1700000000\t1000\t2000\t25\n\
        wg0\tcGVlcjI=\t(none)\t(none)\t10.0.0.3/32\t0\t0\t0\toff\n";

    #[test]
    fn test_interface_line_skipped() {
        let report = parse_dump(DUMP, DumpOptions::default());

        assert_eq!(report.stats.len(), 2);
        assert_eq!(report.malformed, 0);
        assert_eq!(report.stats[0].public_key, "cGVlcjE=");
        assert_eq!(report.stats[1].allowed_ips, "10.0.0.3/32");
    }

    #[test]
    fn test_first_line_kept_when_disabled() {
        let report = parse_dump(
            DUMP,
            DumpOptions {
                skip_first_line: false,
            },
        );

        // The interface summary line is then rejected on field count.
        assert_eq!(report.stats.len(), 2);
        assert_eq!(report.malformed, 1);
    }

    #[test]
    fn test_first_peer_lost_without_header() {
        let peers_only = DUMP.split_once('\n').unwrap().1;
        let report = parse_dump(peers_only, DumpOptions::default());

        assert_eq!(report.stats.len(), 1);
        assert_eq!(report.stats[0].public_key, "cGVlcjI=");
    }

    #[test]
    fn test_malformed_lines_counted() {
        let raw = "header\nwg0\tonly\tthree\n\nwg0\ta\tb\tc\td\t1\t2\t3\t4\n";
        let report = parse_dump(raw, DumpOptions::default());

        assert_eq!(report.stats.len(), 1);
        assert_eq!(report.malformed, 1);
    }

    #[test]
    fn test_empty_output() {
        assert_eq!(parse_dump("", DumpOptions::default()), DumpReport::default());
        assert_eq!(parse_dump("\n\n", DumpOptions::default()), DumpReport::default());
    }

    #[test]
    fn test_second_interface_summary_is_malformed() {
        let raw = format!("{DUMP}wg1\tcHJpdg==\tcHVi\t51821\toff\n");
        let report = parse_dump(&raw, DumpOptions::default());

        assert_eq!(report.stats.len(), 2);
        assert_eq!(report.malformed, 1);
    }
}
