//! Parsing of `wg show all dump` output.
//!
//! The dump is split into lines, each peer line is validated against the
//! nine-column layout and its numeric columns are converted independently.
//! A bad column only drops that value; a bad line only drops that peer.

mod dump;
mod record;

pub use dump::{parse_dump, DumpOptions, DumpReport};
pub use record::{parse_record, FieldError, ParsedStat, RecordError, PEER_FIELD_COUNT};
