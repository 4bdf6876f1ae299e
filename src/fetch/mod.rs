//! Retrieval of the raw WireGuard status dump.

mod command;

pub use command::{FetchError, StatusSource, StaticStatus, WgCommand};
