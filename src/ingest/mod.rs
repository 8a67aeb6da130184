//! Feed ingestion: turning fetched bytes into a normalized entry sequence.
//!
//! Handles RSS and Atom through feed-rs, JSON Feed through serde, and
//! retries malformed XML once after cleanup before giving up.

mod parser;
mod types;
mod util;

pub use self::parser::ingest;
pub use self::types::RawEntry;
pub use self::util::{cleanup_xml, is_valid_url, parse_date};
