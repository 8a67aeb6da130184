//! Bounded-concurrency HTTP retrieval with timeout, retry, and backoff.
//!
//! One [`BoundedFetcher`] is shared across an aggregation run; its permit
//! pool caps in-flight requests for feed documents and article pages alike.

mod client;
mod fetcher;
mod util;

pub use self::client::create_http_client;
pub use self::fetcher::{BoundedFetcher, Fetch, FetchKind, FetchedBody};
pub use self::fetcher::{MAX_RETRIES, RETRY_BASE_DELAY, USER_AGENT};
pub use self::util::{decode_body, decompress_body};
