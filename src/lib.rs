pub mod cache;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod ingest;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod rank;
pub mod relevance;
pub mod summarize;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_CACHE: &str = "cache";
pub const TARGET_PIPELINE: &str = "pipeline";

/// One configured syndication endpoint.
#[derive(Clone, Debug, serde::Deserialize, Serialize, PartialEq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

/// A surviving, scored entry ready for the output boundary.
#[derive(Clone, Debug, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub original_link: String,
    pub source_name: String,
    pub published: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub feed_name: String,
    pub summary: String,
    pub condensed_summary: String,
    pub relevance_score: f64,
}
