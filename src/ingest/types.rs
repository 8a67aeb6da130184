//! Type definitions for the ingest module.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One feed entry as the ingestor saw it, before cleaning, dedup, and
/// scoring. Ephemeral; consumed immediately by the pipeline.
#[derive(Clone, Debug, Default)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    /// The publish date as the feed carried it.
    pub published: Option<String>,
    /// The publish date parsed to UTC, when any of the known formats match.
    pub published_at: Option<DateTime<Utc>>,
}

/// JSON Feed document shape (the subset this crate consumes).
#[derive(Debug, Deserialize)]
pub struct JsonFeed {
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<JsonFeedItem>,
}

#[derive(Debug, Deserialize)]
pub struct JsonFeedItem {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content_text: Option<String>,
    pub date_published: Option<String>,
}
