//! Feed parsing for RSS, Atom, and JSON Feed documents.

use std::io::Cursor;

use feed_rs::parser;
use tracing::{debug, warn};

use super::types::{JsonFeed, RawEntry};
use super::util::{cleanup_xml, parse_date};
use crate::error::IngestError;
use crate::fetch::decode_body;
use crate::TARGET_PIPELINE;

/// Parse a fetched feed document into entries, in document order.
///
/// A document that parses but yields neither entries nor feed-level
/// metadata is reported as [`IngestError::Empty`]; callers may retry it.
/// A document both parse attempts reject is [`IngestError::Malformed`] and
/// is not worth retrying.
pub fn ingest(bytes: &[u8], content_type: Option<&str>) -> Result<Vec<RawEntry>, IngestError> {
    let body = decode_body(bytes, content_type);

    let looks_like_json = content_type.map(|ct| ct.contains("json")).unwrap_or(false)
        || body.trim_start().starts_with('{');
    if looks_like_json {
        return ingest_json(&body);
    }

    match parser::parse(Cursor::new(body.as_bytes())) {
        Ok(feed) => collect_entries(feed),
        Err(first_err) => {
            let cleaned = cleanup_xml(&body);
            if !cleaned.contains("<rss") && !cleaned.contains("<feed") {
                return Err(IngestError::Malformed(format!(
                    "not an RSS or Atom document: {}",
                    first_err
                )));
            }

            match parser::parse(Cursor::new(cleaned.as_bytes())) {
                Ok(feed) => {
                    debug!(target: TARGET_PIPELINE, "Feed parsed after XML cleanup");
                    collect_entries(feed)
                }
                Err(second_err) => Err(IngestError::Malformed(format!(
                    "parse failed even after cleanup: {} / {}",
                    first_err, second_err
                ))),
            }
        }
    }
}

fn collect_entries(feed: feed_rs::model::Feed) -> Result<Vec<RawEntry>, IngestError> {
    if feed.entries.is_empty() && feed.title.is_none() {
        return Err(IngestError::Empty);
    }

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let published_at = entry.published.or(entry.updated);
            RawEntry {
                title: entry.title.map(|t| t.content),
                link: entry.links.first().map(|link| link.href.clone()),
                summary: entry
                    .summary
                    .map(|s| s.content)
                    .or(entry.content.and_then(|c| c.body)),
                published: published_at.map(|d| d.to_rfc3339()),
                published_at,
            }
        })
        .collect();

    Ok(entries)
}

fn ingest_json(body: &str) -> Result<Vec<RawEntry>, IngestError> {
    let feed: JsonFeed = serde_json::from_str(body)
        .map_err(|err| IngestError::Malformed(format!("invalid JSON feed: {}", err)))?;

    if feed.items.is_empty() && feed.title.is_none() {
        return Err(IngestError::Empty);
    }

    let entries = feed
        .items
        .into_iter()
        .map(|item| {
            let link = item.url.or(item.id);
            let published_at = item.date_published.as_deref().and_then(parse_date);
            if item.date_published.is_some() && published_at.is_none() {
                warn!(target: TARGET_PIPELINE, "Unparseable JSON feed date: {:?}", item.date_published);
            }
            RawEntry {
                title: item.title,
                link,
                summary: item.summary.or(item.content_text),
                published: item.date_published,
                published_at,
            }
        })
        .collect();

    Ok(entries)
}
