//! Utility functions for feed ingestion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Hostname-bearing http(s) URLs only.
pub fn is_valid_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.scheme() == "http" || parsed.scheme() == "https",
        Err(_) => false,
    }
}

/// Parse a date string in the formats feeds actually use.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(date_str) {
        return Some(date.with_timezone(&Utc));
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(date_str) {
        return Some(date.with_timezone(&Utc));
    }

    if let Ok(date) = DateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(date.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    None
}

const ENTITY_FIXES: &[(&str, &str)] = &[
    ("&nbsp;", "&#160;"),
    ("&ndash;", "&#8211;"),
    ("&mdash;", "&#8212;"),
    ("&rsquo;", "&#8217;"),
    ("&lsquo;", "&#8216;"),
    ("&rdquo;", "&#8221;"),
    ("&ldquo;", "&#8220;"),
    ("&amp;amp;", "&amp;"),
    ("&apos;", "&#39;"),
];

/// Clean up malformed XML enough for a second parse attempt: strip the BOM
/// and any leading junk before the document, replace entities XML parsers
/// reject, and drop characters outside the XML character range.
pub fn cleanup_xml(xml: &str) -> String {
    let mut cleaned = xml.trim().trim_start_matches('\u{FEFF}').to_string();

    for marker in ["<?xml", "<rss", "<feed"] {
        if let Some(start) = cleaned.find(marker) {
            cleaned = cleaned[start..].to_string();
            break;
        }
    }

    for (entity, replacement) in ENTITY_FIXES {
        cleaned = cleaned.replace(entity, replacement);
    }

    cleaned = cleaned
        .chars()
        .filter(|&c| {
            matches!(c,
                '\u{0009}' | '\u{000A}' | '\u{000D}' |
                '\u{0020}'..='\u{D7FF}' |
                '\u{E000}'..='\u{FFFD}' |
                '\u{10000}'..='\u{10FFFF}'
            )
        })
        .collect();

    if !cleaned.starts_with("<?xml") {
        cleaned = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", cleaned);
    }

    cleaned
}
