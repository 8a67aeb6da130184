//! Title normalization, fingerprinting, and duplicate suppression.

use dashmap::DashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

/// Cleaned titles shorter than this are rejected by the pipeline.
pub const MIN_TITLE_CHARS: usize = 10;
/// How much of the lowercased title feeds the fingerprint.
const FINGERPRINT_CHARS: usize = 50;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("static regex"));
static BOILERPLATE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(Breaking|Update|News|Exclusive|Just In|Watch|Read)[:\s\-\[\]\|]+")
        .expect("static regex")
});
static BOILERPLATE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*[\-\|]\s*(Read More|Subscribe|Full Article).*$").expect("static regex")
});
static DOMAIN_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*[\-\|]\s*(\w+\.com|\w+\.org)$").expect("static regex"));
static HANDLEBARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\{\{.*?\}\}\s*").expect("static regex"));
static JS_TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\$\{.*?\}\s*").expect("static regex"));
static URL_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"%\w{2}").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Normalize a raw feed title: strip markup, boilerplate prefixes and
/// suffixes, template syntax, and URL-escape remnants.
pub fn clean_title(title: &str) -> String {
    if title.is_empty() {
        return String::new();
    }

    let title = HTML_TAG.replace_all(title, "");
    let title = html_escape::decode_html_entities(&title).to_string();
    let title = BOILERPLATE_PREFIX.replace(&title, "");
    let title = BOILERPLATE_SUFFIX.replace(&title, "");
    let title = DOMAIN_SUFFIX.replace(&title, "");
    let title = HANDLEBARS.replace_all(&title, " ");
    let title = JS_TEMPLATE.replace_all(&title, " ");
    let title = title.replace("%20", " ");
    let title = URL_ESCAPE.replace_all(&title, "");
    WHITESPACE.replace_all(&title, " ").trim().to_string()
}

/// Dedup key: Sha256 of the first 50 lowercased characters of the cleaned
/// title. Deterministic for case-insensitive near-duplicates.
pub fn fingerprint(cleaned_title: &str) -> String {
    let prefix: String = cleaned_title
        .to_lowercase()
        .chars()
        .take(FINGERPRINT_CHARS)
        .collect();
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Duplicate-suppression state for one aggregation run. Shared across the
/// per-feed tasks; each `insert_*` call is an atomic
/// membership-check-and-insert, so two tasks can never both admit the same
/// link or title.
#[derive(Default)]
pub struct SeenSets {
    links: DashSet<String>,
    fingerprints: DashSet<String>,
}

impl SeenSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if this link has not been seen before.
    pub fn insert_link(&self, link: &str) -> bool {
        self.links.insert(link.to_string())
    }

    /// True if this title fingerprint has not been seen before.
    pub fn insert_fingerprint(&self, fp: &str) -> bool {
        self.fingerprints.insert(fp.to_string())
    }

    /// Release a link claimed by an entry that was rejected after the link
    /// check. Only admitted entries keep their links; the link and
    /// fingerprint sets stay independent.
    pub fn remove_link(&self, link: &str) {
        self.links.remove(link);
    }
}
