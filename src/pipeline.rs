//! The aggregation pipeline: one task per feed, shared permit pool, shared
//! dedup state, and a final ranking pass.

use std::sync::Arc;

use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::dedupe::{clean_title, fingerprint, SeenSets, MIN_TITLE_CHARS};
use crate::error::IngestError;
use crate::extract::extract_body;
use crate::fetch::{decode_body, Fetch, FetchKind, MAX_RETRIES, RETRY_BASE_DELAY};
use crate::ingest::{ingest, is_valid_url, RawEntry};
use crate::rank::Prioritizer;
use crate::relevance::RelevanceScorer;
use crate::summarize::Summarize;
use crate::{FeedSource, NewsItem, TARGET_PIPELINE, TARGET_WEB_REQUEST};

/// Feed summaries are capped at this many characters on the item.
const MAX_SUMMARY_CHARS: usize = 500;

pub struct Aggregator {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetch>,
    cache: Arc<CacheStore>,
    summarizer: Arc<dyn Summarize>,
    scorer: Arc<RelevanceScorer>,
    prioritizer: Prioritizer,
}

impl Aggregator {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn Fetch>,
        cache: Arc<CacheStore>,
        summarizer: Arc<dyn Summarize>,
    ) -> Self {
        let scorer = Arc::new(RelevanceScorer::new(
            &config.ai_keywords,
            &config.exclude_keywords,
        ));
        let prioritizer = Prioritizer::new(&config.trusted_sources);
        Self {
            config: Arc::new(config),
            fetcher,
            cache,
            summarizer,
            scorer,
            prioritizer,
        }
    }

    /// Run one aggregation pass over every configured feed. Failing feeds
    /// contribute nothing; a run where every feed fails completes with an
    /// empty list.
    pub async fn run(&self) -> Vec<NewsItem> {
        let started = Instant::now();
        info!(
            target: TARGET_PIPELINE,
            "Starting aggregation over {} feeds",
            self.config.feeds.len()
        );

        let seen = Arc::new(SeenSets::new());
        let mut handles = Vec::new();

        for feed in self.config.feeds.clone() {
            let config = self.config.clone();
            let fetcher = self.fetcher.clone();
            let cache = self.cache.clone();
            let summarizer = self.summarizer.clone();
            let scorer = self.scorer.clone();
            let seen = seen.clone();

            handles.push(tokio::spawn(async move {
                collect_feed(feed, config, fetcher, cache, summarizer, scorer, seen).await
            }));
        }

        let mut all_items = Vec::new();
        let mut contributing = 0usize;
        for result in futures::future::join_all(handles).await {
            match result {
                Ok(items) => {
                    if !items.is_empty() {
                        contributing += 1;
                    }
                    all_items.extend(items);
                }
                Err(err) => {
                    error!(target: TARGET_PIPELINE, "Feed task join error: {}", err);
                }
            }
        }

        let ranked = self
            .prioritizer
            .rank(all_items, self.config.total_max_items);

        info!(
            target: TARGET_PIPELINE,
            "Aggregated {} items from {}/{} feeds in {:.2?}",
            ranked.len(),
            contributing,
            self.config.feeds.len(),
            started.elapsed()
        );

        ranked
    }
}

/// Fetch and process one feed, returning its surviving items (at most
/// `max_items_per_feed`).
async fn collect_feed(
    feed: FeedSource,
    config: Arc<Config>,
    fetcher: Arc<dyn Fetch>,
    cache: Arc<CacheStore>,
    summarizer: Arc<dyn Summarize>,
    scorer: Arc<RelevanceScorer>,
    seen: Arc<SeenSets>,
) -> Vec<NewsItem> {
    if !is_valid_url(&feed.url) {
        warn!(target: TARGET_PIPELINE, "Skipping feed {} with invalid URL: {}", feed.name, feed.url);
        return Vec::new();
    }

    let entries = match load_entries(&feed, &fetcher, &cache).await {
        Some(entries) => entries,
        None => return Vec::new(),
    };

    debug!(
        target: TARGET_PIPELINE,
        "Feed {} yielded {} entries",
        feed.name,
        entries.len()
    );

    let mut items = Vec::new();
    for entry in entries {
        if items.len() >= config.max_items_per_feed {
            break;
        }

        if let Some(item) =
            process_entry(entry, &feed, &config, &fetcher, &summarizer, &scorer, &seen).await
        {
            items.push(item);
        }
    }

    items
}

/// Load the feed document, preferring the cache, and parse it into
/// entries. An empty feed is retried with backoff; a malformed one is
/// terminal for this run.
async fn load_entries(
    feed: &FeedSource,
    fetcher: &Arc<dyn Fetch>,
    cache: &Arc<CacheStore>,
) -> Option<Vec<RawEntry>> {
    if let Some(payload) = cache.get(&feed.url) {
        match ingest(payload.as_bytes(), None) {
            Ok(entries) => return Some(entries),
            Err(err) => {
                warn!(target: TARGET_PIPELINE, "Cached document for {} unusable ({}); refetching", feed.name, err);
            }
        }
    }

    for attempt in 0..=MAX_RETRIES {
        if attempt > 0 {
            sleep(RETRY_BASE_DELAY * attempt as u32).await;
        }

        let body = match fetcher.fetch(&feed.url, FetchKind::Feed).await {
            Ok(body) => body,
            Err(err) => {
                // The fetcher already spent its own retry budget.
                error!(target: TARGET_WEB_REQUEST, "Feed {} failed: {}", feed.name, err);
                return None;
            }
        };

        match ingest(&body.bytes, body.content_type.as_deref()) {
            Ok(entries) => {
                cache.put(
                    &feed.url,
                    decode_body(&body.bytes, body.content_type.as_deref()),
                );
                return Some(entries);
            }
            Err(IngestError::Empty) => {
                warn!(
                    target: TARGET_PIPELINE,
                    "Empty feed from {} - attempt {}/{}",
                    feed.name,
                    attempt + 1,
                    MAX_RETRIES + 1
                );
            }
            Err(err @ IngestError::Malformed(_)) => {
                error!(target: TARGET_PIPELINE, "Feed {} unparseable: {}", feed.name, err);
                return None;
            }
        }
    }

    error!(target: TARGET_PIPELINE, "Feed {} stayed empty after retries", feed.name);
    None
}

/// Apply the per-entry gauntlet: link and title checks, relevance, dedup,
/// body extraction, and summarization.
async fn process_entry(
    entry: RawEntry,
    feed: &FeedSource,
    config: &Arc<Config>,
    fetcher: &Arc<dyn Fetch>,
    summarizer: &Arc<dyn Summarize>,
    scorer: &Arc<RelevanceScorer>,
    seen: &Arc<SeenSets>,
) -> Option<NewsItem> {
    let link = entry.link.as_deref().filter(|l| !l.is_empty())?.to_string();

    let title = clean_title(entry.title.as_deref().unwrap_or(""));
    if title.chars().count() < MIN_TITLE_CHARS {
        return None;
    }

    let (included, relevance_score) = scorer.score(&title, entry.summary.as_deref());
    if !included {
        debug!(target: TARGET_PIPELINE, "Dropping irrelevant entry: {}", title);
        return None;
    }

    // Atomic check-and-insert keeps concurrent feed tasks from admitting
    // the same link or near-duplicate title. A link claimed by an entry
    // that then loses the fingerprint check is released again; only
    // admitted entries keep their links.
    if !seen.insert_link(&link) {
        debug!(target: TARGET_PIPELINE, "Duplicate link dropped: {}", link);
        return None;
    }
    if !seen.insert_fingerprint(&fingerprint(&title)) {
        seen.remove_link(&link);
        debug!(target: TARGET_PIPELINE, "Duplicate title dropped: {}", title);
        return None;
    }

    let mut body = fetch_article_body(&link, fetcher).await;
    if body.is_empty() {
        if let Some(summary) = entry.summary.as_deref() {
            body = summary.to_string();
        }
    }

    let condensed_summary = summarizer.condense(&body).await;

    let summary = entry
        .summary
        .as_deref()
        .unwrap_or("")
        .chars()
        .take(MAX_SUMMARY_CHARS)
        .collect();

    Some(NewsItem {
        source_name: config.source_display_name(&link),
        title,
        original_link: link,
        published: entry.published,
        published_at: entry.published_at,
        feed_name: feed.name.clone(),
        summary,
        condensed_summary,
        relevance_score,
    })
}

/// Fetch an article page and extract its body text. Any failure degrades
/// to an empty string.
async fn fetch_article_body(url: &str, fetcher: &Arc<dyn Fetch>) -> String {
    if !is_valid_url(url) {
        return String::new();
    }

    match fetcher.fetch(url, FetchKind::Article).await {
        Ok(body) => {
            let html = decode_body(&body.bytes, body.content_type.as_deref());
            extract_body(&html)
        }
        Err(err) => {
            debug!(target: TARGET_WEB_REQUEST, "Article fetch for {} failed: {}", url, err);
            String::new()
        }
    }
}
