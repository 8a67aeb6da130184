//! Injected configuration for one aggregation run.
//!
//! All tunables live here and are passed explicitly to the components that
//! need them; there are no ambient globals. The built-in defaults mirror the
//! curated AI-news feed list and keyword sets, and the CLI can extend the
//! feed list from a JSON file of `{"name": "url"}` pairs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::FeedSource;

pub const DEFAULT_MAX_ITEMS_PER_FEED: usize = 5;
pub const DEFAULT_TOTAL_MAX_ITEMS: usize = 30;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 1800;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;

#[derive(Clone, Debug)]
pub struct Config {
    pub feeds: Vec<FeedSource>,
    pub ai_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    /// Hostname substring -> display name, checked in order.
    pub source_names: Vec<(String, String)>,
    /// Source-name substrings granting the trusted-source ranking bonus.
    pub trusted_sources: Vec<String>,
    pub max_items_per_feed: usize,
    pub total_max_items: usize,
    pub cache_dir: PathBuf,
    pub cache_ttl_secs: u64,
    pub max_concurrent_requests: usize,
    /// OpenAI-compatible endpoint for the text-transform collaborator.
    /// No API key means the stub summarizer is used instead.
    pub summarizer_api_key: Option<String>,
    pub summarizer_base_url: String,
    pub summarizer_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            feeds: default_feeds(),
            ai_keywords: to_strings(&[
                "ai",
                "artificial intelligence",
                "machine learning",
                "deep learning",
                "neural network",
                "nlp",
                "natural language",
                "computer vision",
                "ml",
                "generative ai",
                "llm",
                "gpt",
                "chatgpt",
                "gemini",
                "claude",
                "stable diffusion",
                "dall-e",
                "midjourney",
                "anthropic",
                "openai",
                "ml ops",
                "mlops",
                "rag",
                "retrieval",
                "embedding",
                "transformer",
                "fine-tuning",
                "fine tune",
                "inference",
                "data science",
                "prompt",
            ]),
            exclude_keywords: to_strings(&[
                "sponsor",
                "sponsored",
                "advertisement",
                "promoción",
                "webinar",
                "register now",
                "limited time",
                "discount",
            ]),
            source_names: default_source_names(),
            trusted_sources: to_strings(&[
                "google",
                "openai",
                "anthropic",
                "deepmind",
                "microsoft",
                "mit",
                "ieee",
                "arxiv",
            ]),
            max_items_per_feed: DEFAULT_MAX_ITEMS_PER_FEED,
            total_max_items: DEFAULT_TOTAL_MAX_ITEMS,
            cache_dir: PathBuf::from("cache"),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            summarizer_api_key: None,
            summarizer_base_url: "https://api.openai.com/v1".to_string(),
            summarizer_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    /// Merge extra feeds from a JSON file of name -> URL pairs. Names that
    /// collide with configured feeds replace them.
    pub fn merge_feeds_file(&mut self, path: &Path) -> Result<usize> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read feeds file {}", path.display()))?;
        let extra: BTreeMap<String, String> = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse feeds file {}", path.display()))?;

        let count = extra.len();
        for (name, url) in extra {
            if let Some(existing) = self.feeds.iter_mut().find(|f| f.name == name) {
                existing.url = url;
            } else {
                self.feeds.push(FeedSource { name, url });
            }
        }
        Ok(count)
    }

    /// Resolve a display name for an article URL from the hostname mapping.
    pub fn source_display_name(&self, url: &str) -> String {
        if let Ok(parsed) = url::Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                for (needle, name) in &self.source_names {
                    if host.contains(needle.as_str()) {
                        return name.clone();
                    }
                }
                let trimmed = host.trim_start_matches("www.");
                if let Some(label) = trimmed.split('.').next() {
                    if !label.is_empty() {
                        let mut chars = label.chars();
                        if let Some(first) = chars.next() {
                            return first.to_uppercase().chain(chars).collect();
                        }
                    }
                }
            }
        }
        "Unknown Source".to_string()
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_feeds() -> Vec<FeedSource> {
    [
        (
            "Google AI Blog",
            "https://blog.research.google/feeds/posts/default/-/artificial%20intelligence",
        ),
        (
            "MIT Technology Review (AI)",
            "https://www.technologyreview.com/c/artificial-intelligence/feed/",
        ),
        ("VentureBeat AI", "https://feeds.feedburner.com/venturebeat/SZYF"),
        ("Ars Technica (AI)", "https://arstechnica.com/tag/ai/feed/"),
        (
            "IEEE Spectrum AI",
            "https://spectrum.ieee.org/topic/artificial-intelligence/feed/",
        ),
        ("AI Trends", "https://aitrends.com/feed/"),
        ("Unite.AI", "https://www.unite.ai/feed/"),
        ("The AI Journal", "https://aijourn.com/feed/"),
        ("AI Business", "https://aibusiness.com/feed/"),
        (
            "Analytics Insight",
            "https://www.analyticsinsight.net/category/latest-news/artificial-intelligence/feed/",
        ),
        ("KDnuggets", "https://www.kdnuggets.com/feed"),
        ("Towards Data Science", "https://towardsdatascience.com/feed"),
        ("Analytics Vidhya", "https://medium.com/feed/analytics-vidhya"),
        ("OpenAI Blog", "https://openai.com/blog/rss/"),
        ("DeepMind Blog", "https://deepmind.com/blog/feed/basic/"),
    ]
    .iter()
    .map(|(name, url)| FeedSource {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}

fn default_source_names() -> Vec<(String, String)> {
    [
        ("blog.research.google", "Google AI Blog"),
        ("www.technologyreview.com", "MIT Tech Review"),
        ("venturebeat.com", "VentureBeat"),
        ("arstechnica.com", "Ars Technica"),
        ("www.zdnet.com", "ZDNet"),
        ("www.anthropic.com", "Anthropic"),
        ("stability.ai", "Stability AI"),
        ("blog.google", "Google Blog"),
        ("spectrum.ieee.org", "IEEE Spectrum"),
        ("aitrends.com", "AI Trends"),
        ("www.unite.ai", "Unite.AI"),
        ("aijourn.com", "The AI Journal"),
        ("aibusiness.com", "AI Business"),
        ("www.analyticsinsight.net", "Analytics Insight"),
        ("www.kdnuggets.com", "KDnuggets"),
        ("towardsdatascience.com", "Towards Data Science"),
        ("medium.com", "Medium"),
        ("openai.com", "OpenAI"),
        ("deepmind.com", "DeepMind"),
    ]
    .iter()
    .map(|(host, name)| (host.to_string(), name.to_string()))
    .collect()
}
