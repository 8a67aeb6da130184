use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use vedette::cache::{CacheStore, FileBackend};
use vedette::config::Config;
use vedette::fetch::{BoundedFetcher, Fetch};
use vedette::logging::configure_logging;
use vedette::output::{render, write_to_file, OutputFormat};
use vedette::pipeline::Aggregator;
use vedette::summarize::{HttpSummarizer, StubSummarizer, Summarize};
use vedette::TARGET_PIPELINE;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser)]
#[clap(
    name = "vedette",
    about = "Aggregate and rank AI news from RSS feeds",
    version = VERSION
)]
struct Cli {
    /// Maximum items to keep per feed
    #[clap(long)]
    max_per_feed: Option<usize>,

    /// Maximum items in the final digest
    #[clap(long)]
    max_total: Option<usize>,

    /// Output format: console, json, or markdown
    #[clap(short, long, default_value = "console")]
    output: OutputFormat,

    /// Write the rendered digest to this file instead of stdout
    #[clap(short, long)]
    file: Option<PathBuf>,

    /// Directory for the durable response cache
    #[clap(long)]
    cache_dir: Option<PathBuf>,

    /// JSON file mapping feed names to URLs, merged over the built-in list
    #[clap(long)]
    feeds_file: Option<PathBuf>,

    /// Log level for stdout (trace, debug, info, warn, error)
    #[clap(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    configure_logging(&cli.log_level);

    let mut config = Config::default();
    if let Some(path) = &cli.feeds_file {
        config.merge_feeds_file(path)?;
    }
    if let Some(max) = cli.max_per_feed {
        config.max_items_per_feed = max;
    }
    if let Some(max) = cli.max_total {
        config.total_max_items = max;
    }
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = dir.clone();
    }
    if config.summarizer_api_key.is_none() {
        config.summarizer_api_key = std::env::var("SUMMARIZER_API_KEY").ok();
    }

    let fetcher: Arc<dyn Fetch> = Arc::new(BoundedFetcher::new(config.max_concurrent_requests)?);
    let cache = Arc::new(CacheStore::new(
        Arc::new(FileBackend::new(config.cache_dir.clone())),
        config.cache_ttl_secs,
    ));

    let summarizer: Arc<dyn Summarize> = match &config.summarizer_api_key {
        Some(key) => Arc::new(HttpSummarizer::new(
            config.summarizer_base_url.clone(),
            key.clone(),
            config.summarizer_model.clone(),
        )?),
        None => {
            info!(target: TARGET_PIPELINE, "No summarizer API key set; summaries are stubbed");
            Arc::new(StubSummarizer)
        }
    };

    let output = cli.output;
    let aggregator = Aggregator::new(config, fetcher, cache, summarizer);
    let items = aggregator.run().await;

    let rendered = render(&items, output)?;
    match &cli.file {
        Some(path) => {
            write_to_file(path, &rendered)?;
            info!(target: TARGET_PIPELINE, "Digest written to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
