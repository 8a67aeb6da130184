//! The bounded fetcher: a shared permit pool, per-kind total timeouts, and
//! a linear-backoff retry loop.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

use super::client::create_http_client;
use super::util::decompress_body;
use crate::error::FetchError;
use crate::TARGET_WEB_REQUEST;

/// Additional attempts after the first failure.
pub const MAX_RETRIES: usize = 3;
pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const FEED_TIMEOUT: Duration = Duration::from_secs(15);
const ARTICLE_TIMEOUT: Duration = Duration::from_secs(10);

/// What kind of resource is being fetched; articles get a tighter total
/// timeout than feed documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchKind {
    Feed,
    Article,
}

impl FetchKind {
    pub fn total_timeout(&self) -> Duration {
        match self {
            FetchKind::Feed => FEED_TIMEOUT,
            FetchKind::Article => ARTICLE_TIMEOUT,
        }
    }

    fn accept_header(&self) -> &'static str {
        match self {
            FetchKind::Feed => {
                "application/feed+json, application/json, application/rss+xml, application/atom+xml, application/xml, text/xml, */*;q=0.9"
            }
            FetchKind::Article => {
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
            }
        }
    }
}

/// A fetched body plus the Content-Type the server claimed for it.
#[derive(Clone, Debug)]
pub struct FetchedBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Retrieval seam: the pipeline talks to this trait, so tests can swap in
/// an in-memory fake.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, kind: FetchKind) -> Result<FetchedBody, FetchError>;
}

pub struct BoundedFetcher {
    client: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl BoundedFetcher {
    pub fn new(max_concurrent: usize) -> anyhow::Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        })
    }

    async fn attempt(&self, url: &str, kind: FetchKind) -> Result<FetchedBody, FetchError> {
        let request = async {
            let response = self
                .client
                .get(url)
                .header(header::USER_AGENT, USER_AGENT)
                .header(header::ACCEPT, kind.accept_header())
                .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
                .send()
                .await
                .map_err(FetchError::from)?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|ct| ct.to_str().ok())
                .map(|s| s.to_lowercase());

            let content_encoding = response
                .headers()
                .get(header::CONTENT_ENCODING)
                .and_then(|ce| ce.to_str().ok())
                .map(|s| s.to_lowercase());

            let bytes = response.bytes().await.map_err(FetchError::from)?;
            let bytes = decompress_body(&bytes, content_encoding.as_deref(), url);

            Ok(FetchedBody {
                bytes,
                content_type,
            })
        };

        match timeout(kind.total_timeout(), request).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }
}

#[async_trait]
impl Fetch for BoundedFetcher {
    /// Fetch a resource, holding one permit for the whole retry loop.
    /// Returns the last observed error once the attempt budget is spent;
    /// callers treat that as "no data for this resource" and move on.
    async fn fetch(&self, url: &str, kind: FetchKind) -> Result<FetchedBody, FetchError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FetchError::Network("permit pool closed".to_string()))?;

        let mut last_error = FetchError::Network("no attempts made".to_string());

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                sleep(RETRY_BASE_DELAY * attempt as u32).await;
            }

            debug!(
                target: TARGET_WEB_REQUEST,
                "Fetching {} ({:?}) - attempt {}/{}",
                url,
                kind,
                attempt + 1,
                MAX_RETRIES + 1
            );

            match self.attempt(url, kind).await {
                Ok(body) => {
                    debug!(target: TARGET_WEB_REQUEST, "Fetched {} ({} bytes)", url, body.bytes.len());
                    return Ok(body);
                }
                Err(err) => {
                    warn!(
                        target: TARGET_WEB_REQUEST,
                        "Attempt {}/{} for {} failed: {}",
                        attempt + 1,
                        MAX_RETRIES + 1,
                        url,
                        err
                    );
                    last_error = err;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves the same canned HTTP response to every connection and counts
    /// how many arrive. Connections are closed after one response, so each
    /// fetch attempt shows up as one hit.
    async fn canned_server(response: &'static [u8]) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let server_hits = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                server_hits.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf).await;
                let _ = stream.write_all(response).await;
            }
        });

        (format!("http://{}/feed", addr), hits)
    }

    #[tokio::test]
    async fn test_server_errors_consume_all_attempts() {
        let (url, hits) = canned_server(
            b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;

        let fetcher = BoundedFetcher::new(1).unwrap();
        let err = fetcher.fetch(&url, FetchKind::Article).await.unwrap_err();

        assert!(matches!(err, FetchError::Status(503)));
        assert_eq!(hits.load(Ordering::SeqCst), MAX_RETRIES + 1);
    }

    #[tokio::test]
    async fn test_success_stops_the_retry_loop() {
        let (url, hits) = canned_server(
            b"HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok",
        )
        .await;

        let fetcher = BoundedFetcher::new(1).unwrap();
        let body = fetcher.fetch(&url, FetchKind::Article).await.unwrap();

        assert_eq!(body.bytes, b"ok");
        assert_eq!(body.content_type.as_deref(), Some("text/plain"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_timeouts_per_kind() {
        assert_eq!(FetchKind::Feed.total_timeout(), Duration::from_secs(15));
        assert_eq!(FetchKind::Article.total_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_accept_headers_differ() {
        assert!(FetchKind::Feed.accept_header().contains("application/rss+xml"));
        assert!(FetchKind::Article.accept_header().starts_with("text/html"));
    }
}
