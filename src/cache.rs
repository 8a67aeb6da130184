//! Two-tier expiring cache for fetched feed documents.
//!
//! The in-memory tier is authoritative for freshness checks and is lost on
//! restart; the durable tier survives restarts behind the [`CacheBackend`]
//! seam. Expiry is wall-clock TTL compared at read time; there is no
//! background eviction, an expired entry is simply treated as absent and
//! overwritten by the next write.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use crate::TARGET_CACHE;

/// One durable-tier record. Must round-trip losslessly, including
/// non-ASCII payloads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheRecord {
    pub url: String,
    pub payload: String,
    pub expires_at: i64,
}

impl CacheRecord {
    fn is_fresh(&self, now: i64) -> bool {
        self.expires_at > now
    }
}

/// Durable second tier of the cache.
pub trait CacheBackend: Send + Sync {
    fn load(&self, key: &str) -> Option<CacheRecord>;
    fn store(&self, key: &str, record: &CacheRecord) -> Result<()>;
}

/// File-backed durable tier: one JSON file per cached URL.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl CacheBackend for FileBackend {
    fn load(&self, key: &str) -> Option<CacheRecord> {
        let path = self.path_for(key);
        let data = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&data) {
            Ok(record) => Some(record),
            Err(err) => {
                error!(target: TARGET_CACHE, "Unreadable cache file {}: {}", path.display(), err);
                None
            }
        }
    }

    fn store(&self, key: &str, record: &CacheRecord) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create cache dir {}", self.dir.display()))?;
        let path = self.path_for(key);
        let data = serde_json::to_string(record)?;
        fs::write(&path, data)
            .with_context(|| format!("failed to write cache file {}", path.display()))?;
        Ok(())
    }
}

/// Stable cache key: hex Sha256 of the URL.
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct CacheStore {
    memory: DashMap<String, CacheRecord>,
    backend: Arc<dyn CacheBackend>,
    ttl_secs: i64,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl_secs: u64) -> Self {
        Self {
            memory: DashMap::new(),
            backend,
            ttl_secs: ttl_secs as i64,
        }
    }

    /// Look up a cached payload, promoting a valid durable hit into the
    /// memory tier.
    pub fn get(&self, url: &str) -> Option<String> {
        let key = cache_key(url);
        let now = Utc::now().timestamp();

        if let Some(entry) = self.memory.get(&key) {
            if entry.is_fresh(now) {
                debug!(target: TARGET_CACHE, "Memory cache hit for {}", url);
                return Some(entry.payload.clone());
            }
        }

        if let Some(record) = self.backend.load(&key) {
            if record.is_fresh(now) {
                debug!(target: TARGET_CACHE, "Durable cache hit for {}", url);
                let payload = record.payload.clone();
                self.memory.insert(key, record);
                return Some(payload);
            }
        }

        None
    }

    /// Write a payload to both tiers. Durable-tier failures are logged and
    /// non-fatal; the cache stays best-effort.
    pub fn put(&self, url: &str, payload: String) {
        let key = cache_key(url);
        let record = CacheRecord {
            url: url.to_string(),
            payload,
            expires_at: Utc::now().timestamp() + self.ttl_secs,
        };

        if let Err(err) = self.backend.store(&key, &record) {
            error!(target: TARGET_CACHE, "Failed to write cache record for {}: {}", url, err);
        }
        self.memory.insert(key, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_store(dir: &TempDir, ttl_secs: u64) -> CacheStore {
        CacheStore::new(Arc::new(FileBackend::new(dir.path().to_path_buf())), ttl_secs)
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir, 1800);

        store.put("https://example.com/feed", "<rss>payload</rss>".to_string());
        assert_eq!(
            store.get("https://example.com/feed").as_deref(),
            Some("<rss>payload</rss>")
        );
    }

    #[test]
    fn test_round_trip_non_ascii() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir, 1800);

        let payload = "제목: AI 뉴스 — résumé ✓".to_string();
        store.put("https://example.com/feed", payload.clone());

        // Force a durable read by using a fresh store over the same files.
        let fresh = file_store(&dir, 1800);
        assert_eq!(fresh.get("https://example.com/feed"), Some(payload));
    }

    #[test]
    fn test_expired_entry_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir, 0);

        store.put("https://example.com/feed", "stale".to_string());
        assert_eq!(store.get("https://example.com/feed"), None);
    }

    #[test]
    fn test_durable_promotion() {
        let dir = TempDir::new().unwrap();
        let writer = file_store(&dir, 1800);
        writer.put("https://example.com/feed", "durable".to_string());

        let reader = file_store(&dir, 1800);
        assert!(reader.memory.is_empty());
        assert_eq!(reader.get("https://example.com/feed").as_deref(), Some("durable"));
        // Promoted into the memory tier.
        assert_eq!(reader.memory.len(), 1);
    }

    #[test]
    fn test_durable_write_failure_is_non_fatal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"occupied").unwrap();

        let store = CacheStore::new(Arc::new(FileBackend::new(blocker)), 1800);
        store.put("https://example.com/feed", "memory only".to_string());
        assert_eq!(
            store.get("https://example.com/feed").as_deref(),
            Some("memory only")
        );
    }

    #[test]
    fn test_cache_key_is_stable() {
        assert_eq!(cache_key("https://a.example"), cache_key("https://a.example"));
        assert_ne!(cache_key("https://a.example"), cache_key("https://b.example"));
    }
}
