//! In-memory memoization caches for catalog lookups
//!
//! Repeated questions tend to produce the same (artist, title) pairs, so
//! search results and playable URLs are memoized in bounded, time-expiring
//! caches shared by all in-flight requests.

use moka::future::Cache as MokaCache;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Separator for composite cache keys; never appears in artist/title text
const KEY_SEPARATOR: char = '\u{1}';

/// Sizing and expiry settings for [`CatalogCache`]
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Max entries in the search cache
    pub search_capacity: u64,
    /// Search entries expire this long after write
    pub search_ttl: Duration,
    /// Search entries also expire this long after last access
    pub search_tti: Duration,
    /// Max entries in the URL cache
    pub url_capacity: u64,
    /// URL entries expire this long after write
    pub url_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            search_capacity: 1000,
            search_ttl: Duration::from_secs(86_400),
            search_tti: Duration::from_secs(21_600),
            url_capacity: 500,
            url_ttl: Duration::from_secs(1_800),
        }
    }
}

/// Snapshot of cache statistics for the monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CatalogCacheStats {
    pub search_entries: u64,
    pub search_hits: u64,
    pub search_misses: u64,
    pub url_entries: u64,
    pub url_hits: u64,
    pub url_misses: u64,
}

/// Shared memoization cache for catalog search results and playable URLs
///
/// Cheap to clone; all clones share the same underlying caches and counters.
#[derive(Clone)]
pub struct CatalogCache {
    searches: Arc<MokaCache<String, Vec<String>>>,
    urls: Arc<MokaCache<String, String>>,
    search_hits: Arc<AtomicU64>,
    search_misses: Arc<AtomicU64>,
    url_hits: Arc<AtomicU64>,
    url_misses: Arc<AtomicU64>,
}

impl CatalogCache {
    /// Creates a cache with the default settings
    pub fn new() -> Self {
        Self::with_settings(CacheSettings::default())
    }

    /// Creates a cache with explicit settings
    pub fn with_settings(settings: CacheSettings) -> Self {
        Self {
            searches: Arc::new(
                MokaCache::builder()
                    .max_capacity(settings.search_capacity)
                    .time_to_live(settings.search_ttl)
                    .time_to_idle(settings.search_tti)
                    .build(),
            ),
            urls: Arc::new(
                MokaCache::builder()
                    .max_capacity(settings.url_capacity)
                    .time_to_live(settings.url_ttl)
                    .build(),
            ),
            search_hits: Arc::new(AtomicU64::new(0)),
            search_misses: Arc::new(AtomicU64::new(0)),
            url_hits: Arc::new(AtomicU64::new(0)),
            url_misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Composite key for a search query
    pub fn search_key(artist: &str, title: &str, limit: usize) -> String {
        format!("{artist}{KEY_SEPARATOR}{title}{KEY_SEPARATOR}{limit}")
    }

    /// Returns the memoized track ids for a search key, counting hit/miss
    pub async fn get_search(&self, key: &str) -> Option<Vec<String>> {
        match self.searches.get(key).await {
            Some(ids) => {
                self.search_hits.fetch_add(1, Ordering::Relaxed);
                Some(ids)
            }
            None => {
                self.search_misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub async fn put_search(&self, key: String, ids: Vec<String>) {
        self.searches.insert(key, ids).await;
    }

    /// Returns the memoized playable URL for a track id, counting hit/miss
    pub async fn get_url(&self, track_id: &str) -> Option<String> {
        match self.urls.get(track_id).await {
            Some(url) => {
                self.url_hits.fetch_add(1, Ordering::Relaxed);
                Some(url)
            }
            None => {
                self.url_misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub async fn put_url(&self, track_id: String, url: String) {
        self.urls.insert(track_id, url).await;
    }

    /// Statistics snapshot
    pub fn stats(&self) -> CatalogCacheStats {
        CatalogCacheStats {
            search_entries: self.searches.entry_count(),
            search_hits: self.search_hits.load(Ordering::Relaxed),
            search_misses: self.search_misses.load(Ordering::Relaxed),
            url_entries: self.urls.entry_count(),
            url_hits: self.url_hits.load(Ordering::Relaxed),
            url_misses: self.url_misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_roundtrip_and_counters() {
        let cache = CatalogCache::new();
        let key = CatalogCache::search_key("王菲", "岁月如歌", 1);

        assert!(cache.get_search(&key).await.is_none());
        cache.put_search(key.clone(), vec!["186016".to_string()]).await;
        assert_eq!(
            cache.get_search(&key).await,
            Some(vec!["186016".to_string()])
        );

        let stats = cache.stats();
        assert_eq!(stats.search_hits, 1);
        assert_eq!(stats.search_misses, 1);
    }

    #[tokio::test]
    async fn url_roundtrip() {
        let cache = CatalogCache::new();
        assert!(cache.get_url("186016").await.is_none());
        cache
            .put_url("186016".to_string(), "https://example.com/a.flac".to_string())
            .await;
        assert_eq!(
            cache.get_url("186016").await,
            Some("https://example.com/a.flac".to_string())
        );
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = CatalogCache::with_settings(CacheSettings {
            search_capacity: 10,
            search_ttl: Duration::from_millis(50),
            search_tti: Duration::from_millis(50),
            url_capacity: 10,
            url_ttl: Duration::from_millis(50),
        });
        let key = CatalogCache::search_key("a", "b", 1);
        cache.put_search(key.clone(), vec!["1".to_string()]).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get_search(&key).await.is_none());
    }

    #[test]
    fn keys_distinguish_limit() {
        assert_ne!(
            CatalogCache::search_key("a", "b", 1),
            CatalogCache::search_key("a", "b", 2)
        );
    }
}
