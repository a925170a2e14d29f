//! Track resolution: candidate -> catalog identifier -> playable URL
//!
//! Each candidate goes through two catalog calls, memoized through
//! [`CatalogCache`]. Per-candidate failures are logged and skipped so one
//! bad lookup never aborts a batch.
//!
//! Policy: only fully-resolved tracks (identifier AND playable URL) are
//! returned, on the single-track path as well as the batch path.

use crate::cache::CatalogCache;
use crate::client::CatalogApi;
use crate::models::{ResolvedTrack, TrackCandidate};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves parsed candidates against the music catalog
#[derive(Clone)]
pub struct TrackResolver {
    api: Arc<dyn CatalogApi>,
    cache: CatalogCache,
}

impl TrackResolver {
    pub fn new(api: Arc<dyn CatalogApi>, cache: CatalogCache) -> Self {
        Self { api, cache }
    }

    /// Shared cache handle (for the monitoring endpoint)
    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Resolves a single (artist, title) pair.
    ///
    /// Returns `None` when the search finds no track or the URL lookup
    /// yields no playable URL; both cases are logged, never propagated.
    pub async fn resolve_one(&self, artist: &str, title: &str) -> Option<ResolvedTrack> {
        let track_id = self.search_first_id(artist, title).await?;
        let play_url = match self.lookup_url(&track_id).await {
            Some(url) => url,
            None => {
                debug!(artist, title, track_id, "No playable URL, dropping candidate");
                return None;
            }
        };

        Some(ResolvedTrack {
            artist: artist.to_string(),
            title: title.to_string(),
            track_id,
            play_url,
        })
    }

    /// Resolves at most `limit` candidates, in input order.
    ///
    /// Candidates beyond `limit` are skipped. A failing candidate
    /// contributes nothing and processing continues with the next one, so
    /// the result preserves the relative order of the successes.
    pub async fn resolve_batch(
        &self,
        candidates: &[TrackCandidate],
        limit: usize,
    ) -> Vec<ResolvedTrack> {
        let mut resolved = Vec::new();

        for candidate in candidates.iter().take(limit) {
            match self.resolve_one(&candidate.artist, &candidate.title).await {
                Some(track) => resolved.push(track),
                None => {
                    warn!(
                        artist = %candidate.artist,
                        title = %candidate.title,
                        "Failed to resolve candidate, continuing with the next one"
                    );
                }
            }
        }

        resolved
    }

    /// First search hit for `artist title`, memoized
    async fn search_first_id(&self, artist: &str, title: &str) -> Option<String> {
        let key = CatalogCache::search_key(artist, title, 1);

        if let Some(ids) = self.cache.get_search(&key).await {
            return ids.first().cloned();
        }

        match self.api.search_track_ids(artist, title, 1).await {
            Ok(ids) => {
                // Empty results are cached too: a question repeating an
                // unknown song should not hammer the search endpoint.
                self.cache.put_search(key, ids.clone()).await;
                ids.into_iter().next()
            }
            Err(e) => {
                warn!(artist, title, "Catalog search failed: {}", e);
                None
            }
        }
    }

    /// Playable URL for a track id, memoized
    async fn lookup_url(&self, track_id: &str) -> Option<String> {
        if let Some(url) = self.cache.get_url(track_id).await {
            return Some(url);
        }

        match self.api.song_url(track_id).await {
            Ok(Some(url)) => {
                self.cache.put_url(track_id.to_string(), url.clone()).await;
                Some(url)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(track_id, "URL lookup failed: {}", e);
                None
            }
        }
    }
}
