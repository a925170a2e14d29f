//! Short-window duplicate request suppression
//!
//! A request is fingerprinted by who sent it and what it asks for. A
//! second request with the same fingerprint inside the window is reported
//! as a duplicate without refreshing the stored timestamp, so a client
//! hammering the endpoint becomes eligible again as soon as the first
//! request ages out.

use md5::{Digest, Md5};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Suppression window: identical requests inside it are duplicates (5 s)
pub const DEFAULT_WINDOW_MS: u64 = 5_000;

/// How often expired fingerprints are swept out (60 s)
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 60_000;

/// Outcome of a duplicate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupDecision {
    Fresh,
    Duplicate,
}

/// Counters exposed on the monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct DedupStats {
    pub total_requests: u64,
    pub duplicate_requests: u64,
    pub tracked_fingerprints: usize,
}

/// Tracks recent request fingerprints
pub struct RequestDeduplicator {
    entries: Mutex<HashMap<String, u64>>,
    last_sweep_ms: AtomicU64,
    total_requests: AtomicU64,
    duplicate_requests: AtomicU64,
    window_ms: u64,
    sweep_interval_ms: u64,
}

impl RequestDeduplicator {
    pub fn new(window_ms: u64, sweep_interval_ms: u64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            last_sweep_ms: AtomicU64::new(0),
            total_requests: AtomicU64::new(0),
            duplicate_requests: AtomicU64::new(0),
            window_ms,
            sweep_interval_ms,
        }
    }

    /// Hex MD5 over the request identity: sender plus normalized question
    /// and preferences
    pub fn fingerprint(
        client_ip: &str,
        question: &str,
        music_count: usize,
        genres: &[String],
        regions: &[String],
    ) -> String {
        let data = format!(
            "{}:{}:{}:{}:{}",
            client_ip,
            question,
            music_count,
            genres.join(","),
            regions.join(","),
        );
        let mut hasher = Md5::new();
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Records the fingerprint and reports whether it was seen within the
    /// suppression window
    pub fn check(&self, fingerprint: &str) -> DedupDecision {
        self.check_at(fingerprint, now_ms())
    }

    /// Clock-injected variant of [`check`](Self::check)
    pub fn check_at(&self, fingerprint: &str, now_ms: u64) -> DedupDecision {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        {
            let mut entries = self.entries.lock().unwrap();
            if let Some(&seen_ms) = entries.get(fingerprint) {
                if now_ms.saturating_sub(seen_ms) < self.window_ms {
                    self.duplicate_requests.fetch_add(1, Ordering::Relaxed);
                    return DedupDecision::Duplicate;
                }
            }
            entries.insert(fingerprint.to_string(), now_ms);
        }

        self.sweep_at(now_ms);
        DedupDecision::Fresh
    }

    /// Drops fingerprints older than the window, at most once per sweep
    /// interval. The compare-exchange makes one caller do the work while
    /// concurrent callers skip it.
    fn sweep_at(&self, now_ms: u64) {
        let last = self.last_sweep_ms.load(Ordering::Relaxed);
        if now_ms.saturating_sub(last) < self.sweep_interval_ms {
            return;
        }
        if self
            .last_sweep_ms
            .compare_exchange(last, now_ms, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, &mut seen_ms| now_ms.saturating_sub(seen_ms) < self.window_ms);
        debug!(
            removed = before - entries.len(),
            remaining = entries.len(),
            "Swept expired request fingerprints"
        );
    }

    pub fn stats(&self) -> DedupStats {
        DedupStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            duplicate_requests: self.duplicate_requests.load(Ordering::Relaxed),
            tracked_fingerprints: self.entries.lock().unwrap().len(),
        }
    }
}

impl Default for RequestDeduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS, DEFAULT_SWEEP_INTERVAL_MS)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive() {
        let genres = tags(&["pop"]);
        let regions = tags(&["china"]);
        let a = RequestDeduplicator::fingerprint("1.2.3.4", "最近心情不好", 10, &genres, &regions);
        let b = RequestDeduplicator::fingerprint("1.2.3.4", "最近心情不好", 10, &genres, &regions);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);

        let other_ip =
            RequestDeduplicator::fingerprint("5.6.7.8", "最近心情不好", 10, &genres, &regions);
        assert_ne!(a, other_ip);
        let other_count =
            RequestDeduplicator::fingerprint("1.2.3.4", "最近心情不好", 5, &genres, &regions);
        assert_ne!(a, other_count);
    }

    #[test]
    fn duplicate_within_window() {
        let dedup = RequestDeduplicator::new(5_000, 60_000);
        assert_eq!(dedup.check_at("fp", 1_000), DedupDecision::Fresh);
        assert_eq!(dedup.check_at("fp", 2_000), DedupDecision::Duplicate);
        assert_eq!(dedup.check_at("fp", 5_999), DedupDecision::Duplicate);
        assert_eq!(dedup.check_at("fp", 6_000), DedupDecision::Fresh);
    }

    #[test]
    fn duplicates_do_not_extend_the_window() {
        let dedup = RequestDeduplicator::new(5_000, 60_000);
        assert_eq!(dedup.check_at("fp", 1_000), DedupDecision::Fresh);
        // Seen again at 4s: still a duplicate, but the stored timestamp
        // stays at 1s, so 6.1s is past the window.
        assert_eq!(dedup.check_at("fp", 4_000), DedupDecision::Duplicate);
        assert_eq!(dedup.check_at("fp", 6_100), DedupDecision::Fresh);
    }

    #[test]
    fn different_fingerprints_do_not_collide() {
        let dedup = RequestDeduplicator::new(5_000, 60_000);
        assert_eq!(dedup.check_at("a", 1_000), DedupDecision::Fresh);
        assert_eq!(dedup.check_at("b", 1_000), DedupDecision::Fresh);
    }

    #[test]
    fn sweep_removes_expired_entries() {
        let dedup = RequestDeduplicator::new(5_000, 60_000);
        dedup.check_at("old", 1_000);
        assert_eq!(dedup.stats().tracked_fingerprints, 1);

        // Next fresh check past the sweep interval triggers the sweep
        dedup.check_at("new", 70_000);
        let stats = dedup.stats();
        assert_eq!(stats.tracked_fingerprints, 1);
        assert_eq!(stats.total_requests, 2);
    }

    #[test]
    fn counters_track_totals_and_duplicates() {
        let dedup = RequestDeduplicator::new(5_000, 60_000);
        dedup.check_at("fp", 1_000);
        dedup.check_at("fp", 2_000);
        dedup.check_at("fp", 3_000);
        let stats = dedup.stats();
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.duplicate_requests, 2);
    }
}
