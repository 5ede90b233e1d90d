pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::core::PropertySummary;
use crate::error::Result;

pub use sqlite::SqliteCache;

/// Trait for candidate-set cache implementations
///
/// Entries are keyed by [`PropertyFilter::cache_key`](crate::retrieval::PropertyFilter::cache_key),
/// so the same coarse filter never hits the backend twice within the TTL.
#[async_trait]
pub trait CandidateCache: Send + Sync {
    /// Get cached candidates for a filter key
    async fn get(&self, key: &str) -> Result<Option<CachedCandidates>>;

    /// Save candidates for a filter key
    async fn save(&self, key: &str, candidates: &[PropertySummary]) -> Result<()>;

    /// Increment cache hit counter
    async fn increment_hit(&self, key: &str) -> Result<()>;

    /// Get cache statistics
    async fn stats(&self) -> Result<CacheStats>;

    /// Clear expired entries (older than `max_age_days`)
    async fn cleanup(&self, max_age_days: i64) -> Result<u64>;
}

/// Cached candidate list with metadata
#[derive(Debug, Clone)]
pub struct CachedCandidates {
    pub key: String,
    pub candidates: Vec<PropertySummary>,
    pub hit_count: i32,
    pub cached_at: DateTime<Utc>,
}

impl CachedCandidates {
    /// Entry is younger than `ttl_secs`
    pub fn is_fresh(&self, ttl_secs: u64) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age.num_seconds() < ttl_secs as i64
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: u64,
    pub total_hits: u64,
    pub avg_hit_count: f64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}
