use rusqlite::{Connection, params, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::cache::{CandidateCache, CachedCandidates, CacheStats};
use crate::core::PropertySummary;
use crate::error::{Result, EngineError};

/// SQLite-based candidate cache
///
/// ```sql
/// CREATE TABLE candidate_cache (
///     filter_key TEXT PRIMARY KEY,
///     candidates TEXT NOT NULL,
///     hit_count INTEGER DEFAULT 0,
///     cached_at TEXT NOT NULL
/// );
/// ```
pub struct SqliteCache {
    conn: Arc<Mutex<Connection>>,
}

/// Fixed-width RFC 3339 so timestamps compare correctly as text
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl SqliteCache {
    /// Open (or create) the cache database; `":memory:"` for a throwaway cache
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS candidate_cache (
                filter_key TEXT PRIMARY KEY,
                candidates TEXT NOT NULL,
                hit_count INTEGER DEFAULT 0,
                cached_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_candidate_cached_at ON candidate_cache(cached_at)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| EngineError::Cache("connection mutex poisoned".to_string()))
    }

    fn boundary_timestamp(conn: &Connection, sql: &str) -> Option<DateTime<Utc>> {
        conn.query_row(sql, [], |row| row.get::<_, Option<String>>(0))
            .ok()
            .flatten()
            .and_then(|s| parse_timestamp(&s))
    }
}

#[async_trait]
impl CandidateCache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<CachedCandidates>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT filter_key, candidates, hit_count, cached_at
                 FROM candidate_cache
                 WHERE filter_key = ?",
                params![key],
                |row| {
                    let candidates_json: String = row.get(1)?;
                    let hit_count: i32 = row.get(2)?;
                    let cached_at: String = row.get(3)?;

                    let candidates: Vec<PropertySummary> = serde_json::from_str(&candidates_json)
                        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

                    Ok(CachedCandidates {
                        key: key.to_string(),
                        candidates,
                        hit_count,
                        // Unreadable timestamps count as expired
                        cached_at: parse_timestamp(&cached_at).unwrap_or(DateTime::<Utc>::MIN_UTC),
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    async fn save(&self, key: &str, candidates: &[PropertySummary]) -> Result<()> {
        let candidates_json = serde_json::to_string(candidates)?;
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO candidate_cache (filter_key, candidates, hit_count, cached_at)
             VALUES (?1, ?2, COALESCE((SELECT hit_count FROM candidate_cache WHERE filter_key = ?1), 0), ?3)",
            params![key, candidates_json, format_timestamp(Utc::now())],
        )?;

        Ok(())
    }

    async fn increment_hit(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "UPDATE candidate_cache SET hit_count = hit_count + 1 WHERE filter_key = ?",
            params![key],
        )?;

        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        let conn = self.lock()?;

        let total_entries: u64 = conn.query_row(
            "SELECT COUNT(*) FROM candidate_cache",
            [],
            |row| row.get(0),
        )?;

        let total_hits: u64 = conn.query_row(
            "SELECT COALESCE(SUM(hit_count), 0) FROM candidate_cache",
            [],
            |row| row.get(0),
        )?;

        let avg_hit_count: f64 = if total_entries > 0 {
            total_hits as f64 / total_entries as f64
        } else {
            0.0
        };

        Ok(CacheStats {
            total_entries,
            total_hits,
            avg_hit_count,
            oldest_entry: Self::boundary_timestamp(&conn, "SELECT MIN(cached_at) FROM candidate_cache"),
            newest_entry: Self::boundary_timestamp(&conn, "SELECT MAX(cached_at) FROM candidate_cache"),
        })
    }

    async fn cleanup(&self, max_age_days: i64) -> Result<u64> {
        let conn = self.lock()?;

        let cutoff_date = Utc::now() - chrono::Duration::days(max_age_days);

        let deleted = conn.execute(
            "DELETE FROM candidate_cache WHERE cached_at < ?",
            params![format_timestamp(cutoff_date)],
        )?;

        Ok(deleted as u64)
    }
}
