use crate::cache::{CacheStats, CandidateCache, SqliteCache};
use crate::config::EngineConfig;
use crate::core::{AcceptanceThreshold, PropertySummary, RetrievalStrategy, SimilarityResponse};
use crate::error::{EngineError, Result};
use crate::ranking::{select, RankedCandidate, SimilarityScorer, WeightedFeatureScorer};
use crate::retrieval::{HttpPropertySource, PropertyFilter, PropertySource};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Similar-property ranking orchestrator
pub struct SimilarityEngine {
    source: Arc<dyn PropertySource>,
    scorer: Arc<dyn SimilarityScorer>,
    cache: Option<Arc<dyn CandidateCache>>,
    config: EngineConfig,
}

/// Ranking request parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityRequest {
    pub reference: PropertySummary,
    pub strategy: RetrievalStrategy,
    pub threshold: AcceptanceThreshold,
    pub use_cache: bool,
}

impl SimilarityRequest {
    pub fn new(reference: PropertySummary) -> Self {
        Self {
            reference,
            strategy: RetrievalStrategy::default(),
            threshold: AcceptanceThreshold::default(),
            use_cache: true,
        }
    }

    pub fn with_strategy(mut self, strategy: RetrievalStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_threshold(mut self, threshold: AcceptanceThreshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Same reference and strategy, so the scored candidates can be reused
    pub fn same_candidates(&self, other: &SimilarityRequest) -> bool {
        self.reference == other.reference && self.strategy == other.strategy
    }
}

/// Every candidate for one reference and strategy, scored and sorted best first.
///
/// Independent of the threshold, so one fetch serves every threshold.
#[derive(Debug, Clone)]
pub struct ScoredCandidates {
    pub reference_id: String,
    pub strategy: RetrievalStrategy,
    pub ranked: Vec<RankedCandidate>,
    pub from_cache: bool,
}

/// Reject references whose price or floor area cannot anchor a relative difference.
///
/// Zero is allowed: it only matches other zero values.
fn validate_reference(reference: &PropertySummary) -> Result<()> {
    for (field, value) in [("price", reference.price), ("floor area", reference.floor_area)] {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::DegenerateReference(format!(
                "{} of #{} is {}",
                field, reference.id, value
            )));
        }
        if value == 0.0 {
            tracing::debug!("Reference #{} has zero {}, only zero values will match", reference.id, field);
        }
    }
    Ok(())
}

impl SimilarityEngine {
    /// Create engine backed by the HTTP backend and, if enabled, the SQLite cache
    pub async fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let source = HttpPropertySource::new(&config.api_base_url, config.request_timeout())?
            .with_token(config.api_token.clone());

        let mut engine = Self::with_source(Arc::new(source), config);

        if engine.config.cache_enabled {
            match SqliteCache::new(&engine.config.db_path).await {
                Ok(cache) => {
                    tracing::info!("✅ Candidate cache at {}", engine.config.db_path);
                    engine.cache = Some(Arc::new(cache));
                }
                Err(e) => {
                    tracing::warn!("⚠️ Candidate cache unavailable, continuing without: {}", e);
                }
            }
        }

        Ok(engine)
    }

    /// Create engine over any property source, without cache
    pub fn with_source(source: Arc<dyn PropertySource>, config: EngineConfig) -> Self {
        Self {
            source,
            scorer: Arc::new(WeightedFeatureScorer::new()),
            cache: None,
            config,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CandidateCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<dyn PropertySource> {
        &self.source
    }

    pub fn scorer(&self) -> &Arc<dyn SimilarityScorer> {
        &self.scorer
    }

    /// Request with the configured default strategy and threshold
    pub fn request_for(&self, reference: PropertySummary) -> SimilarityRequest {
        SimilarityRequest::new(reference)
            .with_strategy(self.config.default_strategy)
            .with_threshold(self.config.default_threshold)
            .with_cache(self.config.cache_enabled)
    }

    /// Look up a reference property by ID through the source
    pub async fn reference_by_id(&self, id: &str) -> Result<PropertySummary> {
        self.source.get_by_id(id).await
    }

    /// Rank similar properties
    pub async fn find_similar(&self, request: &SimilarityRequest) -> Result<SimilarityResponse> {
        self.find_similar_cancellable(request, &CancellationToken::new()).await
    }

    /// Rank similar properties, giving up with [`EngineError::Cancelled`] once `cancel` fires
    pub async fn find_similar_cancellable(
        &self,
        request: &SimilarityRequest,
        cancel: &CancellationToken,
    ) -> Result<SimilarityResponse> {
        let start = Instant::now();

        let scored = self.score_candidates(request, cancel).await?;
        let response = self.select_from(&scored, request.threshold, start);

        tracing::info!("✅ {}", response.display());

        Ok(response)
    }

    /// Fetch and score every candidate for the request's reference and strategy
    pub async fn score_candidates(
        &self,
        request: &SimilarityRequest,
        cancel: &CancellationToken,
    ) -> Result<ScoredCandidates> {
        validate_reference(&request.reference)?;

        let filter = PropertyFilter::for_strategy(request.strategy, &request.reference);
        let (candidates, from_cache) = self.fetch_candidates(&filter, request.use_cache, cancel).await?;

        // Sources promise to honour exclude_id, but the reference must never rank against itself
        let candidates: Vec<PropertySummary> = candidates
            .into_iter()
            .filter(|p| p.id != request.reference.id)
            .collect();

        let ranked = self.scorer.rank(&request.reference, &candidates);

        Ok(ScoredCandidates {
            reference_id: request.reference.id.clone(),
            strategy: request.strategy,
            ranked,
            from_cache,
        })
    }

    /// Apply a threshold to already scored candidates
    pub fn select_from(
        &self,
        scored: &ScoredCandidates,
        threshold: AcceptanceThreshold,
        started: Instant,
    ) -> SimilarityResponse {
        let selection = select(&scored.ranked, threshold, self.config.max_results);

        SimilarityResponse {
            reference_id: scored.reference_id.clone(),
            strategy: scored.strategy,
            threshold,
            outcome: selection.outcome,
            results: selection.results,
            candidates_considered: scored.ranked.len(),
            from_cache: scored.from_cache,
            latency_ms: started.elapsed().as_secs_f64() * 1000.0,
            scoring_method: self.scorer.name().to_string(),
        }
    }

    async fn fetch_candidates(
        &self,
        filter: &PropertyFilter,
        use_cache: bool,
        cancel: &CancellationToken,
    ) -> Result<(Vec<PropertySummary>, bool)> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let key = filter.cache_key();
        let cache = self.cache.as_ref().filter(|_| use_cache);

        if let Some(cache) = cache {
            match cache.get(&key).await {
                Ok(Some(cached)) if cached.is_fresh(self.config.cache_ttl_secs) => {
                    tracing::debug!("Cache hit for {} ({} candidates)", key, cached.candidates.len());
                    if let Err(e) = cache.increment_hit(&key).await {
                        tracing::warn!("Failed to record cache hit: {}", e);
                    }
                    return Ok((cached.candidates, true));
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Cache lookup failed: {}", e),
            }
        }

        let candidates = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Fetch for {} cancelled", key);
                return Err(EngineError::Cancelled);
            }
            result = self.source.search(filter) => result?,
        };

        tracing::debug!("Source {} returned {} candidates", self.source.name(), candidates.len());

        if let Some(cache) = cache {
            if let Err(e) = cache.save(&key, &candidates).await {
                tracing::warn!("Failed to save to cache: {}", e);
            }
        }

        Ok((candidates, false))
    }

    /// Get cache statistics
    pub async fn cache_stats(&self) -> Result<CacheStats> {
        match &self.cache {
            Some(cache) => cache.stats().await,
            None => Err(EngineError::Cache("cache disabled".to_string())),
        }
    }

    /// Clean up old cache entries
    pub async fn cleanup_cache(&self, max_age_days: i64) -> Result<u64> {
        match &self.cache {
            Some(cache) => cache.cleanup(max_age_days).await,
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MatchOutcome, PropertyCategory};
    use crate::retrieval::InMemoryPropertySource;

    fn reference() -> PropertySummary {
        PropertySummary::new("ref", "Berlin", 500000.0, 100.0, PropertyCategory::Apartment, 2)
    }

    fn engine(properties: Vec<PropertySummary>) -> SimilarityEngine {
        SimilarityEngine::with_source(
            Arc::new(InMemoryPropertySource::new(properties)),
            EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_engine_creation() {
        let config = EngineConfig {
            db_path: ":memory:".to_string(),
            ..Default::default()
        };
        let engine = SimilarityEngine::new(config).await.unwrap();
        assert!(engine.cache_stats().await.is_ok());
    }

    #[tokio::test]
    async fn test_degenerate_reference_rejected() {
        let engine = engine(Vec::new());
        let mut broken = reference();
        broken.price = -1.0;

        let result = engine.find_similar(&SimilarityRequest::new(broken)).await;
        assert!(matches!(result, Err(EngineError::DegenerateReference(_))));

        let mut nan = reference();
        nan.floor_area = f64::NAN;
        let result = engine.find_similar(&SimilarityRequest::new(nan)).await;
        assert!(matches!(result, Err(EngineError::DegenerateReference(_))));
    }

    #[tokio::test]
    async fn test_empty_candidate_set() {
        let engine = engine(vec![reference()]);

        let response = engine.find_similar(&SimilarityRequest::new(reference())).await.unwrap();

        assert_eq!(response.outcome, MatchOutcome::Empty);
        assert_eq!(response.candidates_considered, 0);
        assert!(!response.is_fallback());
    }

    #[tokio::test]
    async fn test_cancelled_before_fetch() {
        let engine = engine(vec![reference()]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = engine
            .find_similar_cancellable(&SimilarityRequest::new(reference()), &cancel)
            .await;
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cache_disabled_stats() {
        let engine = engine(Vec::new());
        assert!(engine.cache_stats().await.is_err());
        assert_eq!(engine.cleanup_cache(0).await.unwrap(), 0);
    }
}
