//! Last-request-wins ranking for interactive callers.
//!
//! Each new request cancels the one in flight. A request that completes after
//! a newer one started is discarded, so stale candidates never replace the
//! state of a newer request.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::{AcceptanceThreshold, RetrievalStrategy, SimilarityResponse};
use crate::engine::{ScoredCandidates, SimilarityEngine, SimilarityRequest};
use crate::error::EngineError;

/// What a caller should display
#[derive(Debug, Clone)]
pub enum RankingState {
    /// Matched, fallback or empty results
    Ready(SimilarityResponse),
    /// Retrieval failed; `retry` re-runs the latest request
    Failed { reason: String },
}

impl RankingState {
    pub fn response(&self) -> Option<&SimilarityResponse> {
        match self {
            RankingState::Ready(response) => Some(response),
            RankingState::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RankingState::Failed { .. })
    }
}

struct Snapshot {
    request: SimilarityRequest,
    scored: ScoredCandidates,
}

#[derive(Default)]
struct SessionState {
    generation: u64,
    in_flight: Option<CancellationToken>,
    latest: Option<SimilarityRequest>,
    snapshot: Option<Snapshot>,
    current: Option<RankingState>,
}

pub struct RankingSession {
    engine: Arc<SimilarityEngine>,
    state: Mutex<SessionState>,
}

impl RankingSession {
    pub fn new(engine: Arc<SimilarityEngine>) -> Self {
        Self {
            engine,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // State stays consistent between statements, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run a request, superseding any in flight.
    ///
    /// Returns `None` when this request was itself superseded or cancelled.
    pub async fn request(&self, request: SimilarityRequest) -> Option<RankingState> {
        let (generation, token) = {
            let mut state = self.lock();
            state.generation += 1;
            if let Some(previous) = state.in_flight.take() {
                tracing::debug!("Superseding in-flight request (generation {})", state.generation - 1);
                previous.cancel();
            }
            let token = CancellationToken::new();
            state.in_flight = Some(token.clone());
            state.latest = Some(request.clone());
            (state.generation, token)
        };

        let start = Instant::now();
        let outcome = self.engine.score_candidates(&request, &token).await;

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!("Discarding result of superseded generation {}", generation);
            return None;
        }
        state.in_flight = None;

        match outcome {
            Ok(scored) => {
                let response = self.engine.select_from(&scored, request.threshold, start);
                tracing::info!("✅ {}", response.display());

                let ready = RankingState::Ready(response);
                state.snapshot = Some(Snapshot { request, scored });
                state.current = Some(ready.clone());
                Some(ready)
            }
            Err(EngineError::Cancelled) => None,
            Err(e) => {
                tracing::warn!("❌ Similar properties unavailable for #{}: {}", request.reference.id, e);

                let failed = RankingState::Failed { reason: e.to_string() };
                state.snapshot = None;
                state.current = Some(failed.clone());
                Some(failed)
            }
        }
    }

    /// Switch threshold, re-using the last scored candidates when they are current
    pub async fn change_threshold(&self, threshold: AcceptanceThreshold) -> Option<RankingState> {
        let rerun = {
            let mut guard = self.lock();
            let state = &mut *guard;

            let reusable = state.in_flight.is_none()
                && match (&state.latest, &state.snapshot) {
                    (Some(latest), Some(snapshot)) => latest.same_candidates(&snapshot.request),
                    _ => false,
                };

            if reusable {
                if let Some(snapshot) = state.snapshot.as_mut() {
                    snapshot.request.threshold = threshold;
                    if let Some(latest) = state.latest.as_mut() {
                        latest.threshold = threshold;
                    }

                    let response = self.engine.select_from(&snapshot.scored, threshold, Instant::now());
                    tracing::debug!("Re-partitioned locally: {}", response.display());

                    let ready = RankingState::Ready(response);
                    state.current = Some(ready.clone());
                    return Some(ready);
                }
            }

            state.latest.clone().map(|r| r.with_threshold(threshold))
        };

        match rerun {
            Some(request) => self.request(request).await,
            None => None,
        }
    }

    /// Switch strategy; always re-fetches
    pub async fn change_strategy(&self, strategy: RetrievalStrategy) -> Option<RankingState> {
        let request = self.lock().latest.clone()?;
        self.request(request.with_strategy(strategy)).await
    }

    /// Re-run the latest request, e.g. after a failure
    pub async fn retry(&self) -> Option<RankingState> {
        let request = self.lock().latest.clone()?;
        self.request(request).await
    }

    /// Cancel the in-flight request, if any, without starting another
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.generation += 1;
        if let Some(token) = state.in_flight.take() {
            token.cancel();
        }
    }

    /// Last applied state
    pub fn current(&self) -> Option<RankingState> {
        self.lock().current.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().in_flight.is_some()
    }
}
