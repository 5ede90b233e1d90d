use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estate_match_engine::{
    ranking::SimilarityScorer, AcceptanceThreshold, EngineConfig, EngineError, PropertySummary,
    RetrievalStrategy, SimilarityEngine, SimilarityResponse, SimilarityScore,
};

#[derive(Clone)]
struct AppState {
    engine: Arc<SimilarityEngine>,
}

#[derive(Debug, Deserialize)]
struct SimilarRequest {
    #[serde(default)]
    reference: Option<PropertySummary>,
    #[serde(default)]
    reference_id: Option<String>,
    #[serde(default)]
    strategy: Option<RetrievalStrategy>,
    #[serde(default)]
    threshold: Option<u8>,
    #[serde(default)]
    use_cache: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ScoreRequest {
    reference: PropertySummary,
    candidate: PropertySummary,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    cache: CacheStatsDto,
}

#[derive(Debug, Serialize)]
struct CacheStatsDto {
    total_entries: u64,
    total_hits: u64,
    avg_hit_count: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estate_match_server=debug,estate_match_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env()?;
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8090);

    tracing::info!("🚀 Starting Estate Match Server");
    tracing::info!("⚙️ {}", config);
    tracing::info!("🔌 Port: {}", port);

    let engine = SimilarityEngine::new(config).await?;

    if !engine.source().is_available().await {
        tracing::warn!("⚠️ Property backend {} not reachable yet", engine.config().api_base_url);
    }

    let state = AppState {
        engine: Arc::new(engine),
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/similar", post(similar_handler))
        .route("/v1/score", post(score_handler))
        .route("/v1/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("🏠 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: estate_match_engine::VERSION.to_string(),
    })
}

async fn similar_handler(
    State(state): State<AppState>,
    Json(req): Json<SimilarRequest>,
) -> Result<Json<SimilarityResponse>, AppError> {
    tracing::debug!("Similar request: {:?}", req);

    let reference = match (req.reference, req.reference_id) {
        (Some(reference), _) => reference,
        (None, Some(id)) => state.engine.reference_by_id(&id).await?,
        (None, None) => {
            return Err(EngineError::Config("either reference or reference_id is required".to_string()).into())
        }
    };

    let mut request = state.engine.request_for(reference);
    if let Some(strategy) = req.strategy {
        request = request.with_strategy(strategy);
    }
    if let Some(threshold) = req.threshold {
        request = request.with_threshold(AcceptanceThreshold::try_from(threshold)?);
    }
    if let Some(use_cache) = req.use_cache {
        request = request.with_cache(use_cache);
    }

    let result = state.engine.find_similar(&request).await?;

    tracing::info!(
        "✅ #{} → {} results ({:?}, {:.1}ms)",
        result.reference_id,
        result.results.len(),
        result.outcome,
        result.latency_ms
    );

    Ok(Json(result))
}

async fn score_handler(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Json<SimilarityScore> {
    Json(state.engine.scorer().score(&req.reference, &req.candidate))
}

async fn stats_handler(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let cache_stats = state.engine.cache_stats().await?;

    Ok(Json(StatsResponse {
        cache: CacheStatsDto {
            total_entries: cache_stats.total_entries,
            total_hits: cache_stats.total_hits,
            avg_hit_count: cache_stats.avg_hit_count,
        },
    }))
}

// Error handling
struct AppError(EngineError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EngineError::InvalidThreshold(_)
            | EngineError::DegenerateReference(_)
            | EngineError::Config(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Retrieval { .. } | EngineError::HttpRequest(_) => StatusCode::BAD_GATEWAY,
            EngineError::Cache(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = self.0.to_string();

        tracing::error!("❌ Error: {} - {}", status, message);

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<EngineError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
