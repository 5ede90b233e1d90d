//! # Estate Match Engine
//!
//! Similar-property ranking for a real-estate marketplace:
//! - Five coarse retrieval strategies (location, price, size, type, comprehensive)
//! - Deterministic weighted-feature similarity scoring (0 - 100)
//! - Threshold matching with best-available fallback
//! - SQLite candidate cache
//! - Last-request-wins sessions for interactive callers
//! - Multiple interfaces: Rust library, HTTP API, CLI
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use estate_match_engine::{EngineConfig, SimilarityEngine, RetrievalStrategy};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = SimilarityEngine::new(EngineConfig::from_env()?).await?;
//!
//!     let reference = engine.reference_by_id("42").await?;
//!     let request = engine
//!         .request_for(reference)
//!         .with_strategy(RetrievalStrategy::Location);
//!
//!     let response = engine.find_similar(&request).await?;
//!     for entry in &response.results {
//!         println!("{} - {}%", entry.property.display_name(), entry.score.total);
//!     }
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod cache;
pub mod config;
pub mod ranking;
pub mod retrieval;
pub mod engine;
pub mod session;
pub mod error;

// Re-export primary types
pub use core::{
    AcceptanceThreshold, MatchOutcome, PropertyCategory, PropertySummary, RankedProperty,
    RetrievalStrategy, SimilarityResponse, SimilarityScore,
};
pub use config::EngineConfig;
pub use engine::{SimilarityEngine, SimilarityRequest};
pub use error::{EngineError, Result};
pub use session::{RankingSession, RankingState};
pub use cache::CandidateCache;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
