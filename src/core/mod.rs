pub mod criteria;
pub mod property;
pub mod score;
pub mod similarity_response;

pub use criteria::{AcceptanceThreshold, RetrievalStrategy};
pub use property::{PropertyCategory, PropertySummary};
pub use score::{Feature, ScoreBreakdown, SimilarityScore, SimilarityTier};
pub use similarity_response::{MatchOutcome, RankedProperty, SimilarityResponse};
