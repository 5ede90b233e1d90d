use serde::{Deserialize, Serialize};

use crate::core::{
    AcceptanceThreshold, PropertySummary, RetrievalStrategy, SimilarityScore, SimilarityTier,
};

/// How the result set was assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    /// At least one candidate met the threshold
    Matched,
    /// Candidates exist but none met the threshold, closest shown instead
    Fallback,
    /// Retrieval returned no candidates
    Empty,
}

/// Candidate listing with its computed similarity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedProperty {
    pub property: PropertySummary,
    pub score: SimilarityScore,
    pub tier: SimilarityTier,

    /// Score is under the requested threshold (fallback entries)
    pub below_threshold: bool,
}

impl RankedProperty {
    pub fn new(property: PropertySummary, score: SimilarityScore, threshold: AcceptanceThreshold) -> Self {
        Self {
            property,
            tier: score.tier(),
            below_threshold: !threshold.accepts(score.total),
            score,
        }
    }

    /// Listing is in the reference's city
    pub fn same_city(&self) -> bool {
        self.score.breakdown.location > 0
    }

    /// Listing has the reference's category
    pub fn same_category(&self) -> bool {
        self.score.breakdown.category > 0
    }
}

/// Ranked similar listings for one reference property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResponse {
    pub reference_id: String,
    pub strategy: RetrievalStrategy,
    pub threshold: AcceptanceThreshold,
    pub outcome: MatchOutcome,

    /// At most `max_results` entries, best first
    #[serde(default)]
    pub results: Vec<RankedProperty>,

    /// Number of candidates scored
    pub candidates_considered: usize,

    /// Whether candidates came from the cache
    pub from_cache: bool,

    /// Ranking latency in milliseconds
    pub latency_ms: f64,

    /// Scoring model used
    pub scoring_method: String,
}

impl SimilarityResponse {
    /// No candidate met the threshold, results are best available
    pub fn is_fallback(&self) -> bool {
        self.outcome == MatchOutcome::Fallback
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Message shown above the results
    pub fn headline(&self) -> String {
        match self.outcome {
            MatchOutcome::Matched => format!("Curated based on {}", self.strategy),
            MatchOutcome::Fallback => format!(
                "No properties meet your {}% similarity criteria, showing the closest matches available",
                self.threshold.value()
            ),
            MatchOutcome::Empty => "No matching properties found".to_string(),
        }
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        let best = self
            .results
            .first()
            .map(|r| format!("{} {}%", r.property.display_name(), r.score.total))
            .unwrap_or_else(|| "none".to_string());
        format!(
            "#{} [{} @ {}] {:?}: {} of {} (best: {})",
            self.reference_id,
            self.strategy,
            self.threshold,
            self.outcome,
            self.results.len(),
            self.candidates_considered,
            best
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PropertyCategory, ScoreBreakdown};

    fn ranked(total_location: u8, threshold: AcceptanceThreshold) -> RankedProperty {
        let property = PropertySummary::new("1", "Berlin", 1.0, 1.0, PropertyCategory::House, 1);
        let score = SimilarityScore::from_breakdown(ScoreBreakdown {
            location: total_location,
            ..Default::default()
        });
        RankedProperty::new(property, score, threshold)
    }

    #[test]
    fn test_ranked_property_flags() {
        let entry = ranked(30, AcceptanceThreshold::Balanced);
        assert!(entry.below_threshold);
        assert!(entry.same_city());
        assert!(!entry.same_category());
        assert_eq!(entry.tier, SimilarityTier::Related);

        let entry = ranked(30, AcceptanceThreshold::Broad);
        assert!(!entry.below_threshold);
    }

    #[test]
    fn test_fallback_headline() {
        let response = SimilarityResponse {
            reference_id: "1".to_string(),
            strategy: RetrievalStrategy::Price,
            threshold: AcceptanceThreshold::Exact,
            outcome: MatchOutcome::Fallback,
            results: vec![ranked(30, AcceptanceThreshold::Exact)],
            candidates_considered: 4,
            from_cache: false,
            latency_ms: 1.0,
            scoring_method: "weighted".to_string(),
        };

        assert!(response.is_fallback());
        assert!(response.headline().contains("60%"));
        assert!(response.display().contains("1 of 4"));
    }
}
