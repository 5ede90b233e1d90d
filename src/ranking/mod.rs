pub mod selection;
pub mod tiers;
pub mod weighted;

use crate::core::{PropertySummary, SimilarityScore};

pub use selection::{select, Selection};
pub use tiers::Tier;
pub use weighted::{ScoringModel, WeightedFeatureScorer};

/// Trait for similarity scoring models
pub trait SimilarityScorer: Send + Sync {
    /// Score one candidate against the reference
    fn score(&self, reference: &PropertySummary, candidate: &PropertySummary) -> SimilarityScore;

    /// Score all candidates, sorted by total (highest first).
    ///
    /// The sort is stable: ties keep the order the source returned, which
    /// sources do not guarantee.
    fn rank(&self, reference: &PropertySummary, candidates: &[PropertySummary]) -> Vec<RankedCandidate> {
        let mut ranked: Vec<RankedCandidate> = candidates
            .iter()
            .map(|property| RankedCandidate::new(property.clone(), self.score(reference, property)))
            .collect();

        ranked.sort_by(|a, b| b.score.total.cmp(&a.score.total));
        ranked
    }

    /// Get scorer name for logging
    fn name(&self) -> &str;
}

/// Candidate with similarity score
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub property: PropertySummary,
    pub score: SimilarityScore,
}

impl RankedCandidate {
    pub fn new(property: PropertySummary, score: SimilarityScore) -> Self {
        Self { property, score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PropertyCategory;

    #[test]
    fn test_rank_sorts_descending() {
        let scorer = WeightedFeatureScorer::new();
        let reference =
            PropertySummary::new("ref", "Berlin", 500000.0, 100.0, PropertyCategory::Apartment, 2);

        let candidates = vec![
            PropertySummary::new("B", "Munich", 900000.0, 100.0, PropertyCategory::House, 4),
            PropertySummary::new("A", "Berlin", 520000.0, 105.0, PropertyCategory::Apartment, 2),
            PropertySummary::new("C", "Berlin", 640000.0, 125.0, PropertyCategory::Villa, 3),
        ];

        let ranked = scorer.rank(&reference, &candidates);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].property.id, "A");
        assert_eq!(ranked[2].property.id, "B");
        assert!(ranked.windows(2).all(|w| w[0].score.total >= w[1].score.total));
        assert!(ranked.iter().all(|r| r.score.total <= 100));
    }
}
