use serde::{Deserialize, Serialize};

use crate::core::{PropertySummary, ScoreBreakdown, SimilarityScore};
use crate::ranking::tiers::{relative_difference, tier_points, Tier, PRICE_TIERS, SIZE_TIERS};
use crate::ranking::SimilarityScorer;

/// Points awarded per feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringModel {
    pub location_points: u8,
    pub price_tiers: Vec<Tier>,
    pub size_tiers: Vec<Tier>,
    pub category_points: u8,
    pub bedroom_exact_points: u8,
    /// Bedroom counts one apart
    pub bedroom_adjacent_points: u8,
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self {
            location_points: 30,
            price_tiers: PRICE_TIERS.to_vec(),
            size_tiers: SIZE_TIERS.to_vec(),
            category_points: 15,
            bedroom_exact_points: 10,
            bedroom_adjacent_points: 5,
        }
    }
}

/// Deterministic weighted-feature scorer
pub struct WeightedFeatureScorer {
    model: ScoringModel,
}

impl WeightedFeatureScorer {
    pub fn new() -> Self {
        Self::with_model(ScoringModel::default())
    }

    pub fn with_model(model: ScoringModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &ScoringModel {
        &self.model
    }

    fn bedroom_points(&self, reference: u32, candidate: u32) -> u8 {
        match reference.abs_diff(candidate) {
            0 => self.model.bedroom_exact_points,
            1 => self.model.bedroom_adjacent_points,
            _ => 0,
        }
    }
}

impl Default for WeightedFeatureScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityScorer for WeightedFeatureScorer {
    fn score(&self, reference: &PropertySummary, candidate: &PropertySummary) -> SimilarityScore {
        let model = &self.model;

        let location = if candidate.city == reference.city {
            model.location_points
        } else {
            0
        };

        let price = tier_points(
            &model.price_tiers,
            relative_difference(reference.price, candidate.price),
        );

        let size = tier_points(
            &model.size_tiers,
            relative_difference(reference.floor_area, candidate.floor_area),
        );

        let category = if candidate.category == reference.category {
            model.category_points
        } else {
            0
        };

        let bedrooms = self.bedroom_points(reference.bedrooms, candidate.bedrooms);

        SimilarityScore::from_breakdown(ScoreBreakdown {
            location,
            price,
            size,
            category,
            bedrooms,
        })
    }

    fn name(&self) -> &str {
        "weighted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PropertyCategory;

    fn reference() -> PropertySummary {
        PropertySummary::new("ref", "Berlin", 500000.0, 100.0, PropertyCategory::Apartment, 2)
    }

    #[test]
    fn test_close_match_scores_full_marks() {
        let scorer = WeightedFeatureScorer::new();
        let candidate =
            PropertySummary::new("A", "Berlin", 520000.0, 105.0, PropertyCategory::Apartment, 2);

        let score = scorer.score(&reference(), &candidate);

        assert_eq!(score.total, 100);
        assert_eq!(
            score.breakdown,
            ScoreBreakdown {
                location: 30,
                price: 25,
                size: 20,
                category: 15,
                bedrooms: 10,
            }
        );
    }

    #[test]
    fn test_distant_candidate_only_scores_size() {
        let scorer = WeightedFeatureScorer::new();
        let candidate =
            PropertySummary::new("B", "Munich", 900000.0, 100.0, PropertyCategory::House, 4);

        let score = scorer.score(&reference(), &candidate);

        assert_eq!(score.total, 20);
        assert_eq!(score.breakdown.size, 20);
        assert_eq!(score.breakdown.price, 0);
    }

    #[test]
    fn test_identical_property_scores_100() {
        let scorer = WeightedFeatureScorer::new();
        let mut twin = reference();
        twin.id = "twin".to_string();

        assert_eq!(scorer.score(&reference(), &twin).total, 100);
    }

    #[test]
    fn test_city_mismatch_costs_exactly_location_points() {
        let scorer = WeightedFeatureScorer::new();
        let mut elsewhere = reference();
        elsewhere.city = "berlin".to_string();

        let same = scorer.score(&reference(), &reference()).total;
        let moved = scorer.score(&reference(), &elsewhere).total;

        assert_eq!(same - moved, 30);
    }

    #[test]
    fn test_bedroom_points() {
        let scorer = WeightedFeatureScorer::new();
        assert_eq!(scorer.bedroom_points(2, 2), 10);
        assert_eq!(scorer.bedroom_points(2, 3), 5);
        assert_eq!(scorer.bedroom_points(2, 1), 5);
        assert_eq!(scorer.bedroom_points(2, 4), 0);
        assert_eq!(scorer.bedroom_points(0, 1), 5);
    }

    #[test]
    fn test_zero_reference_area() {
        let scorer = WeightedFeatureScorer::new();
        let mut land = reference();
        land.floor_area = 0.0;

        let mut zero = land.clone();
        zero.id = "zero".to_string();
        let mut sized = land.clone();
        sized.id = "sized".to_string();
        sized.floor_area = 80.0;

        assert_eq!(scorer.score(&land, &zero).breakdown.size, 20);
        assert_eq!(scorer.score(&land, &sized).breakdown.size, 0);
    }

    #[test]
    fn test_oversized_model_is_clamped() {
        let model = ScoringModel {
            location_points: 90,
            ..ScoringModel::default()
        };
        let scorer = WeightedFeatureScorer::with_model(model);

        assert_eq!(scorer.score(&reference(), &reference()).total, 100);
    }
}
