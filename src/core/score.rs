use serde::{Deserialize, Serialize};

/// Feature dimensions contributing to a similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Location,
    Price,
    Size,
    Category,
    Bedrooms,
}

/// Points contributed by each feature
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub location: u8,
    pub price: u8,
    pub size: u8,
    pub category: u8,
    pub bedrooms: u8,
}

impl ScoreBreakdown {
    pub fn points(&self, feature: Feature) -> u8 {
        match feature {
            Feature::Location => self.location,
            Feature::Price => self.price,
            Feature::Size => self.size,
            Feature::Category => self.category,
            Feature::Bedrooms => self.bedrooms,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, u8)> + '_ {
        [
            Feature::Location,
            Feature::Price,
            Feature::Size,
            Feature::Category,
            Feature::Bedrooms,
        ]
        .into_iter()
        .map(move |f| (f, self.points(f)))
    }

    /// Unclamped sum of all feature points
    pub fn sum(&self) -> u32 {
        self.iter().map(|(_, p)| p as u32).sum()
    }
}

/// Similarity of one candidate to the reference property (0 - 100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub total: u8,
    pub breakdown: ScoreBreakdown,
}

impl SimilarityScore {
    pub const MAX: u8 = 100;

    /// Build a score from its breakdown, clamping the total at 100
    pub fn from_breakdown(breakdown: ScoreBreakdown) -> Self {
        let total = breakdown.sum().min(Self::MAX as u32) as u8;
        Self { total, breakdown }
    }

    pub fn tier(&self) -> SimilarityTier {
        SimilarityTier::for_score(self.total)
    }
}

/// Badge shown next to a similar listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityTier {
    PerfectMatch,
    VerySimilar,
    Similar,
    Related,
}

impl SimilarityTier {
    pub fn for_score(total: u8) -> Self {
        match total {
            80.. => SimilarityTier::PerfectMatch,
            60..=79 => SimilarityTier::VerySimilar,
            40..=59 => SimilarityTier::Similar,
            _ => SimilarityTier::Related,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SimilarityTier::PerfectMatch => "Perfect Match",
            SimilarityTier::VerySimilar => "Very Similar",
            SimilarityTier::Similar => "Similar",
            SimilarityTier::Related => "Related",
        }
    }
}
