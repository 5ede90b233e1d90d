use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Which coarse server-side filter narrows candidates before scoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalStrategy {
    /// Same city and a wide (±50%) price band
    #[default]
    Comprehensive,
    /// Same city
    Location,
    /// ±30% price band
    Price,
    /// ±30% floor area band
    Size,
    /// Same category
    Type,
}

impl RetrievalStrategy {
    pub const ALL: [RetrievalStrategy; 5] = [
        RetrievalStrategy::Comprehensive,
        RetrievalStrategy::Location,
        RetrievalStrategy::Price,
        RetrievalStrategy::Size,
        RetrievalStrategy::Type,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalStrategy::Comprehensive => "comprehensive",
            RetrievalStrategy::Location => "location",
            RetrievalStrategy::Price => "price",
            RetrievalStrategy::Size => "size",
            RetrievalStrategy::Type => "type",
        }
    }
}

impl fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalStrategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        RetrievalStrategy::ALL
            .into_iter()
            .find(|st| st.as_str() == lower)
            .ok_or_else(|| EngineError::Config(format!("Unknown retrieval strategy: {}", s)))
    }
}

/// Minimum total score for a candidate to count as a genuine match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AcceptanceThreshold {
    Broad,
    #[default]
    Balanced,
    Specific,
    Exact,
}

impl AcceptanceThreshold {
    pub const ALL: [AcceptanceThreshold; 4] = [
        AcceptanceThreshold::Broad,
        AcceptanceThreshold::Balanced,
        AcceptanceThreshold::Specific,
        AcceptanceThreshold::Exact,
    ];

    pub fn value(&self) -> u8 {
        match self {
            AcceptanceThreshold::Broad => 30,
            AcceptanceThreshold::Balanced => 40,
            AcceptanceThreshold::Specific => 50,
            AcceptanceThreshold::Exact => 60,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AcceptanceThreshold::Broad => "Broad",
            AcceptanceThreshold::Balanced => "Balanced",
            AcceptanceThreshold::Specific => "Specific",
            AcceptanceThreshold::Exact => "Exact",
        }
    }

    pub fn accepts(&self, total: u8) -> bool {
        total >= self.value()
    }
}

impl TryFrom<u8> for AcceptanceThreshold {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        AcceptanceThreshold::ALL
            .into_iter()
            .find(|t| t.value() == value)
            .ok_or(EngineError::InvalidThreshold(value))
    }
}

impl From<AcceptanceThreshold> for u8 {
    fn from(threshold: AcceptanceThreshold) -> Self {
        threshold.value()
    }
}

impl fmt::Display for AcceptanceThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%+", self.value())
    }
}
