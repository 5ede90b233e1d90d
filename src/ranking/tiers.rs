use serde::{Deserialize, Serialize};

/// One scoring band: relative differences up to `max_ratio` earn `points`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub max_ratio: f64,
    pub points: u8,
}

impl Tier {
    pub const fn new(max_ratio: f64, points: u8) -> Self {
        Self { max_ratio, points }
    }
}

/// Price bands, tightest first
pub const PRICE_TIERS: [Tier; 4] = [
    Tier::new(0.10, 25),
    Tier::new(0.20, 20),
    Tier::new(0.30, 15),
    Tier::new(0.50, 10),
];

/// Floor area bands, tightest first
pub const SIZE_TIERS: [Tier; 3] = [
    Tier::new(0.10, 20),
    Tier::new(0.20, 15),
    Tier::new(0.30, 10),
];

/// Points of the first band containing `ratio`, or 0.
///
/// Bands must be ordered by ascending `max_ratio`; NaN matches nothing.
pub fn tier_points(tiers: &[Tier], ratio: f64) -> u8 {
    tiers
        .iter()
        .find(|tier| ratio <= tier.max_ratio)
        .map_or(0, |tier| tier.points)
}

/// `|candidate - reference| / reference`.
///
/// A zero reference compares as identical to a zero candidate and as
/// infinitely far from anything else.
pub fn relative_difference(reference: f64, candidate: f64) -> f64 {
    if reference == 0.0 {
        if candidate == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        (candidate - reference).abs() / reference.abs()
    }
}
