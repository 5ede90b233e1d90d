use serde::{Deserialize, Serialize};

use crate::core::{PropertyCategory, PropertySummary, RetrievalStrategy};

/// Band half-width for the single-dimension strategies
const NARROW_BAND: f64 = 0.3;

/// Price band half-width for the comprehensive strategy
const WIDE_BAND: f64 = 0.5;

/// Coarse candidate filter sent to a property source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub exclude_id: Option<String>,
    pub city: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub size_min: Option<f64>,
    pub size_max: Option<f64>,
    pub category: Option<PropertyCategory>,
}

/// `value ± value * width`, rounded, lower edge clamped at 0
fn band(value: f64, width: f64) -> (f64, f64) {
    let spread = value * width;
    ((value - spread).max(0.0).round(), (value + spread).round())
}

impl PropertyFilter {
    /// Filter for `strategy`, always excluding the reference itself
    pub fn for_strategy(strategy: RetrievalStrategy, reference: &PropertySummary) -> Self {
        let mut filter = PropertyFilter {
            exclude_id: Some(reference.id.clone()),
            ..Default::default()
        };

        match strategy {
            RetrievalStrategy::Location => {
                filter.city = Some(reference.city.clone());
            }
            RetrievalStrategy::Price => {
                filter = filter.with_price_band(reference.price, NARROW_BAND);
            }
            RetrievalStrategy::Size => {
                let (min, max) = band(reference.floor_area, NARROW_BAND);
                filter.size_min = Some(min);
                filter.size_max = Some(max);
            }
            RetrievalStrategy::Type => {
                filter.category = Some(reference.category);
            }
            RetrievalStrategy::Comprehensive => {
                filter.city = Some(reference.city.clone());
                filter = filter.with_price_band(reference.price, WIDE_BAND);
            }
        }

        filter
    }

    fn with_price_band(mut self, price: f64, width: f64) -> Self {
        let (min, max) = band(price, width);
        self.price_min = Some(min);
        self.price_max = Some(max);
        self
    }

    /// Check a property against every clause of the filter
    pub fn matches(&self, property: &PropertySummary) -> bool {
        if self.exclude_id.as_deref() == Some(property.id.as_str()) {
            return false;
        }
        if let Some(city) = &self.city {
            if &property.city != city {
                return false;
            }
        }
        if let Some(category) = self.category {
            if property.category != category {
                return false;
            }
        }

        let in_range = |value: f64, min: Option<f64>, max: Option<f64>| {
            min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
        };

        in_range(property.price, self.price_min, self.price_max)
            && in_range(property.floor_area, self.size_min, self.size_max)
    }

    /// Render as URL query parameters (backend names)
    pub fn to_query_string(&self) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();

        if let Some(id) = &self.exclude_id {
            params.push(("exclude", id.clone()));
        }
        if let Some(city) = &self.city {
            params.push(("city", city.clone()));
        }
        if let Some(category) = self.category {
            params.push(("property_type", category.to_string()));
        }
        if let Some(v) = self.price_min {
            params.push(("price_min", v.to_string()));
        }
        if let Some(v) = self.price_max {
            params.push(("price_max", v.to_string()));
        }
        if let Some(v) = self.size_min {
            params.push(("size_min", v.to_string()));
        }
        if let Some(v) = self.size_max {
            params.push(("size_max", v.to_string()));
        }

        params
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(&v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Stable key identifying this filter (used by the candidate cache)
    pub fn cache_key(&self) -> String {
        self.to_query_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> PropertySummary {
        PropertySummary::new("17", "Berlin", 500000.0, 100.0, PropertyCategory::Apartment, 2)
    }

    #[test]
    fn test_price_strategy_band() {
        let filter = PropertyFilter::for_strategy(RetrievalStrategy::Price, &reference());

        assert_eq!(filter.exclude_id.as_deref(), Some("17"));
        assert_eq!(filter.price_min, Some(350000.0));
        assert_eq!(filter.price_max, Some(650000.0));
        assert!(filter.city.is_none());
        assert!(filter.size_min.is_none());
    }

    #[test]
    fn test_comprehensive_strategy() {
        let filter = PropertyFilter::for_strategy(RetrievalStrategy::Comprehensive, &reference());

        assert_eq!(filter.city.as_deref(), Some("Berlin"));
        assert_eq!(filter.price_min, Some(250000.0));
        assert_eq!(filter.price_max, Some(750000.0));
        assert!(filter.category.is_none());
    }

    #[test]
    fn test_size_and_type_strategies() {
        let size = PropertyFilter::for_strategy(RetrievalStrategy::Size, &reference());
        assert_eq!(size.size_min, Some(70.0));
        assert_eq!(size.size_max, Some(130.0));

        let by_type = PropertyFilter::for_strategy(RetrievalStrategy::Type, &reference());
        assert_eq!(by_type.category, Some(PropertyCategory::Apartment));
        assert!(by_type.price_min.is_none());

        let location = PropertyFilter::for_strategy(RetrievalStrategy::Location, &reference());
        assert_eq!(location.city.as_deref(), Some("Berlin"));
    }

    #[test]
    fn test_band_edges_are_rounded_and_clamped() {
        let mut odd = reference();
        odd.floor_area = 33.0;
        let filter = PropertyFilter::for_strategy(RetrievalStrategy::Size, &odd);
        assert_eq!(filter.size_min, Some(23.0));
        assert_eq!(filter.size_max, Some(43.0));

        assert_eq!(band(-10.0, 0.5), (0.0, -15.0));
    }

    #[test]
    fn test_matches_excludes_reference() {
        let filter = PropertyFilter::for_strategy(RetrievalStrategy::Type, &reference());
        assert!(!filter.matches(&reference()));

        let mut other = reference();
        other.id = "18".to_string();
        assert!(filter.matches(&other));

        other.category = PropertyCategory::House;
        assert!(!filter.matches(&other));
    }

    #[test]
    fn test_matches_price_band() {
        let filter = PropertyFilter::for_strategy(RetrievalStrategy::Price, &reference());
        let mut candidate = reference();
        candidate.id = "2".to_string();

        candidate.price = 650000.0;
        assert!(filter.matches(&candidate));
        candidate.price = 650001.0;
        assert!(!filter.matches(&candidate));
    }

    #[test]
    fn test_query_string() {
        let mut reference = reference();
        reference.city = "São Paulo".to_string();
        let filter = PropertyFilter::for_strategy(RetrievalStrategy::Comprehensive, &reference);

        assert_eq!(
            filter.to_query_string(),
            "exclude=17&city=S%C3%A3o%20Paulo&price_min=250000&price_max=750000"
        );
    }
}
