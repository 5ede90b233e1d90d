use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deserialize an id from either an integer or a string (backend sends ints)
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Int(i64),
        String(String),
    }

    match IdValue::deserialize(deserializer)? {
        IdValue::Int(i) => Ok(i.to_string()),
        IdValue::String(s) => Ok(s),
    }
}

/// Deserialize a numeric amount from a number, a decimal string, or null.
///
/// Anything unparseable becomes 0, the same tolerance the web client had.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AmountValue {
        Number(f64),
        String(String),
        Null,
    }

    match AmountValue::deserialize(deserializer)? {
        AmountValue::Number(n) => Ok(n),
        AmountValue::String(s) => Ok(s.trim().parse::<f64>().unwrap_or(0.0)),
        AmountValue::Null => Ok(0.0),
    }
}

fn deserialize_rooms<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

/// Property category as listed on the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyCategory {
    House,
    Apartment,
    Villa,
    Land,
    Commercial,
}

impl PropertyCategory {
    pub const ALL: [PropertyCategory; 5] = [
        PropertyCategory::House,
        PropertyCategory::Apartment,
        PropertyCategory::Villa,
        PropertyCategory::Land,
        PropertyCategory::Commercial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyCategory::House => "house",
            PropertyCategory::Apartment => "apartment",
            PropertyCategory::Villa => "villa",
            PropertyCategory::Land => "land",
            PropertyCategory::Commercial => "commercial",
        }
    }
}

impl fmt::Display for PropertyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        PropertyCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| format!("Unknown property category: {}", s))
    }
}

/// Listing fields the similarity ranker works with.
///
/// Accepts both the backend's field names (`size`, `property_type`,
/// `number_of_rooms`) and the web client's (`squareMeters`, `type`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertySummary {
    /// Listing identifier
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    /// Listing title
    #[serde(default)]
    pub name: String,

    /// City, compared with exact string equality
    #[serde(default)]
    pub city: String,

    /// Asking price, currency-agnostic
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub price: f64,

    /// Floor area in square meters
    #[serde(
        default,
        alias = "size",
        alias = "squareMeters",
        deserialize_with = "deserialize_amount"
    )]
    pub floor_area: f64,

    #[serde(alias = "property_type", alias = "type")]
    pub category: PropertyCategory,

    #[serde(
        default,
        alias = "number_of_rooms",
        deserialize_with = "deserialize_rooms"
    )]
    pub bedrooms: u32,
}

impl PropertySummary {
    /// Create a new summary with every comparable field set
    pub fn new(
        id: impl Into<String>,
        city: impl Into<String>,
        price: f64,
        floor_area: f64,
        category: PropertyCategory,
        bedrooms: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            city: city.into(),
            price,
            floor_area,
            category,
            bedrooms,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get display name (for logging/UI)
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("#{} ({}, {})", self.id, self.category, self.city)
        } else {
            format!("{} ({}, {})", self.name, self.category, self.city)
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_wire_format() {
        let json = r#"{
            "id": 42,
            "name": "Loft near the river",
            "city": "Berlin",
            "price": "500000.00",
            "size": "100.50",
            "property_type": "apartment",
            "number_of_rooms": 2,
            "is_available": true
        }"#;

        let property = PropertySummary::from_json(json).unwrap();
        assert_eq!(property.id, "42");
        assert_eq!(property.price, 500000.0);
        assert_eq!(property.floor_area, 100.5);
        assert_eq!(property.category, PropertyCategory::Apartment);
        assert_eq!(property.bedrooms, 2);
    }

    #[test]
    fn test_client_wire_format() {
        let json = r#"{
            "id": "7",
            "city": "Munich",
            "price": 900000,
            "squareMeters": 140,
            "type": "house",
            "bedrooms": 4
        }"#;

        let property = PropertySummary::from_json(json).unwrap();
        assert_eq!(property.id, "7");
        assert_eq!(property.floor_area, 140.0);
        assert_eq!(property.category, PropertyCategory::House);
        assert!(property.name.is_empty());
    }

    #[test]
    fn test_tolerant_amounts() {
        let json = r#"{"id": 1, "city": "Lyon", "price": "n/a", "size": null,
                       "property_type": "land", "number_of_rooms": null}"#;

        let property = PropertySummary::from_json(json).unwrap();
        assert_eq!(property.price, 0.0);
        assert_eq!(property.floor_area, 0.0);
        assert_eq!(property.bedrooms, 0);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let json = r#"{"id": 1, "city": "Lyon", "price": 1, "size": 1, "property_type": "castle"}"#;
        assert!(PropertySummary::from_json(json).is_err());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Villa".parse::<PropertyCategory>(), Ok(PropertyCategory::Villa));
        assert!("castle".parse::<PropertyCategory>().is_err());
    }
}
