use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;

use crate::core::PropertySummary;
use crate::error::{EngineError, Result};
use crate::retrieval::{PropertyFilter, PropertySource};

const SOURCE_NAME: &str = "http";

/// Property source talking to the marketplace REST backend
pub struct HttpPropertySource {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpPropertySource {
    /// Create new backend source
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Parse records one by one so a single malformed listing does not
    /// sink the whole candidate set
    fn parse_listings(values: Vec<serde_json::Value>) -> Vec<PropertySummary> {
        values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<PropertySummary>(value) {
                Ok(property) => Some(property),
                Err(e) => {
                    tracing::warn!("Skipping malformed listing: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl PropertySource for HttpPropertySource {
    async fn search(&self, filter: &PropertyFilter) -> Result<Vec<PropertySummary>> {
        let url = format!("{}/properties/?{}", self.base_url, filter.to_query_string());
        tracing::debug!("GET {}", url);

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| EngineError::retrieval(SOURCE_NAME, format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(EngineError::retrieval(
                SOURCE_NAME,
                format!("HTTP {}", response.status()),
            ));
        }

        let values: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| EngineError::retrieval(SOURCE_NAME, format!("Invalid JSON: {}", e)))?;

        // The backend only honours some filter keys, enforce the rest here
        let total = values.len();
        let candidates: Vec<PropertySummary> = Self::parse_listings(values)
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();

        tracing::debug!("Backend returned {} listings, {} match filter", total, candidates.len());

        Ok(candidates)
    }

    async fn get_by_id(&self, id: &str) -> Result<PropertySummary> {
        let url = format!("{}/properties/{}/", self.base_url, urlencoding::encode(id));

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| EngineError::retrieval(SOURCE_NAME, format!("Details request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(EngineError::NotFound(id.to_string()));
        }

        if !response.status().is_success() {
            return Err(EngineError::retrieval(
                SOURCE_NAME,
                format!("HTTP {}", response.status()),
            ));
        }

        response
            .json::<PropertySummary>()
            .await
            .map_err(|e| EngineError::retrieval(SOURCE_NAME, format!("Invalid JSON: {}", e)))
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/properties/filters/options/", self.base_url);
        match self.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PropertyCategory, RetrievalStrategy};

    #[test]
    fn test_base_url_trailing_slash() {
        let source = HttpPropertySource::new("http://localhost:8000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.base_url(), "http://localhost:8000/api");
    }

    #[test]
    fn test_empty_token_ignored() {
        let source = HttpPropertySource::new("http://localhost:8000/api", Duration::from_secs(1))
            .unwrap()
            .with_token(Some(String::new()));
        assert!(source.token.is_none());
    }

    #[test]
    fn test_parse_listings_skips_malformed() {
        let values = vec![
            serde_json::json!({"id": 1, "city": "Berlin", "price": "1.0", "size": "1.0",
                               "property_type": "house", "number_of_rooms": 1}),
            serde_json::json!({"id": 2, "city": "Berlin", "property_type": "castle"}),
        ];

        let parsed = HttpPropertySource::parse_listings(values);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].category, PropertyCategory::House);
    }

    #[tokio::test]
    #[ignore] // Requires the marketplace backend running
    async fn test_backend_search() {
        let source = HttpPropertySource::new("http://localhost:8000/api", Duration::from_secs(5)).unwrap();
        let reference = PropertySummary::new("1", "Berlin", 500000.0, 100.0, PropertyCategory::Apartment, 2);
        let filter = PropertyFilter::for_strategy(RetrievalStrategy::Location, &reference);

        let results = source.search(&filter).await.unwrap();
        assert!(results.iter().all(|p| p.id != "1" && p.city == "Berlin"));
    }
}
