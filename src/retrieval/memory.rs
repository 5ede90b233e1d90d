use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::PropertySummary;
use crate::error::{EngineError, Result};
use crate::retrieval::{PropertyFilter, PropertySource};

/// Property source backed by a fixed list of listings
pub struct InMemoryPropertySource {
    properties: Vec<PropertySummary>,
    searches: AtomicUsize,
}

impl InMemoryPropertySource {
    pub fn new(properties: Vec<PropertySummary>) -> Self {
        Self {
            properties,
            searches: AtomicUsize::new(0),
        }
    }

    /// Load listings from a JSON array file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("Cannot read fixtures {}: {}", path.display(), e))
        })?;
        let properties: Vec<PropertySummary> = serde_json::from_str(&data)?;

        tracing::debug!("Loaded {} fixture properties from {}", properties.len(), path.display());

        Ok(Self::new(properties))
    }

    /// Number of `search` calls served so far
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[async_trait]
impl PropertySource for InMemoryPropertySource {
    async fn search(&self, filter: &PropertyFilter) -> Result<Vec<PropertySummary>> {
        self.searches.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .properties
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<PropertySummary> {
        self.properties
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    fn name(&self) -> &str {
        "memory"
    }

    async fn is_available(&self) -> bool {
        true
    }
}
