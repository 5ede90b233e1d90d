pub mod filter;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use crate::core::PropertySummary;
use crate::error::Result;

pub use filter::PropertyFilter;
pub use http::HttpPropertySource;
pub use memory::InMemoryPropertySource;

/// Trait for property listing backends
///
/// Dropping a pending `search` future abandons the request.
#[async_trait]
pub trait PropertySource: Send + Sync {
    /// Fetch candidates matching the coarse filter, never including `filter.exclude_id`
    async fn search(&self, filter: &PropertyFilter) -> Result<Vec<PropertySummary>>;

    /// Get property by ID
    async fn get_by_id(&self, id: &str) -> Result<PropertySummary>;

    /// Get source name
    fn name(&self) -> &str;

    /// Check if source is reachable
    async fn is_available(&self) -> bool;
}
