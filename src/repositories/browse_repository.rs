use async_trait::async_trait;

use crate::models::{ProductId, RepositoryResult, Row};

/// Data access for catalog browsing and search
#[async_trait]
pub trait BrowseRepository: Send + Sync {
    /// Rows for one category, or the whole catalog when `category` is `None`
    async fn get_browse_items(&self, category: Option<String>) -> RepositoryResult<Vec<Row>>;

    /// Distinct category names
    async fn get_categories(&self) -> RepositoryResult<Vec<String>>;

    /// Up to `limit` featured rows
    async fn get_featured_items(&self, limit: u32) -> RepositoryResult<Vec<Row>>;

    /// Up to `limit` rows matching `query`
    async fn search_items(&self, query: &str, limit: u32) -> RepositoryResult<Vec<Row>>;

    /// A single catalog row, or `None` when the id is unknown or deleted
    async fn get_item(&self, id: ProductId) -> RepositoryResult<Option<Row>>;
}
