use async_trait::async_trait;

use crate::models::{Product, ProductId, RepositoryResult};

/// Lookup of product records by id
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// The product, or `None` when it no longer exists
    async fn get_product(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
}
