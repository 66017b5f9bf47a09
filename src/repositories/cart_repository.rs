use async_trait::async_trait;

use crate::models::{ProductId, RepositoryResult, Row};

/// Data access for stored cart rows
///
/// Each row carries `id`, `username`, `cost` and a `contents` field holding a
/// JSON-encoded list of product ids. Whether repeated additions of the same
/// product are deduplicated is up to the implementation.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// All cart rows stored for a user
    async fn get_cart(&self, username: &str) -> RepositoryResult<Vec<Row>>;

    /// Record a product in the user's cart
    async fn add_to_cart(&self, username: &str, product_id: ProductId) -> RepositoryResult<()>;

    /// Remove a product from the user's cart
    async fn remove_from_cart(&self, username: &str, product_id: ProductId)
        -> RepositoryResult<()>;

    /// Delete every cart row for a user
    async fn delete_cart(&self, username: &str) -> RepositoryResult<()>;
}
