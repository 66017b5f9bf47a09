use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::instrument;

use crate::cache::MemoCache;
use crate::config::CacheConfig;
use crate::models::{
    Cart, CartEntry, CartRow, FromRow, Product, ProductId, ServiceError, ServiceResult,
};
use crate::observability::{Metrics, RepositoryTracer};
use crate::repositories::{CartRepository, ProductRepository};
use crate::services::fetch_distinct;

/// Cart reads memoized per user, invalidated by every cart mutation
pub struct CartService {
    cart_repository: Arc<dyn CartRepository>,
    product_repository: Arc<dyn ProductRepository>,
    tracer: RepositoryTracer,
    cart_cache: MemoCache<String, Vec<Product>>,
}

impl CartService {
    pub fn new(
        cart_repository: Arc<dyn CartRepository>,
        product_repository: Arc<dyn ProductRepository>,
        cache_config: &CacheConfig,
    ) -> Self {
        Self {
            cart_repository,
            product_repository,
            tracer: RepositoryTracer::default(),
            cart_cache: MemoCache::new("cart", cache_config.cart_capacity),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.tracer = RepositoryTracer::new(Some(metrics.clone()));
        self.cart_cache = self.cart_cache.with_metrics(metrics);
        self
    }

    /// Every distinct product referenced by any of the user's cart rows.
    ///
    /// Row boundaries are not kept; use [`CartService::get_carts`] for the
    /// per-row view. Products stored inline come first, then the ones looked
    /// up by id. Ids that no longer exist are dropped.
    #[instrument(skip(self), fields(username = %username))]
    pub async fn get_cart(&self, username: &str) -> ServiceResult<Vec<Product>> {
        self.cart_cache
            .get_or_try_load(username.to_string(), || async move {
                crate::info_with_trace!("Loading cart from repository");

                let rows = self.load_rows(username).await?;
                if rows.is_empty() {
                    return Ok(Vec::new());
                }

                let mut products = Vec::new();
                let mut product_ids = Vec::new();
                for row in &rows {
                    for entry in row.entries()? {
                        match entry {
                            CartEntry::Id(id) => product_ids.push(id),
                            CartEntry::Record(record) => products.push(
                                Product::from_row(record).map_err(ServiceError::malformed_row)?,
                            ),
                        }
                    }
                }

                let mut seen: HashSet<ProductId> = HashSet::new();
                products.retain(|product| seen.insert(product.id));
                product_ids.retain(|id| !seen.contains(id));

                products.extend(self.fetch_products(product_ids).await?);
                Ok(products)
            })
            .await
    }

    /// One assembled [`Cart`] per stored row, products fetched once across all rows
    #[instrument(skip(self), fields(username = %username))]
    pub async fn get_carts(&self, username: &str) -> ServiceResult<Vec<Cart>> {
        let rows = self.load_rows(username).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut product_ids = Vec::new();
        for row in &rows {
            product_ids.extend(row.product_ids()?);
        }

        let products: HashMap<ProductId, Product> = self
            .fetch_products(product_ids)
            .await?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        rows.into_iter()
            .map(|row| Cart::load(row, &products))
            .collect()
    }

    #[instrument(skip(self), fields(username = %username, product_id = product_id))]
    pub async fn add_to_cart(&self, username: &str, product_id: ProductId) -> ServiceResult<()> {
        self.tracer
            .trace_operation(
                "add_to_cart",
                self.cart_repository.add_to_cart(username, product_id),
            )
            .await?;

        self.cart_cache.invalidate_all();
        crate::info_with_trace!("Product added to cart");

        Ok(())
    }

    #[instrument(skip(self), fields(username = %username, product_id = product_id))]
    pub async fn remove_from_cart(
        &self,
        username: &str,
        product_id: ProductId,
    ) -> ServiceResult<()> {
        self.tracer
            .trace_operation(
                "remove_from_cart",
                self.cart_repository.remove_from_cart(username, product_id),
            )
            .await?;

        self.cart_cache.invalidate_all();
        crate::info_with_trace!("Product removed from cart");

        Ok(())
    }

    #[instrument(skip(self), fields(username = %username))]
    pub async fn delete_cart(&self, username: &str) -> ServiceResult<()> {
        self.tracer
            .trace_operation("delete_cart", self.cart_repository.delete_cart(username))
            .await?;

        self.cart_cache.invalidate_all();
        crate::info_with_trace!("Cart deleted");

        Ok(())
    }

    /// Evict every memoized cart, for writes made outside this service
    pub fn clear_cache(&self) {
        self.cart_cache.invalidate_all();
        crate::info_with_trace!("Cart cache cleared");
    }

    async fn load_rows(&self, username: &str) -> ServiceResult<Vec<CartRow>> {
        let rows = self
            .tracer
            .trace_operation("get_cart", self.cart_repository.get_cart(username))
            .await?;

        rows.into_iter()
            .map(CartRow::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::malformed_row)
    }

    async fn fetch_products(&self, product_ids: Vec<ProductId>) -> ServiceResult<Vec<Product>> {
        let repository = self.product_repository.clone();
        let tracer = self.tracer.clone();
        let metrics = self.tracer.metrics().map(|metrics| &**metrics);

        fetch_distinct("get_cart_products", product_ids, metrics, move |id| {
            let repository = repository.clone();
            let tracer = tracer.clone();

            async move {
                tracer
                    .trace_operation("get_product", repository.get_product(id))
                    .await
                    .map_err(ServiceError::from)
            }
        })
        .await
    }
}
