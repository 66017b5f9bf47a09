use std::sync::Arc;
use tracing::instrument;

use crate::cache::MemoCache;
use crate::config::{BrowseConfig, CacheConfig};
use crate::models::{
    validate_search_query, BrowseItem, FromRow, ProductId, Row, ServiceError, ServiceResult,
};
use crate::observability::{Metrics, RepositoryTracer};
use crate::repositories::BrowseRepository;
use crate::services::fetch_distinct;

/// Catalog browsing and search with memoized item and category reads
pub struct BrowseService {
    repository: Arc<dyn BrowseRepository>,
    tracer: RepositoryTracer,
    items_cache: MemoCache<Option<String>, Vec<BrowseItem>>,
    categories_cache: MemoCache<(), Vec<String>>,
    featured_limit: u32,
    search_limit: u32,
}

impl BrowseService {
    pub fn new(repository: Arc<dyn BrowseRepository>, cache_config: &CacheConfig) -> Self {
        let defaults = BrowseConfig::default();

        Self {
            repository,
            tracer: RepositoryTracer::default(),
            items_cache: MemoCache::new("browse_items", cache_config.browse_items_capacity),
            categories_cache: MemoCache::new("categories", cache_config.categories_capacity),
            featured_limit: defaults.featured_limit,
            search_limit: defaults.search_limit,
        }
    }

    /// Attach Prometheus metrics to the caches and repository calls
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.tracer = RepositoryTracer::new(Some(metrics.clone()));
        self.items_cache = self.items_cache.with_metrics(metrics.clone());
        self.categories_cache = self.categories_cache.with_metrics(metrics);
        self
    }

    /// Override the limits used when callers pass none
    pub fn with_defaults(mut self, featured_limit: u32, search_limit: u32) -> Self {
        self.featured_limit = featured_limit;
        self.search_limit = search_limit;
        self
    }

    /// Items in `category`, or the whole catalog when `category` is `None`
    #[instrument(skip(self), fields(category = ?category))]
    pub async fn get_items(&self, category: Option<&str>) -> ServiceResult<Vec<BrowseItem>> {
        let key = category.map(str::to_owned);

        self.items_cache
            .get_or_try_load(key.clone(), || async move {
                crate::info_with_trace!("Loading browse items from repository");

                let rows = self
                    .tracer
                    .trace_operation("get_browse_items", self.repository.get_browse_items(key))
                    .await?;

                map_rows(rows)
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> ServiceResult<Vec<String>> {
        self.categories_cache
            .get_or_try_load((), || async move {
                crate::info_with_trace!("Loading categories from repository");

                let categories = self
                    .tracer
                    .trace_operation("get_categories", self.repository.get_categories())
                    .await?;

                Ok(categories)
            })
            .await
    }

    #[instrument(skip(self), fields(limit = ?limit))]
    pub async fn get_featured_items(&self, limit: Option<u32>) -> ServiceResult<Vec<BrowseItem>> {
        let limit = limit.unwrap_or(self.featured_limit);

        let rows = self
            .tracer
            .trace_operation(
                "get_featured_items",
                self.repository.get_featured_items(limit),
            )
            .await?;

        map_rows(rows)
    }

    #[instrument(skip(self), fields(query = %query, limit = ?limit))]
    pub async fn search_items(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<BrowseItem>> {
        let limit = limit.unwrap_or(self.search_limit);
        validate_search_query(query)?;

        let rows = self
            .tracer
            .trace_operation("search_items", self.repository.search_items(query, limit))
            .await?;

        let items = map_rows(rows)?;
        crate::info_with_trace!(results = items.len(), "Search completed");

        Ok(items)
    }

    /// Fetch each distinct id once, concurrently.
    ///
    /// Unknown ids are dropped. Items come back in the order the fetches
    /// complete, not the order of `item_ids`.
    #[instrument(skip(self, item_ids), fields(requested = item_ids.len()))]
    pub async fn batch_get_items(&self, item_ids: &[ProductId]) -> ServiceResult<Vec<BrowseItem>> {
        let repository = self.repository.clone();
        let tracer = self.tracer.clone();
        let metrics = self.tracer.metrics().map(|metrics| &**metrics);

        fetch_distinct("batch_get_items", item_ids.iter().copied(), metrics, move |id| {
            let repository = repository.clone();
            let tracer = tracer.clone();

            async move {
                let row = tracer
                    .trace_operation("get_item", repository.get_item(id))
                    .await?;

                row.map(BrowseItem::from_row)
                    .transpose()
                    .map_err(ServiceError::malformed_row)
            }
        })
        .await
    }

    /// Evict the memoized `get_items` result for one category
    pub async fn invalidate_items(&self, category: Option<&str>) {
        self.items_cache
            .invalidate(&category.map(str::to_owned))
            .await;
    }

    /// Evict every memoized item and category read
    pub fn clear_cache(&self) {
        self.items_cache.invalidate_all();
        self.categories_cache.invalidate_all();
        crate::info_with_trace!("Browse caches cleared");
    }
}

fn map_rows(rows: Vec<Row>) -> ServiceResult<Vec<BrowseItem>> {
    rows.into_iter()
        .map(BrowseItem::from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ServiceError::malformed_row)
}
