use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),
    #[error("Failed to encode metrics: {0}")]
    Encoding(String),
}

/// Prometheus metrics for the storefront services
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,

    // Cache metrics
    pub cache_lookups_total: CounterVec,
    pub cache_invalidations_total: CounterVec,
    pub cache_entries: GaugeVec,

    // Repository metrics
    pub repository_operations_total: CounterVec,
    pub repository_operation_duration_seconds: HistogramVec,

    // Batch fetch metrics
    pub batch_fetch_size: HistogramVec,
}

impl Metrics {
    /// Create a new metrics instance with all required metrics registered
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        info!("Initializing Prometheus metrics");

        let cache_lookups_total = CounterVec::new(
            Opts::new(
                "cache_lookups_total",
                "Total number of memoized cache lookups",
            ),
            &["cache", "result"],
        )?;

        let cache_invalidations_total = CounterVec::new(
            Opts::new(
                "cache_invalidations_total",
                "Total number of cache invalidations",
            ),
            &["cache", "scope"],
        )?;

        let cache_entries = GaugeVec::new(
            Opts::new(
                "cache_entries",
                "Approximate number of entries held by a cache",
            ),
            &["cache"],
        )?;

        let repository_operations_total = CounterVec::new(
            Opts::new(
                "repository_operations_total",
                "Total number of data access operations",
            ),
            &["operation", "status"],
        )?;

        let repository_operation_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "repository_operation_duration_seconds",
                "Data access operation duration in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ]),
            &["operation"],
        )?;

        let batch_fetch_size = HistogramVec::new(
            HistogramOpts::new(
                "batch_fetch_size",
                "Number of distinct ids fetched per batch",
            )
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0]),
            &["operation"],
        )?;

        registry.register(Box::new(cache_lookups_total.clone()))?;
        registry.register(Box::new(cache_invalidations_total.clone()))?;
        registry.register(Box::new(cache_entries.clone()))?;
        registry.register(Box::new(repository_operations_total.clone()))?;
        registry.register(Box::new(repository_operation_duration_seconds.clone()))?;
        registry.register(Box::new(batch_fetch_size.clone()))?;

        info!("Prometheus metrics initialized successfully");

        Ok(Metrics {
            registry,
            cache_lookups_total,
            cache_invalidations_total,
            cache_entries,
            repository_operations_total,
            repository_operation_duration_seconds,
            batch_fetch_size,
        })
    }

    /// Encode all metrics in Prometheus text format
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }

    /// Record a cache lookup
    pub fn record_cache_lookup(&self, cache: &str, hit: bool) {
        let result = if hit { "hit" } else { "miss" };

        self.cache_lookups_total
            .with_label_values(&[cache, result])
            .inc();
    }

    /// Record a cache invalidation; `scope` is "key" or "all"
    pub fn record_cache_invalidation(&self, cache: &str, scope: &str) {
        self.cache_invalidations_total
            .with_label_values(&[cache, scope])
            .inc();
    }

    pub fn set_cache_entries(&self, cache: &str, entries: u64) {
        self.cache_entries
            .with_label_values(&[cache])
            .set(entries as f64);
    }

    /// Record data access operation metrics
    pub fn record_repository_operation(
        &self,
        operation: &str,
        success: bool,
        duration_seconds: f64,
    ) {
        let status = if success { "success" } else { "error" };

        self.repository_operations_total
            .with_label_values(&[operation, status])
            .inc();

        self.repository_operation_duration_seconds
            .with_label_values(&[operation])
            .observe(duration_seconds);
    }

    /// Record how many distinct ids a batch fetch issued
    pub fn record_batch_fetch(&self, operation: &str, distinct_ids: usize) {
        self.batch_fetch_size
            .with_label_values(&[operation])
            .observe(distinct_ids as f64);
    }
}
