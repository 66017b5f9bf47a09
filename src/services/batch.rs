use std::collections::HashSet;
use std::future::Future;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::models::{ProductId, ServiceError, ServiceResult};
use crate::observability::Metrics;

/// Deduplicate ids, keeping the first occurrence of each
pub fn distinct_ids(ids: impl IntoIterator<Item = ProductId>) -> Vec<ProductId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn describe_missing(ids: &[ProductId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Fetch every distinct id concurrently and collect what was found.
///
/// Results come back in completion order. Ids that resolve to `None` are
/// dropped. The first failing fetch aborts the rest of the batch and its
/// error is returned.
pub async fn fetch_distinct<T, F, Fut>(
    operation: &'static str,
    ids: impl IntoIterator<Item = ProductId>,
    metrics: Option<&Metrics>,
    fetch: F,
) -> ServiceResult<Vec<T>>
where
    T: Send + 'static,
    F: Fn(ProductId) -> Fut,
    Fut: Future<Output = ServiceResult<Option<T>>> + Send + 'static,
{
    let ids = distinct_ids(ids);
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    if let Some(metrics) = metrics {
        metrics.record_batch_fetch(operation, ids.len());
    }
    crate::debug_with_trace!(operation, distinct_ids = ids.len(), "Starting batch fetch");

    let mut join_set = JoinSet::new();
    for id in ids.iter().copied() {
        let fetch_one = fetch(id);
        join_set.spawn(async move { (id, fetch_one.await) }.in_current_span());
    }

    let mut found = Vec::with_capacity(ids.len());
    let mut missing = Vec::new();

    // Returning early drops the JoinSet, which aborts the remaining fetches
    while let Some(joined) = join_set.join_next().await {
        let (id, result) = joined.map_err(|e| ServiceError::BatchFetch {
            message: format!("{} task failed: {}", operation, e),
        })?;

        match result? {
            Some(value) => found.push(value),
            None => missing.push(id),
        }
    }

    if !missing.is_empty() {
        crate::debug_with_trace!(
            operation,
            missing = %describe_missing(&missing),
            "Dropped ids that resolved to nothing"
        );
    }

    Ok(found)
}
