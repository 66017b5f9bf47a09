use std::{future::Future, sync::Arc, time::Instant};
use tracing::{debug, error, Instrument};

use super::Metrics;

/// Wraps data access calls in a span and records their outcome
#[derive(Clone, Default)]
pub struct RepositoryTracer {
    metrics: Option<Arc<Metrics>>,
}

impl RepositoryTracer {
    pub fn new(metrics: Option<Arc<Metrics>>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> Option<&Arc<Metrics>> {
        self.metrics.as_ref()
    }

    /// Trace a data access operation with automatic metrics recording.
    ///
    /// The operation's result is returned untouched.
    pub async fn trace_operation<F, T, E>(&self, operation: &str, future: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let span = tracing::debug_span!(
            "repository",
            "db.operation" = operation,
            "otel.kind" = "client",
            "otel.name" = %format!("repository.{}", operation),
        );

        async move {
            let start_time = Instant::now();

            let result = future.await;
            let duration_seconds = start_time.elapsed().as_secs_f64();

            if let Some(metrics) = &self.metrics {
                metrics.record_repository_operation(operation, result.is_ok(), duration_seconds);
            }

            match &result {
                Ok(_) => debug!(
                    duration_ms = start_time.elapsed().as_millis(),
                    "Repository operation completed"
                ),
                Err(error) => error!(
                    error = %error,
                    duration_ms = start_time.elapsed().as_millis(),
                    "Repository operation failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}
