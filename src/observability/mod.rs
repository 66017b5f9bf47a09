pub mod metrics;
pub mod middleware;
pub mod tracing;

pub use metrics::{Metrics, MetricsError};
pub use middleware::RepositoryTracer;
pub use tracing::{
    get_current_trace_id, init_observability, init_observability_from_config,
    shutdown_observability, ObservabilityError,
};
