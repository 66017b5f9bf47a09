pub mod cache;
pub mod config;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;

pub use cache::MemoCache;
pub use config::{BrowseConfig, CacheConfig, Config, ConfigError, ObservabilityConfig};
pub use observability::{
    init_observability, init_observability_from_config, shutdown_observability, Metrics,
};
pub use services::{BrowseService, CartService};
