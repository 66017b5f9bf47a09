use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};


/// Environment variable prefix, e.g. `STOREFRONT_CACHE__CART_CAPACITY`
pub const ENV_PREFIX: &str = "STOREFRONT";

/// Separates a section from its key, e.g. `CACHE__CART_CAPACITY` is `cache.cart_capacity`
pub const ENV_SECTION_SEPARATOR: &str = "__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Capacities of the memoization caches owned by the services
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_browse_items_capacity")]
    pub browse_items_capacity: u64,
    #[serde(default = "default_categories_capacity")]
    pub categories_capacity: u64,
    #[serde(default = "default_cart_capacity")]
    pub cart_capacity: u64,
}

/// Result limits applied when callers don't pass one
#[derive(Debug, Clone, Deserialize)]
pub struct BrowseConfig {
    #[serde(default = "default_featured_limit")]
    pub featured_limit: u32,
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_enable_json_logging")]
    pub enable_json_logging: bool,
}

impl Config {
    /// Load configuration from `STOREFRONT_<SECTION>__<KEY>` environment variables
    pub fn from_environment() -> Result<Self, ConfigError> {
        info!("Loading configuration from environment");
        Self::from_source(environment())
    }

    /// Load configuration from an explicit environment source
    pub fn from_source(environment: config::Environment) -> Result<Self, ConfigError> {
        let config: Config = config::Config::builder()
            .add_source(environment)
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| ConfigError::LoadError {
                message: format!("Failed to load settings: {}", e),
            })?;

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!("Configuration: {:?}", config);

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()?;
        self.browse.validate()?;

        if self.observability.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Service name cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, capacity) in [
            ("browse_items_capacity", self.browse_items_capacity),
            ("categories_capacity", self.categories_capacity),
            ("cart_capacity", self.cart_capacity),
        ] {
            if capacity == 0 {
                return Err(ConfigError::ValidationError {
                    message: format!("{} cannot be 0", name),
                });
            }
        }

        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            browse_items_capacity: default_browse_items_capacity(),
            categories_capacity: default_categories_capacity(),
            cart_capacity: default_cart_capacity(),
        }
    }
}

impl BrowseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, limit) in [
            ("featured_limit", self.featured_limit),
            ("search_limit", self.search_limit),
        ] {
            if limit == 0 {
                return Err(ConfigError::ValidationError {
                    message: format!("{} cannot be 0", name),
                });
            }
        }

        Ok(())
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            featured_limit: default_featured_limit(),
            search_limit: default_search_limit(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_version: default_service_version(),
            otlp_endpoint: None,
            log_level: default_log_level(),
            enable_json_logging: default_enable_json_logging(),
        }
    }
}

/// The `STOREFRONT_*` environment source with nested sections
pub fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator(ENV_SECTION_SEPARATOR)
}

// Default value functions
pub(crate) fn default_browse_items_capacity() -> u64 {
    2000
}

pub(crate) fn default_categories_capacity() -> u64 {
    100
}

pub(crate) fn default_cart_capacity() -> u64 {
    1000
}

pub(crate) fn default_featured_limit() -> u32 {
    10
}

pub(crate) fn default_search_limit() -> u32 {
    50
}

pub(crate) fn default_service_name() -> String {
    "storefront-rs".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn default_enable_json_logging() -> bool {
    false
}
