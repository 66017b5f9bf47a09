use thiserror::Error;

/// Service-level errors surfaced to callers of the browse and cart services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage fault from the data access layer, passed through as-is
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Malformed stored row: {source}")]
    MalformedRow {
        #[source]
        source: ValidationError,
    },

    #[error("Malformed cart contents in cart {cart_id}: {source}")]
    MalformedCartContents {
        cart_id: i64,
        #[source]
        source: serde_json::Error,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Batch fetch failed: {message}")]
    BatchFetch { message: String },
}

/// Repository-level errors for data access operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database connection failed")]
    ConnectionFailed,

    #[error("Timeout occurred during operation")]
    Timeout,

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

/// Validation errors for caller input and stored rows
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredField { field: String },

    #[error("Unexpected field: {field}")]
    UnexpectedField { field: String },

    #[error("Invalid field value: {field}={value}, reason={reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Value out of range: {field}, min={min}, max={max}, value={value}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
        value: String,
    },
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::ValidationError {
            message: err.to_string(),
        }
    }
}

impl ServiceError {
    pub fn malformed_row(source: ValidationError) -> Self {
        ServiceError::MalformedRow { source }
    }

    pub fn malformed_cart_contents(cart_id: i64, source: serde_json::Error) -> Self {
        ServiceError::MalformedCartContents { cart_id, source }
    }

    /// True when the error came straight from the data access layer
    pub fn is_repository_fault(&self) -> bool {
        matches!(self, ServiceError::Repository(_))
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
