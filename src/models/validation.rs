use super::{ValidationError, ValidationResult};

/// Longest free-text search query forwarded to the repository
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;

/// Validate a free-text search query. Blank queries are passed through.
pub fn validate_search_query(query: &str) -> ValidationResult<()> {
    if query.len() > MAX_SEARCH_QUERY_LENGTH {
        return Err(ValidationError::OutOfRange {
            field: "query_length".to_string(),
            min: "0".to_string(),
            max: MAX_SEARCH_QUERY_LENGTH.to_string(),
            value: query.len().to_string(),
        });
    }

    Ok(())
}
