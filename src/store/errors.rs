//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a store handle or driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed document: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Short code for logs
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Unavailable(_) => "STORE_UNAVAILABLE",
            StoreError::Query(_) => "STORE_QUERY",
            StoreError::Decode(_) => "STORE_DECODE",
            StoreError::Internal(_) => "STORE_INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StoreError::Query("socket closed".into());
        assert_eq!(err.to_string(), "Query failed: socket closed");
        assert_eq!(err.code(), "STORE_QUERY");
    }
}
