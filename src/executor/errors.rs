//! Select error types
//!
//! Error codes:
//! - SELECT_ACQUISITION_FAILED
//! - SELECT_PRIMARY_QUERY_FAILED
//! - SELECT_DESCENDANT_QUERY_FAILED
//! - SELECT_MALFORMED_RECORD
//!
//! Store errors propagate unchanged as the error source. There is no local
//! recovery and no partial result.

use std::fmt;

use crate::store::StoreError;

/// Select error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectErrorCode {
    /// The store handle could not be obtained
    AcquisitionFailed,
    /// The main search query failed
    PrimaryQueryFailed,
    /// The tree-expansion query failed
    DescendantQueryFailed,
    /// A record needed for tree reconstruction has no usable skeleton
    MalformedRecord,
}

impl SelectErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SelectErrorCode::AcquisitionFailed => "SELECT_ACQUISITION_FAILED",
            SelectErrorCode::PrimaryQueryFailed => "SELECT_PRIMARY_QUERY_FAILED",
            SelectErrorCode::DescendantQueryFailed => "SELECT_DESCENDANT_QUERY_FAILED",
            SelectErrorCode::MalformedRecord => "SELECT_MALFORMED_RECORD",
        }
    }

    /// Returns the pipeline stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            SelectErrorCode::AcquisitionFailed => "acquire",
            SelectErrorCode::PrimaryQueryFailed => "primary",
            SelectErrorCode::DescendantQueryFailed => "descendants",
            SelectErrorCode::MalformedRecord => "link",
        }
    }
}

impl fmt::Display for SelectErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Select error with the underlying store error as source
#[derive(Debug, Clone)]
pub struct SelectError {
    code: SelectErrorCode,
    message: String,
    source: Option<StoreError>,
}

impl SelectError {
    /// Create an acquisition failure
    pub fn acquisition_failed(source: StoreError) -> Self {
        Self::from_store(SelectErrorCode::AcquisitionFailed, source)
    }

    /// Create a primary query failure
    pub fn primary_query_failed(source: StoreError) -> Self {
        Self::from_store(SelectErrorCode::PrimaryQueryFailed, source)
    }

    /// Create a descendant query failure
    pub fn descendant_query_failed(source: StoreError) -> Self {
        Self::from_store(SelectErrorCode::DescendantQueryFailed, source)
    }

    /// Create a malformed record error
    pub fn malformed_record(reason: impl Into<String>) -> Self {
        Self {
            code: SelectErrorCode::MalformedRecord,
            message: reason.into(),
            source: None,
        }
    }

    fn from_store(code: SelectErrorCode, source: StoreError) -> Self {
        Self {
            code,
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SelectErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the store error, if the store reported one
    pub fn store_error(&self) -> Option<&StoreError> {
        self.source.as_ref()
    }
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SelectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for select operations
pub type SelectResult<T> = Result<T, SelectError>;
