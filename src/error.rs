//! Error types for the storage facades
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Storage Error Enum ==
/// Unified error type for backing stores and facades.
///
/// Facades never let these escape a read or write call; they are turned into
/// `false`, a status-400 outcome or a status string depending on the entry point.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backing store cannot be accessed
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Write would exceed the store's byte quota
    #[error("Quota exceeded: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Value could not be encoded or decoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying file operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Returns true for the quota-exceeded condition.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

// == Result Type Alias ==
/// Convenience Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
