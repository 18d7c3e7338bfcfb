use thiserror::Error;

use gasdepot_core::DomainError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// Domain failures (validation, missing references) pass through unchanged;
/// `Storage` covers transaction and connectivity faults, which are always
/// fatal to the current operation and always follow a full rollback.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage failure in {operation}: {message}")]
    Storage { operation: String, message: String },
}

impl StoreError {
    pub fn storage(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a user-visible rejection (as opposed to an
    /// infrastructure fault).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Domain(_))
    }
}
