//! Knowledge base error types.

use bucket_store::StoreError;
use thiserror::Error;

/// Every way a command can fail. The processor turns each of these into a
/// reply; none of them is fatal.
#[derive(Debug, Error)]
pub enum KbError {
    #[error("couldn't find {0}")]
    NotFound(String),

    #[error("{0} already created")]
    AlreadyExists(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl KbError {
    pub fn invalid(message: impl Into<String>) -> Self {
        KbError::InvalidOperation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        KbError::NotFound(what.into())
    }
}

pub type Result<T> = std::result::Result<T, KbError>;
