//! Error types for the catalog engine.

use crate::domain::price::PriceFormatError;
use crate::domain::validator::ValidationErrors;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The call did not finish within the configured bound, or was abandoned.
    #[error("store call did not complete within {0:?}")]
    Timeout(Duration),
}

/// Every outcome a catalog operation can report besides success.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// One or more field rules failed. Carries all of them.
    #[error("failed validation: {0}")]
    ValidationFailed(ValidationErrors),

    #[error(transparent)]
    InvalidFormat(#[from] PriceFormatError),

    #[error("record not found")]
    NotFound,

    /// The row exists but its version moved on since it was read.
    #[error("edit conflict")]
    EditConflict,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::Store(StoreError::Database(e))
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
