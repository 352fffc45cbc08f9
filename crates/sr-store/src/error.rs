//! Error types for sr-store.

use thiserror::Error;

use sr_core::{LocationId, RouteId};

/// Errors that can occur when reading or writing records.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("route {0} not found")]
    RouteNotFound(RouteId),

    #[error("location {0} not found")]
    LocationNotFound(LocationId),

    #[error("invalid route draft: {0}")]
    InvalidDraft(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("store connection lock poisoned")]
    Poisoned,
}

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;
