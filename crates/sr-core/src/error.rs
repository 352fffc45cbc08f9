//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` where a core
//! validation can fail inside them.

use thiserror::Error;

use crate::GeoPoint;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid time context: hour {hour} (0..=23), day_of_week {day_of_week} (0..=6)")]
    InvalidTimeContext { hour: u8, day_of_week: u8 },

    #[error("coordinate {0} is outside WGS-84 range")]
    InvalidCoordinate(GeoPoint),

    #[error("unknown route type {0:?}: expected \"safest\", \"fastest\", or \"balanced\"")]
    UnknownRouteType(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `sr-core`.
pub type CoreResult<T> = Result<T, CoreError>;
