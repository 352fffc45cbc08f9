use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("risk model {artifact} unavailable: {reason}")]
    ModelUnavailable { artifact: String, reason: String },

    #[error("invalid model artifact: {0}")]
    Artifact(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("feature table has {got} rows, graph has {expected} edges")]
    FeatureTableMismatch { expected: usize, got: usize },

    #[error("inference exceeded {0:?}")]
    UpstreamTimeout(Duration),

    #[error("cancelled by caller")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RiskResult<T> = Result<T, RiskError>;
