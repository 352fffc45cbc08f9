//! Spatial-subsystem error type.

use std::time::Duration;

use thiserror::Error;

use sr_core::{BoundingBox, NodeId};

/// Errors produced by `sr-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("graph has no nodes to snap to")]
    EmptyGraph,

    #[error("cost slice has {got} entries, graph has {expected} edges")]
    CostLengthMismatch { expected: usize, got: usize },

    #[error("road-data source {source_name} unavailable: {reason}")]
    NetworkUnavailable { source_name: String, reason: String },

    #[error("bounding box {bbox} contains no drivable edges")]
    EmptyRegion { bbox: BoundingBox },

    #[error("place {0:?} yielded no drivable edges")]
    EmptyPlace(String),

    #[error("{what} exceeded {after:?}")]
    UpstreamTimeout { what: &'static str, after: Duration },

    #[error("cancelled by caller")]
    Cancelled,

    #[error("road-data source {source_name} does not support {operation}")]
    Unsupported { source_name: String, operation: &'static str },

    #[error("road data parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
