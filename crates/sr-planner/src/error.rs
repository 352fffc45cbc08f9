//! Planner error type and its caller-facing classification.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use sr_core::{CoreError, GeoPoint, RouteId, RouteType};
use sr_risk::RiskError;
use sr_spatial::SpatialError;
use sr_store::StoreError;

/// Coarse failure class, stable across internal error changes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ErrorKind {
    NetworkUnavailable,
    EmptyRegion,
    ModelUnavailable,
    InferenceFailure,
    NoPath,
    UpstreamTimeout,
    PersistenceFailure,
    Cancelled,
    InvalidRequest,
    NotFound,
    Internal,
}

/// What a planning request asked for, attached to every failure it raises.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestContext {
    pub route_type:  RouteType,
    pub origin:      GeoPoint,
    pub destination: GeoPoint,
    pub at:          DateTime<Utc>,
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} route {} -> {} at {}",
            self.route_type,
            self.origin,
            self.destination,
            self.at.format("%Y-%m-%dT%H:%M:%SZ")
        )
    }
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] CoreError),

    #[error("{ctx}: invalid request: {err}")]
    Rejected { ctx: RequestContext, #[source] err: CoreError },

    #[error("invalid configuration: {0}")]
    Config(#[source] CoreError),

    #[error("{ctx}: road network: {err}")]
    Network { ctx: RequestContext, #[source] err: SpatialError },

    #[error("{ctx}: route search: {err}")]
    Search { ctx: RequestContext, #[source] err: SpatialError },

    #[error("{ctx}: risk model: {err}")]
    Risk { ctx: RequestContext, #[source] err: RiskError },

    #[error("{ctx}: persistence: {err}")]
    Persistence { ctx: RequestContext, #[source] err: StoreError },

    #[error("{ctx}: cancelled by caller")]
    Cancelled { ctx: RequestContext },

    #[error("risk scoring: {0}")]
    Scoring(#[source] RiskError),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("route {0} not found")]
    RouteNotFound(RouteId),
}

impl PlannerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlannerError::InvalidRequest(_) | PlannerError::Rejected { .. } => {
                ErrorKind::InvalidRequest
            }
            PlannerError::Config(_) => ErrorKind::Internal,
            PlannerError::Network { err, .. } | PlannerError::Search { err, .. } => spatial_kind(err),
            PlannerError::Risk { err, .. } | PlannerError::Scoring(err) => risk_kind(err),
            PlannerError::Persistence { .. } | PlannerError::Store(_) => ErrorKind::PersistenceFailure,
            PlannerError::Cancelled { .. } => ErrorKind::Cancelled,
            PlannerError::RouteNotFound(_) => ErrorKind::NotFound,
        }
    }

    /// The request this error belongs to, for request-scoped failures.
    pub fn context(&self) -> Option<&RequestContext> {
        match self {
            PlannerError::Rejected { ctx, .. }
            | PlannerError::Network { ctx, .. }
            | PlannerError::Search { ctx, .. }
            | PlannerError::Risk { ctx, .. }
            | PlannerError::Persistence { ctx, .. }
            | PlannerError::Cancelled { ctx } => Some(ctx),
            _ => None,
        }
    }
}

fn spatial_kind(err: &SpatialError) -> ErrorKind {
    match err {
        SpatialError::NetworkUnavailable { .. }
        | SpatialError::Parse(_)
        | SpatialError::Io(_)
        | SpatialError::Unsupported { .. } => ErrorKind::NetworkUnavailable,
        SpatialError::EmptyRegion { .. } | SpatialError::EmptyPlace(_) | SpatialError::EmptyGraph => {
            ErrorKind::EmptyRegion
        }
        SpatialError::UpstreamTimeout { .. } => ErrorKind::UpstreamTimeout,
        SpatialError::Cancelled => ErrorKind::Cancelled,
        SpatialError::NoPath { .. } => ErrorKind::NoPath,
        SpatialError::NodeNotFound(_) | SpatialError::CostLengthMismatch { .. } => ErrorKind::Internal,
    }
}

fn risk_kind(err: &RiskError) -> ErrorKind {
    match err {
        RiskError::ModelUnavailable { .. }
        | RiskError::Artifact(_)
        | RiskError::Io(_)
        | RiskError::Json(_) => ErrorKind::ModelUnavailable,
        RiskError::Inference(_) | RiskError::FeatureTableMismatch { .. } => ErrorKind::InferenceFailure,
        RiskError::UpstreamTimeout(_) => ErrorKind::UpstreamTimeout,
        RiskError::Cancelled => ErrorKind::Cancelled,
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
