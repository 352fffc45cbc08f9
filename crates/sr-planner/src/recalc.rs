//! Distance-weighted route risk recalculation.

use std::sync::Arc;

use tracing::debug;

use sr_core::RouteId;
use sr_store::{Route, RouteSegment, RouteStore};

use crate::{PlannerError, PlannerResult};

/// `Σ(distance × risk) / Σ distance` over `segments`.
///
/// `None` for an empty slice; `Some(0.0)` when the total distance is zero.
pub fn distance_weighted_risk(segments: &[RouteSegment]) -> Option<f64> {
    if segments.is_empty() {
        return None;
    }
    let total: f64 = segments.iter().map(|s| s.segment_distance_km).sum();
    if total <= 0.0 {
        return Some(0.0);
    }
    let weighted: f64 = segments
        .iter()
        .map(|s| s.segment_distance_km * s.segment_risk_score)
        .sum();
    Some(weighted / total)
}

/// Recomputes a persisted route's overall risk from its persisted segments.
pub struct RouteRiskRecalculator {
    store: Arc<dyn RouteStore>,
}

impl RouteRiskRecalculator {
    pub fn new(store: Arc<dyn RouteStore>) -> Self {
        Self { store }
    }

    /// Replace `overall_risk_score` with the distance-weighted segment risk.
    ///
    /// A route without segments is returned unchanged.
    pub fn recalculate(&self, route_id: RouteId) -> PlannerResult<Route> {
        let route = self.store.route(route_id)?.ok_or(PlannerError::RouteNotFound(route_id))?;
        let segments = self.store.segments(route_id)?;

        let Some(risk) = distance_weighted_risk(&segments) else {
            debug!(%route_id, "no segments, risk unchanged");
            return Ok(route);
        };
        debug!(%route_id, old = route.overall_risk_score, new = risk, "route risk recalculated");
        Ok(self.store.update_overall_risk(route_id, risk)?)
    }
}
