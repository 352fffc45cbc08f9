//! Turning a node path into a persistable route draft.
//!
//! # Per-step values
//!
//! For each consecutive node pair `path[i] → path[i+1]`:
//!
//! - **risk** is the risk of the cheapest parallel edge under the request's
//!   travel cost, i.e. the edge the search actually used;
//! - **distance** is the flat-earth approximation
//!   `sqrt(Δlat² + Δlon²) × km_per_degree`;
//! - **duration** is `distance / speed_kmh` in minutes.
//!
//! The last node contributes no step.  A one-node path produces a draft with
//! one waypoint, no segments, and zero totals.

use sr_core::GeoPoint;
use sr_risk::EdgeWeights;
use sr_spatial::{NodePath, RoadGraph};
use sr_store::{RouteDraft, SegmentDraft};

use crate::PlanRequest;

/// Mean of the per-step risks over `len - 1` steps (`1` for a one-node path).
///
/// This is the overall risk stored when a route is created.  It is not the
/// distance-weighted figure produced by
/// [`distance_weighted_risk`](crate::recalc::distance_weighted_risk).
pub fn mean_step_risk(step_risks: &[f64], path_len: usize) -> f64 {
    let count = path_len.saturating_sub(1).max(1);
    let mean = step_risks.iter().sum::<f64>() / count as f64;
    mean.clamp(0.0, 1.0)
}

#[derive(Clone, Debug)]
pub struct PathMaterializer {
    speed_kmh:     f64,
    km_per_degree: f64,
}

impl PathMaterializer {
    pub fn new(speed_kmh: f64, km_per_degree: f64) -> Self {
        Self { speed_kmh, km_per_degree }
    }

    /// Risk of each step of `path`.
    pub fn step_risks(&self, path: &NodePath, graph: &RoadGraph, weights: &EdgeWeights) -> Vec<f64> {
        path.nodes
            .windows(2)
            .map(|w| {
                graph
                    .cheapest_edge(w[0], w[1], &weights.cost)
                    .map_or(0.0, |e| weights.risk(e))
            })
            .collect()
    }

    pub fn materialize(
        &self,
        request: &PlanRequest,
        path: &NodePath,
        graph: &RoadGraph,
        weights: &EdgeWeights,
    ) -> RouteDraft {
        let waypoints: Vec<GeoPoint> = path.nodes.iter().map(|&n| graph.position(n)).collect();
        let risks = self.step_risks(path, graph, weights);

        let mut segments = Vec::with_capacity(risks.len());
        let mut total_km = 0.0;
        for (i, &risk) in risks.iter().enumerate() {
            let distance_km = waypoints[i].flat_distance_km(waypoints[i + 1], self.km_per_degree);
            let duration_min = distance_km / self.speed_kmh * 60.0;
            total_km += distance_km;
            segments.push(SegmentDraft {
                start: i,
                end: i + 1,
                sequence_order: i as u32,
                distance_km,
                duration_min,
                risk_score: risk,
            });
        }

        RouteDraft {
            user_id:                request.user_id,
            route_type:             request.route_type,
            origin:                 request.origin,
            destination:            request.destination,
            overall_risk_score:     mean_step_risk(&risks, waypoints.len()),
            waypoints,
            segments,
            total_distance_km:      total_km,
            estimated_duration_min: total_km / self.speed_kmh * 60.0,
        }
    }
}

impl Default for PathMaterializer {
    fn default() -> Self {
        Self::new(30.0, sr_core::KM_PER_DEGREE)
    }
}
