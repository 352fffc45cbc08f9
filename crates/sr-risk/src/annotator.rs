//! Per-edge risk annotation.
//!
//! # Flow
//!
//! 1. Stamp the request's [`TimeContext`] onto every edge feature row.
//! 2. Call [`RiskModel::predict_batch`] once for the whole edge set, on a
//!    helper thread bounded by the inference timeout.
//! 3. Clamp scores into `[0, 1]` and derive the route-type travel cost.
//!
//! # Failure policy
//!
//! | Outcome                                         | Result                         |
//! |-------------------------------------------------|--------------------------------|
//! | model error, panic, wrong length, NaN/inf score | neutral risk on every edge + warning |
//! | no answer within the timeout                    | `RiskError::UpstreamTimeout`   |
//! | request cancelled while waiting                 | `RiskError::Cancelled`         |

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use sr_core::{CancelToken, EdgeId, FeatureRow, Interrupted, RouteType, TimeContext, run_bounded};
use sr_spatial::{EdgeFeatureRow, RoadGraph};

use crate::{RiskError, RiskModel, RiskResult};

/// Risk substituted on every edge when inference fails.
pub const NEUTRAL_RISK: f64 = 0.5;

// ── EdgeWeights ───────────────────────────────────────────────────────────────

/// Request-scoped risk and search cost, both indexed by `EdgeId`.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeWeights {
    pub risk: Vec<f64>,
    pub cost: Vec<f64>,
}

impl EdgeWeights {
    /// Derive costs from `risk` and the graph's edge lengths.
    pub fn from_risk(graph: &RoadGraph, risk: Vec<f64>, route_type: RouteType) -> Self {
        let cost = graph
            .edge_length_m
            .iter()
            .zip(&risk)
            .map(|(&len, &r)| route_type.travel_cost(len, r))
            .collect();
        Self { risk, cost }
    }

    #[inline]
    pub fn risk(&self, edge: EdgeId) -> f64 {
        self.risk[edge.index()]
    }

    #[inline]
    pub fn cost(&self, edge: EdgeId) -> f64 {
        self.cost[edge.index()]
    }

    pub fn len(&self) -> usize {
        self.risk.len()
    }

    pub fn is_empty(&self) -> bool {
        self.risk.is_empty()
    }
}

/// Weights plus the reason inference fell back, if it did.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub weights: EdgeWeights,
    pub warning: Option<String>,
}

// ── EdgeRiskAnnotator ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EdgeRiskAnnotator {
    inference_timeout: Duration,
    neutral_risk:      f64,
}

impl EdgeRiskAnnotator {
    pub fn new(inference_timeout: Duration) -> Self {
        Self { inference_timeout, neutral_risk: NEUTRAL_RISK }
    }

    /// Override the fallback risk (clamped to `[0, 1]`).
    pub fn with_neutral_risk(mut self, risk: f64) -> Self {
        self.neutral_risk = risk.clamp(0.0, 1.0);
        self
    }

    pub fn inference_timeout(&self) -> Duration {
        self.inference_timeout
    }

    /// Score every edge of `graph` and compute its travel cost.
    ///
    /// `rows` must be the feature table built with `graph` (one row per edge,
    /// in `EdgeId` order).
    pub fn annotate(
        &self,
        graph: &RoadGraph,
        rows: &[EdgeFeatureRow],
        time: TimeContext,
        route_type: RouteType,
        model: &Arc<dyn RiskModel>,
        cancel: &CancelToken,
    ) -> RiskResult<Annotation> {
        let n = graph.edge_count();
        if rows.len() != n {
            return Err(RiskError::FeatureTableMismatch { expected: n, got: rows.len() });
        }
        if n == 0 {
            let weights = EdgeWeights { risk: Vec::new(), cost: Vec::new() };
            return Ok(Annotation { weights, warning: None });
        }

        let batch: Vec<FeatureRow> = rows
            .iter()
            .map(|r| {
                let mut f = r.features;
                f.set_time(time);
                f
            })
            .collect();

        let job_model = Arc::clone(model);
        let outcome = run_bounded("inference", self.inference_timeout, cancel, move || {
            job_model.predict_batch(&batch)
        });

        let scored = match outcome {
            Ok(Ok(scores)) => check_scores(scores, n),
            Ok(Err(e)) => Err(e.to_string()),
            Err(Interrupted::TimedOut(after)) => return Err(RiskError::UpstreamTimeout(after)),
            Err(Interrupted::Cancelled) => return Err(RiskError::Cancelled),
            Err(e @ (Interrupted::Panicked | Interrupted::Spawn(_))) => Err(e.to_string()),
        };

        let (risk, warning) = match scored {
            Ok(risk) => {
                debug!(model = model.name(), edges = n, %time, "edges scored");
                (risk, None)
            }
            Err(reason) => {
                warn!(
                    model = model.name(),
                    edges = n,
                    neutral_risk = self.neutral_risk,
                    %reason,
                    "inference failed, using neutral risk"
                );
                (vec![self.neutral_risk; n], Some(reason))
            }
        };

        Ok(Annotation { weights: EdgeWeights::from_risk(graph, risk, route_type), warning })
    }
}

/// Validate a batch result and clamp it into `[0, 1]`.
fn check_scores(mut scores: Vec<f64>, expected: usize) -> Result<Vec<f64>, String> {
    if scores.len() != expected {
        return Err(format!("model returned {} scores for {expected} edges", scores.len()));
    }
    if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
        return Err(format!("model returned non-finite score {bad}"));
    }
    for s in &mut scores {
        *s = s.clamp(0.0, 1.0);
    }
    Ok(scores)
}
