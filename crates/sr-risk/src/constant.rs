//! A fixed-output risk model.

use sr_core::FeatureRow;

use crate::{RiskModel, RiskResult};

/// A [`RiskModel`] that gives every row the same score.
///
/// Useful as a placeholder in tests or for running the planner before a
/// trained artifact exists: with risk 0 every route type reduces to the
/// shortest path.
pub struct ConstantRiskModel {
    risk: f64,
}

impl ConstantRiskModel {
    /// `risk` is clamped into `[0, 1]`.
    pub fn new(risk: f64) -> Self {
        Self { risk: risk.clamp(0.0, 1.0) }
    }
}

impl RiskModel for ConstantRiskModel {
    fn name(&self) -> &str {
        "constant"
    }

    fn predict_batch(&self, rows: &[FeatureRow]) -> RiskResult<Vec<f64>> {
        Ok(vec![self.risk; rows.len()])
    }
}
