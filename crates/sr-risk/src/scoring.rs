//! Single-point risk scoring.

use sr_core::{FeatureRow, GeoPoint, TimeContext};

use crate::{RiskError, RiskModel, RiskResult};

/// Score one coordinate at one time under the placeholder feature contract.
///
/// The result is clamped into `[0, 1]`.  A non-finite model output is an
/// [`RiskError::Inference`]; there is no neutral fallback for a single
/// point because the caller asked for this one number.
pub fn score_point(model: &dyn RiskModel, point: GeoPoint, time: TimeContext) -> RiskResult<f64> {
    let row = FeatureRow::placeholder(point, time);
    let score = model.predict_one(&row)?;
    if !score.is_finite() {
        return Err(RiskError::Inference(format!("non-finite score {score} for {point}")));
    }
    Ok(score.clamp(0.0, 1.0))
}
