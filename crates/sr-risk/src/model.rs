//! The `RiskModel` trait: the inference seam of the engine.

use sr_core::FeatureRow;

use crate::{RiskError, RiskResult};

/// A trained classifier mapping feature rows to a risk probability.
///
/// # Contract
///
/// - Input rows follow the column order in [`sr_core::FEATURE_NAMES`].
/// - `predict_batch` returns exactly one score per input row, in input
///   order.  Scores are expected in `[0, 1]`; callers clamp anyway.
///
/// # Thread safety
///
/// One model instance is shared read-only by every in-flight request, so
/// implementations must be `Send + Sync` and must not mutate themselves
/// during inference.
pub trait RiskModel: Send + Sync + 'static {
    /// Short label for logs.
    fn name(&self) -> &str;

    /// Score every row in one call.
    fn predict_batch(&self, rows: &[FeatureRow]) -> RiskResult<Vec<f64>>;

    /// Score a single row.
    ///
    /// Default: a one-row batch.
    fn predict_one(&self, row: &FeatureRow) -> RiskResult<f64> {
        let scores = self.predict_batch(std::slice::from_ref(row))?;
        scores
            .first()
            .copied()
            .ok_or_else(|| RiskError::Inference("model returned no score".into()))
    }
}
