//! Logistic-regression risk model loaded from a JSON artifact.
//!
//! # Artifact format
//!
//! ```json
//! {
//!   "name": "chicago-2024",
//!   "intercept": -1.2,
//!   "coefficients": { "latitude": 0.4, "hour": 0.08 },
//!   "mean":  { "latitude": 41.84, "hour": 11.5 },
//!   "scale": { "latitude": 0.08,  "hour": 6.9 }
//! }
//! ```
//!
//! Keys are column names from [`FEATURE_NAMES`].  A column missing from
//! `coefficients` contributes nothing; missing `mean`/`scale` entries default
//! to 0 and 1.  Unknown column names are rejected so a typo cannot silently
//! drop a feature.
//!
//! Each column is standardized as `(x - mean) / scale` before the linear
//! combination, and the score is `1 / (1 + e^-z)`.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use sr_core::{FEATURE_COUNT, FEATURE_NAMES, FeatureRow};

use crate::{RiskError, RiskModel, RiskResult};

#[derive(Deserialize)]
struct Artifact {
    #[serde(default = "default_name")]
    name:         String,
    intercept:    f64,
    coefficients: FxHashMap<String, f64>,
    #[serde(default)]
    mean:         FxHashMap<String, f64>,
    #[serde(default)]
    scale:        FxHashMap<String, f64>,
}

fn default_name() -> String {
    "logistic".to_owned()
}

/// A fitted logistic-regression classifier over the fixed feature schema.
#[derive(Debug, Clone)]
pub struct LogisticRiskModel {
    name:      String,
    intercept: f64,
    weights:   [f64; FEATURE_COUNT],
    mean:      [f64; FEATURE_COUNT],
    scale:     [f64; FEATURE_COUNT],
}

impl LogisticRiskModel {
    /// Unstandardized model from raw parts.
    pub fn new(name: impl Into<String>, intercept: f64, weights: [f64; FEATURE_COUNT]) -> Self {
        Self {
            name: name.into(),
            intercept,
            weights,
            mean: [0.0; FEATURE_COUNT],
            scale: [1.0; FEATURE_COUNT],
        }
    }

    pub fn from_path(path: &Path) -> RiskResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> RiskResult<Self> {
        let artifact: Artifact = serde_json::from_str(text)?;
        if !artifact.intercept.is_finite() {
            return Err(RiskError::Artifact("intercept is not finite".into()));
        }
        Ok(Self {
            name:      artifact.name,
            intercept: artifact.intercept,
            weights:   columns(&artifact.coefficients, 0.0, "coefficients")?,
            mean:      columns(&artifact.mean, 0.0, "mean")?,
            scale:     nonzero(columns(&artifact.scale, 1.0, "scale")?)?,
        })
    }

    /// Linear predictor `z` for one row.
    pub fn logit(&self, row: &FeatureRow) -> f64 {
        let x = row.to_array();
        let mut z = self.intercept;
        for i in 0..FEATURE_COUNT {
            z += self.weights[i] * (x[i] - self.mean[i]) / self.scale[i];
        }
        z
    }

    pub fn weights(&self) -> &[f64; FEATURE_COUNT] {
        &self.weights
    }
}

impl RiskModel for LogisticRiskModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_batch(&self, rows: &[FeatureRow]) -> RiskResult<Vec<f64>> {
        Ok(rows.iter().map(|r| sigmoid(self.logit(r))).collect())
    }
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Lay a name-keyed map out in column order.
fn columns(
    map: &FxHashMap<String, f64>,
    default: f64,
    what: &str,
) -> RiskResult<[f64; FEATURE_COUNT]> {
    let mut out = [default; FEATURE_COUNT];
    for (key, &value) in map {
        let Some(i) = FEATURE_NAMES.iter().position(|n| *n == key.as_str()) else {
            return Err(RiskError::Artifact(format!("{what}: unknown feature {key:?}")));
        };
        if !value.is_finite() {
            return Err(RiskError::Artifact(format!("{what}: {key} is not finite")));
        }
        out[i] = value;
    }
    Ok(out)
}

fn nonzero(scale: [f64; FEATURE_COUNT]) -> RiskResult<[f64; FEATURE_COUNT]> {
    match scale.iter().position(|&s| s == 0.0) {
        Some(i) => Err(RiskError::Artifact(format!("scale: {} is zero", FEATURE_NAMES[i]))),
        None => Ok(scale),
    }
}
