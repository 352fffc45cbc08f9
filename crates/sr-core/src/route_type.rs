//! Route-preference mode and the edge cost formula it selects.
//!
//! | Mode       | Cost                          |
//! |------------|-------------------------------|
//! | `safest`   | `length * (1 + risk * 20)`    |
//! | `balanced` | `length * (1 + risk * 5)`     |
//! | `fastest`  | `length`                      |
//!
//! For any fixed risk ≥ 0 the multipliers keep
//! `cost(safest) ≥ cost(balanced) ≥ cost(fastest)`.

use std::str::FromStr;

use crate::CoreError;

/// How strongly the search penalises risky road segments.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RouteType {
    /// Risk dominates: a 0.9-risk edge costs 19× its length.
    #[default]
    Safest,
    /// Physical length only; risk is ignored.
    Fastest,
    /// Moderate risk penalty.
    Balanced,
}

impl RouteType {
    pub const ALL: [RouteType; 3] = [RouteType::Safest, RouteType::Fastest, RouteType::Balanced];

    /// Coefficient applied to risk in the cost formula.
    #[inline]
    pub fn risk_multiplier(self) -> f64 {
        match self {
            RouteType::Safest   => 20.0,
            RouteType::Balanced => 5.0,
            RouteType::Fastest  => 0.0,
        }
    }

    /// Search cost of an edge of `length_m` metres with the given risk.
    #[inline]
    pub fn travel_cost(self, length_m: f64, risk: f64) -> f64 {
        match self {
            RouteType::Fastest => length_m,
            _ => length_m * (1.0 + risk * self.risk_multiplier()),
        }
    }

    /// Lowercase label, also the persisted column value.
    pub fn as_str(self) -> &'static str {
        match self {
            RouteType::Safest   => "safest",
            RouteType::Fastest  => "fastest",
            RouteType::Balanced => "balanced",
        }
    }
}

impl std::fmt::Display for RouteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safest"   => Ok(RouteType::Safest),
            "fastest"  => Ok(RouteType::Fastest),
            "balanced" => Ok(RouteType::Balanced),
            other      => Err(CoreError::UnknownRouteType(other.to_owned())),
        }
    }
}
