//! `sr-planner` — risk-aware route planning.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`planner`]     | `RoutePlanner`, `RoutePlannerBuilder`, request/response   |
//! | [`materialize`] | `PathMaterializer`, `mean_step_risk`                      |
//! | [`recalc`]      | `RouteRiskRecalculator`, `distance_weighted_risk`         |
//! | [`config`]      | `PlannerConfig` (defaults + `SAFEROUTE_*` overrides)      |
//! | [`error`]       | `PlannerError`, `ErrorKind`, `RequestContext`             |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                               |
//! |------------|------------------------------------------------------|
//! | `overpass` | Forwards to `sr-spatial/overpass` (live fetching).   |
//!
//! # Example
//!
//! ```rust,ignore
//! let planner = RoutePlanner::builder(source, Arc::new(ModelHandle::from_artifact(path)), store)
//!     .config(PlannerConfig::from_env()?)
//!     .build()?;
//! let req = PlanRequest::new(origin, destination, RouteType::Safest, UserId(1));
//! let resp = planner.plan_route(&req, &CancelToken::new())?;
//! ```

pub mod config;
pub mod error;
pub mod materialize;
pub mod planner;
pub mod recalc;

#[cfg(test)]
mod tests;

pub use config::PlannerConfig;
pub use error::{ErrorKind, PlannerError, PlannerResult, RequestContext};
pub use materialize::{PathMaterializer, mean_step_risk};
pub use planner::{
    PlanRequest, PlanResponse, PlanWarning, RouteDetails, RoutePlanner, RoutePlannerBuilder,
};
pub use recalc::{RouteRiskRecalculator, distance_weighted_risk};
