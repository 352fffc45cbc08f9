//! `sr-core` — foundational types for the saferoute risk-aware planner.
//!
//! This crate is a dependency of every other `sr-*` crate and has no `sr-*`
//! dependencies of its own.
//!
//! # What lives here
//!
//! | Module         | Contents                                               |
//! |----------------|--------------------------------------------------------|
//! | [`ids`]        | `NodeId`, `EdgeId`, and persisted record ids           |
//! | [`geo`]        | `GeoPoint`, `BoundingBox`, distance helpers            |
//! | [`time`]       | `TimeContext` (hour, day of week)                      |
//! | [`route_type`] | `RouteType` and the risk-weighted cost formula         |
//! | [`features`]   | `FeatureRow`, the fixed risk-model input schema        |
//! | [`cancel`]     | `CancelToken`                                          |
//! | [`deadline`]   | `run_bounded` for timeout-limited upstream calls       |
//! | [`backoff`]    | `Backoff` for retrying upstream calls                  |
//! | [`error`]      | `CoreError`, `CoreResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod backoff;
pub mod cancel;
pub mod deadline;
pub mod error;
pub mod features;
pub mod geo;
pub mod ids;
pub mod route_type;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use backoff::Backoff;
pub use cancel::CancelToken;
pub use deadline::{Interrupted, run_bounded};
pub use error::{CoreError, CoreResult};
pub use features::{FEATURE_COUNT, FEATURE_NAMES, FeatureRow};
pub use geo::{BoundingBox, GeoPoint, KM_PER_DEGREE};
pub use ids::{EdgeId, LocationId, NodeId, RouteId, SegmentId, UserId};
pub use route_type::RouteType;
pub use time::TimeContext;
