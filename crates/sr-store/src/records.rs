//! Persisted record types and the drafts they are created from.
//!
//! Records carry database ids and are only produced by a [`RouteStore`];
//! drafts are plain values built by the planner and handed to
//! [`RouteStore::commit_route`] in one piece.
//!
//! [`RouteStore`]: crate::RouteStore
//! [`RouteStore::commit_route`]: crate::RouteStore::commit_route

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sr_core::{GeoPoint, LocationId, RouteId, RouteType, SegmentId, UserId};

use crate::StoreError;

// ── Location ──────────────────────────────────────────────────────────────────

/// Role a location was first created in.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Origin,
    Destination,
    Waypoint,
}

impl LocationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationKind::Origin      => "origin",
            LocationKind::Destination => "destination",
            LocationKind::Waypoint    => "waypoint",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "origin"      => Ok(LocationKind::Origin),
            "destination" => Ok(LocationKind::Destination),
            "waypoint"    => Ok(LocationKind::Waypoint),
            other         => Err(StoreError::Corrupt(format!("unknown location kind {other:?}"))),
        }
    }
}

/// A geographic point known to the store.
///
/// Identity is the exact `(latitude, longitude)` pair.  Apart from
/// `risk_score`, a location never changes after creation; in particular the
/// `kind` stays whatever the first caller asked for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id:         LocationId,
    pub latitude:   f64,
    pub longitude:  f64,
    pub kind:       LocationKind,
    pub risk_score: Option<f64>,
}

impl Location {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id:                     RouteId,
    pub user_id:                UserId,
    pub origin:                 LocationId,
    pub destination:            LocationId,
    pub total_distance_km:      f64,
    pub estimated_duration_min: f64,
    /// Mean step risk at creation; distance-weighted after a recalculation.
    pub overall_risk_score:     f64,
    pub route_type:             RouteType,
    pub created_at:             DateTime<Utc>,
}

/// One hop of a route.  Segments of a route are numbered from 0 and chain:
/// `segments[i + 1].start_location == segments[i].end_location`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub id:                   SegmentId,
    pub route_id:             RouteId,
    pub start_location:       LocationId,
    pub end_location:         LocationId,
    pub sequence_order:       u32,
    pub segment_distance_km:  f64,
    pub segment_duration_min: f64,
    pub segment_risk_score:   f64,
}

/// Everything written by one [`commit_route`](crate::RouteStore::commit_route).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedRoute {
    pub route:       Route,
    pub origin:      Location,
    pub destination: Location,
    /// One per path node, in path order.
    pub waypoints:   Vec<Location>,
    pub segments:    Vec<RouteSegment>,
}

// ── Drafts ────────────────────────────────────────────────────────────────────

/// A route ready to be persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteDraft {
    pub user_id:                UserId,
    pub route_type:             RouteType,
    pub origin:                 GeoPoint,
    pub destination:            GeoPoint,
    /// Path node coordinates in order.
    pub waypoints:              Vec<GeoPoint>,
    pub segments:               Vec<SegmentDraft>,
    pub total_distance_km:      f64,
    pub estimated_duration_min: f64,
    pub overall_risk_score:     f64,
}

/// A segment between two entries of [`RouteDraft::waypoints`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentDraft {
    /// Index into `waypoints`.
    pub start:          usize,
    /// Index into `waypoints`.
    pub end:            usize,
    pub sequence_order: u32,
    pub distance_km:    f64,
    pub duration_min:   f64,
    pub risk_score:     f64,
}
