//! The `RouteStore` trait.

use sr_core::{GeoPoint, LocationId, RouteId, UserId};

use crate::{Location, LocationKind, PersistedRoute, Route, RouteDraft, RouteSegment, StoreResult};

/// Persistence seam for locations, routes, and route segments.
///
/// Implementations must be `Send + Sync`: one store is shared by every
/// planning request.
///
/// # Atomicity
///
/// [`commit_route`](Self::commit_route) writes every location, the route
/// row, and every segment of a draft in a single transaction.  A failure at
/// any point leaves the store exactly as it was.
pub trait RouteStore: Send + Sync {
    /// Return the location at exactly `point`, creating it with `kind` if
    /// absent.  Idempotent.
    fn get_or_create_location(&self, point: GeoPoint, kind: LocationKind) -> StoreResult<Location>;

    fn location(&self, id: LocationId) -> StoreResult<Option<Location>>;

    /// Persist a route draft atomically.
    fn commit_route(&self, draft: &RouteDraft) -> StoreResult<PersistedRoute>;

    fn route(&self, id: RouteId) -> StoreResult<Option<Route>>;

    /// Segments of `route`, ordered by `sequence_order`.
    fn segments(&self, route: RouteId) -> StoreResult<Vec<RouteSegment>>;

    /// Overwrite a route's overall risk and return the updated row.
    fn update_overall_risk(&self, route: RouteId, risk: f64) -> StoreResult<Route>;

    /// Write the risk annotation of a location and return the updated row.
    fn annotate_location_risk(&self, location: LocationId, risk: f64) -> StoreResult<Location>;

    /// Up to `limit` routes of `user`, newest first.
    fn recent_routes(&self, user: UserId, limit: usize) -> StoreResult<Vec<Route>>;
}
