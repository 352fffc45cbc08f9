//! The caller-facing planning service.
//!
//! # Request pipeline
//!
//! ```text
//! validate ─► model handle ─► network fetch ─► edge annotation ─► search ─► materialize ─► commit
//! ```
//!
//! Stages run strictly in sequence on the caller's thread.  Only the fetch
//! and the batch inference block on something external, and both are
//! bounded by timeouts.  The cancellation token is checked between stages;
//! nothing is written until the final commit, which is a single transaction.
//!
//! # Sharing
//!
//! `RoutePlanner` is `Send + Sync`.  Build one at startup and share it via
//! `Arc` across worker threads.  Per-request state (the region graph, its
//! feature table, and the edge weights) never leaves the request.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, info_span, warn};

use sr_core::{
    CancelToken, CoreError, GeoPoint, RouteId, RouteType, TimeContext, UserId,
};
use sr_risk::{EdgeRiskAnnotator, ModelHandle, score_point};
use sr_spatial::{DijkstraSearch, RoadDataSource, RoadNetworkProvider, RouteSearch, SpatialError};
use sr_store::{Location, LocationKind, PersistedRoute, Route, RouteSegment, RouteStore};

use crate::error::RequestContext;
use crate::materialize::PathMaterializer;
use crate::recalc::RouteRiskRecalculator;
use crate::{PlannerConfig, PlannerError, PlannerResult};

// ── Request / response ────────────────────────────────────────────────────────

/// A route planning request.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanRequest {
    pub origin:      GeoPoint,
    pub destination: GeoPoint,
    pub route_type:  RouteType,
    pub user_id:     UserId,
    /// Hour of day for the risk model; wall-clock hour when `None`.
    pub hour:        Option<u8>,
    /// Day of week (Monday = 0); wall-clock day when `None`.
    pub day_of_week: Option<u8>,
}

impl PlanRequest {
    pub fn new(origin: GeoPoint, destination: GeoPoint, route_type: RouteType, user_id: UserId) -> Self {
        Self { origin, destination, route_type, user_id, hour: None, day_of_week: None }
    }

    /// Pin the time context instead of using the wall clock.
    pub fn at(mut self, hour: u8, day_of_week: u8) -> Self {
        self.hour = Some(hour);
        self.day_of_week = Some(day_of_week);
        self
    }

    fn context(&self) -> RequestContext {
        RequestContext {
            route_type:  self.route_type,
            origin:      self.origin,
            destination: self.destination,
            at:          Utc::now(),
        }
    }
}

/// Non-fatal conditions raised while planning.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// Inference failed; every edge was scored with `neutral_risk`.
    InferenceFailure { reason: String, neutral_risk: f64 },
}

#[derive(Clone, Debug, Serialize)]
pub struct PlanResponse {
    /// `None` when no drivable path connects the endpoints.
    pub route:               Option<PersistedRoute>,
    pub computation_time_ms: u64,
    pub warnings:            Vec<PlanWarning>,
    /// Explanation when `route` is `None`.
    pub message:             Option<String>,
}

/// A persisted route with its ordered segments.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteDetails {
    pub route:    Route,
    pub segments: Vec<RouteSegment>,
}

// ── RoutePlanner ──────────────────────────────────────────────────────────────

pub struct RoutePlanner {
    provider:     RoadNetworkProvider,
    model:        Arc<ModelHandle>,
    annotator:    EdgeRiskAnnotator,
    search:       Box<dyn RouteSearch>,
    materializer: PathMaterializer,
    recalculator: RouteRiskRecalculator,
    store:        Arc<dyn RouteStore>,
    config:       PlannerConfig,
}

impl RoutePlanner {
    pub fn builder(
        source: Arc<dyn RoadDataSource>,
        model: Arc<ModelHandle>,
        store: Arc<dyn RouteStore>,
    ) -> RoutePlannerBuilder {
        RoutePlannerBuilder::new(source, model, store)
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan, score, and persist a route between two coordinates.
    pub fn plan_route(&self, request: &PlanRequest, cancel: &CancelToken) -> PlannerResult<PlanResponse> {
        let started = Instant::now();
        let span = info_span!(
            "plan_route",
            route_type = %request.route_type,
            user = request.user_id.0,
            origin = %request.origin,
            destination = %request.destination,
        );
        let _enter = span.enter();

        let ctx = request.context();
        for p in [request.origin, request.destination] {
            if !p.is_valid() {
                return Err(PlannerError::Rejected { ctx, err: CoreError::InvalidCoordinate(p) });
            }
        }
        let time = TimeContext::resolve(request.hour, request.day_of_week)
            .map_err(|err| PlannerError::Rejected { ctx: ctx.clone(), err })?;

        let model = self
            .model
            .get()
            .map_err(|err| PlannerError::Risk { ctx: ctx.clone(), err })?;

        let region = self
            .provider
            .fetch(request.origin, request.destination, cancel)
            .map_err(|err| PlannerError::Network { ctx: ctx.clone(), err })?;
        check_cancel(cancel, &ctx)?;

        let annotation = self
            .annotator
            .annotate(&region.graph, &region.features, time, request.route_type, &model, cancel)
            .map_err(|err| PlannerError::Risk { ctx: ctx.clone(), err })?;
        let mut warnings = Vec::new();
        if let Some(reason) = annotation.warning {
            warnings.push(PlanWarning::InferenceFailure {
                reason,
                neutral_risk: self.config.neutral_risk,
            });
        }
        check_cancel(cancel, &ctx)?;

        let path = match self.search.search(
            &region.graph,
            &annotation.weights.cost,
            request.origin,
            request.destination,
        ) {
            Ok(path) => path,
            Err(SpatialError::NoPath { from, to }) => {
                info!(%from, %to, "no drivable path");
                return Ok(PlanResponse {
                    route: None,
                    computation_time_ms: elapsed_ms(started),
                    warnings,
                    message: Some(format!(
                        "no drivable path between {} and {} in the fetched road network",
                        request.origin, request.destination
                    )),
                });
            }
            Err(err) => return Err(PlannerError::Search { ctx, err }),
        };

        let draft = self.materializer.materialize(request, &path, &region.graph, &annotation.weights);
        check_cancel(cancel, &ctx)?;

        let saved = self
            .store
            .commit_route(&draft)
            .map_err(|err| PlannerError::Persistence { ctx: ctx.clone(), err })?;

        let computation_time_ms = elapsed_ms(started);
        info!(
            route_id = %saved.route.id,
            segments = saved.segments.len(),
            distance_km = saved.route.total_distance_km,
            overall_risk = saved.route.overall_risk_score,
            %time,
            computation_time_ms,
            "route planned"
        );
        Ok(PlanResponse { route: Some(saved), computation_time_ms, warnings, message: None })
    }

    /// Recompute a persisted route's overall risk, weighting each segment by
    /// its distance.
    pub fn recalculate_route_risk(&self, route_id: RouteId) -> PlannerResult<Route> {
        self.recalculator.recalculate(route_id)
    }

    /// Score a single coordinate and record the score on its location.
    pub fn score_location(
        &self,
        point: GeoPoint,
        hour: Option<u8>,
        day_of_week: Option<u8>,
    ) -> PlannerResult<Location> {
        if !point.is_valid() {
            return Err(CoreError::InvalidCoordinate(point).into());
        }
        let time = TimeContext::resolve(hour, day_of_week)?;
        let model = self.model.get().map_err(PlannerError::Scoring)?;
        let risk = score_point(model.as_ref(), point, time).map_err(|e| {
            warn!(%point, %time, error = %e, "point scoring failed");
            PlannerError::Scoring(e)
        })?;

        let location = self.store.get_or_create_location(point, LocationKind::Waypoint)?;
        Ok(self.store.annotate_location_risk(location.id, risk)?)
    }

    /// Most recent routes of `user`, newest first.  `limit` defaults to the
    /// configured history size.
    pub fn route_history(&self, user: UserId, limit: Option<usize>) -> PlannerResult<Vec<Route>> {
        let limit = limit.unwrap_or(self.config.history_limit);
        Ok(self.store.recent_routes(user, limit)?)
    }

    pub fn route(&self, route_id: RouteId) -> PlannerResult<RouteDetails> {
        let route = self.store.route(route_id)?.ok_or(PlannerError::RouteNotFound(route_id))?;
        let segments = self.store.segments(route_id)?;
        Ok(RouteDetails { route, segments })
    }
}

fn check_cancel(cancel: &CancelToken, ctx: &RequestContext) -> PlannerResult<()> {
    if cancel.is_cancelled() {
        return Err(PlannerError::Cancelled { ctx: ctx.clone() });
    }
    Ok(())
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Fluent builder for [`RoutePlanner`].
///
/// # Optional inputs (have defaults)
///
/// | Method         | Default                   |
/// |----------------|---------------------------|
/// | `.config(c)`   | `PlannerConfig::default()`|
/// | `.search(s)`   | `DijkstraSearch`          |
pub struct RoutePlannerBuilder {
    source: Arc<dyn RoadDataSource>,
    model:  Arc<ModelHandle>,
    store:  Arc<dyn RouteStore>,
    config: PlannerConfig,
    search: Box<dyn RouteSearch>,
}

impl RoutePlannerBuilder {
    pub fn new(
        source: Arc<dyn RoadDataSource>,
        model: Arc<ModelHandle>,
        store: Arc<dyn RouteStore>,
    ) -> Self {
        Self {
            source,
            model,
            store,
            config: PlannerConfig::default(),
            search: Box::new(DijkstraSearch),
        }
    }

    pub fn config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn search(mut self, search: impl RouteSearch + 'static) -> Self {
        self.search = Box::new(search);
        self
    }

    /// Validate the configuration and assemble the planner.
    pub fn build(self) -> PlannerResult<RoutePlanner> {
        self.config.validate().map_err(PlannerError::Config)?;

        Ok(RoutePlanner {
            provider:     RoadNetworkProvider::new(self.source, self.config.provider_config()),
            model:        self.model,
            annotator:    self.config.annotator(),
            search:       self.search,
            materializer: PathMaterializer::new(self.config.speed_kmh, self.config.km_per_degree),
            recalculator: RouteRiskRecalculator::new(Arc::clone(&self.store)),
            store:        self.store,
            config:       self.config,
        })
    }
}
