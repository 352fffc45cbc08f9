//! Unit tests for sr-planner.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use sr_core::{BoundingBox, FeatureRow, GeoPoint};
    use sr_risk::{ModelHandle, RiskModel, RiskResult};
    use sr_spatial::{
        RoadDataSource, RoadGraph, RoadGraphBuilder, SpatialError, SpatialResult, StaticSource,
    };
    use sr_store::SqliteStore;

    use crate::{PlannerConfig, RoutePlanner};

    pub const N0: GeoPoint = GeoPoint { lat: 41.880, lon: -87.630 };
    pub const N1: GeoPoint = GeoPoint { lat: 41.880, lon: -87.625 };
    pub const N2: GeoPoint = GeoPoint { lat: 41.880, lon: -87.620 };
    pub const N3: GeoPoint = GeoPoint { lat: 41.885, lon: -87.630 };
    pub const N4: GeoPoint = GeoPoint { lat: 41.885, lon: -87.620 };

    /// Two ways from N0 to N4:
    ///
    /// ```text
    ///   N3 ─────────────── N4        lower: N0 → N3 → N4   (350 m)
    ///   │                   │
    ///   N0 ─── N1 ─── N2 ───┘        upper: N0 → N1 → N2 → N4 (300 m)
    /// ```
    pub fn grid() -> RoadGraph {
        let mut b = RoadGraphBuilder::new();
        let n: Vec<_> = [N0, N1, N2, N3, N4].iter().map(|&p| b.add_node(p)).collect();
        b.add_road(n[0], n[1], 100.0);
        b.add_road(n[1], n[2], 100.0);
        b.add_road(n[2], n[4], 100.0);
        b.add_road(n[0], n[3], 250.0);
        b.add_road(n[3], n[4], 100.0);
        b.build()
    }

    pub fn grid_source() -> Arc<dyn RoadDataSource> {
        Arc::new(StaticSource::new("grid", grid()))
    }

    /// 0.9 on edges leaving N1 or N2, 0.05 everywhere else.
    pub struct HotspotModel;

    impl RiskModel for HotspotModel {
        fn name(&self) -> &str {
            "hotspot"
        }

        fn predict_batch(&self, rows: &[FeatureRow]) -> RiskResult<Vec<f64>> {
            Ok(rows
                .iter()
                .map(|r| {
                    let at = GeoPoint::new(r.latitude, r.longitude);
                    if at == N1 || at == N2 { 0.9 } else { 0.05 }
                })
                .collect())
        }
    }

    pub fn model_of(model: impl RiskModel) -> Arc<ModelHandle> {
        Arc::new(ModelHandle::preloaded(Arc::new(model)))
    }

    pub fn fast_config() -> PlannerConfig {
        PlannerConfig {
            fetch_timeout: Duration::from_secs(5),
            retry_backoff: Duration::from_millis(1),
            inference_timeout: Duration::from_secs(5),
            ..PlannerConfig::default()
        }
    }

    pub fn planner_with(
        source: Arc<dyn RoadDataSource>,
        model: Arc<ModelHandle>,
        config: PlannerConfig,
    ) -> (RoutePlanner, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let planner = RoutePlanner::builder(source, model, store.clone())
            .config(config)
            .build()
            .unwrap();
        (planner, store)
    }

    pub fn planner() -> (RoutePlanner, Arc<SqliteStore>) {
        planner_with(grid_source(), model_of(HotspotModel), fast_config())
    }

    /// Always unreachable; counts attempts.
    pub struct DownSource {
        pub calls: AtomicUsize,
    }

    impl DownSource {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RoadDataSource for DownSource {
        fn name(&self) -> &str {
            "down"
        }

        fn fetch_region(&self, _bbox: &BoundingBox) -> SpatialResult<RoadGraphBuilder> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SpatialError::NetworkUnavailable {
                source_name: "down".into(),
                reason:      "connection refused".into(),
            })
        }
    }

    pub fn points(route: &sr_store::PersistedRoute) -> Vec<GeoPoint> {
        route.waypoints.iter().map(|l| l.point()).collect()
    }
}

// ── Overall-risk formulas ─────────────────────────────────────────────────────

#[cfg(test)]
mod formulas {
    use sr_core::{LocationId, RouteId, SegmentId};
    use sr_store::RouteSegment;

    use crate::{distance_weighted_risk, mean_step_risk};

    fn seg(order: u32, km: f64, risk: f64) -> RouteSegment {
        RouteSegment {
            id:                   SegmentId(i64::from(order) + 1),
            route_id:             RouteId(1),
            start_location:       LocationId(1),
            end_location:         LocationId(2),
            sequence_order:       order,
            segment_distance_km:  km,
            segment_duration_min: km * 2.0,
            segment_risk_score:   risk,
        }
    }

    #[test]
    fn mean_divides_by_step_count() {
        assert!((mean_step_risk(&[0.2, 0.4, 0.9], 4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn one_node_path_has_zero_risk() {
        assert_eq!(mean_step_risk(&[], 1), 0.0);
        assert_eq!(mean_step_risk(&[], 0), 0.0);
    }

    #[test]
    fn weighted_by_distance() {
        let segs = [seg(0, 1.0, 0.2), seg(1, 3.0, 0.6)];
        let r = distance_weighted_risk(&segs).unwrap();
        assert!((r - 0.5).abs() < 1e-12);
        // The unweighted mean of the same segments differs.
        assert!((mean_step_risk(&[0.2, 0.6], 3) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn weighted_edge_cases() {
        assert_eq!(distance_weighted_risk(&[]), None);
        assert_eq!(distance_weighted_risk(&[seg(0, 0.0, 0.7)]), Some(0.0));
    }
}

// ── Path materialization ──────────────────────────────────────────────────────

#[cfg(test)]
mod materialize {
    use sr_core::{RouteType, UserId};
    use sr_risk::EdgeWeights;
    use sr_spatial::{DijkstraSearch, RoadGraphBuilder, RouteSearch};

    use super::helpers::{N0, N1, N2, N4, grid};
    use crate::{PathMaterializer, PlanRequest};

    #[test]
    fn segments_follow_the_path() {
        let g = grid();
        let risk = vec![0.1; g.edge_count()];
        let w = EdgeWeights::from_risk(&g, risk, RouteType::Fastest);
        let path = DijkstraSearch.search(&g, &w.cost, N0, N4).unwrap();

        let req = PlanRequest::new(N0, N4, RouteType::Fastest, UserId(9));
        let draft = PathMaterializer::default().materialize(&req, &path, &g, &w);

        assert_eq!(draft.waypoints, vec![N0, N1, N2, N4]);
        assert_eq!(draft.segments.len(), 3);
        for (i, s) in draft.segments.iter().enumerate() {
            assert_eq!((s.start, s.end, s.sequence_order), (i, i + 1, i as u32));
            assert_eq!(s.risk_score, 0.1);
            // 0.005° at 111 km/° and 30 km/h.
            assert!((s.distance_km - 0.555).abs() < 1e-9);
            assert!((s.duration_min - 1.11).abs() < 1e-9);
        }
        assert!((draft.total_distance_km - 1.665).abs() < 1e-9);
        assert!((draft.estimated_duration_min - 3.33).abs() < 1e-9);
        assert!((draft.overall_risk_score - 0.1).abs() < 1e-12);
        assert_eq!(draft.user_id, UserId(9));
    }

    #[test]
    fn parallel_edges_use_the_traversed_edge_risk() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(N0);
        let c = b.add_node(N1);
        b.add_directed_edge(a, c, 100.0);
        b.add_directed_edge(a, c, 150.0);
        let g = b.build();
        // Short edge is risky, long edge is clear.
        let risk = vec![0.9, 0.0];

        for (route_type, expected) in [(RouteType::Safest, 0.0), (RouteType::Fastest, 0.9)] {
            let w = EdgeWeights::from_risk(&g, risk.clone(), route_type);
            let path = DijkstraSearch.search(&g, &w.cost, N0, N1).unwrap();
            let m = PathMaterializer::default();
            assert_eq!(m.step_risks(&path, &g, &w), vec![expected], "{route_type:?}");

            let req = PlanRequest::new(N0, N1, route_type, UserId(1));
            let draft = m.materialize(&req, &path, &g, &w);
            assert_eq!(draft.segments.len(), 1);
            assert_eq!(draft.segments[0].risk_score, expected);
            assert_eq!(draft.overall_risk_score, expected);
        }
    }

    #[test]
    fn trivial_path_has_no_segments() {
        let g = grid();
        let w = EdgeWeights::from_risk(&g, vec![0.7; g.edge_count()], RouteType::Safest);
        let path = DijkstraSearch.search(&g, &w.cost, N0, N0).unwrap();

        let req = PlanRequest::new(N0, N0, RouteType::Safest, UserId(1));
        let draft = PathMaterializer::default().materialize(&req, &path, &g, &w);

        assert_eq!(draft.waypoints.len(), 1);
        assert!(draft.segments.is_empty());
        assert_eq!(draft.overall_risk_score, 0.0);
        assert_eq!(draft.total_distance_km, 0.0);
    }
}

// ── plan_route ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod plan {
    use std::sync::Arc;

    use sr_core::{CancelToken, GeoPoint, RouteType, UserId};
    use sr_risk::ConstantRiskModel;
    use sr_spatial::{RoadGraphBuilder, StaticSource};
    use sr_store::{LocationKind, RouteStore};

    use super::helpers::*;
    use crate::{ErrorKind, PlanRequest, PlanWarning};

    fn request(route_type: RouteType) -> PlanRequest {
        PlanRequest::new(N0, N4, route_type, UserId(7)).at(7, 4)
    }

    #[test]
    fn safest_avoids_hotspot() {
        let (p, _) = planner();
        let resp = p.plan_route(&request(RouteType::Safest), &CancelToken::new()).unwrap();
        let route = resp.route.unwrap();

        assert_eq!(points(&route), vec![N0, N3, N4]);
        assert_eq!(route.segments.len(), 2);
        assert!((route.route.overall_risk_score - 0.05).abs() < 1e-9);
        assert!(resp.warnings.is_empty());
        assert!(resp.message.is_none());
    }

    #[test]
    fn balanced_avoids_hotspot() {
        let (p, _) = planner();
        let resp = p.plan_route(&request(RouteType::Balanced), &CancelToken::new()).unwrap();
        assert_eq!(points(&resp.route.unwrap()), vec![N0, N3, N4]);
    }

    #[test]
    fn fastest_takes_shorter_way() {
        let (p, _) = planner();
        let resp = p.plan_route(&request(RouteType::Fastest), &CancelToken::new()).unwrap();
        let route = resp.route.unwrap();

        assert_eq!(points(&route), vec![N0, N1, N2, N4]);
        // Mean of 0.05, 0.9, 0.9.
        assert!((route.route.overall_risk_score - 1.85 / 3.0).abs() < 1e-9);
        let risks: Vec<f64> = route.segments.iter().map(|s| s.segment_risk_score).collect();
        assert_eq!(risks, vec![0.05, 0.9, 0.9]);
    }

    #[test]
    fn persisted_records_match_response() {
        let (p, store) = planner();
        let resp = p.plan_route(&request(RouteType::Safest), &CancelToken::new()).unwrap();
        let saved = resp.route.unwrap();

        assert_eq!(saved.route.route_type, RouteType::Safest);
        assert_eq!(saved.route.user_id, UserId(7));
        assert_eq!(saved.origin.point(), N0);
        assert_eq!(saved.destination.point(), N4);
        assert_eq!(saved.origin.kind, LocationKind::Origin);
        assert_eq!(saved.destination.kind, LocationKind::Destination);

        let orders: Vec<u32> = saved.segments.iter().map(|s| s.sequence_order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(saved.segments[0].start_location, saved.origin.id);
        assert_eq!(saved.segments[1].end_location, saved.destination.id);
        assert_eq!(saved.segments[0].end_location, saved.segments[1].start_location);

        assert_eq!(store.route(saved.route.id).unwrap().unwrap(), saved.route);
        assert_eq!(store.segments(saved.route.id).unwrap(), saved.segments);
        assert_eq!(store.route_count().unwrap(), 1);
    }

    #[test]
    fn origin_uses_requested_coordinate() {
        let (p, _) = planner();
        let near_n0 = GeoPoint::new(41.8801, -87.6301);
        let req = PlanRequest::new(near_n0, N4, RouteType::Safest, UserId(1)).at(7, 4);
        let saved = p.plan_route(&req, &CancelToken::new()).unwrap().route.unwrap();

        assert_eq!(saved.origin.point(), near_n0);
        assert_eq!(saved.waypoints[0].point(), N0);
    }

    #[test]
    fn zero_risk_makes_safest_equal_fastest() {
        let model = || model_of(ConstantRiskModel::new(0.0));
        let (safe, _) = planner_with(grid_source(), model(), fast_config());
        let (fast, _) = planner_with(grid_source(), model(), fast_config());

        let a = safe.plan_route(&request(RouteType::Safest), &CancelToken::new()).unwrap();
        let b = fast.plan_route(&request(RouteType::Fastest), &CancelToken::new()).unwrap();
        assert_eq!(points(&a.route.unwrap()), points(&b.route.unwrap()));
    }

    #[test]
    fn same_snap_node_gives_empty_route() {
        let (p, store) = planner();
        let near_n0 = GeoPoint::new(41.8801, -87.6299);
        let req = PlanRequest::new(N0, near_n0, RouteType::Safest, UserId(3)).at(12, 0);
        let saved = p.plan_route(&req, &CancelToken::new()).unwrap().route.unwrap();

        assert_eq!(saved.waypoints.len(), 1);
        assert!(saved.segments.is_empty());
        assert_eq!(saved.route.overall_risk_score, 0.0);
        assert_eq!(saved.route.total_distance_km, 0.0);
        assert_eq!(store.segment_count().unwrap(), 0);
        assert_eq!(store.route_count().unwrap(), 1);
    }

    #[test]
    fn inference_failure_uses_neutral_risk() {
        struct Broken;
        impl sr_risk::RiskModel for Broken {
            fn name(&self) -> &str {
                "broken"
            }
            fn predict_batch(&self, _: &[sr_core::FeatureRow]) -> sr_risk::RiskResult<Vec<f64>> {
                Err(sr_risk::RiskError::Inference("bad input".into()))
            }
        }

        let (p, _) = planner_with(grid_source(), model_of(Broken), fast_config());
        let resp = p.plan_route(&request(RouteType::Safest), &CancelToken::new()).unwrap();

        assert_eq!(resp.warnings.len(), 1);
        let PlanWarning::InferenceFailure { reason, neutral_risk } = &resp.warnings[0];
        assert!(reason.contains("bad input"));
        assert_eq!(*neutral_risk, 0.5);

        let route = resp.route.unwrap();
        assert!(route.segments.iter().all(|s| s.segment_risk_score == 0.5));
        // Uniform risk: shortest way wins.
        assert_eq!(points(&route), vec![N0, N1, N2, N4]);
    }

    #[test]
    fn empty_region_persists_nothing() {
        let mut b = RoadGraphBuilder::new();
        let x = b.add_node(GeoPoint::new(10.0, 10.0));
        let y = b.add_node(GeoPoint::new(10.0, 10.001));
        b.add_road(x, y, 110.0);
        let far = Arc::new(StaticSource::new("elsewhere", b.build()));

        let (p, store) = planner_with(far, model_of(HotspotModel), fast_config());
        let err = p.plan_route(&request(RouteType::Safest), &CancelToken::new()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptyRegion);
        assert!(err.context().is_some());
        assert_eq!(store.route_count().unwrap(), 0);
        assert_eq!(store.location_count().unwrap(), 0);
    }

    #[test]
    fn no_path_is_a_response_not_an_error() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(N0);
        let c = b.add_node(N1);
        b.add_directed_edge(c, a, 400.0);
        let one_way = Arc::new(StaticSource::new("one-way", b.build()));

        let (p, store) = planner_with(one_way, model_of(HotspotModel), fast_config());
        let req = PlanRequest::new(N0, N1, RouteType::Fastest, UserId(1)).at(9, 2);
        let resp = p.plan_route(&req, &CancelToken::new()).unwrap();

        assert!(resp.route.is_none());
        assert!(resp.message.unwrap().contains("no drivable path"));
        assert_eq!(store.route_count().unwrap(), 0);
    }

    #[test]
    fn invalid_coordinate_rejected() {
        let (p, store) = planner();
        let req = PlanRequest::new(GeoPoint::new(95.0, 0.0), N4, RouteType::Safest, UserId(1));
        let err = p.plan_route(&req, &CancelToken::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        let ctx = err.context().unwrap();
        assert_eq!((ctx.route_type, ctx.origin, ctx.destination), (RouteType::Safest, req.origin, N4));
        assert!(err.to_string().starts_with("safest route"), "{err}");
        assert_eq!(store.route_count().unwrap(), 0);
    }

    #[test]
    fn invalid_time_rejected() {
        let (p, _) = planner();
        let req = PlanRequest::new(N0, N4, RouteType::Balanced, UserId(1)).at(24, 0);
        let err = p.plan_route(&req, &CancelToken::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        let ctx = err.context().unwrap();
        assert_eq!((ctx.route_type, ctx.origin, ctx.destination), (RouteType::Balanced, N0, N4));
    }

    #[test]
    fn unavailable_model_fails_request() {
        let model = Arc::new(sr_risk::ModelHandle::from_artifact("/nonexistent/model.json"));
        let (p, store) = planner_with(grid_source(), model, fast_config());
        let err = p.plan_route(&request(RouteType::Safest), &CancelToken::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
        assert_eq!(store.route_count().unwrap(), 0);
    }

    #[test]
    fn cancelled_request_writes_nothing() {
        let (p, store) = planner();
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = p.plan_route(&request(RouteType::Safest), &cancel).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(store.route_count().unwrap(), 0);
    }

    #[test]
    fn slow_inference_times_out() {
        struct Sleepy;
        impl sr_risk::RiskModel for Sleepy {
            fn name(&self) -> &str {
                "sleepy"
            }
            fn predict_batch(&self, rows: &[sr_core::FeatureRow]) -> sr_risk::RiskResult<Vec<f64>> {
                std::thread::sleep(std::time::Duration::from_millis(500));
                Ok(vec![0.1; rows.len()])
            }
        }

        let config = crate::PlannerConfig {
            inference_timeout: std::time::Duration::from_millis(20),
            ..fast_config()
        };
        let (p, store) = planner_with(grid_source(), model_of(Sleepy), config);
        let err = p.plan_route(&request(RouteType::Safest), &CancelToken::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamTimeout);
        assert_eq!(store.route_count().unwrap(), 0);
    }

    #[test]
    fn unreachable_network_retried_once() {
        let down = Arc::new(DownSource { calls: Default::default() });
        let (p, _) = planner_with(down.clone(), model_of(HotspotModel), fast_config());
        let err = p.plan_route(&request(RouteType::Safest), &CancelToken::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkUnavailable);
        assert_eq!(down.calls(), 2);
    }

    #[test]
    fn response_serializes() {
        let (p, _) = planner();
        let resp = p.plan_route(&request(RouteType::Safest), &CancelToken::new()).unwrap();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["route"]["route"]["route_type"], "safest");
        assert!(json["computation_time_ms"].is_u64());
        assert_eq!(json["warnings"].as_array().map(Vec::len), Some(0));
    }
}

// ── Concurrency ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod concurrency {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use sr_core::{CancelToken, RouteType, UserId};
    use sr_risk::{ModelHandle, RiskModel};

    use super::helpers::*;
    use crate::PlanRequest;

    #[test]
    fn shared_planner_loads_model_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let handle = Arc::new(ModelHandle::with_loader("hotspot", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(HotspotModel) as Arc<dyn RiskModel>)
        }));
        let (p, store) = planner_with(grid_source(), handle, fast_config());
        let p = Arc::new(p);

        let workers: Vec<_> = RouteType::ALL
            .iter()
            .cycle()
            .take(9)
            .enumerate()
            .map(|(i, &rt)| {
                let p = Arc::clone(&p);
                thread::spawn(move || {
                    let req = PlanRequest::new(N0, N4, rt, UserId(i as i64)).at(8, 1);
                    p.plan_route(&req, &CancelToken::new()).unwrap()
                })
            })
            .collect();

        for w in workers {
            let resp = w.join().unwrap();
            let route = resp.route.unwrap();
            let expected = match route.route.route_type {
                RouteType::Fastest => vec![N0, N1, N2, N4],
                _ => vec![N0, N3, N4],
            };
            assert_eq!(points(&route), expected);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(store.route_count().unwrap(), 9);
    }
}

// ── Recalculation, scoring, and history ───────────────────────────────────────

#[cfg(test)]
mod queries {
    use std::sync::Arc;

    use sr_core::{CancelToken, GeoPoint, RouteId, RouteType, UserId};
    use sr_risk::ConstantRiskModel;
    use sr_store::{LocationKind, RouteDraft, RouteStore, SegmentDraft};

    use super::helpers::*;
    use crate::{ErrorKind, PlanRequest};

    fn manual_draft(user: i64) -> RouteDraft {
        let a = GeoPoint::new(41.90, -87.70);
        let b = GeoPoint::new(41.91, -87.70);
        let c = GeoPoint::new(41.94, -87.70);
        RouteDraft {
            user_id:                UserId(user),
            route_type:             RouteType::Balanced,
            origin:                 a,
            destination:            c,
            waypoints:              vec![a, b, c],
            segments:               vec![
                SegmentDraft { start: 0, end: 1, sequence_order: 0, distance_km: 1.0, duration_min: 2.0, risk_score: 0.2 },
                SegmentDraft { start: 1, end: 2, sequence_order: 1, distance_km: 3.0, duration_min: 6.0, risk_score: 0.6 },
            ],
            total_distance_km:      4.0,
            estimated_duration_min: 8.0,
            overall_risk_score:     0.4,
        }
    }

    #[test]
    fn recalculation_weights_by_distance() {
        let (p, store) = planner();
        let saved = store.commit_route(&manual_draft(1)).unwrap();

        let updated = p.recalculate_route_risk(saved.route.id).unwrap();
        assert!((updated.overall_risk_score - 0.5).abs() < 1e-12);
        let reread = store.route(saved.route.id).unwrap().unwrap();
        assert!((reread.overall_risk_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn recalculation_without_segments_is_noop() {
        let (p, _) = planner();
        let req = PlanRequest::new(N0, N0, RouteType::Safest, UserId(2)).at(1, 1);
        let saved = p.plan_route(&req, &CancelToken::new()).unwrap().route.unwrap();

        let same = p.recalculate_route_risk(saved.route.id).unwrap();
        assert_eq!(same, saved.route);
    }

    #[test]
    fn recalculating_unknown_route_is_not_found() {
        let (p, _) = planner();
        let err = p.recalculate_route_risk(RouteId(404)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn route_details_round_out_a_plan() {
        let (p, _) = planner();
        let resp = p
            .plan_route(&PlanRequest::new(N0, N4, RouteType::Fastest, UserId(5)).at(7, 4), &CancelToken::new())
            .unwrap();
        let saved = resp.route.unwrap();

        let details = p.route(saved.route.id).unwrap();
        assert_eq!(details.route, saved.route);
        assert_eq!(details.segments, saved.segments);
        assert_eq!(p.route(RouteId(999)).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn score_location_records_risk() {
        let (p, store) =
            planner_with(grid_source(), model_of(ConstantRiskModel::new(0.35)), fast_config());
        let point = GeoPoint::new(41.8789, -87.6359);

        let loc = p.score_location(point, Some(22), Some(5)).unwrap();
        assert_eq!(loc.risk_score, Some(0.35));
        assert_eq!(loc.kind, LocationKind::Waypoint);
        assert_eq!(loc.point(), point);
        assert_eq!(store.location(loc.id).unwrap().unwrap().risk_score, Some(0.35));

        // Scoring again reuses the location.
        let again = p.score_location(point, Some(3), Some(0)).unwrap();
        assert_eq!(again.id, loc.id);
        assert_eq!(store.location_count().unwrap(), 1);
    }

    #[test]
    fn score_location_rejects_bad_input() {
        let (p, _) = planner();
        let err = p.score_location(GeoPoint::new(0.0, 200.0), None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        let err = p.score_location(N0, Some(3), Some(7)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn score_location_with_unavailable_model() {
        let model = Arc::new(sr_risk::ModelHandle::from_artifact("/nonexistent/model.json"));
        let (p, store) = planner_with(grid_source(), model, fast_config());
        let err = p.score_location(N0, Some(1), Some(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
        assert_eq!(store.location_count().unwrap(), 0);
    }

    #[test]
    fn history_is_newest_first_and_per_user() {
        let (p, store) = planner();
        let first = store.commit_route(&manual_draft(11)).unwrap();
        let second = store.commit_route(&manual_draft(11)).unwrap();
        store.commit_route(&manual_draft(12)).unwrap();

        let history = p.route_history(UserId(11), None).unwrap();
        let ids: Vec<_> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.route.id, first.route.id]);

        assert_eq!(p.route_history(UserId(11), Some(1)).unwrap().len(), 1);
        assert!(p.route_history(UserId(99), None).unwrap().is_empty());
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use super::helpers::*;
    use crate::{ErrorKind, PlannerConfig, RoutePlanner};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let c = PlannerConfig::default();
        c.validate().unwrap();
        assert_eq!(c.speed_kmh, 30.0);
        assert_eq!(c.km_per_degree, 111.0);
        assert_eq!(c.neutral_risk, 0.5);
        assert_eq!(c.fetch_retries, 1);
    }

    #[test]
    fn overrides_from_variables() {
        let c = PlannerConfig::from_lookup(lookup(&[
            ("SAFEROUTE_BBOX_MARGIN_DEG", "0.05"),
            ("SAFEROUTE_FETCH_TIMEOUT_SECS", "2.5"),
            ("SAFEROUTE_FETCH_RETRIES", "3"),
            ("SAFEROUTE_RETRY_BACKOFF_MS", "250"),
            ("SAFEROUTE_NEUTRAL_RISK", "0.4"),
            ("SAFEROUTE_HISTORY_LIMIT", "25"),
            ("SAFEROUTE_MODEL_PATH", "/models/risk.json"),
            ("SAFEROUTE_DB_PATH", " "),
        ]))
        .unwrap();

        assert_eq!(c.margin_deg, 0.05);
        assert_eq!(c.fetch_timeout, Duration::from_millis(2500));
        assert_eq!(c.fetch_retries, 3);
        assert_eq!(c.retry_backoff, Duration::from_millis(250));
        assert_eq!(c.neutral_risk, 0.4);
        assert_eq!(c.history_limit, 25);
        assert_eq!(c.model_path, Some(PathBuf::from("/models/risk.json")));
        assert_eq!(c.database_path, None);
        assert_eq!(c.provider_config().max_retries, 3);
    }

    #[test]
    fn malformed_values_rejected() {
        assert!(PlannerConfig::from_lookup(lookup(&[("SAFEROUTE_SPEED_KMH", "fast")])).is_err());
        assert!(PlannerConfig::from_lookup(lookup(&[("SAFEROUTE_NEUTRAL_RISK", "1.5")])).is_err());
        assert!(PlannerConfig::from_lookup(lookup(&[("SAFEROUTE_FETCH_TIMEOUT_SECS", "-1")])).is_err());
        assert!(PlannerConfig::from_lookup(lookup(&[("SAFEROUTE_HISTORY_LIMIT", "0")])).is_err());
    }

    #[test]
    fn oversized_timeouts_rejected() {
        for (key, raw) in [
            ("SAFEROUTE_FETCH_TIMEOUT_SECS", "1e30"),
            ("SAFEROUTE_INFERENCE_TIMEOUT_SECS", "1e30"),
            ("SAFEROUTE_FETCH_TIMEOUT_SECS", "inf"),
            ("SAFEROUTE_INFERENCE_TIMEOUT_SECS", "NaN"),
        ] {
            let err = PlannerConfig::from_lookup(lookup(&[(key, raw)])).unwrap_err();
            assert!(err.to_string().contains(key), "{key}={raw}: {err}");
        }
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let bad = PlannerConfig { speed_kmh: 0.0, ..PlannerConfig::default() };
        let store = std::sync::Arc::new(sr_store::SqliteStore::open_in_memory().unwrap());
        let err = RoutePlanner::builder(grid_source(), model_of(HotspotModel), store)
            .config(bad)
            .build()
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
