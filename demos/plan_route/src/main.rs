//! plan_route — end-to-end demo of the saferoute planner.
//!
//! Plans one trip across a synthetic Chicago Loop grid under each route type,
//! recalculates the distance-weighted risk of the safest one, scores a single
//! corner, and prints the user's history.  Everything runs in memory; set
//! `SAFEROUTE_DB_PATH` to keep the routes in a SQLite file instead.
//!
//! Logging follows `RUST_LOG` (default `info`).

mod network;

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sr_core::{CancelToken, RouteType, UserId};
use sr_planner::{PlanRequest, PlannerConfig, RoutePlanner};
use sr_risk::{LogisticRiskModel, ModelHandle, RiskModel};
use sr_spatial::StaticSource;
use sr_store::{RouteStore, SqliteStore};

use network::{INTERSECTIONS, build_network};

// ── Constants ─────────────────────────────────────────────────────────────────

const USER: UserId = UserId(1);
const HOUR: u8 = 23;
const DAY_OF_WEEK: u8 = 5; // Saturday

// Night hours and the western blocks score higher.
const MODEL_JSON: &str = r#"{
    "name": "loop-demo",
    "intercept": -1.0,
    "coefficients": { "hour": 0.8, "longitude": -1.5 },
    "mean":  { "hour": 12.0, "longitude": -87.6325 },
    "scale": { "hour": 6.0,  "longitude": 0.0015 }
}"#;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PlannerConfig::from_env()?;

    let model: Arc<dyn RiskModel> = match &config.model_path {
        Some(path) => Arc::new(LogisticRiskModel::from_path(path)?),
        None => Arc::new(LogisticRiskModel::from_json_str(MODEL_JSON)?),
    };
    let store: Arc<dyn RouteStore> = match &config.database_path {
        Some(path) => Arc::new(SqliteStore::open(path)?),
        None => Arc::new(SqliteStore::open_in_memory()?),
    };
    let source = Arc::new(StaticSource::new("chicago-loop", build_network()));

    let planner = RoutePlanner::builder(source, Arc::new(ModelHandle::preloaded(model)), store)
        .config(config)
        .build()?;

    let (from_name, origin) = INTERSECTIONS[0];
    let (to_name, destination) = INTERSECTIONS[8];
    println!("=== plan_route — saferoute demo ===");
    println!("{from_name} {origin} → {to_name} {destination}, hour {HOUR}, day {DAY_OF_WEEK}");
    println!();

    let cancel = CancelToken::new();
    let mut safest = None;
    for route_type in RouteType::ALL {
        let request = PlanRequest::new(origin, destination, route_type, USER).at(HOUR, DAY_OF_WEEK);
        let response = planner.plan_route(&request, &cancel)?;

        let Some(saved) = &response.route else {
            println!("{route_type:<9} {}", response.message.as_deref().unwrap_or("no route"));
            continue;
        };
        let r = &saved.route;
        println!(
            "{:<9} route {:>2}: {} segments, {:.2} km, {:.1} min, risk {:.3} ({} ms)",
            route_type.as_str(),
            r.id.0,
            saved.segments.len(),
            r.total_distance_km,
            r.estimated_duration_min,
            r.overall_risk_score,
            response.computation_time_ms,
        );
        for w in &response.warnings {
            println!("          warning: {}", serde_json::to_string(w)?);
        }
        if route_type == RouteType::Safest {
            safest = Some(r.id);
        }
    }
    println!();

    if let Some(id) = safest {
        let updated = planner.recalculate_route_risk(id)?;
        println!("route {} distance-weighted risk: {:.3}", id.0, updated.overall_risk_score);

        let details = planner.route(id)?;
        println!("{}", serde_json::to_string_pretty(&details)?);
    }

    let (corner, point) = INTERSECTIONS[4];
    let scored = planner.score_location(point, Some(HOUR), Some(DAY_OF_WEEK))?;
    println!("{corner}: risk {:.3}", scored.risk_score.unwrap_or_default());

    println!();
    println!("{:<6} {:<9} {:>8} {:>7}", "Route", "Type", "km", "Risk");
    println!("{}", "-".repeat(33));
    for r in planner.route_history(USER, None)? {
        println!(
            "{:<6} {:<9} {:>8.2} {:>7.3}",
            r.id.0,
            r.route_type.as_str(),
            r.total_distance_km,
            r.overall_risk_score
        );
    }

    Ok(())
}
