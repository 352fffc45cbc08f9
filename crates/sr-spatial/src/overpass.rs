//! Overpass API road-data source.
//!
//! Payload parsing ([`parse_overpass_json`]) is always compiled so fixtures
//! can be tested offline; the HTTP client ([`OverpassSource`]) needs the
//! `overpass` Cargo feature.
//!
//! Only ways whose `highway` tag passes [`tags::is_drivable`] become edges.
//! One-way ways add a single directed edge per consecutive node pair;
//! two-way ways add both directions.  Repeated ways over the same node pair
//! become parallel edges.

use rustc_hash::FxHashMap;
use serde::Deserialize;

use sr_core::{GeoPoint, NodeId};

use crate::network::RoadGraphBuilder;
use crate::tags;
use crate::{SpatialError, SpatialResult};

// ── Payload ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OsmElement>,
}

#[derive(Debug, Deserialize)]
struct OsmElement {
    #[serde(rename = "type")]
    elem_type: String,
    id:        i64,
    lat:       Option<f64>,
    lon:       Option<f64>,
    #[serde(default)]
    nodes:     Vec<i64>,
    #[serde(default)]
    tags:      FxHashMap<String, String>,
}

/// Parse an Overpass `out body` JSON payload into a graph builder.
pub fn parse_overpass_json(body: &str) -> SpatialResult<RoadGraphBuilder> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|e| SpatialError::Parse(format!("overpass: {e}")))?;
    Ok(build_from_elements(&response.elements))
}

fn build_from_elements(elements: &[OsmElement]) -> RoadGraphBuilder {
    // First pass: node coordinates.
    let coords: FxHashMap<i64, GeoPoint> = elements
        .iter()
        .filter(|e| e.elem_type == "node")
        .filter_map(|e| Some((e.id, GeoPoint::new(e.lat?, e.lon?))))
        .collect();

    let mut builder = RoadGraphBuilder::with_capacity(coords.len(), coords.len() * 2);
    let mut local: FxHashMap<i64, NodeId> = FxHashMap::default();

    // Second pass: drivable ways.
    for way in elements.iter().filter(|e| e.elem_type == "way") {
        let Some(highway) = way.tags.get("highway").map(String::as_str) else {
            continue;
        };
        if !tags::is_drivable(highway) {
            continue;
        }
        let tag_pairs: Vec<(&str, &str)> = way
            .tags
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let oneway = tags::is_oneway(highway, &tag_pairs);

        for window in way.nodes.windows(2) {
            let (osm_a, osm_b) = (window[0], window[1]);
            let (Some(&pa), Some(&pb)) = (coords.get(&osm_a), coords.get(&osm_b)) else {
                continue;
            };
            let a = *local.entry(osm_a).or_insert_with(|| builder.add_node(pa));
            let b = *local.entry(osm_b).or_insert_with(|| builder.add_node(pb));
            let len_m = pa.distance_m(pb);

            builder.add_directed_edge(a, b, len_m);
            if !oneway {
                builder.add_directed_edge(b, a, len_m);
            }
        }
    }

    builder
}

// ── HTTP source ───────────────────────────────────────────────────────────────

#[cfg(feature = "overpass")]
pub use client::OverpassSource;

#[cfg(feature = "overpass")]
mod client {
    use std::time::Duration;

    use tracing::{debug, info};

    use sr_core::BoundingBox;

    use super::parse_overpass_json;
    use crate::network::RoadGraphBuilder;
    use crate::source::RoadDataSource;
    use crate::tags::DRIVABLE_HIGHWAY_REGEX;
    use crate::{SpatialError, SpatialResult};

    /// Public Overpass endpoint.
    pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

    /// Blocking Overpass API client.
    pub struct OverpassSource {
        endpoint: String,
        timeout:  Duration,
        client:   reqwest::blocking::Client,
    }

    impl OverpassSource {
        pub fn new(endpoint: impl Into<String>, timeout: Duration) -> SpatialResult<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .connect_timeout(timeout.min(Duration::from_secs(10)))
                .user_agent(concat!("saferoute/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| SpatialError::NetworkUnavailable {
                    source_name: "overpass".into(),
                    reason:      e.to_string(),
                })?;
            Ok(Self { endpoint: endpoint.into(), timeout, client })
        }

        pub fn public(timeout: Duration) -> SpatialResult<Self> {
            Self::new(DEFAULT_ENDPOINT, timeout)
        }

        fn query(&self, ql: String) -> SpatialResult<RoadGraphBuilder> {
            debug!(endpoint = %self.endpoint, query = %ql, "overpass request");
            let response = self
                .client
                .post(&self.endpoint)
                .header("Content-Type", "text/plain")
                .body(ql)
                .send()
                .map_err(|e| self.transport_error(e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(SpatialError::NetworkUnavailable {
                    source_name: "overpass".into(),
                    reason:      format!("HTTP {status}"),
                });
            }
            let body = response.text().map_err(|e| self.transport_error(e))?;
            info!(bytes = body.len(), "overpass payload received");
            parse_overpass_json(&body)
        }

        fn transport_error(&self, e: reqwest::Error) -> SpatialError {
            if e.is_timeout() {
                SpatialError::UpstreamTimeout { what: "overpass request", after: self.timeout }
            } else {
                SpatialError::NetworkUnavailable {
                    source_name: "overpass".into(),
                    reason:      e.to_string(),
                }
            }
        }

        fn server_timeout_secs(&self) -> u64 {
            self.timeout.as_secs().max(1)
        }
    }

    impl RoadDataSource for OverpassSource {
        fn name(&self) -> &str {
            "overpass"
        }

        fn fetch_region(&self, bbox: &BoundingBox) -> SpatialResult<RoadGraphBuilder> {
            let ql = format!(
                "[out:json][timeout:{t}];\n\
                 (way[\"highway\"~\"{re}\"]({s},{w},{n},{e}););\n\
                 (._;>;);\n\
                 out body;",
                t = self.server_timeout_secs(),
                re = DRIVABLE_HIGHWAY_REGEX,
                s = bbox.min_lat,
                w = bbox.min_lon,
                n = bbox.max_lat,
                e = bbox.max_lon,
            );
            self.query(ql)
        }

        fn fetch_place(&self, place: &str) -> SpatialResult<RoadGraphBuilder> {
            let escaped = place.replace('\\', "\\\\").replace('"', "\\\"");
            let ql = format!(
                "[out:json][timeout:{t}];\n\
                 area[\"name\"=\"{escaped}\"]->.searchArea;\n\
                 (way[\"highway\"~\"{re}\"](area.searchArea););\n\
                 (._;>;);\n\
                 out body;",
                t = self.server_timeout_secs(),
                re = DRIVABLE_HIGHWAY_REGEX,
            );
            self.query(ql)
        }
    }
}
