//! CSV road-network loader.
//!
//! # CSV format
//!
//! Two files.  Node ids are arbitrary integers (OSM ids work as-is).
//!
//! ```csv
//! id,lat,lon
//! 261095,41.8640,-87.7068
//! 261096,41.8641,-87.7040
//! ```
//!
//! ```csv
//! from,to,length_m,oneway
//! 261095,261096,232.5,no
//! 261096,261097,,yes
//! ```
//!
//! `length_m` may be empty, in which case the haversine distance between the
//! endpoints is used.  `oneway` accepts `yes`/`true`/`1`; anything else
//! (including an empty field) adds both directions.  Repeating a `from,to`
//! row adds a parallel edge.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use sr_core::{GeoPoint, NodeId};

use crate::network::{RoadGraph, RoadGraphBuilder};
use crate::{SpatialError, SpatialResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    id:  i64,
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from:     i64,
    to:       i64,
    length_m: Option<f64>,
    oneway:   Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a road network from `nodes.csv` and `edges.csv` files.
pub fn load_network_csv(nodes_path: &Path, edges_path: &Path) -> SpatialResult<RoadGraph> {
    let nodes = std::fs::File::open(nodes_path)?;
    let edges = std::fs::File::open(edges_path)?;
    load_network_readers(nodes, edges)
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
pub fn load_network_readers<N: Read, E: Read>(nodes: N, edges: E) -> SpatialResult<RoadGraph> {
    let mut builder = RoadGraphBuilder::new();
    let mut ids: FxHashMap<i64, NodeId> = FxHashMap::default();

    // ── Nodes ─────────────────────────────────────────────────────────────
    let mut rdr = csv::Reader::from_reader(nodes);
    for result in rdr.deserialize::<NodeRecord>() {
        let row = result.map_err(|e| SpatialError::Parse(format!("nodes: {e}")))?;
        let pos = GeoPoint::new(row.lat, row.lon);
        if !pos.is_valid() {
            return Err(SpatialError::Parse(format!(
                "nodes: node {} has invalid coordinate {pos}",
                row.id
            )));
        }
        if ids.insert(row.id, builder.add_node(pos)).is_some() {
            return Err(SpatialError::Parse(format!("nodes: duplicate node id {}", row.id)));
        }
    }

    // ── Edges ─────────────────────────────────────────────────────────────
    let mut rdr = csv::Reader::from_reader(edges);
    for result in rdr.deserialize::<EdgeRecord>() {
        let row = result.map_err(|e| SpatialError::Parse(format!("edges: {e}")))?;
        let from = lookup(&ids, row.from)?;
        let to = lookup(&ids, row.to)?;
        let length_m = match row.length_m {
            Some(len) if len.is_finite() && len >= 0.0 => len,
            Some(len) => {
                return Err(SpatialError::Parse(format!(
                    "edges: {} -> {} has invalid length {len}",
                    row.from, row.to
                )));
            }
            None => builder.node_pos(from).distance_m(builder.node_pos(to)),
        };

        builder.add_directed_edge(from, to, length_m);
        if !parse_oneway(row.oneway.as_deref()) {
            builder.add_directed_edge(to, from, length_m);
        }
    }

    Ok(builder.build())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn lookup(ids: &FxHashMap<i64, NodeId>, id: i64) -> SpatialResult<NodeId> {
    ids.get(&id)
        .copied()
        .ok_or_else(|| SpatialError::Parse(format!("edges: unknown node id {id}")))
}

fn parse_oneway(s: Option<&str>) -> bool {
    matches!(
        s.map(str::trim).map(str::to_ascii_lowercase).as_deref(),
        Some("yes" | "true" | "1")
    )
}
