//! Road-data sources.
//!
//! A [`RoadDataSource`] turns a bounding box (or a place name) into a fresh
//! [`RoadGraphBuilder`].  The provider finishes the build so that the edge
//! feature table is produced in the same pass as the CSR arrays.
//!
//! Every call returns a builder the caller owns outright.  Sources that keep
//! a large network in memory ([`StaticSource`]) clip a private copy per call
//! and never hand out references into their shared data.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use sr_core::{BoundingBox, NodeId};

use crate::network::{RoadGraph, RoadGraphBuilder};
use crate::{SpatialError, SpatialResult};

/// Upstream provider of drivable road networks.
pub trait RoadDataSource: Send + Sync {
    /// Short label used in logs and error messages.
    fn name(&self) -> &str;

    /// Drivable network inside `bbox`.
    ///
    /// Return [`SpatialError::NetworkUnavailable`] when the upstream cannot be
    /// reached; the provider retries that case once.
    fn fetch_region(&self, bbox: &BoundingBox) -> SpatialResult<RoadGraphBuilder>;

    /// Drivable network of a named place (city, district).
    fn fetch_place(&self, place: &str) -> SpatialResult<RoadGraphBuilder> {
        let _ = place;
        Err(SpatialError::Unsupported {
            source_name: self.name().to_owned(),
            operation:   "fetch_place",
        })
    }
}

// ── StaticSource ──────────────────────────────────────────────────────────────

/// A whole-area road network held in memory and clipped per request.
///
/// Typical uses: a city network loaded once from CSV at startup, and
/// hand-built fixtures in tests.  The underlying graph is shared read-only
/// behind an `Arc`; clipping copies the edges inside the box into a new
/// builder.
#[derive(Clone)]
pub struct StaticSource {
    name:  String,
    graph: Arc<RoadGraph>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, graph: RoadGraph) -> Self {
        Self { name: name.into(), graph: Arc::new(graph) }
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    /// Copy every edge whose endpoints both lie inside `bbox`.
    ///
    /// Nodes are renumbered densely in first-seen order.  Because the source
    /// graph is sorted by `(from, to, key)`, kept parallel edges get the same
    /// keys they had in the source.
    pub fn clip(&self, bbox: &BoundingBox) -> RoadGraphBuilder {
        let g = &*self.graph;
        let mut builder = RoadGraphBuilder::new();
        let mut remap: FxHashMap<NodeId, NodeId> = FxHashMap::default();

        for e in 0..g.edge_count() {
            let (from, to) = (g.edge_from[e], g.edge_to[e]);
            if !bbox.contains(g.position(from)) || !bbox.contains(g.position(to)) {
                continue;
            }
            let local_from = *remap
                .entry(from)
                .or_insert_with(|| builder.add_node(g.position(from)));
            let local_to = *remap
                .entry(to)
                .or_insert_with(|| builder.add_node(g.position(to)));
            builder.add_directed_edge(local_from, local_to, g.edge_length_m[e]);
        }
        builder
    }
}

impl RoadDataSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_region(&self, bbox: &BoundingBox) -> SpatialResult<RoadGraphBuilder> {
        Ok(self.clip(bbox))
    }

    /// The static network is the only place this source knows about.
    fn fetch_place(&self, place: &str) -> SpatialResult<RoadGraphBuilder> {
        if !place.eq_ignore_ascii_case(&self.name) {
            return Err(SpatialError::EmptyPlace(place.to_owned()));
        }
        match self.graph.envelope() {
            Some(bbox) => Ok(self.clip(&bbox)),
            None => Ok(RoadGraphBuilder::new()),
        }
    }
}
