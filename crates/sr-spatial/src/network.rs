//! Road multigraph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_key`, `edge_length_m`) are
//! sorted by `(from, to, key)` and indexed by `EdgeId`.
//!
//! # Multigraph
//!
//! Two intersections may be joined by several distinct road segments (a
//! service road beside an arterial, a split carriageway).  Every directed
//! edge therefore carries an `edge_key` that numbers the parallel edges of
//! its ordered `(from, to)` pair from 0.  Nothing in this crate assumes at
//! most one edge per pair.
//!
//! # Request-scoped weights
//!
//! The graph stores only physical data.  Risk and travel cost are computed
//! per request into parallel `Vec<f64>`s indexed by `EdgeId`, so a graph is
//! never mutated after [`RoadGraphBuilder::build`].
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId` by
//! Euclidean distance in degree space.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use sr_core::{BoundingBox, EdgeId, FeatureRow, GeoPoint, NodeId, TimeContext};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── EdgeFeatureRow ────────────────────────────────────────────────────────────

/// Model input row for one edge, keyed by the edge's multigraph identity.
///
/// Built alongside the CSR arrays; the time columns hold a placeholder until
/// the annotator stamps the request's `TimeContext` onto them.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeFeatureRow {
    pub edge:     EdgeId,
    pub from:     NodeId,
    pub to:       NodeId,
    pub edge_key: u32,
    pub features: FeatureRow,
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed road multigraph in CSR format plus a spatial index for node
/// snapping.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadGraphBuilder`].
pub struct RoadGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.  Redundant with CSR but required for
    /// path reconstruction.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Parallel-edge discriminator within the `(from, to)` pair.
    pub edge_key: Vec<u32>,

    /// Physical length of each edge in metres.
    pub edge_length_m: Vec<f64>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl RoadGraph {
    /// Construct an empty graph with no nodes or edges.
    pub fn empty() -> Self {
        RoadGraphBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// All parallel edges `from → to`, in key order.
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_edges(from)
            .filter(move |e| self.edge_to[e.index()] == to)
    }

    /// The lowest-cost edge `from → to` under `costs` (indexed by `EdgeId`).
    /// Ties go to the lower edge key.
    pub fn cheapest_edge(&self, from: NodeId, to: NodeId, costs: &[f64]) -> Option<EdgeId> {
        self.edges_between(from, to)
            .min_by(|a, b| costs[a.index()].total_cmp(&costs[b.index()]))
    }

    #[inline]
    pub fn position(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    /// Envelope of all node positions, or `None` for an empty graph.
    pub fn envelope(&self) -> Option<BoundingBox> {
        let first = *self.node_pos.first()?;
        let init = BoundingBox {
            min_lat: first.lat,
            min_lon: first.lon,
            max_lat: first.lat,
            max_lon: first.lon,
        };
        Some(self.node_pos.iter().fold(init, |b, p| BoundingBox {
            min_lat: b.min_lat.min(p.lat),
            min_lon: b.min_lon.min(p.lon),
            max_lat: b.max_lat.max(p.lat),
            max_lon: b.max_lon.max(p.lon),
        }))
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest road node to `pos`.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build)
/// or [`build_with_features`](Self::build_with_features).
///
/// # Example
///
/// ```
/// use sr_core::GeoPoint;
/// use sr_spatial::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_node(GeoPoint::new(41.86, -87.70));
/// let c = b.add_node(GeoPoint::new(41.87, -87.69));
/// b.add_road(a, c, 1_200.0);
/// let (graph, rows) = b.build_with_features();
/// assert_eq!(graph.edge_count(), 2); // bidirectional
/// assert_eq!(rows.len(), 2);
/// ```
pub struct RoadGraphBuilder {
    nodes:      Vec<GeoPoint>,
    raw_edges:  Vec<RawEdge>,
    pair_count: FxHashMap<(NodeId, NodeId), u32>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    key:      u32,
    length_m: f64,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes:      Vec::new(),
            raw_edges:  Vec::new(),
            pair_count: FxHashMap::default(),
        }
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:      Vec::with_capacity(nodes),
            raw_edges:  Vec::with_capacity(edges),
            pair_count: FxHashMap::with_capacity_and_hasher(edges, Default::default()),
        }
    }

    /// Add a road node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** edge and return its multigraph key.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f64) -> u32 {
        let slot = self.pair_count.entry((from, to)).or_insert(0);
        let key = *slot;
        *slot += 1;
        self.raw_edges.push(RawEdge { from, to, key, length_m });
        key
    }

    /// Convenience: add edges in **both directions** for a two-way road.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64) {
        self.add_directed_edge(a, b, length_m);
        self.add_directed_edge(b, a, length_m);
    }

    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    pub fn build(self) -> RoadGraph {
        self.assemble(false).0
    }

    /// Like [`build`](Self::build) but also emits one [`EdgeFeatureRow`] per
    /// edge, filled in the same pass that lays out the edge arrays.
    pub fn build_with_features(self) -> (RoadGraph, Vec<EdgeFeatureRow>) {
        self.assemble(true)
    }

    fn assemble(self, with_features: bool) -> (RoadGraph, Vec<EdgeFeatureRow>) {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Sort edges by (source, target, key) for CSR construction.
        let mut raw = self.raw_edges;
        raw.sort_unstable_by_key(|e| (e.from.0, e.to.0, e.key));

        let mut edge_from     = Vec::with_capacity(edge_count);
        let mut edge_to       = Vec::with_capacity(edge_count);
        let mut edge_key      = Vec::with_capacity(edge_count);
        let mut edge_length_m = Vec::with_capacity(edge_count);
        let mut features      = Vec::with_capacity(if with_features { edge_count } else { 0 });
        let mut node_out_start = vec![0u32; node_count + 1];

        // Time columns are stamped per request by the annotator.
        let unset_time = TimeContext { hour: 0, day_of_week: 0 };

        for (i, e) in raw.iter().enumerate() {
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_key.push(e.key);
            edge_length_m.push(e.length_m);
            node_out_start[e.from.index() + 1] += 1;

            if with_features {
                features.push(EdgeFeatureRow {
                    edge:     EdgeId(i as u32),
                    from:     e.from,
                    to:       e.to,
                    edge_key: e.key,
                    features: FeatureRow::placeholder(self.nodes[e.from.index()], unset_time),
                });
            }
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // Bulk-load R-tree for O(N log N) construction.
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.lat, pos.lon],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        let graph = RoadGraph {
            node_pos: self.nodes,
            node_out_start,
            edge_from,
            edge_to,
            edge_key,
            edge_length_m,
            spatial_idx,
        };
        (graph, features)
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
