//! Synthetic Chicago Loop road network.
//!
//! Nine intersections on a 3 × 3 grid, roughly 400 m apart.  All roads are
//! two-way except Wacker, which runs east only.

use sr_core::GeoPoint;
use sr_spatial::{RoadGraph, RoadGraphBuilder};

/// `(name, position)` of every intersection, row by row from the north-west.
pub const INTERSECTIONS: [(&str, GeoPoint); 9] = [
    ("Wacker & Wells",       GeoPoint { lat: 41.8865, lon: -87.6340 }),
    ("Wacker & LaSalle",     GeoPoint { lat: 41.8865, lon: -87.6325 }),
    ("Wacker & Clark",       GeoPoint { lat: 41.8865, lon: -87.6310 }),
    ("Madison & Wells",      GeoPoint { lat: 41.8820, lon: -87.6340 }),
    ("Madison & LaSalle",    GeoPoint { lat: 41.8820, lon: -87.6325 }),
    ("Madison & Clark",      GeoPoint { lat: 41.8820, lon: -87.6310 }),
    ("Van Buren & Wells",    GeoPoint { lat: 41.8768, lon: -87.6340 }),
    ("Van Buren & LaSalle",  GeoPoint { lat: 41.8768, lon: -87.6325 }),
    ("Van Buren & Clark",    GeoPoint { lat: 41.8768, lon: -87.6310 }),
];

pub fn build_network() -> RoadGraph {
    let mut b = RoadGraphBuilder::new();
    let n: Vec<_> = INTERSECTIONS.iter().map(|&(_, p)| b.add_node(p)).collect();

    // Wacker Drive, one-way eastbound.
    b.add_directed_edge(n[0], n[1], 125.0);
    b.add_directed_edge(n[1], n[2], 125.0);

    // Madison and Van Buren, east-west.
    b.add_road(n[3], n[4], 125.0);
    b.add_road(n[4], n[5], 125.0);
    b.add_road(n[6], n[7], 125.0);
    b.add_road(n[7], n[8], 125.0);

    // Wells, LaSalle, Clark, north-south.
    for col in 0..3 {
        b.add_road(n[col], n[col + 3], 500.0);
        b.add_road(n[col + 3], n[col + 6], 580.0);
    }

    b.build()
}
