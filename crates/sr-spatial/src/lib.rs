//! `sr-spatial` — road multigraph, road-data sources, and route search.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`network`]  | `RoadGraph` (CSR multigraph + R-tree), `RoadGraphBuilder`, `EdgeFeatureRow` |
//! | [`router`]   | `RouteSearch` trait, `NodePath`, `DijkstraSearch`          |
//! | [`source`]   | `RoadDataSource` trait, `StaticSource`                     |
//! | [`provider`] | `RoadNetworkProvider`, `RegionNetwork`, `ProviderConfig`   |
//! | [`loader`]   | CSV network loading                                        |
//! | [`overpass`] | Overpass payload parsing; `OverpassSource` (feature `overpass`) |
//! | [`tags`]     | OSM drivability / one-way rules                            |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `overpass` | Enables the blocking Overpass API client.                 |
//! | `serde`    | Derives `Serialize`/`Deserialize` on `EdgeFeatureRow`, `NodePath`, and `sr-core` types. |

pub mod error;
pub mod loader;
pub mod network;
pub mod overpass;
pub mod provider;
pub mod router;
pub mod source;
pub mod tags;


pub use error::{SpatialError, SpatialResult};
pub use loader::{load_network_csv, load_network_readers};
pub use network::{EdgeFeatureRow, RoadGraph, RoadGraphBuilder};
pub use provider::{ProviderConfig, RegionNetwork, RoadNetworkProvider};
pub use router::{DijkstraSearch, NodePath, RouteSearch};
pub use source::{RoadDataSource, StaticSource};

#[cfg(feature = "overpass")]
pub use overpass::OverpassSource;
