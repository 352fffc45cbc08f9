//! `sr-store` — persisted records and the route store.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                       |
//! |-------------|----------------------------------------------------------------|
//! | [`records`] | `Location`, `Route`, `RouteSegment`, `PersistedRoute`, drafts  |
//! | [`store`]   | `RouteStore` trait                                             |
//! | [`sqlite`]  | `SqliteStore` — bundled SQLite, one transaction per route      |
//! | [`error`]   | `StoreError`, `StoreResult<T>`                                 |
//!
//! All record types derive `Serialize`/`Deserialize` so callers can return
//! them from an API layer unchanged.

pub mod error;
pub mod records;
pub mod sqlite;
pub mod store;


pub use error::{StoreError, StoreResult};
pub use records::{
    Location, LocationKind, PersistedRoute, Route, RouteDraft, RouteSegment, SegmentDraft,
};
pub use sqlite::SqliteStore;
pub use store::RouteStore;
