//! SQLite-backed [`RouteStore`].
//!
//! Three tables: `locations`, `routes`, and `route_segments`.  Location
//! identity is enforced by `UNIQUE(latitude, longitude)`, so get-or-create is
//! a conflict-ignoring insert followed by a lookup and stays idempotent even
//! when two requests race on the same coordinate.
//!
//! The connection sits behind a `Mutex`; every operation holds it for its
//! full duration, which serializes writers the same way SQLite would.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use sr_core::{GeoPoint, LocationId, RouteId, SegmentId, UserId};

use crate::{
    Location, LocationKind, PersistedRoute, Route, RouteDraft, RouteSegment, RouteStore,
    StoreError, StoreResult,
};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS locations (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        latitude   REAL    NOT NULL,
        longitude  REAL    NOT NULL,
        kind       TEXT    NOT NULL,
        risk_score REAL,
        UNIQUE (latitude, longitude)
    );
    CREATE TABLE IF NOT EXISTS routes (
        id                     INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id                INTEGER NOT NULL,
        origin_id              INTEGER NOT NULL REFERENCES locations(id),
        destination_id         INTEGER NOT NULL REFERENCES locations(id),
        total_distance_km      REAL    NOT NULL,
        estimated_duration_min REAL    NOT NULL,
        overall_risk_score     REAL    NOT NULL,
        route_type             TEXT    NOT NULL,
        created_at             TEXT    NOT NULL
    );
    CREATE INDEX IF NOT EXISTS routes_by_user ON routes (user_id, created_at);
    CREATE TABLE IF NOT EXISTS route_segments (
        id                   INTEGER PRIMARY KEY AUTOINCREMENT,
        route_id             INTEGER NOT NULL REFERENCES routes(id) ON DELETE CASCADE,
        start_location_id    INTEGER NOT NULL REFERENCES locations(id),
        end_location_id      INTEGER NOT NULL REFERENCES locations(id),
        sequence_order       INTEGER NOT NULL,
        segment_distance_km  REAL    NOT NULL,
        segment_duration_min REAL    NOT NULL,
        segment_risk_score   REAL    NOT NULL,
        UNIQUE (route_id, sequence_order)
    );";

const LOCATION_COLS: &str = "id, latitude, longitude, kind, risk_score";

const ROUTE_COLS: &str = "id, user_id, origin_id, destination_id, total_distance_km, \
                          estimated_duration_min, overall_risk_score, route_type, created_at";

const SEGMENT_COLS: &str = "id, route_id, start_location_id, end_location_id, sequence_order, \
                            segment_distance_km, segment_duration_min, segment_risk_score";

/// Route store over a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and initialise the schema.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;
        Self::init(conn)
    }

    /// A private in-memory database, mainly for tests and demos.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn location_count(&self) -> StoreResult<u64> {
        self.count("locations")
    }

    pub fn route_count(&self) -> StoreResult<u64> {
        self.count("routes")
    }

    pub fn segment_count(&self) -> StoreResult<u64> {
        self.count("route_segments")
    }

    fn count(&self, table: &str) -> StoreResult<u64> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
        Ok(n as u64)
    }
}

impl RouteStore for SqliteStore {
    fn get_or_create_location(&self, point: GeoPoint, kind: LocationKind) -> StoreResult<Location> {
        let conn = self.lock()?;
        upsert_location(&conn, point, kind)
    }

    fn location(&self, id: LocationId) -> StoreResult<Option<Location>> {
        let conn = self.lock()?;
        let loc = conn
            .query_row(
                &format!("SELECT {LOCATION_COLS} FROM locations WHERE id = ?1"),
                [id.0],
                location_from_row,
            )
            .optional()?;
        Ok(loc)
    }

    fn commit_route(&self, draft: &RouteDraft) -> StoreResult<PersistedRoute> {
        validate_draft(draft)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let origin = upsert_location(&tx, draft.origin, LocationKind::Origin)?;
        let destination = upsert_location(&tx, draft.destination, LocationKind::Destination)?;
        let waypoints = draft
            .waypoints
            .iter()
            .map(|&p| upsert_location(&tx, p, LocationKind::Waypoint))
            .collect::<StoreResult<Vec<_>>>()?;

        let created_at = Utc::now().trunc_subsecs(3);
        tx.execute(
            "INSERT INTO routes \
             (user_id, origin_id, destination_id, total_distance_km, estimated_duration_min, \
              overall_risk_score, route_type, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                draft.user_id.0,
                origin.id.0,
                destination.id.0,
                draft.total_distance_km,
                draft.estimated_duration_min,
                draft.overall_risk_score,
                draft.route_type.as_str(),
                created_at,
            ],
        )?;
        let route_id = RouteId(tx.last_insert_rowid());

        let mut segments = Vec::with_capacity(draft.segments.len());
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO route_segments \
                 (route_id, start_location_id, end_location_id, sequence_order, \
                  segment_distance_km, segment_duration_min, segment_risk_score) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for s in &draft.segments {
                let start = waypoints[s.start].id;
                let end = waypoints[s.end].id;
                stmt.execute(params![
                    route_id.0,
                    start.0,
                    end.0,
                    s.sequence_order,
                    s.distance_km,
                    s.duration_min,
                    s.risk_score,
                ])?;
                segments.push(RouteSegment {
                    id:                   SegmentId(tx.last_insert_rowid()),
                    route_id,
                    start_location:       start,
                    end_location:         end,
                    sequence_order:       s.sequence_order,
                    segment_distance_km:  s.distance_km,
                    segment_duration_min: s.duration_min,
                    segment_risk_score:   s.risk_score,
                });
            }
        }
        tx.commit()?;

        debug!(%route_id, segments = segments.len(), "route committed");

        let route = Route {
            id:                     route_id,
            user_id:                draft.user_id,
            origin:                 origin.id,
            destination:            destination.id,
            total_distance_km:      draft.total_distance_km,
            estimated_duration_min: draft.estimated_duration_min,
            overall_risk_score:     draft.overall_risk_score,
            route_type:             draft.route_type,
            created_at,
        };
        Ok(PersistedRoute { route, origin, destination, waypoints, segments })
    }

    fn route(&self, id: RouteId) -> StoreResult<Option<Route>> {
        let conn = self.lock()?;
        select_route(&conn, id)
    }

    fn segments(&self, route: RouteId) -> StoreResult<Vec<RouteSegment>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {SEGMENT_COLS} FROM route_segments WHERE route_id = ?1 ORDER BY sequence_order"
        ))?;
        let rows = stmt.query_map([route.0], segment_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn update_overall_risk(&self, route: RouteId, risk: f64) -> StoreResult<Route> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE routes SET overall_risk_score = ?1 WHERE id = ?2",
            params![risk, route.0],
        )?;
        if changed == 0 {
            return Err(StoreError::RouteNotFound(route));
        }
        select_route(&conn, route)?.ok_or(StoreError::RouteNotFound(route))
    }

    fn annotate_location_risk(&self, location: LocationId, risk: f64) -> StoreResult<Location> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE locations SET risk_score = ?1 WHERE id = ?2",
            params![risk, location.0],
        )?;
        if changed == 0 {
            return Err(StoreError::LocationNotFound(location));
        }
        let loc = conn.query_row(
            &format!("SELECT {LOCATION_COLS} FROM locations WHERE id = ?1"),
            [location.0],
            location_from_row,
        )?;
        Ok(loc)
    }

    fn recent_routes(&self, user: UserId, limit: usize) -> StoreResult<Vec<Route>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {ROUTE_COLS} FROM routes WHERE user_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT ?2"
        ))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![user.0, limit], route_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn upsert_location(conn: &Connection, point: GeoPoint, kind: LocationKind) -> StoreResult<Location> {
    conn.execute(
        "INSERT INTO locations (latitude, longitude, kind) VALUES (?1, ?2, ?3) \
         ON CONFLICT (latitude, longitude) DO NOTHING",
        params![point.lat, point.lon, kind.as_str()],
    )?;
    let loc = conn.query_row(
        &format!("SELECT {LOCATION_COLS} FROM locations WHERE latitude = ?1 AND longitude = ?2"),
        params![point.lat, point.lon],
        location_from_row,
    )?;
    Ok(loc)
}

fn select_route(conn: &Connection, id: RouteId) -> StoreResult<Option<Route>> {
    let route = conn
        .query_row(
            &format!("SELECT {ROUTE_COLS} FROM routes WHERE id = ?1"),
            [id.0],
            route_from_row,
        )
        .optional()?;
    Ok(route)
}

fn validate_draft(draft: &RouteDraft) -> StoreResult<()> {
    let n = draft.waypoints.len();
    for s in &draft.segments {
        if s.start >= n || s.end >= n {
            return Err(StoreError::InvalidDraft(format!(
                "segment {} references waypoint {} of {n}",
                s.sequence_order,
                s.start.max(s.end)
            )));
        }
    }
    Ok(())
}

fn location_from_row(row: &Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id:         LocationId(row.get(0)?),
        latitude:   row.get(1)?,
        longitude:  row.get(2)?,
        kind:       parse_text(row, 3)?,
        risk_score: row.get(4)?,
    })
}

fn route_from_row(row: &Row<'_>) -> rusqlite::Result<Route> {
    Ok(Route {
        id:                     RouteId(row.get(0)?),
        user_id:                UserId(row.get(1)?),
        origin:                 LocationId(row.get(2)?),
        destination:            LocationId(row.get(3)?),
        total_distance_km:      row.get(4)?,
        estimated_duration_min: row.get(5)?,
        overall_risk_score:     row.get(6)?,
        route_type:             parse_text(row, 7)?,
        created_at:             row.get(8)?,
    })
}

fn segment_from_row(row: &Row<'_>) -> rusqlite::Result<RouteSegment> {
    Ok(RouteSegment {
        id:                   SegmentId(row.get(0)?),
        route_id:             RouteId(row.get(1)?),
        start_location:       LocationId(row.get(2)?),
        end_location:         LocationId(row.get(3)?),
        sequence_order:       row.get(4)?,
        segment_distance_km:  row.get(5)?,
        segment_duration_min: row.get(6)?,
        segment_risk_score:   row.get(7)?,
    })
}

/// Read a TEXT column through `FromStr`.
fn parse_text<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
