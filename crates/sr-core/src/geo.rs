//! Geographic coordinate and bounding-box types.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Persisted locations are
//! identified by their exact coordinate pair, so the engine never narrows a
//! caller-supplied coordinate.

/// Kilometres per degree used by the flat-earth segment approximation.
pub const KM_PER_DEGREE: f64 = 111.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` if both components are finite and inside the WGS-84 ranges.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Flat-earth distance in kilometres: the Euclidean norm of the degree
    /// deltas scaled by `km_per_degree`.
    ///
    /// Ignores the longitude shrink with latitude.  Good enough for
    /// consecutive intersections; use [`distance_m`](Self::distance_m) when
    /// accuracy matters.
    #[inline]
    pub fn flat_distance_km(self, other: GeoPoint, km_per_degree: f64) -> f64 {
        let d_lat = other.lat - self.lat;
        let d_lon = other.lon - self.lon;
        (d_lat * d_lat + d_lon * d_lon).sqrt() * km_per_degree
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── BoundingBox ───────────────────────────────────────────────────────────────

/// Axis-aligned lat/lon rectangle used to scope a road-network fetch.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Smallest box containing `a` and `b`, grown by `margin_deg` on every
    /// side.
    pub fn around(a: GeoPoint, b: GeoPoint, margin_deg: f64) -> Self {
        Self {
            min_lat: a.lat.min(b.lat) - margin_deg,
            min_lon: a.lon.min(b.lon) - margin_deg,
            max_lat: a.lat.max(b.lat) + margin_deg,
            max_lon: a.lon.max(b.lon) + margin_deg,
        }
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.lat)
            && (self.min_lon..=self.max_lon).contains(&p.lon)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) * 0.5,
            (self.min_lon + self.max_lon) * 0.5,
        )
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.5},{:.5} .. {:.5},{:.5}]",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}
