//! Bounding-box road-network provider.
//!
//! # Topology strategy
//!
//! Every planning request fetches its own network for the box around its two
//! endpoints (plus a fixed margin).  There is no process-wide graph cache: a
//! request owns its [`RegionNetwork`] outright, which rules out two requests
//! racing on edge weights and bounds memory by the size of one region.  The
//! cost is one upstream fetch per request; [`StaticSource`](crate::StaticSource)
//! makes that fetch an in-memory clip when a whole-city network is available.
//!
//! # Failure handling
//!
//! | Upstream outcome             | Provider result                         |
//! |------------------------------|-----------------------------------------|
//! | `NetworkUnavailable`         | retried once after backoff, then error  |
//! | no answer within the timeout | `UpstreamTimeout`                       |
//! | zero edges in the box        | `EmptyRegion` (never retried)           |

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use sr_core::{Backoff, BoundingBox, CancelToken, GeoPoint, Interrupted, run_bounded};

use crate::network::{EdgeFeatureRow, RoadGraph, RoadGraphBuilder};
use crate::source::RoadDataSource;
use crate::{SpatialError, SpatialResult};

/// Default margin added around the endpoints' envelope (≈ 2 km).
pub const DEFAULT_MARGIN_DEG: f64 = 0.02;

/// A request-scoped road network and its edge feature table.
pub struct RegionNetwork {
    pub bbox:     BoundingBox,
    pub graph:    RoadGraph,
    /// One row per edge, in `EdgeId` order.
    pub features: Vec<EdgeFeatureRow>,
}

/// Tunables for [`RoadNetworkProvider`].
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Degrees added on each side of the endpoints' envelope.
    pub margin_deg: f64,
    /// Upper bound on one upstream fetch.
    pub fetch_timeout: Duration,
    /// Delay before the retry of a `NetworkUnavailable` fetch.
    pub retry_backoff: Duration,
    /// Retries after the first `NetworkUnavailable`.
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            margin_deg:    DEFAULT_MARGIN_DEG,
            fetch_timeout: Duration::from_secs(30),
            retry_backoff: Duration::from_millis(500),
            max_retries:   1,
        }
    }
}

/// Fetches a drivable network around two endpoints.
pub struct RoadNetworkProvider {
    source: Arc<dyn RoadDataSource>,
    config: ProviderConfig,
}

impl RoadNetworkProvider {
    pub fn new(source: Arc<dyn RoadDataSource>, config: ProviderConfig) -> Self {
        Self { source, config }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// The box fetched for a request between `origin` and `destination`.
    pub fn bounding_box(&self, origin: GeoPoint, destination: GeoPoint) -> BoundingBox {
        BoundingBox::around(origin, destination, self.config.margin_deg)
    }

    /// Fetch and build the network covering both endpoints.
    pub fn fetch(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        cancel: &CancelToken,
    ) -> SpatialResult<RegionNetwork> {
        let bbox = self.bounding_box(origin, destination);
        debug!(source = self.source_name(), %bbox, "fetching road network");

        let builder = self.fetch_with_retry(cancel, move |s| s.fetch_region(&bbox))?;
        let (graph, features) = builder.build_with_features();
        if graph.edge_count() == 0 {
            return Err(SpatialError::EmptyRegion { bbox });
        }

        info!(
            source = self.source_name(),
            %bbox,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "road network ready"
        );
        Ok(RegionNetwork { bbox, graph, features })
    }

    /// Fetch and build the network of a named place.
    pub fn fetch_place(&self, place: &str, cancel: &CancelToken) -> SpatialResult<RegionNetwork> {
        let name = place.to_owned();
        let builder = self.fetch_with_retry(cancel, move |s| s.fetch_place(&name))?;
        let (graph, features) = builder.build_with_features();
        match graph.envelope() {
            Some(bbox) if graph.edge_count() > 0 => Ok(RegionNetwork { bbox, graph, features }),
            _ => Err(SpatialError::EmptyPlace(place.to_owned())),
        }
    }

    /// Run `job` against the source under the fetch timeout, retrying
    /// `NetworkUnavailable` up to `max_retries` times.
    fn fetch_with_retry<F>(&self, cancel: &CancelToken, job: F) -> SpatialResult<RoadGraphBuilder>
    where
        F: Fn(&dyn RoadDataSource) -> SpatialResult<RoadGraphBuilder> + Clone + Send + 'static,
    {
        let mut backoff = Backoff::new(self.config.retry_backoff, self.config.retry_backoff * 4);
        let mut attempt = 0;

        loop {
            let source = Arc::clone(&self.source);
            let job = job.clone();
            let outcome = run_bounded("road-fetch", self.config.fetch_timeout, cancel, move || {
                job(source.as_ref())
            });

            let result = match outcome {
                Ok(result) => result,
                Err(Interrupted::TimedOut(after)) => Err(SpatialError::UpstreamTimeout {
                    what: "road network fetch",
                    after,
                }),
                Err(Interrupted::Cancelled) => Err(SpatialError::Cancelled),
                Err(e @ (Interrupted::Panicked | Interrupted::Spawn(_))) => {
                    Err(SpatialError::NetworkUnavailable {
                        source_name: self.source_name().to_owned(),
                        reason:      e.to_string(),
                    })
                }
            };

            match result {
                Err(SpatialError::NetworkUnavailable { reason, .. })
                    if attempt < self.config.max_retries =>
                {
                    attempt += 1;
                    let delay = backoff.next_delay();
                    warn!(
                        source = self.source_name(),
                        attempt,
                        ?delay,
                        %reason,
                        "road-data source unavailable, retrying"
                    );
                    std::thread::sleep(delay);
                    if cancel.is_cancelled() {
                        return Err(SpatialError::Cancelled);
                    }
                }
                other => return other,
            }
        }
    }
}
