//! Planner configuration.
//!
//! Every knob has a default; [`PlannerConfig::from_env`] overrides any of
//! them from `SAFEROUTE_*` environment variables:
//!
//! | Variable                          | Field               | Default |
//! |-----------------------------------|---------------------|---------|
//! | `SAFEROUTE_BBOX_MARGIN_DEG`       | `margin_deg`        | 0.02    |
//! | `SAFEROUTE_FETCH_TIMEOUT_SECS`    | `fetch_timeout`     | 30      |
//! | `SAFEROUTE_FETCH_RETRIES`         | `fetch_retries`     | 1       |
//! | `SAFEROUTE_RETRY_BACKOFF_MS`      | `retry_backoff`     | 500     |
//! | `SAFEROUTE_INFERENCE_TIMEOUT_SECS`| `inference_timeout` | 10      |
//! | `SAFEROUTE_NEUTRAL_RISK`          | `neutral_risk`      | 0.5     |
//! | `SAFEROUTE_SPEED_KMH`             | `speed_kmh`         | 30      |
//! | `SAFEROUTE_KM_PER_DEGREE`         | `km_per_degree`     | 111     |
//! | `SAFEROUTE_HISTORY_LIMIT`         | `history_limit`     | 10      |
//! | `SAFEROUTE_MODEL_PATH`            | `model_path`        | unset   |
//! | `SAFEROUTE_DB_PATH`               | `database_path`     | unset   |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sr_core::{CoreError, CoreResult, KM_PER_DEGREE};
use sr_risk::{EdgeRiskAnnotator, NEUTRAL_RISK};
use sr_spatial::ProviderConfig;
use sr_spatial::provider::DEFAULT_MARGIN_DEG;

/// Top-level planner configuration.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
    /// Degrees added around the endpoints' envelope for the network fetch.
    pub margin_deg: f64,
    pub fetch_timeout: Duration,
    /// Retries after a `NetworkUnavailable` fetch.
    pub fetch_retries: u32,
    pub retry_backoff: Duration,
    pub inference_timeout: Duration,
    /// Risk assigned to every edge when inference fails.
    pub neutral_risk: f64,
    /// Assumed travel speed for segment durations.
    pub speed_kmh: f64,
    /// Scale of the flat-earth segment distance.
    pub km_per_degree: f64,
    /// Default number of routes returned by the history query.
    pub history_limit: usize,
    pub model_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            margin_deg:        DEFAULT_MARGIN_DEG,
            fetch_timeout:     Duration::from_secs(30),
            fetch_retries:     1,
            retry_backoff:     Duration::from_millis(500),
            inference_timeout: Duration::from_secs(10),
            neutral_risk:      NEUTRAL_RISK,
            speed_kmh:         30.0,
            km_per_degree:     KM_PER_DEGREE,
            history_limit:     10,
            model_path:        None,
            database_path:     None,
        }
    }
}

impl PlannerConfig {
    /// Defaults overridden by the process environment, then validated.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let mut c = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = parse(&get, "SAFEROUTE_BBOX_MARGIN_DEG")? {
            c.margin_deg = v;
        }
        if let Some(v) = parse(&get, "SAFEROUTE_FETCH_TIMEOUT_SECS")? {
            c.fetch_timeout = seconds("SAFEROUTE_FETCH_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = parse(&get, "SAFEROUTE_FETCH_RETRIES")? {
            c.fetch_retries = v;
        }
        if let Some(v) = parse(&get, "SAFEROUTE_RETRY_BACKOFF_MS")? {
            c.retry_backoff = Duration::from_millis(v);
        }
        if let Some(v) = parse(&get, "SAFEROUTE_INFERENCE_TIMEOUT_SECS")? {
            c.inference_timeout = seconds("SAFEROUTE_INFERENCE_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = parse(&get, "SAFEROUTE_NEUTRAL_RISK")? {
            c.neutral_risk = v;
        }
        if let Some(v) = parse(&get, "SAFEROUTE_SPEED_KMH")? {
            c.speed_kmh = v;
        }
        if let Some(v) = parse(&get, "SAFEROUTE_KM_PER_DEGREE")? {
            c.km_per_degree = v;
        }
        if let Some(v) = parse(&get, "SAFEROUTE_HISTORY_LIMIT")? {
            c.history_limit = v;
        }
        c.model_path = get("SAFEROUTE_MODEL_PATH").map(PathBuf::from);
        c.database_path = get("SAFEROUTE_DB_PATH").map(PathBuf::from);

        c.validate()?;
        Ok(c)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !(self.margin_deg.is_finite() && self.margin_deg >= 0.0) {
            return Err(config_err(format!("margin_deg must be >= 0, got {}", self.margin_deg)));
        }
        if self.fetch_timeout.is_zero() || self.inference_timeout.is_zero() {
            return Err(config_err("timeouts must be non-zero".to_owned()));
        }
        if !(0.0..=1.0).contains(&self.neutral_risk) {
            return Err(config_err(format!("neutral_risk must be in [0, 1], got {}", self.neutral_risk)));
        }
        if !(self.speed_kmh.is_finite() && self.speed_kmh > 0.0) {
            return Err(config_err(format!("speed_kmh must be > 0, got {}", self.speed_kmh)));
        }
        if !(self.km_per_degree.is_finite() && self.km_per_degree > 0.0) {
            return Err(config_err(format!("km_per_degree must be > 0, got {}", self.km_per_degree)));
        }
        if self.history_limit == 0 {
            return Err(config_err("history_limit must be > 0".to_owned()));
        }
        Ok(())
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            margin_deg:    self.margin_deg,
            fetch_timeout: self.fetch_timeout,
            retry_backoff: self.retry_backoff,
            max_retries:   self.fetch_retries,
        }
    }

    pub fn annotator(&self) -> EdgeRiskAnnotator {
        EdgeRiskAnnotator::new(self.inference_timeout).with_neutral_risk(self.neutral_risk)
    }
}

fn parse<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> CoreResult<Option<T>> {
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| config_err(format!("{key}={raw:?} is not a valid value"))),
    }
}

/// Whole or fractional seconds; negative, non-finite, and out-of-range values are rejected.
fn seconds(key: &str, v: f64) -> CoreResult<Duration> {
    Duration::try_from_secs_f64(v)
        .map_err(|e| config_err(format!("{key} must be a non-negative number of seconds, got {v}: {e}")))
}

fn config_err(msg: String) -> CoreError {
    CoreError::Config(msg)
}
