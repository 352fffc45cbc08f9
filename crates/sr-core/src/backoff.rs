//! Exponential backoff with jitter for retrying upstream calls.

use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone)]
pub struct Backoff {
    base:         Duration,
    max:          Duration,
    current:      Duration,
    jitter_ratio: f64,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.max(Duration::from_millis(1));
        let max = max.max(base);
        Self { base, max, current: base, jitter_ratio: 0.2 }
    }

    /// Override the jitter ratio (clamped to `[0, 1]`).  Zero disables jitter.
    pub fn with_jitter(mut self, ratio: f64) -> Self {
        self.jitter_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Delay to wait before the next attempt.  Doubles the base delay for the
    /// attempt after, saturating at `max`.
    pub fn next_delay(&mut self) -> Duration {
        let delay = add_jitter(self.current, self.jitter_ratio);
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

fn add_jitter(delay: Duration, ratio: f64) -> Duration {
    let jitter_ms_max = (delay.as_millis() as f64 * ratio) as u64;
    if jitter_ms_max == 0 {
        return delay;
    }
    delay + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms_max))
}
