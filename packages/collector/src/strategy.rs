//! Adaptive pacing between requests.
//!
//! A [`DelayController`] holds one multiplier that scales the configured
//! base delay. After each round it is nudged by the running success rate:
//! doubled below [`LOW_SUCCESS_RATE`], cut by a fifth above
//! [`HIGH_SUCCESS_RATE`], and always kept within the configured clamp.
//! The actual wait is `base_delay * multiplier * jitter` with jitter drawn
//! uniformly from `[0.5, 1.5]`.

use std::ops::RangeInclusive;
use std::time::Duration;

use data_collect_collector_models::Adjustment;
use data_collect_config::CollectorConfig;
use rand::Rng;

/// Multiplier every controller starts from.
pub const INITIAL_MULTIPLIER: f64 = 1.0;

/// Success rates below this slow the collector down.
pub const LOW_SUCCESS_RATE: f64 = 0.5;

/// Success rates above this speed the collector up.
pub const HIGH_SUCCESS_RATE: f64 = 0.9;

const BACKOFF_FACTOR: f64 = 2.0;
const SPEEDUP_FACTOR: f64 = 0.8;

/// Range the random jitter factor is drawn from.
pub const JITTER_RANGE: RangeInclusive<f64> = 0.5..=1.5;

/// Threshold-based feedback on the inter-request delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayController {
    multiplier: f64,
    min: f64,
    max: f64,
}

impl DelayController {
    /// Creates a controller at [`INITIAL_MULTIPLIER`] clamped to
    /// `[min, max]`.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            multiplier: INITIAL_MULTIPLIER.clamp(min, max),
            min,
            max,
        }
    }

    /// Creates a controller using the configured clamp.
    #[must_use]
    pub fn from_config(config: &CollectorConfig) -> Self {
        Self::new(config.min_multiplier, config.max_multiplier)
    }

    /// Current multiplier.
    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Adjusts the multiplier from the running success rate.
    pub fn adjust(&mut self, success_rate: f64) -> Adjustment {
        let (factor, adjustment) = if success_rate < LOW_SUCCESS_RATE {
            (BACKOFF_FACTOR, Adjustment::Increased)
        } else if success_rate > HIGH_SUCCESS_RATE {
            (SPEEDUP_FACTOR, Adjustment::Decreased)
        } else {
            return Adjustment::Unchanged;
        };

        self.multiplier = (self.multiplier * factor).clamp(self.min, self.max);
        adjustment
    }
}

/// Draws a jitter factor from [`JITTER_RANGE`].
pub fn jitter_factor(rng: &mut impl Rng) -> f64 {
    rng.gen_range(JITTER_RANGE)
}

/// `base_delay * multiplier * jitter` as a [`Duration`].
///
/// Non-positive and NaN products yield zero; products too large for a
/// `Duration`, infinity included, saturate to [`Duration::MAX`].
#[must_use]
pub fn compute_delay(base_delay: f64, multiplier: f64, jitter: f64) -> Duration {
    let secs = base_delay * multiplier * jitter;
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Waits for `delay`. The pipeline awaits this directly and does nothing
/// else in the meantime; there is no cancellation.
pub async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
