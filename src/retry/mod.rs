
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Retry delay policy for a [BackoffTimer]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct BackoffConfig {
    /// Delay of the first attempt. Each following attempt adds this again.
    pub base_delay_ms: u64,
    /// Upper bound for any returned delay
    pub max_delay_ms: u64,
    /// Number of attempts after which the delay starts over from the base
    pub reset_interval: Option<u32>,
    /// Fraction of the delay to randomly add or subtract (e.g. 0.1 for ±10%)
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 5000,
            reset_interval: Some(5),
            jitter: 0.1,
        }
    }
}

impl BackoffConfig {
    /// Backoff policy for keyboards, which reconnect with fast, short steps
    pub fn keyboard() -> Self {
        Self {
            base_delay_ms: 100,
            max_delay_ms: 1000,
            reset_interval: None,
            jitter: 0.1,
        }
    }
}

/// Produces increasing delays between failed connection attempts.
///
/// Each channel owns its own timer, so no synchronization is done here.
#[derive(Debug)]
pub struct BackoffTimer {
    config: BackoffConfig,
    attempts: u32,
}

impl BackoffTimer {
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            attempts: 0,
        }
    }

    /// Returns the number of attempts since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the delay to wait before the next attempt and advances the
    /// attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next_base_delay();
        let jitter = self.config.jitter.clamp(0.0, 1.0);
        if jitter == 0.0 || delay.is_zero() {
            return delay;
        }

        let factor = 1.0 + rand::rng().random_range(-jitter..=jitter);
        delay.mul_f64(factor)
    }

    /// Returns the delay for the next attempt before any jitter is applied
    pub fn next_base_delay(&mut self) -> Duration {
        self.attempts = self.attempts.saturating_add(1);

        let base = Duration::from_millis(self.config.base_delay_ms);
        let max = Duration::from_millis(self.config.max_delay_ms);
        let delay = base.saturating_mul(self.attempts).min(max);

        if let Some(interval) = self.config.reset_interval {
            if self.attempts >= interval {
                self.reset();
            }
        }

        delay
    }

    /// Start over from the base delay. Called after a successful connection.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
