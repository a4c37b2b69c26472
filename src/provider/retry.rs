use crate::errors::{AppError, Result};
use crate::provider::{Quote, VenueFeed};
use rand::Rng;
use std::time::Duration;
use tracing::warn;

/// Exponential backoff with jitter for feed fetches.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Relative jitter applied to each delay (0.3 = ±30%).
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // 500ms base, 2x multiplier, 30s cap, ±30% jitter
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter_factor: 0.3,
        }
    }
}

impl RetryPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(AppError::config("retry max_attempts must be positive"));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(AppError::config("retry multiplier must be >= 1"));
        }
        if !self.jitter_factor.is_finite() || !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(AppError::config("retry jitter must be within [0, 1]"));
        }
        if self.max_delay < self.base_delay {
            return Err(AppError::config("retry max delay must be >= base delay"));
        }
        Ok(())
    }

    /// Delay before retry number `attempt` (0-based), before jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(base.min(self.max_delay.as_secs_f64()))
    }

    /// Backoff with ±`jitter_factor` noise, never below zero or above `max_delay`.
    pub fn delay_with_jitter<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let capped = self.backoff(attempt).as_secs_f64();
        let range = capped * self.jitter_factor;
        let jitter = if range > 0.0 {
            rng.gen_range(-range..=range)
        } else {
            0.0
        };
        let secs = (capped + jitter).clamp(0.0, self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

/// Fetch from `feed`, retrying per `policy`. Returns the last error once all
/// attempts are spent.
pub async fn fetch_with_retry(feed: &dyn VenueFeed, policy: &RetryPolicy) -> Result<Vec<Quote>> {
    let mut attempt = 0;
    loop {
        match feed.fetch_quotes().await {
            Ok(quotes) => return Ok(quotes),
            Err(e) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    return Err(e);
                }
                let delay = policy.delay_with_jitter(attempt - 1, &mut rand::thread_rng());
                warn!(
                    venue = feed.venue(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "[FEED] fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
