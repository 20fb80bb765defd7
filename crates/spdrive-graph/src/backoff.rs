//! Backoff policy for retrying throttled and failing requests
//!
//! The policy is pure: it computes delays and never sleeps. The
//! executor owns the clock.

use std::time::Duration;

use spdrive_core::config::RetryConfig;
use tracing::warn;

/// Exponential backoff schedule with a server-hint override
///
/// Delays grow as `base * multiplier^(n-1)` for the n-th failed attempt
/// and are capped at `max_delay`. When the server supplies a
/// `Retry-After` hint, the hint wins over the computed delay, still
/// subject to the cap.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    max_attempts: u32,
    base_delay: Duration,
    multiplier: f64,
    max_delay: Duration,
}

impl BackoffPolicy {
    /// Creates a policy; `max_attempts` counts the first try
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: f64, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            multiplier,
            max_delay,
        }
    }

    pub fn from_config(retry: &RetryConfig) -> Self {
        Self::new(
            retry.max_attempts,
            Duration::from_millis(retry.base_delay_ms),
            retry.multiplier,
            Duration::from_millis(retry.max_delay_ms),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    ///
    /// Returns `None` when the attempt budget is spent, meaning the
    /// caller must stop retrying. A `hint` from a `Retry-After` header
    /// overrides the computed delay but never exceeds the cap.
    pub fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        if let Some(hint) = hint {
            return Some(hint.min(self.max_delay));
        }
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let millis = (self.base_delay.as_millis() as f64) * factor;
        let delay = if millis >= self.max_delay.as_millis() as f64 {
            self.max_delay
        } else {
            Duration::from_millis(millis as u64)
        };
        Some(delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Parses a `Retry-After` header value into a duration
///
/// Accepts integer seconds (the common Graph form) or an HTTP-date.
/// Unparseable values return `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    // Integer seconds first (most common for Graph API)
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    // HTTP-date using chrono
    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value.trim()) {
        let now = chrono::Utc::now();
        let target = date.with_timezone(&chrono::Utc);
        if target > now {
            let diff = target - now;
            if let Some(secs) = diff
                .num_seconds()
                .try_into()
                .ok()
                .filter(|&s: &u64| s <= 3600)
            {
                return Some(Duration::from_secs(secs));
            }
        }
    }

    warn!(value, "Could not parse Retry-After header");
    None
}
