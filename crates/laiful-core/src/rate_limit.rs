//! Per-sender cooldown for network-triggering commands.
//!
//! Only allowed attempts are recorded: a rejected attempt does not push the
//! window forward, so rapid retries see a shrinking wait.

use moka::future::Cache;
use std::time::{Duration, Instant};
use tracing::debug;

/// Upper bound on tracked senders.
const MAX_TRACKED_SENDERS: u64 = 100_000;

/// Cooldown gate keyed by sender id
#[derive(Clone)]
pub struct RateLimiter {
    /// sender -> instant of the last allowed attempt; entries expire with the cooldown
    last_allowed: Cache<String, Instant>,
    cooldown: Duration,
}

impl RateLimiter {
    /// Creates a limiter with the given cooldown.
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        let last_allowed = Cache::builder()
            .max_capacity(MAX_TRACKED_SENDERS)
            .time_to_live(cooldown)
            .build();

        Self {
            last_allowed,
            cooldown,
        }
    }

    /// Returns the remaining wait for `sender`, or zero when the attempt is allowed.
    ///
    /// An allowed attempt starts a new cooldown window.
    pub async fn check(&self, sender: &str) -> Duration {
        if let Some(last) = self.last_allowed.get(sender).await {
            let elapsed = last.elapsed();
            if elapsed < self.cooldown {
                let wait = self.cooldown - elapsed;
                debug!(sender = %sender, wait_ms = wait.as_millis(), "Rate limited");
                return wait;
            }
        }

        self.last_allowed
            .insert(sender.to_string(), Instant::now())
            .await;
        Duration::ZERO
    }

    /// Configured cooldown
    #[cfg(test)]
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_attempt_is_allowed() {
        let limiter = RateLimiter::new(Duration::from_millis(1500));
        assert_eq!(limiter.check("628111").await, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_second_attempt_waits() {
        let limiter = RateLimiter::new(Duration::from_millis(1500));
        limiter.check("628111").await;

        let wait = limiter.check("628111").await;
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_rejected_attempts_do_not_extend_window() {
        let limiter = RateLimiter::new(Duration::from_millis(300));
        limiter.check("628111").await;

        let first_wait = limiter.check("628111").await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second_wait = limiter.check("628111").await;
        assert!(second_wait < first_wait);

        tokio::time::sleep(second_wait + Duration::from_millis(20)).await;
        assert_eq!(limiter.check("628111").await, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_senders_are_independent() {
        let limiter = RateLimiter::new(Duration::from_millis(1500));
        limiter.check("628111").await;
        assert_eq!(limiter.check("628222").await, Duration::ZERO);
    }
}
