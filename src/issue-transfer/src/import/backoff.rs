//! Poll pacing for pending imports.

use async_trait::async_trait;
use std::time::Duration;

/// Exponential backoff between import status polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Wait before the first poll.
    pub initial_delay: Duration,

    /// Multiplier applied after every poll.
    pub factor: f64,

    /// Polls allowed before giving up.
    pub max_retries: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1000),
            factor: 1.6,
            max_retries: 10,
        }
    }
}

impl BackoffPolicy {
    /// Returns the delay that follows `delay`.
    #[must_use]
    pub fn next_delay(&self, delay: Duration) -> Duration {
        delay.mul_f64(self.factor)
    }
}

/// Suspends the driver between polls.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Waits for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_by_factor() {
        let policy = BackoffPolicy::default();
        let mut delay = policy.initial_delay;
        let mut delays = Vec::new();
        for _ in 0..4 {
            delays.push(delay.as_millis());
            delay = policy.next_delay(delay);
        }
        assert_eq!(delays, vec![1000, 1600, 2560, 4096]);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_advances_timer() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_millis(1600)).await;
        assert!(start.elapsed() >= Duration::from_millis(1600));
    }
}
