//! Rate limiting for destination writes.
//!
//! A migration issues thousands of sequential write calls, so the core rate
//! limit is checked every few calls and the run pauses until the window
//! resets when the remaining budget gets low.

use octocrab::Octocrab;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Maximum time to wait for rate limit reset (1 hour).
const MAX_WAIT_SECS: u64 = 3600;

/// Minimum remaining requests before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 50;

/// Rate limit information for the core API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// Unix timestamp when the rate limit resets.
    pub reset: u64,
    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// Returns how long to pause at `now` (Unix seconds), if at all.
    ///
    /// Waits are capped at one hour.
    #[must_use]
    pub fn wait_duration(&self, now: u64) -> Option<Duration> {
        if self.remaining >= MIN_REMAINING_THRESHOLD || self.reset <= now {
            return None;
        }

        let wait_secs = self.reset - now;
        if wait_secs > MAX_WAIT_SECS {
            warn!(
                wait_secs,
                max_wait = MAX_WAIT_SECS,
                "Rate limit reset too far in future, capping wait time"
            );
        }
        Some(Duration::from_secs(wait_secs.min(MAX_WAIT_SECS)))
    }
}

/// Checks the current rate limit status for the core API.
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn check_core_rate_limit(octocrab: &Octocrab) -> Result<RateLimitInfo, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let core = &rate_limit.resources.core;

    Ok(RateLimitInfo {
        remaining: core.remaining as u32,
        reset: core.reset,
        limit: core.limit as u32,
    })
}

/// Samples the core rate limit every `interval` calls.
#[derive(Debug)]
pub struct RateLimitGuard {
    calls: AtomicU32,
    interval: u32,
}

impl RateLimitGuard {
    /// Creates a guard that checks on the first call and every `interval`
    /// calls after it.
    #[must_use]
    pub fn new(interval: u32) -> Self {
        Self {
            calls: AtomicU32::new(0),
            interval: interval.max(1),
        }
    }

    /// Returns true if the call with this sequence number should check.
    fn is_due(&self) -> bool {
        self.calls.fetch_add(1, Ordering::Relaxed) % self.interval == 0
    }

    /// Pauses until the rate limit resets when the budget is nearly spent.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate limit API call fails.
    pub async fn ensure(&self, octocrab: &Octocrab) -> Result<(), octocrab::Error> {
        if !self.is_due() {
            return Ok(());
        }

        let info = check_core_rate_limit(octocrab).await?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        if let Some(wait) = info.wait_duration(now) {
            info!(
                remaining = info.remaining,
                limit = info.limit,
                wait_secs = wait.as_secs(),
                "Rate limit low, waiting for reset"
            );
            tokio::time::sleep(wait).await;
        }
        Ok(())
    }
}
