//! Process-wide pacing gate for outbound requests.
//!
//! This module provides the [`RateLimiter`] struct which enforces a minimum
//! interval between any two requests issued by the process, regardless of
//! which component issues them (search, listing, detail pages, archives).
//!
//! # Overview
//!
//! There is exactly one gate. Callers queue on it in arrival order and each
//! acquisition completes at least `interval` after the previous one. The gate
//! never closes, so a waiting caller always eventually proceeds.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use subscout_core::download::RateLimiter;
//!
//! # async fn example() {
//! let limiter = Arc::new(RateLimiter::new(Duration::from_millis(300)));
//!
//! // First request proceeds immediately
//! limiter.acquire().await;
//!
//! // Second request waits until 300ms have passed since the first
//! limiter.acquire().await;
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, trace, warn};

use super::constants::CUMULATIVE_DELAY_WARNING_THRESHOLD;

/// Global request pacing gate.
///
/// Designed to be wrapped in `Arc` and shared by every fetch call site. The
/// inner `tokio::sync::Mutex` is fair (FIFO), and is held across the pacing
/// sleep so acquisitions are serialized in arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum time between two completed acquisitions.
    interval: Duration,

    /// Whether pacing is disabled (for `--rate-limit 0`).
    disabled: bool,

    /// Completion time of the last acquisition.
    /// `None` until the first request, which proceeds immediately.
    last_request: Mutex<Option<Instant>>,

    /// Cumulative delay applied so far (in milliseconds).
    cumulative_delay_ms: AtomicU64,
}

impl RateLimiter {
    /// Creates a new gate with the given minimum interval.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use subscout_core::download::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(Duration::from_millis(300));
    /// assert_eq!(limiter.interval(), Duration::from_millis(300));
    /// ```
    #[must_use]
    #[instrument(skip_all, fields(interval_ms = interval.as_millis()))]
    pub fn new(interval: Duration) -> Self {
        debug!("creating rate limiter");
        Self {
            interval,
            disabled: interval.is_zero(),
            last_request: Mutex::new(None),
            cumulative_delay_ms: AtomicU64::new(0),
        }
    }

    /// Creates a gate that applies no delay.
    #[must_use]
    pub fn disabled() -> Self {
        debug!("creating disabled rate limiter");
        Self::new(Duration::ZERO)
    }

    /// Returns whether pacing is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the minimum interval between acquisitions.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the total delay applied by this gate so far.
    #[must_use]
    pub fn cumulative_delay(&self) -> Duration {
        Duration::from_millis(self.cumulative_delay_ms.load(Ordering::SeqCst))
    }

    /// Waits until the caller may issue its request.
    ///
    /// The first acquisition returns immediately. Every later acquisition
    /// returns no sooner than `interval` after the previous one returned.
    pub async fn acquire(&self) {
        if self.disabled {
            return;
        }

        let mut last_request = self.last_request.lock().await;

        if let Some(previous) = *last_request {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                let delay = self.interval.saturating_sub(elapsed);
                let cumulative = self.add_cumulative_delay(delay);

                trace!(
                    delay_ms = delay.as_millis(),
                    cumulative_ms = cumulative.as_millis(),
                    "applying pacing delay"
                );

                if cumulative >= CUMULATIVE_DELAY_WARNING_THRESHOLD
                    && cumulative.saturating_sub(delay) < CUMULATIVE_DELAY_WARNING_THRESHOLD
                {
                    warn!(
                        cumulative_delay_secs = cumulative.as_secs(),
                        "heavy request pacing - consider selecting fewer subtitles"
                    );
                }

                tokio::time::sleep(delay).await;
            }
        }

        *last_request = Some(Instant::now());
    }

    #[allow(clippy::cast_possible_truncation)]
    fn add_cumulative_delay(&self, delay: Duration) -> Duration {
        let delay_ms = delay.as_millis() as u64;
        let total = self
            .cumulative_delay_ms
            .fetch_add(delay_ms, Ordering::SeqCst)
            + delay_ms;
        Duration::from_millis(total)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(super::constants::DEFAULT_RATE_LIMIT)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_rate_limiter_new_creates_with_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        assert_eq!(limiter.interval(), Duration::from_millis(500));
        assert!(!limiter.is_disabled());
    }

    #[test]
    fn test_rate_limiter_zero_interval_is_disabled() {
        assert!(RateLimiter::new(Duration::ZERO).is_disabled());
        assert!(RateLimiter::disabled().is_disabled());
    }

    #[test]
    fn test_rate_limiter_default_is_300ms() {
        assert_eq!(RateLimiter::default().interval(), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_rate_limiter_disabled_no_delay() {
        tokio::time::pause();

        let limiter = RateLimiter::disabled();
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_rate_limiter_first_request_no_delay() {
        tokio::time::pause();

        let limiter = RateLimiter::new(Duration::from_secs(1));
        let start = Instant::now();

        limiter.acquire().await;

        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_sequential_requests() {
        tokio::time::pause();

        let limiter = RateLimiter::new(Duration::from_millis(300));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(300));

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(600));
        assert!(start.elapsed() < Duration::from_millis(700));
        assert_eq!(limiter.cumulative_delay(), Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_rate_limiter_no_delay_after_idle_period() {
        tokio::time::pause();

        let limiter = RateLimiter::new(Duration::from_millis(300));
        limiter.acquire().await;

        tokio::time::sleep(Duration::from_secs(1)).await;

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_rate_limiter_concurrent_acquisitions_are_spaced() {
        tokio::time::pause();

        let interval = Duration::from_millis(300);
        let limiter = Arc::new(RateLimiter::new(interval));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                Instant::now()
            }));
        }

        let mut completions = Vec::new();
        for handle in handles {
            completions.push(handle.await.unwrap());
        }
        completions.sort();

        for pair in completions.windows(2) {
            assert!(
                pair[1].duration_since(pair[0]) >= interval,
                "acquisitions completed {:?} apart",
                pair[1].duration_since(pair[0])
            );
        }
    }
}
