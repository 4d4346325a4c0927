//! Pacing between external operations.
//!
//! Two modes:
//! - batch-adaptive: [`delay_for`] picks a pause from the batch size, and
//!   [`BatchPacer`] applies it between items (never after the last);
//! - fixed-interval: [`FixedInterval`] is a shared limiter owned by one
//!   provider client, so every caller of that provider is throttled in
//!   aggregate.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

/// Upper bound on any batch delay.
const MAX_DELAY_SECS: f64 = 10.0;

/// Pause in seconds between consecutive items of a batch of `batch_size`.
///
/// | batch size | delay |
/// |---|---|
/// | 0..=10 | 1.0 |
/// | 11..=100 | 2.0 |
/// | 101..=500 | `3 + n/100` |
/// | above 500 | `min(5 + log10(n/100) * 2, 10)` |
///
/// Capped at 10 seconds, but not monotonic: the logarithmic tier restarts
/// below the top of the linear one, so 500 items wait 8.0 s and 501 items
/// about 6.4 s. The cap is only reached at 100 000 items.
pub fn delay_for(batch_size: usize) -> f64 {
    match batch_size {
        0..=10 => 1.0,
        11..=100 => 2.0,
        101..=500 => 3.0 + batch_size as f64 / 100.0,
        _ => (5.0 + (batch_size as f64 / 100.0).log10() * 2.0).min(MAX_DELAY_SECS),
    }
}

/// Applies the batch delay between items of one batch loop.
#[derive(Debug, Clone)]
pub struct BatchPacer {
    delay: Duration,
    total: usize,
}

impl BatchPacer {
    /// Pacer for a batch of `total` items using [`delay_for`].
    pub fn for_batch(total: usize) -> Self {
        Self::with_delay(total, Duration::from_secs_f64(delay_for(total)))
    }

    /// Pacer with an explicit delay.
    pub fn with_delay(total: usize, delay: Duration) -> Self {
        Self { delay, total }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep after item `index` (0-based) unless it was the last one.
    pub async fn after_item(&self, index: usize) {
        if index + 1 < self.total && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Fixed minimum spacing between calls, shared by every user of one client.
pub struct FixedInterval {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    period: Duration,
}

impl FixedInterval {
    /// One call per `period`. A zero period disables pacing.
    pub fn new(period: Duration) -> Self {
        let limiter = Quota::with_period(period).map(|quota| {
            RateLimiter::direct(quota.allow_burst(NonZeroU32::MIN))
        });
        Self { limiter, period }
    }

    /// No pacing at all (tests and local mocks).
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait until the next call is allowed.
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

impl std::fmt::Debug for FixedInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedInterval")
            .field("period", &self.period)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_delay_table() {
        assert_eq!(delay_for(0), 1.0);
        assert_eq!(delay_for(5), 1.0);
        assert_eq!(delay_for(10), 1.0);
        assert_eq!(delay_for(11), 2.0);
        assert_eq!(delay_for(50), 2.0);
        assert_eq!(delay_for(100), 2.0);
        assert_eq!(delay_for(300), 6.0);
        assert_eq!(delay_for(500), 8.0);
    }

    #[test]
    fn test_delay_above_500() {
        assert!((delay_for(1000) - 7.0).abs() < 1e-9);
        assert!((delay_for(10_000) - 9.0).abs() < 1e-9);
        assert_eq!(delay_for(100_000), 10.0);
        assert_eq!(delay_for(1_000_000), 10.0);
        // The log tier starts below the top of the linear tier
        assert!(delay_for(501) < delay_for(500));
    }

    #[tokio::test]
    async fn test_pacer_skips_last_item() {
        let pacer = BatchPacer::with_delay(2, Duration::from_millis(40));
        let start = std::time::Instant::now();
        pacer.after_item(0).await;
        let after_first = start.elapsed();
        assert!(after_first >= Duration::from_millis(40));
        pacer.after_item(1).await;
        assert!(start.elapsed() - after_first < Duration::from_millis(30));
    }

    #[test]
    fn test_pacer_uses_batch_delay() {
        assert_eq!(BatchPacer::for_batch(300).delay(), Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_disabled_interval_does_not_wait() {
        let interval = FixedInterval::disabled();
        let start = std::time::Instant::now();
        for _ in 0..5 {
            interval.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_fixed_interval_spaces_calls() {
        let interval = FixedInterval::new(Duration::from_millis(50));
        let start = std::time::Instant::now();
        interval.wait().await;
        interval.wait().await;
        interval.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    proptest! {
        #[test]
        fn delay_is_bounded(n in 0usize..10_000_000) {
            let d = delay_for(n);
            prop_assert!(d <= 10.0);
            prop_assert!(d >= 1.0);
        }

        #[test]
        fn delay_is_monotonic_within_tiers(n in 0usize..1_000_000) {
            if n != 500 {
                prop_assert!(delay_for(n + 1) >= delay_for(n));
            }
        }
    }
}
