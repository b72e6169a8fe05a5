use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum spacing between outbound adapter requests.
///
/// One instance is shared across an entire [`crate::manager::ScraperManager`]
/// sweep, not per-source: the limit applies to the manager's request
/// cadence as a whole, regardless of which source is being tried.
pub struct RateLimiter {
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: Mutex::new(None),
        }
    }

    /// Sleep for whatever remains of the configured delay since the last
    /// call, then record this call's time. The first call never sleeps.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[tokio::test]
    async fn first_call_does_not_block() {
        let limiter = RateLimiter::new(Duration::from_millis(200));
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn second_call_waits_out_the_remaining_delay() {
        let limiter = RateLimiter::new(Duration::from_millis(60));
        limiter.wait().await;
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_advances_virtual_time_by_exactly_the_configured_delay() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        limiter.wait().await;

        let start = Instant::now();
        limiter.wait().await;
        tokio_test::assert_elapsed!(start, Duration::from_millis(500));
    }

    proptest::proptest! {
        /// For any configured delay and any number of consecutive calls,
        /// every call after the first observes at least `delay` of
        /// wall-clock spacing since the previous one returned.
        #[test]
        fn consecutive_waits_are_always_spaced_by_at_least_delay(
            delay_ms in 5u64..40,
            calls in 2usize..6,
        ) {
            tokio::runtime::Runtime::new().unwrap().block_on(async {
                let limiter = RateLimiter::new(Duration::from_millis(delay_ms));
                let mut previous: Option<Instant> = None;

                for _ in 0..calls {
                    let before = Instant::now();
                    limiter.wait().await;
                    if let Some(previous) = previous {
                        prop_assert!(before.duration_since(previous) + Duration::from_millis(1) >= Duration::from_millis(delay_ms));
                    }
                    previous = Some(Instant::now());
                }
                Ok(())
            })?;
        }
    }
}
