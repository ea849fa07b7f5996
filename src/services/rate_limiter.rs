// src/services/rate_limiter.rs

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::Error;

/// Bounds outgoing requests to at most `max_per_second` grants within any
/// trailing one-second window.
///
/// Single-caller by construction (`&mut self`, no internal locking); the
/// grant log is a monotonic-clock deque bounded by the configured cap.
pub struct RateLimiter {
    max_per_second: usize,
    window: Duration,
    grants: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_per_second: u32) -> Result<Self, Error> {
        if max_per_second == 0 {
            return Err(Error::Config(
                "max_requests_per_second must be > 0".to_string(),
            ));
        }

        Ok(Self {
            max_per_second: max_per_second as usize,
            window: Duration::from_secs(1),
            grants: VecDeque::with_capacity(max_per_second as usize),
        })
    }

    /// Suspends until one more request fits in the trailing window, then
    /// records the grant.
    pub async fn acquire(&mut self) {
        loop {
            let now = Instant::now();

            while matches!(self.grants.front(), Some(t) if now.duration_since(*t) > self.window) {
                self.grants.pop_front();
            }

            if self.grants.len() < self.max_per_second {
                break;
            }

            let Some(&oldest) = self.grants.front() else {
                break;
            };
            let wait = self.window.saturating_sub(now.duration_since(oldest));
            if wait.is_zero() {
                // The oldest grant just aged out of the window.
                self.grants.pop_front();
                continue;
            }

            debug!("Rate limit reached, waiting {:.2}s", wait.as_secs_f64());
            sleep(wait).await;
        }

        self.grants.push_back(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_cap_is_a_configuration_error() {
        assert!(matches!(RateLimiter::new(0), Err(Error::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn grants_under_the_cap_do_not_wait() {
        let mut limiter = RateLimiter::new(5).unwrap();

        let started = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }

        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn no_trailing_window_exceeds_the_cap() {
        let mut limiter = RateLimiter::new(3).unwrap();

        let mut grant_times = Vec::new();
        for _ in 0..10 {
            limiter.acquire().await;
            grant_times.push(Instant::now());
        }

        // Every sliding one-second window holds at most 3 grants.
        for (i, start) in grant_times.iter().enumerate() {
            let in_window = grant_times[i..]
                .iter()
                .filter(|t| t.duration_since(*start) < Duration::from_secs(1))
                .count();
            assert!(in_window <= 3, "window starting at grant {i} holds {in_window} grants");
        }

        // 10 grants at 3/s take at least 3 simulated seconds overall.
        let elapsed = grant_times[9].duration_since(grant_times[0]);
        assert!(elapsed >= Duration::from_secs(3), "elapsed was {elapsed:?}");
        assert!(elapsed < Duration::from_secs(4), "elapsed was {elapsed:?}");
    }
}
