//! Request pacing with adaptive backoff for the MusicBrainz client.

use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// Keeps a minimum gap between requests.  The gap doubles after a failure
/// (up to `ceiling`) and halves again after a streak of successes (down to
/// `floor`).
pub struct RateLimiter {
    service: String,
    floor: Duration,
    ceiling: Duration,
    gap: Duration,
    previous: Option<Instant>,
    streak: u32,
    streak_to_relax: u32,
}

impl RateLimiter {
    /// * `service` - label for log messages
    /// * `floor` - minimum time between requests
    /// * `ceiling` - largest gap after repeated failures
    /// * `streak_to_relax` - consecutive successes before the gap halves;
    ///   0 keeps a widened gap for good
    pub fn new(service: &str, floor: Duration, ceiling: Duration, streak_to_relax: u32) -> Self {
        RateLimiter {
            service: service.to_string(),
            floor,
            ceiling,
            gap: floor,
            previous: None,
            streak: 0,
            streak_to_relax,
        }
    }

    /// `millis` floor, 16x ceiling, relax after 10 successes.
    pub fn from_millis(service: &str, millis: u64) -> Self {
        let floor = Duration::from_millis(millis);
        Self::new(service, floor, floor * 16, 10)
    }

    pub fn gap(&self) -> Duration {
        self.gap
    }

    /// Block until the next request may be sent and mark it as sent.
    ///
    /// # Returns
    /// The time spent sleeping.
    pub fn pace(&mut self) -> Duration {
        let remaining = self
            .previous
            .map(|at| self.gap.saturating_sub(at.elapsed()))
            .unwrap_or_default();
        if !remaining.is_zero() {
            debug!("[{}] pacing: waiting {:.1}s", self.service, remaining.as_secs_f64());
            thread::sleep(remaining);
        }
        self.previous = Some(Instant::now());
        remaining
    }

    pub fn succeeded(&mut self) {
        if self.streak_to_relax == 0 || self.gap <= self.floor {
            self.streak = 0;
            return;
        }

        self.streak += 1;
        if self.streak >= self.streak_to_relax {
            self.gap = (self.gap / 2).max(self.floor);
            debug!("[{}] gap relaxed to {:.1}s", self.service, self.gap.as_secs_f64());
            self.streak = 0;
        }
    }

    pub fn failed(&mut self) {
        self.gap = (self.gap * 2).min(self.ceiling);
        self.streak = 0;
        debug!("[{}] gap widened to {:.1}s after an error", self.service, self.gap.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(streak: u32) -> RateLimiter {
        RateLimiter::new("test", Duration::from_millis(10), Duration::from_millis(80), streak)
    }

    #[test]
    fn test_failures_widen_up_to_ceiling() {
        let mut limiter = limiter(2);
        for expected in [20, 40, 80, 80] {
            limiter.failed();
            assert_eq!(limiter.gap(), Duration::from_millis(expected));
        }
    }

    #[test]
    fn test_success_streak_relaxes_down_to_floor() {
        let mut limiter = limiter(2);
        limiter.failed();
        limiter.failed();

        limiter.succeeded();
        assert_eq!(limiter.gap(), Duration::from_millis(40));
        limiter.succeeded();
        assert_eq!(limiter.gap(), Duration::from_millis(20));

        for _ in 0..6 {
            limiter.succeeded();
        }
        assert_eq!(limiter.gap(), Duration::from_millis(10));
    }

    #[test]
    fn test_failure_breaks_streak() {
        let mut limiter = limiter(2);
        limiter.failed();
        limiter.succeeded();
        limiter.failed();
        limiter.succeeded();
        assert_eq!(limiter.gap(), Duration::from_millis(40));
    }

    #[test]
    fn test_zero_streak_never_relaxes() {
        let mut limiter = limiter(0);
        limiter.failed();
        for _ in 0..20 {
            limiter.succeeded();
        }
        assert_eq!(limiter.gap(), Duration::from_millis(20));
    }

    #[test]
    fn test_first_request_is_not_delayed() {
        let mut limiter = RateLimiter::from_millis("test", 20);
        assert_eq!(limiter.pace(), Duration::ZERO);
        let start = Instant::now();
        limiter.pace();
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
