//! Injectable time source used throughout vericache.
//!
//! The manager, circuit breaker, learner, warming scheduler, and monitor all
//! need "now" to compute TTLs, recency scores, and predicted next-access
//! times. A trait object lets tests advance time deterministically instead
//! of sleeping real wall-clock seconds to exercise expiry and prediction
//! logic.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A source of the current time and of monotonically increasing IDs.
///
/// Implementations must be cheap to call repeatedly; the hot read path
/// calls `now()` on every cache lookup to score recency.
pub trait Clock: Send + Sync {
    /// Returns the current instant, per this clock's notion of "now".
    fn now(&self) -> Instant;

    /// Returns the current wall-clock time as a Unix timestamp in seconds.
    fn unix_now(&self) -> u64;
}

/// The real system clock. Used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// A manually advanceable clock for tests.
///
/// `TestClock` anchors to the instant it was created and an arbitrary Unix
/// timestamp, then lets a test move both forward by the same offset with
/// [`TestClock::advance`] without needing to actually sleep.
#[derive(Clone)]
pub struct TestClock {
    anchor_instant: Instant,
    anchor_unix: u64,
    offset: Arc<Mutex<Duration>>,
}

impl TestClock {
    /// Creates a new test clock anchored at the given Unix timestamp.
    pub fn new(anchor_unix: u64) -> Self {
        Self {
            anchor_instant: Instant::now(),
            anchor_unix,
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Advances this clock by `duration`. All clones of this `TestClock`
    /// observe the advance, since the offset is shared.
    pub fn advance(&self, duration: Duration) {
        let mut offset = self.offset.lock().expect("test clock mutex poisoned");
        *offset += duration;
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new(1_700_000_000)
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().expect("test clock mutex poisoned");
        self.anchor_instant + offset
    }

    fn unix_now(&self) -> u64 {
        let offset = *self.offset.lock().expect("test clock mutex poisoned");
        self.anchor_unix + offset.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_unix_now_is_plausible() {
        let clock = SystemClock;
        let now = clock.unix_now();
        assert!(now > 1_700_000_000);
    }

    #[test]
    fn test_clock_advances_both_now_and_unix_now() {
        let clock = TestClock::new(1_000);
        let start = clock.now();
        assert_eq!(clock.unix_now(), 1_000);

        clock.advance(Duration::from_secs(30));
        assert_eq!(clock.unix_now(), 1_030);
        assert_eq!(clock.now() - start, Duration::from_secs(30));
    }

    #[test]
    fn clones_share_the_same_offset() {
        let clock = TestClock::new(0);
        let clone = clock.clone();

        clock.advance(Duration::from_secs(5));
        assert_eq!(clone.unix_now(), 5);
    }
}
