//! Fake platform implementation for testing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pal::abstractions::Platform;

/// Fake implementation of the platform abstraction for testing.
///
/// Tests control the current time instead of relying on the real clock. Multiple clones of
/// the same `FakePlatform` share the same underlying time, allowing tests to advance the clock
/// after handing the platform to a registry.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    now: Arc<Mutex<Duration>>,
}

impl FakePlatform {
    /// Creates a new fake platform whose clock reads zero.
    pub(crate) fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Sets the current time. This affects all clones of this platform.
    pub(crate) fn set_now(&self, now: Duration) {
        *self
            .now
            .lock()
            .expect("FakePlatform state lock should not be poisoned") = now;
    }

    /// Moves the current time forward. This affects all clones of this platform.
    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self
            .now
            .lock()
            .expect("FakePlatform state lock should not be poisoned");

        *now = now
            .checked_add(by)
            .expect("tests never advance the fake clock beyond Duration::MAX");
    }
}

impl Platform for FakePlatform {
    fn now(&self) -> Duration {
        *self
            .now
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn initializes_with_zero_time() {
        let platform = FakePlatform::new();
        assert_eq!(platform.now(), Duration::ZERO);
    }

    #[test]
    fn sets_and_advances_time() {
        let platform = FakePlatform::new();

        platform.set_now(Duration::from_millis(150));
        assert_eq!(platform.now(), Duration::from_millis(150));

        platform.advance(Duration::from_millis(50));
        assert_eq!(platform.now(), Duration::from_millis(200));
    }

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        platform1.set_now(Duration::from_secs(3));
        assert_eq!(platform2.now(), Duration::from_secs(3));
    }
}
