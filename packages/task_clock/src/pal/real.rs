use std::time::{Duration, Instant};

use crate::pal::Platform;

/// Measures time with the operating system monotonic clock.
///
/// Timestamps are offsets from the moment the platform was created. Copies share the origin.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RealPlatform {
    origin: Instant,
}

impl RealPlatform {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Platform for RealPlatform {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
