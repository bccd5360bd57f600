//! Platform abstraction trait definitions.

use std::fmt::Debug;
use std::time::Duration;

/// Provides monotonic timestamps.
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Gets the current time as an offset from an arbitrary fixed origin.
    ///
    /// The value never decreases between calls on the same platform instance or its clones.
    fn now(&self) -> Duration;
}
