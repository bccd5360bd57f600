//! Conversions of elapsed time into the numeric representations used by reports.
//!
//! Milliseconds are expressed as `f64`, which only represents integers exactly up to
//! `2^53 - 1`. Nanoseconds are expressed as `u64`. Durations whose second count exceeds the
//! respective bound are rejected instead of silently losing precision.

use std::time::Duration;

use crate::{Error, Result, Scale};

/// The largest integer that `f64` represents exactly (`2^53 - 1`).
const MAX_EXACT_F64_INTEGER: u64 = 9_007_199_254_740_991;

const MILLIS_PER_SECOND: u64 = 1_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;
const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// The largest elapsed second count that can be converted to milliseconds.
///
/// This is `floor((2^53 - 1) / 1000)`: any more and the whole-millisecond part of an `f64`
/// would no longer be exact.
pub const MAX_MILLIS_SECONDS: u64 = 9_007_199_254_740;

/// The largest elapsed second count that can be converted to nanoseconds.
///
/// This is `floor((u64::MAX - 999_999_999) / 10^9)`, the largest second count for which the
/// nanosecond total fits in `u64` regardless of the sub-second remainder.
pub const MAX_NANOS_SECONDS: u64 = 18_446_744_072;

pub(crate) fn seconds(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64()
}

pub(crate) fn millis(elapsed: Duration) -> Result<f64> {
    let seconds = elapsed.as_secs();

    if seconds > MAX_MILLIS_SECONDS {
        return Err(Error::RangeOverflow {
            seconds,
            scale: Scale::Milliseconds,
        });
    }

    let whole_millis = seconds
        .checked_mul(MILLIS_PER_SECOND)
        .expect("guarded by MAX_MILLIS_SECONDS");

    #[expect(
        clippy::cast_precision_loss,
        reason = "guarded by MAX_MILLIS_SECONDS, so the value is exactly representable"
    )]
    let whole_millis = whole_millis as f64;

    Ok(whole_millis + f64::from(elapsed.subsec_nanos()) / NANOS_PER_MILLI)
}

pub(crate) fn nanos(elapsed: Duration) -> Result<u64> {
    let seconds = elapsed.as_secs();

    if seconds > MAX_NANOS_SECONDS {
        return Err(Error::RangeOverflow {
            seconds,
            scale: Scale::Nanoseconds,
        });
    }

    Ok(seconds
        .checked_mul(NANOS_PER_SECOND)
        .and_then(|whole| whole.checked_add(u64::from(elapsed.subsec_nanos())))
        .expect("guarded by MAX_NANOS_SECONDS"))
}
