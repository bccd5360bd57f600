use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The time unit used to express elapsed time in a [`Report`](crate::Report).
///
/// Parse from text with [`str::parse()`]:
///
/// ```
/// use task_clock::Scale;
///
/// let scale: Scale = "seconds".parse().unwrap();
/// assert_eq!(scale, Scale::Seconds);
///
/// assert!("minutes".parse::<Scale>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Scale {
    /// Whole nanoseconds, rendered as an integer.
    Nanoseconds,

    /// Milliseconds, rendered as a decimal.
    #[default]
    Milliseconds,

    /// Seconds, rendered as a decimal.
    Seconds,
}

impl Scale {
    /// All recognized scales.
    pub const ALL: [Self; 3] = [Self::Nanoseconds, Self::Milliseconds, Self::Seconds];

    /// The name of the scale, as used in report headers and accepted by [`str::parse()`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nanoseconds => "nanoseconds",
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scale| scale.as_str() == s)
            .ok_or_else(|| Error::InvalidArgument {
                invalid_value: s.to_string(),
                problem: "expected one of 'nanoseconds', 'milliseconds' or 'seconds'".to_string(),
            })
    }
}
