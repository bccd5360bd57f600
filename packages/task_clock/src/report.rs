//! Snapshots of tracked tasks and their CSV rendering.

use std::fmt;
use std::time::Duration;

use itertools::Itertools;

use crate::{Result, Scale, Task, TaskState, elapsed};

/// A snapshot of the name, state and elapsed time of a set of tasks, at one [`Scale`].
///
/// The `Display` implementation renders the report as CSV: a header line
/// `"name","state","<scale>"` followed by one line per task. Text fields are quoted, the elapsed
/// time is an unquoted number. Lines are separated by `\n` with no trailing newline.
///
/// A `Report` holds no references to the tasks it was created from and can be sent to other
/// threads.
///
/// # Examples
///
/// ```
/// use task_clock::{Registry, Scale};
///
/// # fn main() -> task_clock::Result<()> {
/// let registry = Registry::new();
/// registry.task("Warm up")?;
///
/// let report = registry.to_report(Scale::Nanoseconds)?;
/// assert_eq!(report.to_string(), "\"name\",\"state\",\"nanoseconds\"\n\"Warm up\",\"Pending\",0");
///
/// for row in report.rows() {
///     println!("{} is {}", row.name(), row.state());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Report {
    scale: Scale,
    rows: Vec<ReportRow>,
}

/// One task in a [`Report`].
#[derive(Clone, Debug)]
pub struct ReportRow {
    name: String,
    state: TaskState,
    value: ReportValue,
}

/// An elapsed time expressed at a report's [`Scale`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum ReportValue {
    /// Whole nanoseconds.
    Nanoseconds(u64),

    /// Milliseconds, including the sub-millisecond fraction.
    Milliseconds(f64),

    /// Seconds, including the sub-second fraction.
    Seconds(f64),
}

impl ReportValue {
    fn from_elapsed(elapsed: Duration, scale: Scale) -> Result<Self> {
        Ok(match scale {
            Scale::Nanoseconds => Self::Nanoseconds(elapsed::nanos(elapsed)?),
            Scale::Milliseconds => Self::Milliseconds(elapsed::millis(elapsed)?),
            Scale::Seconds => Self::Seconds(elapsed::seconds(elapsed)),
        })
    }
}

impl fmt::Display for ReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nanoseconds(value) => write!(f, "{value}"),
            Self::Milliseconds(value) | Self::Seconds(value) => write!(f, "{value}"),
        }
    }
}

impl Report {
    /// Captures the given tasks in order. Fails without a partial result if any task fails.
    pub(crate) fn from_tasks(tasks: &[Task], scale: Scale) -> Result<Self> {
        let rows = tasks
            .iter()
            .map(|task| {
                let (state, elapsed) = task.snapshot()?;

                Ok(ReportRow {
                    name: task.name().to_string(),
                    state,
                    value: ReportValue::from_elapsed(elapsed, scale)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { scale, rows })
    }

    /// The scale the elapsed times are expressed at.
    #[must_use]
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// The rows of the report, in the order the tasks were enumerated.
    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Whether the report contains no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Prints the report to stdout, followed by a newline.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        println!("{self}");
    }
}

impl ReportRow {
    /// The friendly name of the task.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The state of the task when the report was created.
    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// The elapsed time of the task when the report was created.
    #[must_use]
    pub fn value(&self) -> ReportValue {
        self.value
    }
}

/// A CSV field. Text is quoted, with embedded quotes doubled. Numbers are written as-is.
enum Field<'a> {
    Text(&'a str),
    Number(ReportValue),
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "\"{}\"", text.replace('"', "\"\"")),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = [
            Field::Text("name"),
            Field::Text("state"),
            Field::Text(self.scale.as_str()),
        ];
        write!(f, "{}", header.iter().join(","))?;

        for row in &self.rows {
            let fields = [
                Field::Text(&row.name),
                Field::Text(row.state.as_str()),
                Field::Number(row.value),
            ];
            write!(f, "\n{}", fields.iter().join(","))?;
        }

        Ok(())
    }
}
