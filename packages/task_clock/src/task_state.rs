use std::fmt;

/// The lifecycle state of a [`Task`](crate::Task).
///
/// A task only ever moves forward: `Pending` to `Started` to `Finished`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum TaskState {
    /// The task has been created but its clock has not been started.
    Pending,

    /// The clock is running.
    Started,

    /// The clock has been stopped and the elapsed time is frozen.
    Finished,
}

impl TaskState {
    /// The name of the state, as used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Started => "Started",
            Self::Finished => "Finished",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
