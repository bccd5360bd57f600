use thiserror::Error;

use crate::{Scale, TaskState};

/// Errors that can occur when timing tasks or generating reports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller provided a value that is not acceptable for the operation.
    #[error("invalid argument: '{invalid_value}' is invalid: {problem}")]
    InvalidArgument {
        /// The value that was rejected.
        invalid_value: String,

        /// A human-readable description of the problem.
        problem: String,
    },

    /// A lifecycle operation was attempted on a task whose state does not allow it.
    #[error("cannot {operation} a task in state {state}")]
    InvalidStateTransition {
        /// The attempted operation, e.g. `start` or `finish`.
        operation: &'static str,

        /// The state the task was in when the operation was attempted.
        state: TaskState,
    },

    /// The elapsed time is too large to express in the requested unit without losing precision.
    #[error("elapsed time of {seconds} seconds is too long to express in {scale}")]
    RangeOverflow {
        /// The whole seconds of the elapsed time that could not be converted.
        seconds: u64,

        /// The unit the conversion targeted.
        scale: Scale,
    },

    /// The internal state of a task could not be read.
    ///
    /// This can only happen if a thread panicked while holding the task's state lock. It does
    /// not occur in normal operation.
    #[error("task '{task}' is in an invalid state")]
    InvalidState {
        /// The name of the affected task.
        task: String,
    },
}

/// A specialized `Result` type for task timing operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
