#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! High-resolution wall-clock timing of named tasks.
//!
//! A task is one instrumented operation. It has a friendly name and moves through exactly three
//! states, in order: `Pending`, `Started`, `Finished`. While `Started`, its elapsed time is read
//! live from a monotonic clock. Once `Finished`, the elapsed time is frozen and every later read
//! returns the same value.
//!
//! Tasks are created by a [`Registry`], which tracks them until they are explicitly untracked or
//! the registry is reset. The registry can render all tracked tasks as a CSV report at a chosen
//! time [`Scale`].
//!
//! The core functionality includes:
//! - [`Registry`] - Creates and tracks tasks, generates reports
//! - [`Task`] - The state machine and timing data of one operation
//! - [`Report`] - A snapshot of the tracked tasks, formatted as CSV by its `Display` impl
//! - [`Scale`] - The time unit used in a report
//!
//! # Simple usage
//!
//! ```
//! use task_clock::{Registry, Scale};
//!
//! # fn main() -> task_clock::Result<()> {
//! let registry = Registry::new();
//!
//! let load = registry.task("Load configuration")?;
//! load.start()?;
//! // Do the work...
//! load.finish()?;
//!
//! // Tasks that were never started report zero elapsed time.
//! let _idle = registry.task("Never started")?;
//!
//! println!("{}", registry.report(Scale::Milliseconds)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Polling a long-running task
//!
//! A started task can be read at any time without finishing it:
//!
//! ```
//! use task_clock::Registry;
//!
//! # fn main() -> task_clock::Result<()> {
//! let registry = Registry::new();
//! let task = registry.task("Background import")?;
//! task.start()?;
//!
//! let so_far = task.seconds()?;
//! assert!(so_far >= 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Process-wide registry
//!
//! [`Registry::global()`] returns a registry shared by the entire process. Independent registries
//! can be created with [`Registry::new()`] wherever isolation is desired, such as in tests.
//!
//! # Tracking
//!
//! Tracking is independent from the lifecycle. A task of any state can be removed from its
//! registry with [`Task::untrack()`] and added back with [`Task::track()`], which controls whether
//! the task shows up in reports.
//!
//! # Threading
//!
//! All types are thread-safe. The registry membership and each task's state are guarded by
//! their own locks, so state transitions are atomic even when the same task is shared between
//! threads.
//!
//! # Logging
//!
//! Lifecycle events are emitted via the `tracing` facade at debug/trace level. This crate does
//! not install a subscriber.

mod elapsed;
mod error;
mod pal;
mod registry;
mod report;
mod scale;
mod task;
mod task_state;

pub use elapsed::{MAX_MILLIS_SECONDS, MAX_NANOS_SECONDS};
pub use error::*;
pub use registry::Registry;
pub use report::{Report, ReportRow, ReportValue};
pub use scale::Scale;
pub use task::Task;
pub use task_state::TaskState;

pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned lock - tracked tasks can no longer be trusted";
