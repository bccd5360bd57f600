use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tracing::{debug, trace};

use crate::pal::{Platform, PlatformFacade};
use crate::registry::RegistryShared;
use crate::{ERR_POISONED_LOCK, Error, Result, TaskState, elapsed};

/// Source of task identifiers. Identifiers are unique for the lifetime of the process,
/// so any registry can key any task by its identifier.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(0);

/// One instrumented operation with a friendly name and a three-state lifecycle.
///
/// Tasks are created by [`Registry::task()`](crate::Registry::task), start out `Pending` and
/// are tracked by the registry that created them. Calling [`start()`](Self::start) starts the
/// clock and [`finish()`](Self::finish) stops it. Each transition is legal exactly once.
///
/// `Task` is a handle: clones refer to the same task and compare equal. Two separately created
/// tasks never compare equal, even if they have the same name.
///
/// # Examples
///
/// ```
/// use task_clock::{Registry, TaskState};
///
/// # fn main() -> task_clock::Result<()> {
/// let registry = Registry::new();
/// let task = registry.task("Parse input")?;
/// assert_eq!(task.state(), TaskState::Pending);
///
/// task.start()?.finish()?;
/// assert_eq!(task.state(), TaskState::Finished);
///
/// // Finished tasks always report the same elapsed time.
/// assert_eq!(task.nanos()?, task.nanos()?);
///
/// // A task cannot be started twice.
/// assert!(task.start().is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

struct TaskInner {
    id: u64,
    name: String,
    phase: Mutex<Phase>,
    platform: PlatformFacade,

    // Weak because the registry holds strong references to the tasks it tracks.
    registry: Weak<RegistryShared>,
}

/// The lifecycle state together with the timing data that only exists in that state.
#[derive(Clone, Copy, Debug)]
enum Phase {
    Pending,
    Started { start: Duration },
    Finished { elapsed: Duration },
}

impl Phase {
    fn state(self) -> TaskState {
        match self {
            Self::Pending => TaskState::Pending,
            Self::Started { .. } => TaskState::Started,
            Self::Finished { .. } => TaskState::Finished,
        }
    }

    fn elapsed(self, platform: &PlatformFacade) -> Duration {
        match self {
            Self::Pending => Duration::ZERO,
            Self::Started { start } => platform.now().saturating_sub(start),
            Self::Finished { elapsed } => elapsed,
        }
    }
}

impl Task {
    /// Creates a pending task. The caller is responsible for tracking it.
    pub(crate) fn new(
        name: String,
        platform: PlatformFacade,
        registry: Weak<RegistryShared>,
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidArgument {
                invalid_value: name,
                problem: "task name must be a non-empty string".to_string(),
            });
        }

        Ok(Self {
            inner: Arc::new(TaskInner {
                id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
                name,
                phase: Mutex::new(Phase::Pending),
                platform,
                registry,
            }),
        })
    }

    pub(crate) fn id(&self) -> u64 {
        self.inner.id
    }

    /// The friendly name given when the task was created.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TaskState {
        self.inner.phase.lock().expect(ERR_POISONED_LOCK).state()
    }

    /// Starts the clock, moving the task from `Pending` to `Started`.
    ///
    /// Returns the task itself, so calls can be chained.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if the task is not `Pending`. The task is not
    /// modified in that case.
    pub fn start(&self) -> Result<&Self> {
        {
            let mut phase = self.lock_phase()?;

            let Phase::Pending = *phase else {
                return Err(Error::InvalidStateTransition {
                    operation: "start",
                    state: phase.state(),
                });
            };

            *phase = Phase::Started {
                start: self.inner.platform.now(),
            };
        }

        debug!(task = %self.inner.name, id = self.inner.id, "task started");

        Ok(self)
    }

    /// Stops the clock, moving the task from `Started` to `Finished`.
    ///
    /// The elapsed time is captured at this moment and never changes afterwards.
    /// Returns the task itself, so calls can be chained.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if the task is not `Started`. The task is not
    /// modified in that case.
    pub fn finish(&self) -> Result<&Self> {
        let elapsed = {
            let mut phase = self.lock_phase()?;

            let Phase::Started { start } = *phase else {
                return Err(Error::InvalidStateTransition {
                    operation: "finish",
                    state: phase.state(),
                });
            };

            let elapsed = self.inner.platform.now().saturating_sub(start);
            *phase = Phase::Finished { elapsed };
            elapsed
        };

        debug!(task = %self.inner.name, id = self.inner.id, ?elapsed, "task finished");

        Ok(self)
    }

    /// Adds the task to the registry that created it, if it is not already tracked.
    ///
    /// Tracking is independent of the lifecycle state. If the registry no longer exists,
    /// this does nothing.
    pub fn track(&self) -> &Self {
        if let Some(registry) = self.inner.registry.upgrade() {
            registry.insert(self);
            trace!(task = %self.inner.name, id = self.inner.id, "task tracked");
        }

        self
    }

    /// Removes the task from the registry that created it, if it is tracked there.
    ///
    /// The task keeps its state and timing data and can be tracked again later.
    pub fn untrack(&self) -> &Self {
        if let Some(registry) = self.inner.registry.upgrade() {
            registry.remove(self);
            trace!(task = %self.inner.name, id = self.inner.id, "task untracked");
        }

        self
    }

    /// The elapsed time of the task.
    ///
    /// * `Pending` tasks always report zero.
    /// * `Started` tasks report the time since [`start()`](Self::start), measured anew on
    ///   every call.
    /// * `Finished` tasks report the time between [`start()`](Self::start) and
    ///   [`finish()`](Self::finish).
    ///
    /// Use [`Duration::as_secs()`] and [`Duration::subsec_nanos()`] to obtain the whole seconds
    /// and the sub-second remainder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the task state is unreadable, which only happens after
    /// a panic while the state lock was held.
    pub fn elapsed(&self) -> Result<Duration> {
        Ok(self.lock_phase()?.elapsed(&self.inner.platform))
    }

    /// The elapsed time in seconds.
    ///
    /// # Errors
    ///
    /// See [`elapsed()`](Self::elapsed).
    pub fn seconds(&self) -> Result<f64> {
        self.elapsed().map(elapsed::seconds)
    }

    /// The elapsed time in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RangeOverflow`] if the elapsed time exceeds
    /// [`MAX_MILLIS_SECONDS`](crate::MAX_MILLIS_SECONDS) seconds. See also
    /// [`elapsed()`](Self::elapsed).
    pub fn millis(&self) -> Result<f64> {
        elapsed::millis(self.elapsed()?)
    }

    /// The elapsed time in whole nanoseconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RangeOverflow`] if the elapsed time exceeds
    /// [`MAX_NANOS_SECONDS`](crate::MAX_NANOS_SECONDS) seconds. See also
    /// [`elapsed()`](Self::elapsed).
    pub fn nanos(&self) -> Result<u64> {
        elapsed::nanos(self.elapsed()?)
    }

    /// Reads the state and the elapsed time under a single lock, so they agree with each other.
    pub(crate) fn snapshot(&self) -> Result<(TaskState, Duration)> {
        let phase = self.lock_phase()?;
        Ok((phase.state(), phase.elapsed(&self.inner.platform)))
    }

    fn lock_phase(&self) -> Result<MutexGuard<'_, Phase>> {
        self.inner
            .phase
            .lock()
            .map_err(|_poisoned| Error::InvalidState {
                task: self.inner.name.clone(),
            })
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Task {}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = self.inner.phase.lock().map(|phase| *phase);

        f.debug_struct("Task")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("phase", &phase.ok())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.inner.name, self.state())
    }
}
