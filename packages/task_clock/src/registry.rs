use std::collections::BTreeMap;
use std::mem;
use std::sync::{Arc, LazyLock, Mutex};

use tracing::debug;

use crate::pal::PlatformFacade;
use crate::{ERR_POISONED_LOCK, Report, Result, Scale, Task};

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Creates tasks and keeps track of them for reporting.
///
/// A registry owns the clock its tasks are timed with and the set of tasks that are currently
/// tracked. Tasks are tracked automatically when created via [`task()`](Self::task) and can be
/// untracked and re-tracked at any time, independent of their lifecycle state.
///
/// `Registry` is a handle: clones refer to the same set of tracked tasks.
///
/// # Examples
///
/// ```
/// use task_clock::{Registry, Scale};
///
/// # fn main() -> task_clock::Result<()> {
/// let registry = Registry::new();
///
/// let download = registry.task("Download")?;
/// download.start()?;
/// download.finish()?;
///
/// let verify = registry.task("Verify")?;
/// verify.untrack();
///
/// // Only the tracked task appears in the report.
/// let report = registry.report(Scale::Seconds)?;
/// assert_eq!(report.lines().count(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Registry {
    shared: Arc<RegistryShared>,
}

/// The state shared by all clones of a registry. Tasks refer back to it weakly.
#[derive(Debug)]
pub(crate) struct RegistryShared {
    // Keyed by task identifier, which makes enumeration order the task creation order.
    tasks: Mutex<BTreeMap<u64, Task>>,

    platform: PlatformFacade,
}

impl RegistryShared {
    pub(crate) fn insert(&self, task: &Task) {
        self.tasks
            .lock()
            .expect(ERR_POISONED_LOCK)
            .entry(task.id())
            .or_insert_with(|| task.clone());
    }

    pub(crate) fn remove(&self, task: &Task) {
        self.tasks.lock().expect(ERR_POISONED_LOCK).remove(&task.id());
    }
}

impl Registry {
    /// Creates an empty registry that times its tasks with the operating system monotonic clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(PlatformFacade::real())
    }

    #[must_use]
    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self {
            shared: Arc::new(RegistryShared {
                tasks: Mutex::new(BTreeMap::new()),
                platform,
            }),
        }
    }

    /// The registry shared by the entire process.
    ///
    /// It is created empty on first use and lives until the process exits. Use
    /// [`reset()`](Self::reset) to clear it.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Creates a new `Pending` task with the given friendly name and tracks it in this registry.
    ///
    /// The name is used for display only. Several tasks may share a name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) if the name is empty.
    /// Nothing is tracked in that case.
    pub fn task(&self, name: impl Into<String>) -> Result<Task> {
        let task = Task::new(
            name.into(),
            self.shared.platform.clone(),
            Arc::downgrade(&self.shared),
        )?;

        self.shared.insert(&task);

        debug!(task = task.name(), id = task.id(), "task created");

        Ok(task)
    }

    /// Starts tracking a task, if it is not already tracked. Any task can be tracked by any
    /// registry, though [`Task::track()`] always refers to the registry that created the task.
    pub fn track(&self, task: &Task) {
        self.shared.insert(task);
    }

    /// Stops tracking a task, if it is tracked.
    pub fn untrack(&self, task: &Task) {
        self.shared.remove(task);
    }

    /// Whether the task is currently tracked by this registry.
    #[must_use]
    pub fn contains(&self, task: &Task) -> bool {
        self.shared
            .tasks
            .lock()
            .expect(ERR_POISONED_LOCK)
            .get(&task.id())
            .is_some_and(|tracked| tracked == task)
    }

    /// The number of currently tracked tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.tasks.lock().expect(ERR_POISONED_LOCK).len()
    }

    /// Whether no tasks are currently tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.tasks.lock().expect(ERR_POISONED_LOCK).is_empty()
    }

    /// Returns the currently tracked tasks, in creation order.
    ///
    /// The returned list is a copy. Changing it does not affect the registry.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.shared
            .tasks
            .lock()
            .expect(ERR_POISONED_LOCK)
            .values()
            .cloned()
            .collect()
    }

    /// Stops tracking all tasks.
    ///
    /// The tasks themselves are unaffected. They keep their state and timing data and can be
    /// tracked again individually.
    pub fn reset(&self) {
        let previous = mem::take(&mut *self.shared.tasks.lock().expect(ERR_POISONED_LOCK));

        debug!(untracked = previous.len(), "registry reset");
    }

    /// Captures the name, state and elapsed time of every tracked task.
    ///
    /// The set of tracked tasks is captured first. Tasks created or tracked while the report is
    /// being assembled are not included.
    ///
    /// # Errors
    ///
    /// Fails if the elapsed time of any task cannot be expressed at the requested scale
    /// ([`Error::RangeOverflow`](crate::Error::RangeOverflow)) or any task state is
    /// unreadable ([`Error::InvalidState`](crate::Error::InvalidState)). No report is produced
    /// in that case.
    pub fn to_report(&self, scale: Scale) -> Result<Report> {
        Report::from_tasks(&self.tasks(), scale)
    }

    /// Renders all tracked tasks as CSV text at the requested scale.
    ///
    /// The first line is the header `"name","state","<scale>"`, followed by one line per
    /// tracked task in [`tasks()`](Self::tasks) order.
    ///
    /// # Errors
    ///
    /// See [`to_report()`](Self::to_report).
    pub fn report(&self, scale: Scale) -> Result<String> {
        Ok(self.to_report(scale)?.to_string())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::pal::FakePlatform;
    use crate::{Error, MAX_NANOS_SECONDS, TaskState};

    fn create_test_registry() -> (Registry, FakePlatform) {
        let fake_platform = FakePlatform::new();
        let registry = Registry::with_platform(PlatformFacade::fake(fake_platform.clone()));
        (registry, fake_platform)
    }

    assert_impl_all!(Registry: Send, Sync, Clone);

    #[test]
    fn new_registry_is_empty() {
        let (registry, _clock) = create_test_registry();

        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.tasks().is_empty());
    }

    #[test]
    fn created_tasks_are_tracked_in_creation_order() {
        let (registry, _clock) = create_test_registry();

        let first = registry.task("first").unwrap();
        let second = registry.task("second").unwrap();
        let third = registry.task("third").unwrap();

        assert_eq!(registry.tasks(), vec![first, second, third]);
    }

    #[test]
    fn tasks_returns_independent_copy() {
        let (registry, _clock) = create_test_registry();
        let task = registry.task("test").unwrap();

        let mut snapshot = registry.tasks();
        snapshot.clear();

        assert_eq!(registry.tasks(), vec![task]);
    }

    #[test]
    fn tracking_twice_is_noop() {
        let (registry, _clock) = create_test_registry();
        let task = registry.task("test").unwrap();

        registry.track(&task);
        task.track();

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn untracking_absent_task_is_noop() {
        let (registry, _clock) = create_test_registry();
        let task = registry.task("test").unwrap();
        let other = registry.task("other").unwrap();

        task.untrack();
        task.untrack();

        assert_eq!(registry.tasks(), vec![other]);
    }

    #[test]
    fn untrack_does_not_disturb_other_tasks() {
        let (registry, _clock) = create_test_registry();
        let earlier = registry.task("earlier").unwrap();
        let middle = registry.task("middle").unwrap();
        let later = registry.task("later").unwrap();

        middle.untrack();
        assert_eq!(registry.tasks(), vec![earlier.clone(), later.clone()]);

        middle.track();
        assert_eq!(registry.tasks(), vec![earlier, middle, later]);
    }

    #[test]
    fn reset_untracks_everything_without_touching_tasks() {
        let (registry, clock) = create_test_registry();
        let pending = registry.task("pending").unwrap();
        let finished = registry.task("finished").unwrap();
        finished.start().unwrap();
        clock.advance(Duration::from_millis(40));
        finished.finish().unwrap();

        registry.reset();

        assert!(registry.tasks().is_empty());
        assert_eq!(pending.state(), TaskState::Pending);
        assert_eq!(finished.state(), TaskState::Finished);
        assert_eq!(finished.elapsed().unwrap(), Duration::from_millis(40));
    }

    #[test]
    fn tasks_can_be_tracked_after_reset() {
        let (registry, _clock) = create_test_registry();
        let original = registry.task("original").unwrap();

        registry.reset();
        let created_after = registry.task("new").unwrap();
        assert_eq!(registry.tasks(), vec![created_after.clone()]);

        original.track();
        assert_eq!(registry.tasks(), vec![original, created_after]);
    }

    #[test]
    fn registry_can_track_foreign_task() {
        let (registry, _clock) = create_test_registry();
        let (other_registry, _other_clock) = create_test_registry();
        let foreign = other_registry.task("foreign").unwrap();

        registry.track(&foreign);

        assert!(registry.contains(&foreign));
        assert!(other_registry.contains(&foreign));

        // Task::untrack() refers to the registry that created the task.
        foreign.untrack();
        assert!(registry.contains(&foreign));
        assert!(!other_registry.contains(&foreign));
    }

    #[test]
    fn clones_share_membership() {
        let (registry, _clock) = create_test_registry();
        let clone = registry.clone();

        let task = clone.task("test").unwrap();

        assert!(registry.contains(&task));
    }

    #[test]
    fn failed_creation_tracks_nothing() {
        let (registry, _clock) = create_test_registry();

        assert!(matches!(
            registry.task(String::new()),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn report_with_pending_and_finished_tasks() {
        let (registry, clock) = create_test_registry();
        let _a = registry.task("A").unwrap();
        let b = registry.task("B").unwrap();
        b.start().unwrap();
        clock.advance(Duration::new(1, 500_000_000));
        b.finish().unwrap();

        let report = registry.report(Scale::Nanoseconds).unwrap();

        assert_eq!(
            report,
            "\"name\",\"state\",\"nanoseconds\"\n\"A\",\"Pending\",0\n\"B\",\"Finished\",1500000000"
        );
    }

    #[test]
    fn report_at_each_scale() {
        let (registry, clock) = create_test_registry();
        let task = registry.task("B").unwrap();
        task.start().unwrap();
        clock.advance(Duration::new(1, 500_000_000));
        task.finish().unwrap();

        assert_eq!(
            registry.report(Scale::Milliseconds).unwrap(),
            "\"name\",\"state\",\"milliseconds\"\n\"B\",\"Finished\",1500"
        );
        assert_eq!(
            registry.report(Scale::Seconds).unwrap(),
            "\"name\",\"state\",\"seconds\"\n\"B\",\"Finished\",1.5"
        );
    }

    #[test]
    fn report_of_empty_registry_is_header_only() {
        let (registry, _clock) = create_test_registry();

        assert_eq!(
            registry.report(Scale::default()).unwrap(),
            "\"name\",\"state\",\"milliseconds\""
        );
    }

    #[test]
    fn report_includes_live_started_task() {
        let (registry, clock) = create_test_registry();
        let task = registry.task("running").unwrap();
        task.start().unwrap();
        clock.advance(Duration::from_millis(3));

        assert_eq!(
            registry.report(Scale::Nanoseconds).unwrap(),
            "\"name\",\"state\",\"nanoseconds\"\n\"running\",\"Started\",3000000"
        );
    }

    #[test]
    fn report_excludes_untracked_tasks() {
        let (registry, _clock) = create_test_registry();
        let _shown = registry.task("shown").unwrap();
        let hidden = registry.task("hidden").unwrap();
        hidden.untrack();

        let report = registry.report(Scale::Seconds).unwrap();

        assert!(report.contains("\"shown\""));
        assert!(!report.contains("\"hidden\""));
    }

    #[test]
    fn report_fails_entirely_on_overflow() {
        let (registry, clock) = create_test_registry();
        let _fine = registry.task("fine").unwrap();
        let huge = registry.task("huge").unwrap();
        huge.start().unwrap();
        clock.advance(Duration::from_secs(MAX_NANOS_SECONDS + 1));
        huge.finish().unwrap();

        assert!(matches!(
            registry.report(Scale::Nanoseconds),
            Err(Error::RangeOverflow {
                scale: Scale::Nanoseconds,
                ..
            })
        ));

        // The same task is fine at a coarser scale.
        assert!(registry.report(Scale::Seconds).is_ok());
    }

    #[test]
    fn global_registry_is_shared() {
        let task = Registry::global().task("global registry test").unwrap();

        assert!(Registry::global().contains(&task));

        task.untrack();
        assert!(!Registry::global().contains(&task));
    }
}
