//! The host update cycle that deferred layout work runs on.
//!
//! The scheduler never solves synchronously. It hands a [`Task`] to an
//! [`UpdateCycle`] and gets a [`TaskHandle`] back; the host drains the cycle
//! once per frame through [`LayoutTree::run_cycle`](crate::LayoutTree::run_cycle).

use alloc::{boxed::Box, collections::VecDeque, rc::Rc, vec::Vec};
use core::{
    cell::{Cell, RefCell},
    fmt::{self, Debug},
};

use crate::{LayoutError, LayoutTree};

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce(&mut LayoutTree) -> Result<(), LayoutError>>;

/// Callback fired once a task has finished.
pub type Completion = Box<dyn FnOnce(&Result<(), LayoutError>)>;

/// Identifier of a scheduled task, unique per [`UpdateCycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Creates an identifier from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

struct HandleState {
    id: TaskId,
    outcome: Option<Result<(), LayoutError>>,
    callbacks: Vec<Completion>,
}

/// Shared view of a scheduled task.
#[derive(Clone)]
pub struct TaskHandle {
    state: Rc<RefCell<HandleState>>,
}

impl TaskHandle {
    /// Creates the handle of a task that has not run yet.
    #[must_use]
    pub fn new(id: TaskId) -> Self {
        Self {
            state: Rc::new(RefCell::new(HandleState {
                id,
                outcome: None,
                callbacks: Vec::new(),
            })),
        }
    }

    /// The identifier of the task.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.state.borrow().id
    }

    /// Whether the task has run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.borrow().outcome.is_some()
    }

    /// The result of the task, once it has run.
    #[must_use]
    pub fn outcome(&self) -> Option<Result<(), LayoutError>> {
        self.state.borrow().outcome.clone()
    }

    /// Registers `callback` to run after the task body, whatever its result.
    ///
    /// Fires immediately if the task has already finished.
    pub fn notify(&self, callback: impl FnOnce(&Result<(), LayoutError>) + 'static) {
        let finished = self.state.borrow().outcome.clone();
        match finished {
            Some(outcome) => callback(&outcome),
            None => self.state.borrow_mut().callbacks.push(Box::new(callback)),
        }
    }

    /// Records the outcome and fires every pending callback.
    pub fn complete(&self, outcome: Result<(), LayoutError>) {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            state.outcome = Some(outcome.clone());
            core::mem::take(&mut state.callbacks)
        };
        for callback in callbacks {
            callback(&outcome);
        }
    }
}

impl Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TaskHandle")
            .field("id", &state.id)
            .field("outcome", &state.outcome)
            .field("callbacks", &state.callbacks.len())
            .finish()
    }
}

/// A task waiting in an update cycle, together with its handle.
pub struct ScheduledTask {
    handle: TaskHandle,
    task: Task,
}

impl ScheduledTask {
    /// Pairs a task with its handle.
    #[must_use]
    pub fn new(handle: TaskHandle, task: Task) -> Self {
        Self { handle, task }
    }

    /// The handle given out when the task was scheduled.
    #[must_use]
    pub const fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    /// Runs the task, then completes its handle.
    ///
    /// # Errors
    ///
    /// Returns whatever the task body returned. Completion callbacks fire in
    /// both cases.
    pub fn run(self, tree: &mut LayoutTree) -> Result<(), LayoutError> {
        let outcome = (self.task)(tree);
        self.handle.complete(outcome.clone());
        outcome
    }
}

impl Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// The host's cooperative task queue.
///
/// Implementations must run tasks on the UI thread, in the order they were
/// scheduled. Tasks scheduled while a cycle is running belong to the next
/// cycle.
pub trait UpdateCycle: Debug {
    /// Queues `task` and returns its handle.
    fn schedule(&self, task: Task) -> TaskHandle;

    /// Removes and returns every task that is due in this cycle.
    fn take_ready(&self) -> Vec<ScheduledTask>;

    /// Whether no task is waiting.
    fn is_idle(&self) -> bool;
}

/// A FIFO [`UpdateCycle`] draining everything queued before the cycle began.
#[derive(Debug, Default)]
pub struct FrameQueue {
    queue: RefCell<VecDeque<ScheduledTask>>,
    next_id: Cell<u64>,
}

impl FrameQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Whether no task is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl UpdateCycle for FrameQueue {
    fn schedule(&self, task: Task) -> TaskHandle {
        let id = TaskId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let handle = TaskHandle::new(id);
        self.queue
            .borrow_mut()
            .push_back(ScheduledTask::new(handle.clone(), task));
        handle
    }

    fn take_ready(&self) -> Vec<ScheduledTask> {
        self.queue.borrow_mut().drain(..).collect()
    }

    fn is_idle(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::WidgetId;

    #[test]
    fn handles_fire_callbacks_after_completion() {
        let handle = TaskHandle::new(TaskId::new(7));
        let fired = Rc::new(Cell::new(0));

        let counter = fired.clone();
        handle.notify(move |outcome| {
            assert!(outcome.is_ok());
            counter.set(counter.get() + 1);
        });
        assert_eq!(fired.get(), 0);

        handle.complete(Ok(()));
        assert_eq!(fired.get(), 1);
        assert!(handle.is_finished());
    }

    #[test]
    fn late_callbacks_fire_immediately() {
        let handle = TaskHandle::new(TaskId::new(0));
        handle.complete(Err(LayoutError::UnknownWidget(WidgetId::new(3))));

        let seen = Rc::new(RefCell::new(None));
        let slot = seen.clone();
        handle.notify(move |outcome| *slot.borrow_mut() = Some(outcome.clone()));

        assert_eq!(
            *seen.borrow(),
            Some(Err(LayoutError::UnknownWidget(WidgetId::new(3))))
        );
    }

    #[test]
    fn frame_queue_is_fifo() {
        let queue = FrameQueue::new();
        let first = queue.schedule(Box::new(|_: &mut LayoutTree| Ok(())));
        let second = queue.schedule(Box::new(|_: &mut LayoutTree| Ok(())));

        let ready = queue.take_ready();
        let ids: Vec<_> = ready.iter().map(|task| task.handle().id()).collect();

        assert_eq!(ids, vec![first.id(), second.id()]);
        assert!(queue.is_idle());
    }
}
