//! Coalescing of relayout requests.
//!
//! Every widget is either idle or pending. A relayout request moves an idle,
//! active widget to pending and queues exactly one task on the
//! [`UpdateCycle`]; further requests are no-ops until that task starts
//! running. Requests raised while it runs queue the next task, and a task
//! that never runs still clears its widget when it completes.

use alloc::{boxed::Box, rc::Rc, vec::Vec};
use core::{
    cell::{Cell, RefCell},
    fmt,
};
use std::collections::HashMap;

use crate::{LayoutTree, TaskHandle, UpdateCycle, WidgetId};

/// Shared liveness flag of a widget.
///
/// Reactive watchers hold a clone so they can tell whether their widget is
/// still part of an active tree without borrowing the tree.
#[derive(Debug, Clone)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    /// Creates a flag in the given state.
    #[must_use]
    pub fn new(active: bool) -> Self {
        Self(Rc::new(Cell::new(active)))
    }

    /// Whether the widget is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.get()
    }

    /// Updates the flag.
    pub fn set(&self, active: bool) {
        self.0.set(active);
    }
}

#[derive(Default)]
struct SchedulerState {
    pending: HashMap<WidgetId, TaskHandle>,
    suspended: usize,
    deferred: Vec<(WidgetId, Liveness)>,
    /// Counts requests from active widgets, coalesced ones included.
    clock: u64,
    last_request: HashMap<WidgetId, u64>,
}

/// Turns relayout requests into at most one pending task per widget.
#[derive(Clone)]
pub struct LayoutScheduler {
    cycle: Rc<dyn UpdateCycle>,
    state: Rc<RefCell<SchedulerState>>,
}

impl fmt::Debug for LayoutScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("LayoutScheduler")
            .field("cycle", &self.cycle)
            .field("pending", &state.pending.len())
            .field("suspended", &state.suspended)
            .field("deferred", &state.deferred.len())
            .finish()
    }
}

impl LayoutScheduler {
    /// Creates a scheduler queuing its tasks on `cycle`.
    pub fn new(cycle: Rc<dyn UpdateCycle>) -> Self {
        Self {
            cycle,
            state: Rc::default(),
        }
    }

    /// The update cycle tasks are queued on.
    #[must_use]
    pub fn cycle(&self) -> &Rc<dyn UpdateCycle> {
        &self.cycle
    }

    /// Requests a relayout of `widget`.
    ///
    /// Returns `true` if a task was queued. Nothing is queued if the widget is
    /// inactive or already pending; while the scheduler is suspended the
    /// request is remembered instead.
    pub fn relayout(&self, widget: WidgetId, liveness: &Liveness) -> bool {
        if !liveness.is_active() {
            tracing::trace!(%widget, "relayout ignored, widget is inactive");
            return false;
        }
        {
            let mut state = self.state.borrow_mut();
            state.clock += 1;
            let now = state.clock;
            state.last_request.insert(widget, now);
            if state.pending.contains_key(&widget) {
                tracing::trace!(%widget, "relayout coalesced");
                return false;
            }
            if state.suspended > 0 {
                if !state.deferred.iter().any(|(id, _)| *id == widget) {
                    state.deferred.push((widget, liveness.clone()));
                }
                return false;
            }
        }
        self.dispatch(widget);
        true
    }

    fn dispatch(&self, widget: WidgetId) {
        let handle = self
            .cycle
            .schedule(Box::new(move |tree: &mut LayoutTree| tree.run_layout_task(widget)));
        tracing::debug!(%widget, task = ?handle.id(), "relayout scheduled");

        self.state
            .borrow_mut()
            .pending
            .insert(widget, handle.clone());

        let state = Rc::downgrade(&self.state);
        let id = handle.id();
        handle.notify(move |_| {
            let Some(state) = state.upgrade() else { return };
            let mut state = state.borrow_mut();
            if state
                .pending
                .get(&widget)
                .is_some_and(|pending| pending.id() == id)
            {
                state.pending.remove(&widget);
            }
        });
    }

    /// Holds back requests until the matching [`resume`](Self::resume).
    ///
    /// Suspensions nest.
    pub fn suspend(&self) {
        self.state.borrow_mut().suspended += 1;
    }

    /// Ends one suspension. When the outermost one ends, every request raised
    /// in between is dispatched once.
    pub fn resume(&self) {
        let deferred = {
            let mut state = self.state.borrow_mut();
            state.suspended = state.suspended.saturating_sub(1);
            if state.suspended > 0 {
                return;
            }
            core::mem::take(&mut state.deferred)
        };
        if !deferred.is_empty() {
            tracing::debug!(requests = deferred.len(), "dispatching deferred relayouts");
        }
        for (widget, liveness) in deferred {
            self.relayout(widget, &liveness);
        }
    }

    /// Whether requests are currently held back.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.state.borrow().suspended > 0
    }

    /// Whether `widget` has a task that has not finished yet.
    #[must_use]
    pub fn is_pending(&self, widget: WidgetId) -> bool {
        self.state.borrow().pending.contains_key(&widget)
    }

    /// Number of pending widgets.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// The current request clock.
    pub(crate) fn clock(&self) -> u64 {
        self.state.borrow().clock
    }

    /// Whether `widget` was requested after the clock read `stamp`.
    pub(crate) fn requested_since(&self, widget: WidgetId, stamp: u64) -> bool {
        self.state
            .borrow()
            .last_request
            .get(&widget)
            .is_some_and(|&at| at > stamp)
    }

    /// Marks the pending task of `widget` as running.
    ///
    /// The widget goes back to idle, so anything the running task changes
    /// about the widget is picked up by a fresh task.
    pub(crate) fn start(&self, widget: WidgetId) {
        if self.state.borrow_mut().pending.remove(&widget).is_some() {
            tracing::trace!(%widget, "relayout started");
        }
    }

    /// Suspends the scheduler until the returned guard is dropped.
    #[must_use]
    pub fn suspend_guard(&self) -> SuspendGuard {
        self.suspend();
        SuspendGuard {
            scheduler: self.clone(),
        }
    }
}

/// Resumes its scheduler when dropped.
#[derive(Debug)]
pub struct SuspendGuard {
    scheduler: LayoutScheduler,
}

impl Drop for SuspendGuard {
    fn drop(&mut self) {
        self.scheduler.resume();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameQueue;

    fn scheduler() -> (Rc<FrameQueue>, LayoutScheduler) {
        let queue = Rc::new(FrameQueue::new());
        let scheduler = LayoutScheduler::new(queue.clone());
        (queue, scheduler)
    }

    #[test]
    fn repeated_requests_queue_one_task() {
        let (queue, scheduler) = scheduler();
        let widget = WidgetId::new(1);
        let liveness = Liveness::new(true);

        assert!(scheduler.relayout(widget, &liveness));
        assert!(!scheduler.relayout(widget, &liveness));
        assert!(!scheduler.relayout(widget, &liveness));

        assert_eq!(queue.len(), 1);
        assert!(scheduler.is_pending(widget));
    }

    #[test]
    fn inactive_widgets_are_ignored() {
        let (queue, scheduler) = scheduler();

        assert!(!scheduler.relayout(WidgetId::new(1), &Liveness::new(false)));
        assert!(queue.is_empty());
    }

    #[test]
    fn completion_returns_widget_to_idle() {
        let (queue, scheduler) = scheduler();
        let widget = WidgetId::new(2);
        let liveness = Liveness::new(true);
        scheduler.relayout(widget, &liveness);

        for task in queue.take_ready() {
            task.handle().complete(Ok(()));
        }

        assert!(!scheduler.is_pending(widget));
        assert!(scheduler.relayout(widget, &liveness));
    }

    #[test]
    fn running_tasks_let_new_requests_through() {
        let (queue, scheduler) = scheduler();
        let widget = WidgetId::new(3);
        let liveness = Liveness::new(true);
        scheduler.relayout(widget, &liveness);
        let running = queue.take_ready();

        scheduler.start(widget);
        assert!(scheduler.relayout(widget, &liveness));
        for task in running {
            task.handle().complete(Ok(()));
        }

        // The finished task must not clear the request raised while it ran.
        assert!(scheduler.is_pending(widget));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn suspension_defers_and_deduplicates() {
        let (queue, scheduler) = scheduler();
        let liveness = Liveness::new(true);

        {
            let _outer = scheduler.suspend_guard();
            scheduler.relayout(WidgetId::new(1), &liveness);
            {
                let _inner = scheduler.suspend_guard();
                scheduler.relayout(WidgetId::new(1), &liveness);
                scheduler.relayout(WidgetId::new(2), &liveness);
            }
            assert!(queue.is_empty());
        }

        assert_eq!(queue.len(), 2);
        assert!(!scheduler.is_suspended());
    }

    #[test]
    fn deferred_requests_recheck_liveness() {
        let (queue, scheduler) = scheduler();
        let liveness = Liveness::new(true);

        scheduler.suspend();
        scheduler.relayout(WidgetId::new(1), &liveness);
        liveness.set(false);
        scheduler.resume();

        assert!(queue.is_empty());
    }
}
