//! Disposable handles around single scheduled callbacks.

use crate::{Scheduler, SchedulerRef, TaskHandle};
use anyhow::Result;
use std::cell::Cell;
use std::rc::{Rc, Weak};

/// Owner of one scheduled callback.
///
/// Dropping a `Task` does not cancel it; call [`Task::dispose`].
pub struct Task {
    scheduler: Weak<dyn Scheduler>,
    handle: Cell<Option<TaskHandle>>,
}

impl Task {
    /// Run `f` on the next tick.
    pub fn run<F>(scheduler: &SchedulerRef, f: F) -> Self
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        Self::timeout(scheduler, 1, f)
    }

    /// Run `f` once after `delay` ticks.
    pub fn timeout<F>(scheduler: &SchedulerRef, delay: u64, f: F) -> Self
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        let handle = scheduler.schedule_once(delay, Box::new(f));
        Self::wrap(scheduler, handle)
    }

    /// Run `f` every `interval` ticks.
    pub fn interval<F>(scheduler: &SchedulerRef, interval: u64, f: F) -> Self
    where
        F: FnMut() -> Result<()> + 'static,
    {
        let handle = scheduler.schedule_repeating(interval, Box::new(f));
        Self::wrap(scheduler, handle)
    }

    fn wrap(scheduler: &SchedulerRef, handle: TaskHandle) -> Self {
        Self {
            scheduler: Rc::downgrade(scheduler),
            handle: Cell::new(Some(handle)),
        }
    }

    /// Cancel the callback. Safe to call any number of times, including after
    /// a one-shot has already fired.
    pub fn dispose(&self) {
        if let (Some(handle), Some(scheduler)) = (self.handle.take(), self.scheduler.upgrade()) {
            scheduler.cancel(handle);
        }
    }

    /// Whether the callback will still fire.
    pub fn is_active(&self) -> bool {
        match (self.handle.get(), self.scheduler.upgrade()) {
            (Some(handle), Some(scheduler)) => scheduler.is_scheduled(handle),
            _ => false,
        }
    }

    /// Underlying scheduler handle, if not yet disposed.
    pub fn handle(&self) -> Option<TaskHandle> {
        self.handle.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TickScheduler;

    #[test]
    fn disposed_interval_never_fires_again() {
        let ticker = Rc::new(TickScheduler::new());
        let shared: SchedulerRef = ticker.clone();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let task = Task::interval(&shared, 2, move || {
            h.set(h.get() + 1);
            Ok(())
        });

        ticker.run_ticks(4);
        assert_eq!(hits.get(), 2);
        task.dispose();
        task.dispose();
        ticker.run_ticks(10);
        assert_eq!(hits.get(), 2);
        assert!(!task.is_active());
    }

    #[test]
    fn disposing_fired_timeout_is_harmless() {
        let ticker = Rc::new(TickScheduler::new());
        let shared: SchedulerRef = ticker.clone();
        let task = Task::run(&shared, || Ok(()));
        assert!(task.is_active());
        ticker.step();
        assert!(!task.is_active());
        task.dispose();
        assert!(task.handle().is_none());
    }
}
