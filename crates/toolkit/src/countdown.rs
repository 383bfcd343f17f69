//! Seconds countdown driven by a 20-tick interval.

use mcbe_core::SimTick;
use mcbe_scheduler::{SchedulerRef, Task};
use std::cell::{Cell, OnceCell};
use std::rc::Rc;
use tracing::debug;

/// Counts down once per second, reporting `(minutes, "ss")` on every step.
///
/// A timer of `n` seconds reports `n, n-1, .., 0` and then calls the end
/// callback once and disposes itself.
pub struct CountdownTimer {
    task: Rc<OnceCell<Task>>,
    remaining: Rc<Cell<i64>>,
}

impl CountdownTimer {
    /// Start counting down from `seconds`; the first report comes one second
    /// from now.
    pub fn start<E, U>(scheduler: &SchedulerRef, seconds: u32, on_end: E, mut on_update: U) -> Self
    where
        E: FnOnce() + 'static,
        U: FnMut(u32, &str) + 'static,
    {
        let remaining = Rc::new(Cell::new(i64::from(seconds)));
        let task = Rc::new(OnceCell::new());
        let body = {
            let remaining = Rc::clone(&remaining);
            let task = Rc::clone(&task);
            let mut on_end = Some(on_end);
            move || -> anyhow::Result<()> {
                let left = remaining.get();
                let minutes = u32::try_from(left / 60).unwrap_or_default();
                on_update(minutes, &format!("{:02}", left % 60));
                remaining.set(left - 1);
                if left - 1 < 0 {
                    if let Some(on_end) = on_end.take() {
                        on_end();
                    }
                    if let Some(task) = task.get() {
                        Task::dispose(task);
                    }
                    debug!("countdown finished");
                }
                Ok(())
            }
        };
        let handle = Task::interval(scheduler, SimTick::PER_SECOND, body);
        let _ = task.set(handle);
        Self { task, remaining }
    }

    /// Stop early without calling the end callback.
    pub fn dispose(&self) {
        if let Some(task) = self.task.get() {
            task.dispose();
        }
    }

    /// Seconds left before the next report; negative once finished.
    pub fn remaining(&self) -> i64 {
        self.remaining.get()
    }

    /// Whether the timer is still counting.
    pub fn is_running(&self) -> bool {
        self.task.get().is_some_and(Task::is_active)
    }
}
