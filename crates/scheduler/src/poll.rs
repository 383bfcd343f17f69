//! Self-rescheduling one-tick loops.

use crate::{Scheduler, SchedulerRef, TaskHandle};
use anyhow::{Context, Result};
use mcbe_core::SimTick;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::debug;

type LoopBody = Rc<RefCell<dyn FnMut(SimTick) -> Result<()>>>;

struct LoopState {
    label: &'static str,
    scheduler: Weak<dyn Scheduler>,
    active: Cell<bool>,
    pending: Cell<Option<TaskHandle>>,
}

/// A body re-armed with a one-tick delay after every run until stopped.
///
/// Stopping cancels the pending run; a run already in progress finishes but
/// does not re-arm. An error from the body is returned to the scheduler (which
/// logs it) after the loop has been re-armed, so one bad tick never ends the
/// loop.
pub struct PollLoop {
    state: Rc<LoopState>,
}

impl PollLoop {
    /// Arm `body` to run on the next tick and every tick after.
    pub fn start<F>(scheduler: &SchedulerRef, label: &'static str, body: F) -> Self
    where
        F: FnMut(SimTick) -> Result<()> + 'static,
    {
        let state = Rc::new(LoopState {
            label,
            scheduler: Rc::downgrade(scheduler),
            active: Cell::new(true),
            pending: Cell::new(None),
        });
        let body: LoopBody = Rc::new(RefCell::new(body));
        arm(&state, body);
        debug!(label, "poll loop started");
        Self { state }
    }

    /// Stop the loop. Idempotent.
    pub fn stop(&self) {
        if !self.state.active.replace(false) {
            return;
        }
        if let (Some(handle), Some(scheduler)) =
            (self.state.pending.take(), self.state.scheduler.upgrade())
        {
            scheduler.cancel(handle);
        }
        debug!(label = self.state.label, "poll loop stopped");
    }

    /// Whether the loop will run again.
    pub fn is_active(&self) -> bool {
        self.state.active.get()
    }

    /// Diagnostic label.
    pub fn label(&self) -> &'static str {
        self.state.label
    }
}

fn arm(state: &Rc<LoopState>, body: LoopBody) {
    let Some(scheduler) = state.scheduler.upgrade() else {
        state.active.set(false);
        return;
    };
    let next = Rc::clone(state);
    let handle = scheduler.schedule_once(
        1,
        Box::new(move || {
            next.pending.set(None);
            let tick = next
                .scheduler
                .upgrade()
                .map_or(SimTick::ZERO, |s| s.current_tick());
            let result = {
                let mut run = body
                    .try_borrow_mut()
                    .map_err(|_| anyhow::anyhow!("poll loop `{}` re-entered", next.label))?;
                (&mut *run)(tick)
            };
            if next.active.get() {
                arm(&next, body);
            }
            result.with_context(|| format!("poll loop `{}` tick {}", next.label, tick.0))
        }),
    );
    state.pending.set(Some(handle));
}
