#![warn(missing_docs)]
//! Tick scheduling substrate.
//!
//! The host only offers "run after N ticks", "run every N ticks" and
//! "cancel". [`Scheduler`] is that contract; [`TickScheduler`] is a
//! deterministic single-threaded implementation that host adapters drive once
//! per game tick and tests step by hand. Everything recurring in the
//! workspace is built from [`PollLoop`], a self-rescheduling one-tick loop.

mod handler;
mod poll;
mod queue;
mod task;

use anyhow::Result;
use mcbe_core::SimTick;
use std::rc::Rc;

pub use handler::{Manager, TickHandler};
pub use poll::PollLoop;
pub use queue::TickScheduler;
pub use task::Task;

/// Body of a one-shot task.
pub type OnceFn = Box<dyn FnOnce() -> Result<()>>;

/// Body of a repeating task.
pub type RepeatFn = Box<dyn FnMut() -> Result<()>>;

/// Shared scheduler handle.
pub type SchedulerRef = Rc<dyn Scheduler>;

/// Opaque identifier of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(pub(crate) u64);

impl TaskHandle {
    /// Raw numeric id (for logging).
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Host tick scheduler contract.
///
/// Callbacks run to completion on tick boundaries, never concurrently. Task
/// bodies return errors instead of unwinding; implementations log them and
/// keep repeating tasks alive.
pub trait Scheduler {
    /// Tick currently being (or last) executed.
    fn current_tick(&self) -> SimTick;

    /// Run `task` once after `delay` ticks (0 is treated as 1: next tick).
    fn schedule_once(&self, delay: u64, task: OnceFn) -> TaskHandle;

    /// Run `task` every `interval` ticks, first after one interval.
    fn schedule_repeating(&self, interval: u64, task: RepeatFn) -> TaskHandle;

    /// Cancel a task. Unknown or already finished handles are ignored.
    fn cancel(&self, handle: TaskHandle);

    /// Whether `handle` will still fire.
    fn is_scheduled(&self, handle: TaskHandle) -> bool;
}
