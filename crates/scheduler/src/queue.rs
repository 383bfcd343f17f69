//! Deterministic tick queue.

use crate::{OnceFn, RepeatFn, Scheduler, TaskHandle};
use mcbe_core::SimTick;
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

enum Body {
    Once(OnceFn),
    Repeat { interval: u64, run: RepeatFn },
}

struct Slot {
    due: SimTick,
    /// `None` while the body is executing.
    body: Option<Body>,
}

#[derive(Default)]
struct Queue {
    tick: SimTick,
    next_id: u64,
    tasks: BTreeMap<TaskHandle, Slot>,
}

impl Queue {
    fn insert(&mut self, due: SimTick, body: Body) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.tasks.insert(
            handle,
            Slot {
                due,
                body: Some(body),
            },
        );
        handle
    }
}

/// Single-threaded scheduler stepped one tick at a time.
///
/// Tasks due on the same tick run in `(due tick, scheduling order)` order.
/// Tasks scheduled while a tick is running never run during that same tick.
#[derive(Default)]
pub struct TickScheduler {
    queue: RefCell<Queue>,
}

impl TickScheduler {
    /// Empty scheduler at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick and run every task due on it. Returns the new tick.
    pub fn step(&self) -> SimTick {
        let (tick, mut due) = {
            let mut queue = self.queue.borrow_mut();
            queue.tick = queue.tick.advance(1);
            let tick = queue.tick;
            let due: Vec<(SimTick, TaskHandle)> = queue
                .tasks
                .iter()
                .filter(|(_, slot)| slot.due <= tick && slot.body.is_some())
                .map(|(handle, slot)| (slot.due, *handle))
                .collect();
            (tick, due)
        };
        due.sort();
        trace!(tick = tick.0, tasks = due.len(), "scheduler step");

        for (_, handle) in due {
            let body = {
                let mut queue = self.queue.borrow_mut();
                match queue.tasks.get_mut(&handle) {
                    Some(slot) => slot.body.take(),
                    // Cancelled by an earlier task this tick.
                    None => None,
                }
            };
            let Some(body) = body else {
                continue;
            };

            match body {
                Body::Once(run) => {
                    self.queue.borrow_mut().tasks.remove(&handle);
                    if let Err(err) = run() {
                        warn!(task = handle.id(), tick = tick.0, "scheduled task failed: {err:#}");
                    }
                }
                Body::Repeat { interval, mut run } => {
                    let result = run();
                    if let Some(slot) = self.queue.borrow_mut().tasks.get_mut(&handle) {
                        slot.due = tick.advance(interval);
                        slot.body = Some(Body::Repeat { interval, run });
                    }
                    if let Err(err) = result {
                        warn!(task = handle.id(), tick = tick.0, "repeating task failed: {err:#}");
                    }
                }
            }
        }
        tick
    }

    /// Step `ticks` times.
    pub fn run_ticks(&self, ticks: u64) -> SimTick {
        let mut tick = self.current_tick();
        for _ in 0..ticks {
            tick = self.step();
        }
        tick
    }

    /// Number of tasks still scheduled.
    pub fn pending(&self) -> usize {
        self.queue.borrow().tasks.len()
    }
}

impl Scheduler for TickScheduler {
    fn current_tick(&self) -> SimTick {
        self.queue.borrow().tick
    }

    fn schedule_once(&self, delay: u64, task: OnceFn) -> TaskHandle {
        let mut queue = self.queue.borrow_mut();
        let due = queue.tick.advance(delay.max(1));
        queue.insert(due, Body::Once(task))
    }

    fn schedule_repeating(&self, interval: u64, task: RepeatFn) -> TaskHandle {
        let interval = interval.max(1);
        let mut queue = self.queue.borrow_mut();
        let due = queue.tick.advance(interval);
        queue.insert(
            due,
            Body::Repeat {
                interval,
                run: task,
            },
        )
    }

    fn cancel(&self, handle: TaskHandle) {
        if self.queue.borrow_mut().tasks.remove(&handle).is_some() {
            debug!(task = handle.id(), "task cancelled");
        }
    }

    fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.queue.borrow().tasks.contains_key(&handle)
    }
}
