//! Long-lived per-tick managers.

use crate::{PollLoop, SchedulerRef};
use anyhow::Result;
use mcbe_core::SimTick;
use std::cell::RefCell;
use std::rc::Rc;

/// Work invoked once per tick by a [`Manager`].
pub trait TickHandler {
    /// Called once per tick with the host tick.
    fn on_tick(&mut self, tick: SimTick) -> Result<()>;
}

/// Drives a shared [`TickHandler`] every tick until disposed.
pub struct Manager {
    poll: PollLoop,
}

impl Manager {
    /// Start ticking `handler` from the next tick on.
    pub fn start<H>(scheduler: &SchedulerRef, label: &'static str, handler: Rc<RefCell<H>>) -> Self
    where
        H: TickHandler + 'static,
    {
        let poll = PollLoop::start(scheduler, label, move |tick| {
            handler.borrow_mut().on_tick(tick)
        });
        Self { poll }
    }

    /// Stop ticking. Idempotent.
    pub fn dispose(&self) {
        self.poll.stop();
    }

    /// Whether the handler is still being ticked.
    pub fn is_running(&self) -> bool {
        self.poll.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TickScheduler;

    #[derive(Default)]
    struct Counter {
        ticks: Vec<u64>,
    }

    impl TickHandler for Counter {
        fn on_tick(&mut self, tick: SimTick) -> Result<()> {
            self.ticks.push(tick.0);
            Ok(())
        }
    }

    #[test]
    fn manager_ticks_handler_until_disposed() {
        let ticker = Rc::new(TickScheduler::new());
        let shared: SchedulerRef = ticker.clone();
        let counter = Rc::new(RefCell::new(Counter::default()));
        let manager = Manager::start(&shared, "counter", counter.clone());

        ticker.run_ticks(2);
        manager.dispose();
        ticker.run_ticks(2);
        assert_eq!(counter.borrow().ticks, vec![1, 2]);
        assert!(!manager.is_running());
    }

    struct FailsOnSecond {
        calls: u32,
    }

    impl TickHandler for FailsOnSecond {
        fn on_tick(&mut self, tick: SimTick) -> Result<()> {
            self.calls += 1;
            anyhow::ensure!(tick.0 != 2, "handler failed at tick {}", tick.0);
            Ok(())
        }
    }

    #[test]
    fn failing_tick_keeps_manager_running() {
        let ticker = Rc::new(TickScheduler::new());
        let shared: SchedulerRef = ticker.clone();
        let handler = Rc::new(RefCell::new(FailsOnSecond { calls: 0 }));
        let manager = Manager::start(&shared, "flaky", handler.clone());

        ticker.run_ticks(4);
        assert_eq!(handler.borrow().calls, 4);
        assert!(manager.is_running());
    }
}
