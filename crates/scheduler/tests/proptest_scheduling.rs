//! Property-based tests for the tick scheduler.
//!
//! - One-shot tasks fire exactly once, on their due tick
//! - Cancelled tasks never fire

use mcbe_scheduler::{Scheduler, SchedulerRef, TickScheduler};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

proptest! {
    /// Property: every one-shot task fires once, at `max(delay, 1)`.
    #[test]
    fn once_tasks_fire_exactly_once_on_due_tick(delays in prop::collection::vec(0u64..40, 1..20)) {
        let ticker = Rc::new(TickScheduler::new());
        let shared: SchedulerRef = ticker.clone();
        let fired = Rc::new(RefCell::new(Vec::new()));

        for (index, delay) in delays.iter().copied().enumerate() {
            let log = fired.clone();
            let clock = Rc::downgrade(&shared);
            shared.schedule_once(delay, Box::new(move || {
                let tick = clock.upgrade().map(|s| s.current_tick().0).unwrap_or_default();
                log.borrow_mut().push((index, tick));
                Ok(())
            }));
        }

        ticker.run_ticks(50);

        let fired = fired.borrow();
        prop_assert_eq!(fired.len(), delays.len());
        for (index, tick) in fired.iter() {
            prop_assert_eq!(*tick, delays[*index].max(1));
        }
        prop_assert_eq!(ticker.pending(), 0);
    }

    /// Property: cancelled tasks never fire, the rest are unaffected.
    #[test]
    fn cancelled_tasks_never_fire(
        delays in prop::collection::vec(1u64..20, 1..16),
        cancel_mask in prop::collection::vec(any::<bool>(), 16),
    ) {
        let ticker = Rc::new(TickScheduler::new());
        let fired = Rc::new(RefCell::new(Vec::new()));
        let mut expected = Vec::new();

        for (index, delay) in delays.iter().copied().enumerate() {
            let log = fired.clone();
            let handle = ticker.schedule_once(delay, Box::new(move || {
                log.borrow_mut().push(index);
                Ok(())
            }));
            if cancel_mask[index] {
                ticker.cancel(handle);
            } else {
                expected.push(index);
            }
        }

        ticker.run_ticks(25);

        let mut fired = fired.borrow().clone();
        fired.sort_unstable();
        prop_assert_eq!(fired, expected);
    }
}
