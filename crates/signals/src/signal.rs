//! Subscribe/unsubscribe over a per-tick scan.

use crate::SignalEvent;
use mcbe_core::{EntityRef, SimTick, World};
use mcbe_scheduler::{PollLoop, SchedulerRef};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, trace};

/// Which population a detector scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Population {
    /// Every loaded entity, players included.
    Entities,
    /// Connected players only.
    Players,
}

/// Per-tick scan-and-diff step.
///
/// A fresh detector is created for every subscription, so its tracking state
/// is private to that subscription.
pub trait Detector: Default + 'static {
    /// Diagnostic name.
    const LABEL: &'static str;
    /// Population enumerated each tick.
    const POPULATION: Population;

    /// Inspect `population` and emit one event per detected transition.
    fn scan(&mut self, population: &[EntityRef], emit: &mut dyn FnMut(SignalEvent));

    /// Number of ids currently tracked.
    fn tracked(&self) -> usize;
}

/// Errors from the signal API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignalError {
    /// `subscribe` was called after the signal was disposed.
    #[error("signal `{0}` has been disposed")]
    Disposed(&'static str),
}

/// Lifecycle of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    /// No live subscriptions yet (or all were individually cancelled).
    Idle,
    /// At least one subscription is polling.
    Polling,
    /// `unsubscribe` was called on the signal; terminal.
    Disposed,
}

/// Handle to one polling loop started by [`Signal::subscribe`].
#[derive(Clone)]
pub struct Subscription {
    live: Rc<Cell<bool>>,
    poll: Rc<PollLoop>,
    tracked: Rc<Cell<usize>>,
}

impl Subscription {
    /// Stop this subscription. No callback runs after this returns, even if
    /// called from inside a callback partway through a scan.
    pub fn unsubscribe(&self) {
        self.live.set(false);
        self.poll.stop();
    }

    /// Whether the subscription still delivers events.
    pub fn is_active(&self) -> bool {
        self.live.get()
    }

    /// Ids tracked by this subscription after its latest scan.
    pub fn tracked(&self) -> usize {
        self.tracked.get()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.poll.label())
            .field("active", &self.live.get())
            .field("tracked", &self.tracked.get())
            .finish()
    }
}

/// An event source for one kind of transition.
pub struct Signal<D: Detector> {
    scheduler: SchedulerRef,
    world: Rc<dyn World>,
    disposed: Cell<bool>,
    subscriptions: RefCell<Vec<Subscription>>,
    _detector: PhantomData<fn() -> D>,
}

impl<D: Detector> Signal<D> {
    /// New idle signal polling `world` on `scheduler`.
    pub fn new(scheduler: SchedulerRef, world: Rc<dyn World>) -> Self {
        Self {
            scheduler,
            world,
            disposed: Cell::new(false),
            subscriptions: RefCell::new(Vec::new()),
            _detector: PhantomData,
        }
    }

    /// Start polling from the next tick; `callback` runs once per transition.
    pub fn subscribe<F>(&self, callback: F) -> Result<Subscription, SignalError>
    where
        F: FnMut(&SignalEvent) + 'static,
    {
        if self.disposed.get() {
            return Err(SignalError::Disposed(D::LABEL));
        }

        let live = Rc::new(Cell::new(true));
        let tracked = Rc::new(Cell::new(0));
        let body = {
            let world = Rc::clone(&self.world);
            let live = Rc::clone(&live);
            let tracked = Rc::clone(&tracked);
            let mut detector = D::default();
            let mut callback = callback;
            move |tick: SimTick| -> anyhow::Result<()> {
                let population = match D::POPULATION {
                    Population::Entities => world.entities(),
                    Population::Players => world.players(),
                };
                let population = match population {
                    Ok(population) => population,
                    Err(err) => {
                        debug!(signal = D::LABEL, tick = tick.0, "population unavailable: {err}");
                        return Ok(());
                    }
                };

                let mut delivered = 0usize;
                detector.scan(&population, &mut |event: SignalEvent| {
                    if live.get() {
                        trace!(signal = D::LABEL, entity = %event.entity().id(), "transition");
                        callback(&event);
                        delivered += 1;
                    }
                });
                tracked.set(detector.tracked());
                if delivered > 0 {
                    trace!(signal = D::LABEL, tick = tick.0, delivered, "delivered events");
                }
                Ok(())
            }
        };

        let poll = PollLoop::start(&self.scheduler, D::LABEL, body);
        let subscription = Subscription {
            live,
            poll: Rc::new(poll),
            tracked,
        };
        let mut subscriptions = self.subscriptions.borrow_mut();
        subscriptions.retain(Subscription::is_active);
        subscriptions.push(subscription.clone());
        drop(subscriptions);
        debug!(signal = D::LABEL, "subscribed");
        Ok(subscription)
    }

    /// Stop every subscription and dispose the signal.
    pub fn unsubscribe(&self) {
        self.disposed.set(true);
        for subscription in self.subscriptions.borrow_mut().drain(..) {
            subscription.unsubscribe();
        }
        debug!(signal = D::LABEL, "disposed");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SignalState {
        if self.disposed.get() {
            SignalState::Disposed
        } else if self.subscriptions.borrow().iter().any(Subscription::is_active) {
            SignalState::Polling
        } else {
            SignalState::Idle
        }
    }

    /// Diagnostic name.
    pub fn label(&self) -> &'static str {
        D::LABEL
    }
}
