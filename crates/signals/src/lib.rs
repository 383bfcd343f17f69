#![warn(missing_docs)]
//! Polling event signals.
//!
//! The host reports no events for jumping, sneaking, landing or equipment
//! changes, so each [`Signal`] scans a population once per tick and diffs it
//! against what it observed the tick before. [`WorldSignals`] hands out one
//! fresh signal per call.

mod event;
mod signal;
mod tracking;
pub mod variants;

use mcbe_core::World;
use mcbe_scheduler::SchedulerRef;
use std::rc::Rc;

pub use event::{EntityEvent, EquipmentEvent, EventKind, SignalEvent, UnknownEventKind};
pub use signal::{Detector, Population, Signal, SignalError, SignalState, Subscription};
pub use tracking::{capture_equipment, observe, EquipmentSnapshot, TrackingMap, TrackingSet};

use variants::{
    AirJumpDetector, EdgeDetector, EquipDiff, EquipmentDetector, JumpEdge, LandEdge,
    OnGroundEdge, SneakEdge, StartJumpingEdge, StopJumpingEdge, UnequipDiff, UnsneakEdge,
};

/// Entity jumped off the ground.
pub type EntityJumpSignal = Signal<EdgeDetector<JumpEdge>>;
/// Entity pressed jump while airborne.
pub type EntityStartJumpingSignal = Signal<EdgeDetector<StartJumpingEdge>>;
/// Entity released jump after an airborne jump.
pub type EntityStopJumpingSignal = Signal<EdgeDetector<StopJumpingEdge>>;
/// Entity started sneaking.
pub type EntitySneakSignal = Signal<EdgeDetector<SneakEdge>>;
/// Entity stopped sneaking.
pub type EntityUnsneakSignal = Signal<EdgeDetector<UnsneakEdge>>;
/// Entity touched the ground.
pub type EntityOnGroundSignal = Signal<EdgeDetector<OnGroundEdge>>;
/// Player landed.
pub type PlayerLandSignal = Signal<EdgeDetector<LandEdge>>;
/// Player jumped again while airborne.
pub type PlayerAirJumpSignal = Signal<AirJumpDetector>;
/// Player equipped an item.
pub type PlayerEquipSignal = Signal<EquipmentDetector<EquipDiff>>;
/// Player unequipped an item.
pub type PlayerUnequipSignal = Signal<EquipmentDetector<UnequipDiff>>;

/// Registry of every signal kind over one world and scheduler.
#[derive(Clone)]
pub struct WorldSignals {
    scheduler: SchedulerRef,
    world: Rc<dyn World>,
}

impl WorldSignals {
    /// Registry polling `world` on `scheduler`.
    pub fn new(scheduler: SchedulerRef, world: Rc<dyn World>) -> Self {
        Self { scheduler, world }
    }

    fn signal<D: Detector>(&self) -> Signal<D> {
        Signal::new(Rc::clone(&self.scheduler), Rc::clone(&self.world))
    }

    /// See [`EntityJumpSignal`].
    pub fn entity_jump(&self) -> EntityJumpSignal {
        self.signal()
    }

    /// See [`EntityStartJumpingSignal`].
    pub fn entity_start_jumping(&self) -> EntityStartJumpingSignal {
        self.signal()
    }

    /// See [`EntityStopJumpingSignal`].
    pub fn entity_stop_jumping(&self) -> EntityStopJumpingSignal {
        self.signal()
    }

    /// See [`EntitySneakSignal`].
    pub fn entity_sneak(&self) -> EntitySneakSignal {
        self.signal()
    }

    /// See [`EntityUnsneakSignal`].
    pub fn entity_unsneak(&self) -> EntityUnsneakSignal {
        self.signal()
    }

    /// See [`EntityOnGroundSignal`].
    pub fn entity_on_ground(&self) -> EntityOnGroundSignal {
        self.signal()
    }

    /// See [`PlayerAirJumpSignal`].
    pub fn player_air_jump(&self) -> PlayerAirJumpSignal {
        self.signal()
    }

    /// See [`PlayerLandSignal`].
    pub fn player_land(&self) -> PlayerLandSignal {
        self.signal()
    }

    /// See [`PlayerEquipSignal`].
    pub fn player_equip(&self) -> PlayerEquipSignal {
        self.signal()
    }

    /// See [`PlayerUnequipSignal`].
    pub fn player_unequip(&self) -> PlayerUnequipSignal {
        self.signal()
    }

    /// Subscribe `callback` to the signal named by `kind`.
    ///
    /// The signal itself is not returned; the subscription keeps its polling
    /// loop alive on the scheduler.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Result<Subscription, SignalError>
    where
        F: FnMut(&SignalEvent) + 'static,
    {
        match kind {
            EventKind::EntityJump => self.entity_jump().subscribe(callback),
            EventKind::EntityStartJumping => self.entity_start_jumping().subscribe(callback),
            EventKind::EntityStopJumping => self.entity_stop_jumping().subscribe(callback),
            EventKind::EntitySneak => self.entity_sneak().subscribe(callback),
            EventKind::EntityUnsneak => self.entity_unsneak().subscribe(callback),
            EventKind::EntityOnGround => self.entity_on_ground().subscribe(callback),
            EventKind::PlayerAirJump => self.player_air_jump().subscribe(callback),
            EventKind::PlayerLand => self.player_land().subscribe(callback),
            EventKind::PlayerEquip => self.player_equip().subscribe(callback),
            EventKind::PlayerUnequip => self.player_unequip().subscribe(callback),
        }
    }
}
