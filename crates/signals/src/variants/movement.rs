//! Boolean edge signals: jumping, sneaking, ground contact.
//!
//! Each rule names an entry condition and an exit condition. An id becomes
//! tracked on the first tick the entry condition holds and untracked on the
//! first tick the exit condition holds; the rule fires on one of those two
//! edges. Entry is checked before exit, so an id that satisfies both on the
//! same tick is tracked rather than released.

use crate::signal::{Detector, Population};
use crate::tracking::{observe, TrackingSet};
use crate::{EntityEvent, SignalEvent};
use mcbe_core::{Entity, EntityRef, HostError};
use std::marker::PhantomData;

/// Which edge a rule reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Report when tracking starts.
    Enter,
    /// Report when tracking ends.
    Exit,
}

/// Entry / exit conditions observed for one entity on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conditions {
    /// Entry condition holds.
    pub enter: bool,
    /// Exit condition holds.
    pub exit: bool,
}

/// A boolean transition rule.
pub trait EdgeRule: 'static {
    /// Diagnostic name.
    const LABEL: &'static str;
    /// Population scanned.
    const POPULATION: Population;
    /// Edge that produces an event.
    const FIRES_ON: Edge;

    /// Evaluate the rule's conditions for `entity`.
    fn conditions(entity: &dyn Entity) -> Result<Conditions, HostError>;

    /// Build the event for `entity`.
    fn event(entity: EntityRef) -> SignalEvent;
}

/// [`Detector`] driving an [`EdgeRule`] over a [`TrackingSet`].
pub struct EdgeDetector<R> {
    tracked: TrackingSet,
    _rule: PhantomData<fn() -> R>,
}

impl<R> Default for EdgeDetector<R> {
    fn default() -> Self {
        Self {
            tracked: TrackingSet::new(),
            _rule: PhantomData,
        }
    }
}

impl<R: EdgeRule> Detector for EdgeDetector<R> {
    const LABEL: &'static str = R::LABEL;
    const POPULATION: Population = R::POPULATION;

    fn scan(&mut self, population: &[EntityRef], emit: &mut dyn FnMut(SignalEvent)) {
        self.tracked.scan(population, |tracked, entity| {
            let id = entity.id();
            let Some(conditions) = observe(&**entity, R::conditions) else {
                tracked.remove(id);
                return;
            };
            let is_tracked = tracked.contains(id);
            if conditions.enter && !is_tracked {
                tracked.insert(id.clone(), ());
                if R::FIRES_ON == Edge::Enter {
                    emit(R::event(entity.clone()));
                }
            } else if conditions.exit && is_tracked {
                tracked.remove(id);
                if R::FIRES_ON == Edge::Exit {
                    emit(R::event(entity.clone()));
                }
            }
        });
    }

    fn tracked(&self) -> usize {
        self.tracked.len()
    }
}

fn airborne_jump(entity: &dyn Entity) -> Result<bool, HostError> {
    Ok(entity.is_jumping()? && !entity.is_on_ground()?)
}

/// Jumping while airborne; released on landing.
pub struct JumpEdge;

impl EdgeRule for JumpEdge {
    const LABEL: &'static str = "entity_jump";
    const POPULATION: Population = Population::Entities;
    const FIRES_ON: Edge = Edge::Enter;

    fn conditions(entity: &dyn Entity) -> Result<Conditions, HostError> {
        Ok(Conditions {
            enter: airborne_jump(entity)?,
            exit: entity.is_on_ground()?,
        })
    }

    fn event(entity: EntityRef) -> SignalEvent {
        SignalEvent::EntityJump(EntityEvent { entity })
    }
}

/// Jumping while airborne; released when the jump input clears.
pub struct StartJumpingEdge;

impl EdgeRule for StartJumpingEdge {
    const LABEL: &'static str = "entity_start_jumping";
    const POPULATION: Population = Population::Entities;
    const FIRES_ON: Edge = Edge::Enter;

    fn conditions(entity: &dyn Entity) -> Result<Conditions, HostError> {
        Ok(Conditions {
            enter: airborne_jump(entity)?,
            exit: !entity.is_jumping()?,
        })
    }

    fn event(entity: EntityRef) -> SignalEvent {
        SignalEvent::EntityStartJumping(EntityEvent { entity })
    }
}

/// Fires when an airborne jump's input clears, regardless of ground state.
pub struct StopJumpingEdge;

impl EdgeRule for StopJumpingEdge {
    const LABEL: &'static str = "entity_stop_jumping";
    const POPULATION: Population = Population::Entities;
    const FIRES_ON: Edge = Edge::Exit;

    fn conditions(entity: &dyn Entity) -> Result<Conditions, HostError> {
        Ok(Conditions {
            enter: airborne_jump(entity)?,
            exit: !entity.is_jumping()?,
        })
    }

    fn event(entity: EntityRef) -> SignalEvent {
        SignalEvent::EntityStopJumping(EntityEvent { entity })
    }
}

/// Sneak input pressed.
pub struct SneakEdge;

impl EdgeRule for SneakEdge {
    const LABEL: &'static str = "entity_sneak";
    const POPULATION: Population = Population::Entities;
    const FIRES_ON: Edge = Edge::Enter;

    fn conditions(entity: &dyn Entity) -> Result<Conditions, HostError> {
        let sneaking = entity.is_sneaking()?;
        Ok(Conditions {
            enter: sneaking,
            exit: !sneaking,
        })
    }

    fn event(entity: EntityRef) -> SignalEvent {
        SignalEvent::EntitySneak(EntityEvent { entity })
    }
}

/// Sneak input released.
pub struct UnsneakEdge;

impl EdgeRule for UnsneakEdge {
    const LABEL: &'static str = "entity_unsneak";
    const POPULATION: Population = Population::Entities;
    const FIRES_ON: Edge = Edge::Exit;

    fn conditions(entity: &dyn Entity) -> Result<Conditions, HostError> {
        let sneaking = entity.is_sneaking()?;
        Ok(Conditions {
            enter: sneaking,
            exit: !sneaking,
        })
    }

    fn event(entity: EntityRef) -> SignalEvent {
        SignalEvent::EntityUnsneak(EntityEvent { entity })
    }
}

fn ground_contact(entity: &dyn Entity) -> Result<Conditions, HostError> {
    let on_ground = entity.is_on_ground()?;
    Ok(Conditions {
        enter: !on_ground,
        exit: on_ground,
    })
}

/// Any entity touching down after being airborne.
pub struct OnGroundEdge;

impl EdgeRule for OnGroundEdge {
    const LABEL: &'static str = "entity_on_ground";
    const POPULATION: Population = Population::Entities;
    const FIRES_ON: Edge = Edge::Exit;

    fn conditions(entity: &dyn Entity) -> Result<Conditions, HostError> {
        ground_contact(entity)
    }

    fn event(entity: EntityRef) -> SignalEvent {
        SignalEvent::EntityOnGround(EntityEvent { entity })
    }
}

/// A player touching down after being airborne.
pub struct LandEdge;

impl EdgeRule for LandEdge {
    const LABEL: &'static str = "player_land";
    const POPULATION: Population = Population::Players;
    const FIRES_ON: Edge = Edge::Exit;

    fn conditions(entity: &dyn Entity) -> Result<Conditions, HostError> {
        ground_contact(entity)
    }

    fn event(entity: EntityRef) -> SignalEvent {
        SignalEvent::PlayerLand(EntityEvent { entity })
    }
}
