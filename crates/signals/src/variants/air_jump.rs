//! Double-jump detection for players.

use crate::signal::{Detector, Population};
use crate::tracking::{observe, TrackingMap};
use crate::{EntityEvent, SignalEvent};
use mcbe_core::{Entity, EntityId, EntityRef, HostError};

/// Progress of one player through an air jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirPhase {
    /// Airborne without jump input for one tick.
    Falling,
    /// Airborne without jump input for at least two ticks; the next jump fires.
    Armed,
    /// Fired; held until the jump input clears.
    Fired,
}

/// Fires when an airborne player presses jump after having released it.
///
/// The initial jump off the ground never fires: the player is dropped from
/// tracking while grounded and must spend two airborne ticks without jump
/// input before being armed.
#[derive(Debug, Default)]
pub struct AirJumpDetector {
    phases: TrackingMap<AirPhase>,
}

#[derive(Clone, Copy)]
struct Airborne {
    jumping: bool,
    on_ground: bool,
}

fn airborne(entity: &dyn Entity) -> Result<Airborne, HostError> {
    Ok(Airborne {
        jumping: entity.is_jumping()?,
        on_ground: entity.is_on_ground()?,
    })
}

impl AirJumpDetector {
    /// Phase currently recorded for `player`.
    pub fn phase(&self, player: &EntityId) -> Option<AirPhase> {
        self.phases.get(player).copied()
    }
}

impl Detector for AirJumpDetector {
    const LABEL: &'static str = "player_air_jump";
    const POPULATION: Population = Population::Players;

    fn scan(&mut self, population: &[EntityRef], emit: &mut dyn FnMut(SignalEvent)) {
        self.phases.scan(population, |phases, player| {
            let id = player.id();
            let Some(state) = observe(&**player, airborne) else {
                phases.remove(id);
                return;
            };
            if state.on_ground {
                phases.remove(id);
                return;
            }

            let current = phases.get(id).copied();
            let next = match (state.jumping, current) {
                (false, None) | (false, Some(AirPhase::Fired)) => Some(AirPhase::Falling),
                (false, Some(AirPhase::Falling | AirPhase::Armed)) => Some(AirPhase::Armed),
                (true, Some(AirPhase::Armed)) => {
                    emit(SignalEvent::PlayerAirJump(EntityEvent {
                        entity: player.clone(),
                    }));
                    Some(AirPhase::Fired)
                }
                (true, Some(AirPhase::Fired)) => Some(AirPhase::Fired),
                (true, Some(AirPhase::Falling) | None) => None,
            };
            match next {
                Some(phase) => {
                    phases.insert(id.clone(), phase);
                }
                None => {
                    phases.remove(id);
                }
            }
        });
    }

    fn tracked(&self) -> usize {
        self.phases.len()
    }
}
