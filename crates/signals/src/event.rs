//! Events delivered to signal subscribers.

use mcbe_core::{EntityRef, EquipmentSlot, ItemStack};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which transition an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Entity left the ground while jumping.
    EntityJump,
    /// Entity started jumping (re-armed when the jump input clears).
    EntityStartJumping,
    /// Entity released jump after an airborne jump.
    EntityStopJumping,
    /// Entity started sneaking.
    EntitySneak,
    /// Entity stopped sneaking.
    EntityUnsneak,
    /// Entity touched the ground after being airborne.
    EntityOnGround,
    /// Player jumped again while already airborne.
    PlayerAirJump,
    /// Player touched the ground after being airborne.
    PlayerLand,
    /// An item appeared in (or changed in) a player's equipment slot.
    PlayerEquip,
    /// An item left (or changed in) a player's equipment slot.
    PlayerUnequip,
}

impl EventKind {
    /// Every kind, in registry order.
    pub const ALL: [EventKind; 10] = [
        EventKind::EntityJump,
        EventKind::EntityStartJumping,
        EventKind::EntityStopJumping,
        EventKind::EntitySneak,
        EventKind::EntityUnsneak,
        EventKind::EntityOnGround,
        EventKind::PlayerAirJump,
        EventKind::PlayerLand,
        EventKind::PlayerEquip,
        EventKind::PlayerUnequip,
    ];

    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::EntityJump => "entity_jump",
            EventKind::EntityStartJumping => "entity_start_jumping",
            EventKind::EntityStopJumping => "entity_stop_jumping",
            EventKind::EntitySneak => "entity_sneak",
            EventKind::EntityUnsneak => "entity_unsneak",
            EventKind::EntityOnGround => "entity_on_ground",
            EventKind::PlayerAirJump => "player_air_jump",
            EventKind::PlayerLand => "player_land",
            EventKind::PlayerEquip => "player_equip",
            EventKind::PlayerUnequip => "player_unequip",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown event kind name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown event kind `{0}`")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// Payload for transitions that only concern an entity.
#[derive(Debug, Clone)]
pub struct EntityEvent {
    /// The entity (or player) that transitioned.
    pub entity: EntityRef,
}

/// Payload for equipment transitions.
#[derive(Debug, Clone)]
pub struct EquipmentEvent {
    /// The player whose equipment changed.
    pub player: EntityRef,
    /// Slot that changed.
    pub slot: EquipmentSlot,
    /// Item now in the slot (equip) or the item that left it (unequip).
    pub item: ItemStack,
}

/// A detected transition, tagged by kind.
#[derive(Debug, Clone)]
pub enum SignalEvent {
    /// See [`EventKind::EntityJump`].
    EntityJump(EntityEvent),
    /// See [`EventKind::EntityStartJumping`].
    EntityStartJumping(EntityEvent),
    /// See [`EventKind::EntityStopJumping`].
    EntityStopJumping(EntityEvent),
    /// See [`EventKind::EntitySneak`].
    EntitySneak(EntityEvent),
    /// See [`EventKind::EntityUnsneak`].
    EntityUnsneak(EntityEvent),
    /// See [`EventKind::EntityOnGround`].
    EntityOnGround(EntityEvent),
    /// See [`EventKind::PlayerAirJump`].
    PlayerAirJump(EntityEvent),
    /// See [`EventKind::PlayerLand`].
    PlayerLand(EntityEvent),
    /// See [`EventKind::PlayerEquip`].
    PlayerEquip(EquipmentEvent),
    /// See [`EventKind::PlayerUnequip`].
    PlayerUnequip(EquipmentEvent),
}

impl SignalEvent {
    /// Transition kind.
    pub fn kind(&self) -> EventKind {
        match self {
            SignalEvent::EntityJump(_) => EventKind::EntityJump,
            SignalEvent::EntityStartJumping(_) => EventKind::EntityStartJumping,
            SignalEvent::EntityStopJumping(_) => EventKind::EntityStopJumping,
            SignalEvent::EntitySneak(_) => EventKind::EntitySneak,
            SignalEvent::EntityUnsneak(_) => EventKind::EntityUnsneak,
            SignalEvent::EntityOnGround(_) => EventKind::EntityOnGround,
            SignalEvent::PlayerAirJump(_) => EventKind::PlayerAirJump,
            SignalEvent::PlayerLand(_) => EventKind::PlayerLand,
            SignalEvent::PlayerEquip(_) => EventKind::PlayerEquip,
            SignalEvent::PlayerUnequip(_) => EventKind::PlayerUnequip,
        }
    }

    /// The entity or player the event refers to.
    pub fn entity(&self) -> &EntityRef {
        match self {
            SignalEvent::EntityJump(e)
            | SignalEvent::EntityStartJumping(e)
            | SignalEvent::EntityStopJumping(e)
            | SignalEvent::EntitySneak(e)
            | SignalEvent::EntityUnsneak(e)
            | SignalEvent::EntityOnGround(e)
            | SignalEvent::PlayerAirJump(e)
            | SignalEvent::PlayerLand(e) => &e.entity,
            SignalEvent::PlayerEquip(e) | SignalEvent::PlayerUnequip(e) => &e.player,
        }
    }

    /// Equipment payload, for equip/unequip events.
    pub fn equipment(&self) -> Option<&EquipmentEvent> {
        match self {
            SignalEvent::PlayerEquip(e) | SignalEvent::PlayerUnequip(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_parse_back() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
        }
        assert_eq!(
            "entity_fly".parse::<EventKind>(),
            Err(UnknownEventKind("entity_fly".into()))
        );
    }
}
