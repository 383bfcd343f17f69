//! Capability traits the scripting host implements.
//!
//! Everything above this module only talks to the host through [`World`] and
//! [`Entity`], so signals and managers run unchanged against a real adapter or
//! against the in-memory doubles in `mcbe-testkit`.

use crate::{Container, EntityId, EquipmentSlot, ItemStack, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Errors surfaced by host queries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// The entity was removed or unloaded since it was enumerated.
    #[error("entity {0} is no longer valid")]
    InvalidEntity(EntityId),
    /// The world has not finished loading; enumeration is not permitted yet.
    #[error("world is not loaded yet")]
    NotReady,
    /// The entity kind does not offer this capability.
    #[error("entity does not support {0}")]
    Unsupported(&'static str),
    /// Any other host-side failure.
    #[error("host query failed: {0}")]
    Query(String),
}

/// Shared handle to a host entity.
pub type EntityRef = Rc<dyn Entity>;

/// State queries on a single entity or player.
///
/// Only the movement and equipment queries are required. The remaining
/// methods back the debug-stick inspector and the helpers in
/// [`EntityExt`](crate::EntityExt); they default to "nothing to report" or
/// [`HostError::Unsupported`].
pub trait Entity: fmt::Debug {
    /// Stable host id.
    fn id(&self) -> &EntityId;

    /// Namespaced type id (e.g. `minecraft:zombie`).
    fn type_id(&self) -> &str;

    /// Whether the handle still refers to a live entity.
    fn is_valid(&self) -> bool;

    /// Jump input held (players) or jump in progress (mobs).
    fn is_jumping(&self) -> Result<bool, HostError>;

    /// Standing on a block.
    fn is_on_ground(&self) -> Result<bool, HostError>;

    /// Sneak input held.
    fn is_sneaking(&self) -> Result<bool, HostError>;

    /// Item in an equipment slot. Entities without equipment return `Ok(None)`.
    fn equipment(&self, slot: EquipmentSlot) -> Result<Option<ItemStack>, HostError>;

    /// Type families (e.g. `mob`, `undead`).
    fn type_families(&self) -> Vec<String> {
        Vec::new()
    }

    /// Scoreboard-style tags.
    fn tags(&self) -> Vec<String> {
        Vec::new()
    }

    /// Current and maximum health, for entities with a health component.
    fn health(&self) -> Option<(f32, f32)> {
        None
    }

    /// Ids of dynamic properties stored on the entity.
    fn dynamic_property_ids(&self) -> Vec<String> {
        Vec::new()
    }

    /// First entity along the view direction.
    fn entity_in_view(&self) -> Option<EntityRef> {
        None
    }

    /// First block along the view direction within `max_distance` blocks.
    fn block_in_view(&self, _max_distance: f32) -> Option<BlockHit> {
        None
    }

    /// Replace the action bar text (players only).
    fn set_action_bar(&self, _message: &RawMessage) -> Result<(), HostError> {
        Ok(())
    }

    /// Feet position.
    fn location(&self) -> Result<Vector3, HostError> {
        Err(HostError::Unsupported("location"))
    }

    /// Eye position.
    fn head_location(&self) -> Result<Vector3, HostError> {
        self.location()
    }

    /// Unit vector the entity is looking along.
    fn view_direction(&self) -> Result<Vector3, HostError> {
        Err(HostError::Unsupported("view direction"))
    }

    /// Current game mode (players only).
    fn game_mode(&self) -> Option<GameMode> {
        None
    }

    /// Replace the item in an equipment slot. `None` empties it.
    fn set_equipment(
        &self,
        _slot: EquipmentSlot,
        _item: Option<ItemStack>,
    ) -> Result<(), HostError> {
        Err(HostError::Unsupported("equipment"))
    }

    /// Carried inventory, for entities that have one.
    fn inventory(&self) -> Option<Rc<dyn Container>> {
        None
    }
}

/// Population enumeration.
pub trait World {
    /// Every loaded entity, players included.
    fn entities(&self) -> Result<Vec<EntityRef>, HostError>;

    /// Every connected player.
    fn players(&self) -> Result<Vec<EntityRef>, HostError>;
}

/// Lifecycle notifications the host delivers to scripts.
#[derive(Debug, Clone)]
pub enum WorldEvent {
    /// The world finished loading; enumeration is now permitted.
    WorldLoad,
    /// A player spawned (`initial_spawn` on first join).
    PlayerSpawn {
        /// The spawned player.
        player: EntityRef,
        /// First spawn after joining.
        initial_spawn: bool,
    },
    /// A player left the world.
    PlayerLeave {
        /// Id of the departed player.
        player_id: EntityId,
    },
    /// An entity was spawned.
    EntitySpawn {
        /// The new entity.
        entity: EntityRef,
    },
    /// A previously saved entity was loaded.
    EntityLoad {
        /// The loaded entity.
        entity: EntityRef,
    },
    /// An entity was removed or unloaded.
    EntityRemove {
        /// Id of the removed entity.
        entity_id: EntityId,
    },
}

/// Block found by a view-direction raycast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHit {
    /// Namespaced block type id.
    pub type_id: String,
    /// Face that was hit (`Up`, `North`, ...).
    pub face: String,
    /// Block permutation states.
    pub states: BTreeMap<String, serde_json::Value>,
}

/// Game modes a player can be switched between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Survival mode.
    Survival,
    /// Creative mode.
    Creative,
    /// Adventure mode.
    #[default]
    Adventure,
    /// Spectator mode.
    Spectator,
}

impl GameMode {
    /// Command-syntax name.
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Survival => "survival",
            GameMode::Creative => "creative",
            GameMode::Adventure => "adventure",
            GameMode::Spectator => "spectator",
        }
    }
}

/// One text component of a [`RawMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawText {
    /// Literal text.
    pub text: String,
}

/// Structured chat / action bar message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawMessage {
    /// Ordered text components.
    pub rawtext: Vec<RawText>,
}

impl RawMessage {
    /// Message with a single text component.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            rawtext: vec![RawText { text: text.into() }],
        }
    }

    /// Append a text component.
    pub fn push(&mut self, text: impl Into<String>) {
        self.rawtext.push(RawText { text: text.into() });
    }

    /// Concatenate every component.
    pub fn to_plain_string(&self) -> String {
        self.rawtext.iter().map(|t| t.text.as_str()).collect()
    }
}

impl From<&str> for RawMessage {
    fn from(value: &str) -> Self {
        Self::plain(value)
    }
}
