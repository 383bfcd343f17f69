#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod container;
pub mod equipment;
pub mod extension;
pub mod host;
pub mod item;
pub mod text;
pub mod vector;

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use container::{Container, ContainerExt};
pub use equipment::EquipmentSlot;
pub use extension::{CarriedItems, EntityExt, PLAYER_TYPE};
pub use host::{
    BlockHit, Entity, EntityRef, GameMode, HostError, RawMessage, RawText, World, WorldEvent,
};
pub use item::{Enchantment, ItemLockMode, ItemStack, Wear, UNBREAKING};
pub use vector::{Vector2, Vector3};

/// Host scheduler tick (20 TPS => 50 ms per tick).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Ticks per real-time second on the host.
    pub const PER_SECOND: u64 = 20;

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }

    /// Convert a duration in seconds to whole ticks (rounded to nearest).
    pub fn from_seconds(seconds: f32) -> u64 {
        (seconds.max(0.0) * Self::PER_SECOND as f32).round() as u64
    }
}

/// Stable identifier the host assigns to an entity or player.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Wrap a host id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
