//! Derived entity properties and item helpers layered over [`Entity`].

use crate::{ContainerExt, Entity, EquipmentSlot, GameMode, HostError, ItemStack, Vector3, Wear};
use rand::Rng;
use std::collections::BTreeMap;

/// Type id the host gives every player.
pub const PLAYER_TYPE: &str = "minecraft:player";

/// Everything an entity carries, keyed by where it sits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarriedItems {
    /// Worn and held items.
    pub equipment: BTreeMap<EquipmentSlot, ItemStack>,
    /// Occupied inventory slots.
    pub inventory: BTreeMap<usize, ItemStack>,
}

impl CarriedItems {
    /// Total number of stacks.
    pub fn len(&self) -> usize {
        self.equipment.len() + self.inventory.len()
    }

    /// Nothing carried at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Convenience queries available on every [`Entity`].
pub trait EntityExt: Entity {
    /// Player check by type id.
    fn is_player(&self) -> bool {
        self.type_id() == PLAYER_TYPE
    }

    /// Current health, 0 without a health component.
    fn current_health(&self) -> f32 {
        self.health().map_or(0.0, |(current, _)| current)
    }

    /// Maximum health, 0 without a health component.
    fn max_health(&self) -> f32 {
        self.health().map_or(0.0, |(_, max)| max)
    }

    /// Health still missing from the maximum.
    fn missing_health(&self) -> f32 {
        self.max_health() - self.current_health()
    }

    /// Creative and spectator players cannot be hurt.
    fn is_invulnerable(&self) -> bool {
        matches!(
            self.game_mode(),
            Some(GameMode::Creative | GameMode::Spectator)
        )
    }

    /// Whether the entity belongs to a type family.
    fn has_family(&self, family: &str) -> bool {
        self.type_families().iter().any(|f| f == family)
    }

    /// Block the feet are in.
    fn coordinates(&self) -> Result<Vector3, HostError> {
        let at = self.location()?;
        Ok(Vector3::new(at.x.floor(), at.y.floor(), at.z.floor()))
    }

    /// 16-block chunk the feet are in, on all three axes.
    fn chunk(&self) -> Result<Vector3, HostError> {
        let at = self.location()?;
        Ok(Vector3::new(
            (at.x / 16.0).floor(),
            (at.y / 16.0).floor(),
            (at.z / 16.0).floor(),
        ))
    }

    /// Point `distance` blocks ahead of the eyes, shifted by `offset` in the
    /// view frame: `x` to the right, `y` up and `z` further forward.
    fn facing_offset(&self, distance: f64, offset: Vector3) -> Result<Vector3, HostError> {
        let view = self.view_direction()?;
        let right = Vector3::new(-view.z, 0.0, view.x).normalized();
        let ahead = view * (distance + offset.z) + right * offset.x;
        Ok(self.head_location()? + ahead + Vector3::new(0.0, offset.y, 0.0))
    }

    /// Equipment and inventory contents, optionally only stacks of `type_id`.
    fn items(&self, type_id: Option<&str>) -> Result<CarriedItems, HostError> {
        let wanted = |item: &ItemStack| type_id.map_or(true, |id| item.type_id == id);
        let mut carried = CarriedItems::default();
        for slot in EquipmentSlot::ALL {
            if let Some(item) = self.equipment(slot)?.filter(|item| wanted(item)) {
                carried.equipment.insert(slot, item);
            }
        }
        if let Some(inventory) = self.inventory() {
            carried.inventory = inventory.items()?;
            carried.inventory.retain(|_, item| wanted(&*item));
        }
        Ok(carried)
    }

    /// Wear the item in `slot` by `amount` uses and write it back.
    ///
    /// A broken item empties the slot. Creative players never wear items.
    /// Returns the item as it stands afterwards, or `None` for an empty slot.
    fn damage_item<R: Rng + ?Sized>(
        &self,
        slot: EquipmentSlot,
        amount: u32,
        rng: &mut R,
    ) -> Result<Option<ItemStack>, HostError> {
        let Some(mut item) = self.equipment(slot)? else {
            return Ok(None);
        };
        if self.game_mode() == Some(GameMode::Creative) {
            return Ok(Some(item));
        }
        match item.apply_wear(amount, rng) {
            Wear::Undamageable | Wear::Resisted => {}
            Wear::Worn => self.set_equipment(slot, Some(item.clone()))?,
            Wear::Broken => self.set_equipment(slot, None)?,
        }
        Ok(Some(item))
    }
}

impl<E: Entity + ?Sized> EntityExt for E {}
