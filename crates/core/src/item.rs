//! Item stacks as observed through the host API.
//!
//! The host hands out a fresh item object on every equipment query, so object
//! identity means nothing. Two stacks are the same item only when every
//! observable property matches; see [`ItemStack::compare`].

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Enchantment that lets a damageable item shrug off wear.
pub const UNBREAKING: &str = "minecraft:unbreaking";

/// How an item is locked into an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemLockMode {
    /// Item can be moved freely.
    #[default]
    None,
    /// Item cannot leave the inventory.
    Inventory,
    /// Item cannot leave its slot.
    Slot,
}

/// An enchantment applied to an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enchantment {
    /// Namespaced enchantment id (e.g. `minecraft:mending`).
    pub id: String,
    /// Enchantment level.
    pub level: u8,
}

impl Enchantment {
    /// Create a new enchantment.
    pub fn new(id: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            level,
        }
    }
}

/// Snapshot of an item stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStack {
    /// Namespaced item type id (e.g. `minecraft:diamond_sword`).
    pub type_id: String,
    /// Quantity in stack
    pub amount: u8,
    /// Maximum stack size for this item type.
    pub max_amount: u8,
    /// Whether the item can stack with other identical items.
    pub is_stackable: bool,
    /// Whether the item survives the holder's death.
    pub keep_on_death: bool,
    /// Inventory lock mode.
    pub lock_mode: ItemLockMode,
    /// Custom name tag, if renamed.
    pub name_tag: Option<String>,
    /// Block types this item may destroy in adventure mode.
    pub can_destroy: Vec<String>,
    /// Component type ids attached to the item.
    pub components: Vec<String>,
    /// Lore lines.
    pub lore: Vec<String>,
    /// Item tags.
    pub tags: Vec<String>,
    /// Remaining durability for damageable items.
    pub durability: Option<u32>,
    /// Durability of an undamaged item. Falls back to `durability` when unset.
    pub max_durability: Option<u32>,
    /// Enchantments applied to this item.
    pub enchantments: Vec<Enchantment>,
    /// Total bytes of dynamic properties stored on the item.
    pub dynamic_property_bytes: u32,
}

impl Default for ItemStack {
    fn default() -> Self {
        Self {
            type_id: String::new(),
            amount: 1,
            max_amount: 64,
            is_stackable: true,
            keep_on_death: false,
            lock_mode: ItemLockMode::None,
            name_tag: None,
            can_destroy: Vec::new(),
            components: Vec::new(),
            lore: Vec::new(),
            tags: Vec::new(),
            durability: None,
            max_durability: None,
            enchantments: Vec::new(),
            dynamic_property_bytes: 0,
        }
    }
}

impl ItemStack {
    /// Create a stack of `amount` items of `type_id`.
    pub fn new(type_id: impl Into<String>, amount: u8) -> Self {
        Self {
            type_id: type_id.into(),
            amount,
            ..Self::default()
        }
    }

    /// Builder: mark as an unstackable, damageable item with `durability`
    /// uses left.
    pub fn with_durability(mut self, durability: u32) -> Self {
        self.durability = Some(durability);
        self.is_stackable = false;
        self.max_amount = 1;
        self
    }

    /// Builder: damageable item that starts at `max` and has taken `damage`.
    pub fn with_wear(self, max: u32, damage: u32) -> Self {
        let mut stack = self.with_durability(max.saturating_sub(damage));
        stack.max_durability = Some(max);
        stack
    }

    /// Builder: add an enchantment.
    pub fn with_enchantment(mut self, enchantment: Enchantment) -> Self {
        self.enchantments.push(enchantment);
        self
    }

    /// Builder: set lore lines.
    pub fn with_lore<I, S>(mut self, lore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lore = lore.into_iter().map(Into::into).collect();
        self
    }

    /// Full identity comparison against an optional other stack.
    ///
    /// Returns false when `other` is `None`, so an empty slot never compares
    /// equal to an occupied one.
    pub fn compare(&self, other: Option<&ItemStack>) -> bool {
        other.is_some_and(|other| self == other)
    }

    /// Look up an enchantment by id.
    pub fn enchantment(&self, id: &str) -> Option<&Enchantment> {
        self.enchantments.iter().find(|e| e.id == id)
    }

    /// Check whether an enchantment is present.
    pub fn has_enchantment(&self, id: &str) -> bool {
        self.enchantment(id).is_some()
    }

    /// Add an enchantment, replacing any existing one with the same id.
    pub fn add_enchantment(&mut self, enchantment: Enchantment) {
        self.remove_enchantment(&enchantment.id);
        self.enchantments.push(enchantment);
    }

    /// Remove an enchantment by id, returning it if it was present.
    pub fn remove_enchantment(&mut self, id: &str) -> Option<Enchantment> {
        let index = self.enchantments.iter().position(|e| e.id == id)?;
        Some(self.enchantments.remove(index))
    }

    /// Strip every enchantment.
    pub fn remove_all_enchantments(&mut self) {
        self.enchantments.clear();
    }

    /// Durability of an undamaged item, for damageable items.
    pub fn max_durability(&self) -> Option<u32> {
        let remaining = self.durability?;
        Some(self.max_durability.unwrap_or(remaining).max(remaining))
    }

    /// Wear taken so far, for damageable items.
    pub fn damage(&self) -> Option<u32> {
        Some(self.max_durability()? - self.durability?)
    }

    /// Set the remaining durability, clamped to `0..=max`.
    ///
    /// Returns false and leaves the stack alone when the item is not
    /// damageable.
    pub fn set_durability(&mut self, durability: i64) -> bool {
        let Some(max) = self.max_durability() else {
            return false;
        };
        self.max_durability = Some(max);
        self.durability = Some(durability.clamp(0, i64::from(max)) as u32);
        true
    }

    /// Wear the item by `amount` uses.
    ///
    /// An item with Unbreaking level `L` only takes the wear with probability
    /// `1 / (L + 1)`.
    pub fn apply_wear<R: Rng + ?Sized>(&mut self, amount: u32, rng: &mut R) -> Wear {
        let Some(remaining) = self.durability else {
            return Wear::Undamageable;
        };
        let level = self.enchantment(UNBREAKING).map_or(0, |e| e.level);
        if !rng.gen_bool(1.0 / (f64::from(level) + 1.0)) {
            return Wear::Resisted;
        }
        let left = i64::from(remaining) - i64::from(amount);
        self.set_durability(left);
        if left <= 0 {
            Wear::Broken
        } else {
            Wear::Worn
        }
    }
}

/// Outcome of [`ItemStack::apply_wear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wear {
    /// The item has no durability.
    Undamageable,
    /// Unbreaking absorbed the wear.
    Resisted,
    /// Durability dropped but uses remain.
    Worn,
    /// Durability ran out; the item should be removed.
    Broken,
}
