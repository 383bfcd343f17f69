//! Equipment slot identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A slot on a player's equipment component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipmentSlot {
    /// Item held in the main hand.
    Mainhand,
    /// Item held in the off hand.
    Offhand,
    /// Helmet slot.
    Head,
    /// Chestplate slot.
    Chest,
    /// Leggings slot.
    Legs,
    /// Boots slot.
    Feet,
}

impl EquipmentSlot {
    /// Every slot, in the order equipment diffs are reported.
    pub const ALL: [EquipmentSlot; 6] = [
        EquipmentSlot::Mainhand,
        EquipmentSlot::Offhand,
        EquipmentSlot::Head,
        EquipmentSlot::Chest,
        EquipmentSlot::Legs,
        EquipmentSlot::Feet,
    ];

    /// Host-facing slot name.
    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentSlot::Mainhand => "Mainhand",
            EquipmentSlot::Offhand => "Offhand",
            EquipmentSlot::Head => "Head",
            EquipmentSlot::Chest => "Chest",
            EquipmentSlot::Legs => "Legs",
            EquipmentSlot::Feet => "Feet",
        }
    }
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_each_slot_once_in_diff_order() {
        let names: Vec<String> = EquipmentSlot::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            ["Mainhand", "Offhand", "Head", "Chest", "Legs", "Feet"]
        );
        let mut sorted = EquipmentSlot::ALL.to_vec();
        sorted.dedup();
        assert_eq!(sorted.len(), EquipmentSlot::ALL.len());
    }
}
