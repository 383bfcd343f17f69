//! Property-based tests for item identity and vector text form.
//!
//! - A stack compares equal to its own copy and never to an empty slot
//! - Changing any single observable property breaks identity
//! - Vectors survive the command-syntax text form

use mcbe_core::{Enchantment, ItemLockMode, ItemStack, Vector3};
use proptest::prelude::*;

fn lock_mode() -> impl Strategy<Value = ItemLockMode> {
    prop_oneof![
        Just(ItemLockMode::None),
        Just(ItemLockMode::Inventory),
        Just(ItemLockMode::Slot),
    ]
}

prop_compose! {
    fn item_stack()(
        type_id in "minecraft:[a-z_]{1,12}",
        amount in 1u8..=64,
        keep_on_death in any::<bool>(),
        lock_mode in lock_mode(),
        name_tag in prop::option::of("[A-Za-z ]{1,10}"),
        lore in prop::collection::vec("[a-z ]{0,8}", 0..3),
        durability in prop::option::of(0u32..2000),
        enchant_level in prop::option::of(1u8..5),
        dynamic_property_bytes in 0u32..256,
    ) -> ItemStack {
        let mut stack = ItemStack::new(type_id, amount);
        stack.keep_on_death = keep_on_death;
        stack.lock_mode = lock_mode;
        stack.name_tag = name_tag;
        stack.lore = lore;
        if let Some(durability) = durability {
            stack = stack.with_durability(durability);
        }
        if let Some(level) = enchant_level {
            stack = stack.with_enchantment(Enchantment::new("minecraft:unbreaking", level));
        }
        stack.dynamic_property_bytes = dynamic_property_bytes;
        stack
    }
}

proptest! {
    /// Property: identity is reflexive over copies and false against `None`.
    #[test]
    fn copies_match_and_empty_slots_do_not(stack in item_stack()) {
        prop_assert!(stack.compare(Some(&stack.clone())));
        prop_assert!(!stack.compare(None));
    }

    /// Property: one changed property is enough to break identity.
    #[test]
    fn single_property_change_breaks_identity(stack in item_stack(), which in 0usize..6) {
        let mut changed = stack.clone();
        match which {
            0 => changed.amount = changed.amount.wrapping_add(1),
            1 => changed.keep_on_death = !changed.keep_on_death,
            2 => changed.tags.push("marked".to_string()),
            3 => changed.can_destroy.push("minecraft:stone".to_string()),
            4 => changed.components.push("minecraft:cooldown".to_string()),
            _ => changed.dynamic_property_bytes += 1,
        }
        prop_assert!(!stack.compare(Some(&changed)));
        prop_assert!(!changed.compare(Some(&stack)));
    }

    /// Property: `Display` output parses back to the same vector.
    #[test]
    fn vector_text_form_parses_back(
        x in -30_000_000.0f64..30_000_000.0,
        y in -64.0f64..320.0,
        z in -30_000_000.0f64..30_000_000.0,
    ) {
        let v = Vector3::new(x, y, z);
        let parsed: Vector3 = v.to_string().parse().unwrap();
        prop_assert_eq!(parsed, v);
    }
}
