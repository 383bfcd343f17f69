//! Slot-indexed item storage (player inventories, chests, hoppers).

use crate::{HostError, ItemStack};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Host inventory with a fixed number of slots.
pub trait Container {
    /// Number of slots.
    fn size(&self) -> usize;

    /// Item in `slot`, or `Ok(None)` for an empty slot.
    fn item(&self, slot: usize) -> Result<Option<ItemStack>, HostError>;

    /// Replace the content of `slot`. `None` empties it.
    fn set_item(&self, slot: usize, item: Option<ItemStack>) -> Result<(), HostError>;
}

/// Whole-container helpers built on [`Container`].
pub trait ContainerExt: Container {
    /// Visit every slot in index order, empty ones included.
    fn for_each_slot<F>(&self, mut visit: F) -> Result<(), HostError>
    where
        F: FnMut(usize, Option<&ItemStack>),
    {
        for slot in 0..self.size() {
            visit(slot, self.item(slot)?.as_ref());
        }
        Ok(())
    }

    /// Occupied slots, keyed by index.
    fn items(&self) -> Result<BTreeMap<usize, ItemStack>, HostError> {
        let mut items = BTreeMap::new();
        for slot in 0..self.size() {
            if let Some(item) = self.item(slot)? {
                items.insert(slot, item);
            }
        }
        Ok(items)
    }

    /// Occupied slots holding `type_id`.
    fn items_of_type(&self, type_id: &str) -> Result<BTreeMap<usize, ItemStack>, HostError> {
        let mut items = self.items()?;
        items.retain(|_, item| item.type_id == type_id);
        Ok(items)
    }

    /// First empty slot, if any.
    fn first_empty_slot(&self) -> Result<Option<usize>, HostError> {
        for slot in 0..self.size() {
            if self.item(slot)?.is_none() {
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }

    /// Sort the items with `compare` and pack them into the lowest slots.
    ///
    /// Gaps between items disappear; every slot past the last item ends up
    /// empty.
    fn sort_by<F>(&self, compare: F) -> Result<(), HostError>
    where
        F: FnMut(&ItemStack, &ItemStack) -> Ordering,
    {
        let mut items: Vec<ItemStack> = self.items()?.into_values().collect();
        items.sort_by(compare);
        let count = items.len();
        for (slot, item) in items.into_iter().enumerate() {
            self.set_item(slot, Some(item))?;
        }
        for slot in count..self.size() {
            self.set_item(slot, None)?;
        }
        Ok(())
    }
}

impl<C: Container + ?Sized> ContainerExt for C {}
