//! Equip / unequip detection by diffing per-tick equipment snapshots.

use crate::signal::{Detector, Population};
use crate::tracking::{capture_equipment, observe, EquipmentSnapshot, TrackingMap};
use crate::{EquipmentEvent, SignalEvent};
use mcbe_core::{EntityRef, EquipmentSlot, ItemStack};
use std::marker::PhantomData;

/// Direction of an equipment diff.
pub trait EquipmentDiff: 'static {
    /// Diagnostic name.
    const LABEL: &'static str;

    /// Item to report for `slot`, if the slot changed in this direction.
    fn changed<'a>(
        previous: Option<&'a ItemStack>,
        current: Option<&'a ItemStack>,
    ) -> Option<&'a ItemStack>;

    /// Wrap the payload in the right event variant.
    fn event(payload: EquipmentEvent) -> SignalEvent;
}

/// Reports the new item whenever a slot holds something different.
pub struct EquipDiff;

impl EquipmentDiff for EquipDiff {
    const LABEL: &'static str = "player_equip";

    fn changed<'a>(
        previous: Option<&'a ItemStack>,
        current: Option<&'a ItemStack>,
    ) -> Option<&'a ItemStack> {
        current.filter(|item| !item.compare(previous))
    }

    fn event(payload: EquipmentEvent) -> SignalEvent {
        SignalEvent::PlayerEquip(payload)
    }
}

/// Reports the old item whenever it is no longer in its slot.
pub struct UnequipDiff;

impl EquipmentDiff for UnequipDiff {
    const LABEL: &'static str = "player_unequip";

    fn changed<'a>(
        previous: Option<&'a ItemStack>,
        current: Option<&'a ItemStack>,
    ) -> Option<&'a ItemStack> {
        previous.filter(|item| !item.compare(current))
    }

    fn event(payload: EquipmentEvent) -> SignalEvent {
        SignalEvent::PlayerUnequip(payload)
    }
}

/// Snapshot-diffing [`Detector`]. Emits one event per changed slot, in
/// [`EquipmentSlot::ALL`] order. The first snapshot of a player only
/// establishes the baseline.
pub struct EquipmentDetector<R> {
    snapshots: TrackingMap<EquipmentSnapshot>,
    _diff: PhantomData<fn() -> R>,
}

impl<R> Default for EquipmentDetector<R> {
    fn default() -> Self {
        Self {
            snapshots: TrackingMap::new(),
            _diff: PhantomData,
        }
    }
}

impl<R: EquipmentDiff> Detector for EquipmentDetector<R> {
    const LABEL: &'static str = R::LABEL;
    const POPULATION: Population = Population::Players;

    fn scan(&mut self, population: &[EntityRef], emit: &mut dyn FnMut(SignalEvent)) {
        self.snapshots.scan(population, |snapshots, player| {
            let id = player.id();
            let Some(current) = observe(&**player, capture_equipment) else {
                snapshots.remove(id);
                return;
            };
            if let Some(previous) = snapshots.get(id) {
                for slot in EquipmentSlot::ALL {
                    if let Some(item) = R::changed(previous.get(&slot), current.get(&slot)) {
                        emit(R::event(EquipmentEvent {
                            player: player.clone(),
                            slot,
                            item: item.clone(),
                        }));
                    }
                }
            }
            snapshots.insert(id.clone(), current);
        });
    }

    fn tracked(&self) -> usize {
        self.snapshots.len()
    }
}
