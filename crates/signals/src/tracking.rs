//! Per-subscription tracking state used for edge detection.

use mcbe_core::{Entity, EntityId, EntityRef, EquipmentSlot, HostError, ItemStack};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace};

/// Slot → item map captured once per tick. Empty slots are absent.
pub type EquipmentSnapshot = BTreeMap<EquipmentSlot, ItemStack>;

/// Map from entity id to the state last observed for it.
///
/// Every scan records which ids were present; entries for ids missing from
/// the latest population are dropped at the end of the scan, so entities
/// removed from the world never leave stale entries behind.
#[derive(Debug)]
pub struct TrackingMap<S> {
    entries: HashMap<EntityId, S>,
    seen: HashSet<EntityId>,
}

/// Membership-only tracking.
pub type TrackingSet = TrackingMap<()>;

impl<S> Default for TrackingMap<S> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            seen: HashSet::new(),
        }
    }
}

impl<S> TrackingMap<S> {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Visit every member of `population`, then prune ids that were not
    /// visited.
    pub fn scan<F>(&mut self, population: &[EntityRef], mut step: F)
    where
        F: FnMut(&mut Self, &EntityRef),
    {
        self.seen.clear();
        for entity in population {
            self.seen.insert(entity.id().clone());
            step(self, entity);
        }
        let pruned = self.prune_unseen();
        if pruned > 0 {
            debug!(pruned, remaining = self.entries.len(), "pruned tracking entries");
        }
    }

    /// Drop entries whose ids were not seen in the current scan.
    pub fn prune_unseen(&mut self) -> usize {
        let before = self.entries.len();
        let seen = &self.seen;
        self.entries.retain(|id, _| seen.contains(id));
        before - self.entries.len()
    }

    /// Whether `id` is tracked.
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entries.contains_key(id)
    }

    /// Tracked state for `id`.
    pub fn get(&self, id: &EntityId) -> Option<&S> {
        self.entries.get(id)
    }

    /// Start (or replace) tracking `id`, returning the previous state.
    pub fn insert(&mut self, id: EntityId, state: S) -> Option<S> {
        self.entries.insert(id, state)
    }

    /// Stop tracking `id`.
    pub fn remove(&mut self, id: &EntityId) -> Option<S> {
        self.entries.remove(id)
    }

    /// Number of tracked ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Evaluate a state query, yielding `None` for removed entities and failed
/// queries. Callers drop tracking for `None` without reporting a transition.
pub fn observe<T, F>(entity: &dyn Entity, query: F) -> Option<T>
where
    F: FnOnce(&dyn Entity) -> Result<T, HostError>,
{
    if !entity.is_valid() {
        trace!(entity = %entity.id(), "entity no longer valid");
        return None;
    }
    match query(entity) {
        Ok(value) => Some(value),
        Err(err) => {
            trace!(entity = %entity.id(), "state query failed: {err}");
            None
        }
    }
}

/// Capture every equipment slot of `entity`.
pub fn capture_equipment(entity: &dyn Entity) -> Result<EquipmentSnapshot, HostError> {
    let mut snapshot = EquipmentSnapshot::new();
    for slot in EquipmentSlot::ALL {
        if let Some(item) = entity.equipment(slot)? {
            snapshot.insert(slot, item);
        }
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcbe_testkit::MockEntity;

    #[test]
    fn scan_prunes_ids_absent_from_population() {
        let a = MockEntity::new("a", "minecraft:zombie");
        let b = MockEntity::new("b", "minecraft:zombie");
        let mut map = TrackingSet::new();

        let both = vec![a.handle(), b.handle()];
        map.scan(&both, |map, entity| {
            map.insert(entity.id().clone(), ());
        });
        assert_eq!(map.len(), 2);

        let only_a = vec![a.handle()];
        map.scan(&only_a, |_, _| {});
        assert_eq!(map.len(), 1);
        assert!(map.contains(&EntityId::new("a")));
    }

    #[test]
    fn observe_treats_removed_entities_as_absent() {
        let entity = MockEntity::new("z", "minecraft:zombie");
        entity.set_jumping(true);
        assert_eq!(observe(&*entity, |e| e.is_jumping()), Some(true));
        entity.remove();
        assert_eq!(observe(&*entity, |e| e.is_jumping()), None);
    }

    #[test]
    fn capture_skips_empty_slots() {
        let player = MockEntity::player("p");
        player.equip(EquipmentSlot::Head, ItemStack::new("minecraft:iron_helmet", 1));
        let snapshot = capture_equipment(&*player).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key(&EquipmentSlot::Head));
    }
}
