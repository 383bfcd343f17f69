//! In-memory doubles for the host capability traits.

use mcbe_core::{
    BlockHit, Container, Entity, EntityExt, EntityId, EntityRef, EquipmentSlot, GameMode,
    HostError, ItemStack, RawMessage, Vector3, World, PLAYER_TYPE,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::trace;

/// Eye height of a standing player, in blocks.
const PLAYER_EYE_HEIGHT: f64 = 1.62;

/// Scriptable entity. Every setter takes `&self` so tests can mutate an
/// entity while a world or signal holds a handle to it.
///
/// New entities start valid at the origin, standing on the ground, idle and
/// unequipped, looking south.
#[derive(Debug)]
pub struct MockEntity {
    id: EntityId,
    type_id: String,
    valid: Cell<bool>,
    failing: Cell<bool>,
    jumping: Cell<bool>,
    on_ground: Cell<bool>,
    sneaking: Cell<bool>,
    equipment: RefCell<BTreeMap<EquipmentSlot, ItemStack>>,
    families: RefCell<Vec<String>>,
    tags: RefCell<Vec<String>>,
    health: Cell<Option<(f32, f32)>>,
    dynamic_properties: RefCell<Vec<String>>,
    entity_in_view: RefCell<Option<EntityRef>>,
    block_in_view: RefCell<Option<BlockHit>>,
    action_bar: RefCell<Vec<RawMessage>>,
    location: Cell<Vector3>,
    eye_height: Cell<f64>,
    view_direction: Cell<Vector3>,
    game_mode: Cell<Option<GameMode>>,
    inventory: RefCell<Option<Rc<MockContainer>>>,
}

impl MockEntity {
    /// New entity of `type_id`.
    pub fn new(id: impl Into<String>, type_id: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            id: EntityId::new(id),
            type_id: type_id.into(),
            valid: Cell::new(true),
            failing: Cell::new(false),
            jumping: Cell::new(false),
            on_ground: Cell::new(true),
            sneaking: Cell::new(false),
            equipment: RefCell::new(BTreeMap::new()),
            families: RefCell::new(Vec::new()),
            tags: RefCell::new(Vec::new()),
            health: Cell::new(None),
            dynamic_properties: RefCell::new(Vec::new()),
            entity_in_view: RefCell::new(None),
            block_in_view: RefCell::new(None),
            action_bar: RefCell::new(Vec::new()),
            location: Cell::new(Vector3::ZERO),
            eye_height: Cell::new(0.0),
            view_direction: Cell::new(Vector3::new(0.0, 0.0, 1.0)),
            game_mode: Cell::new(None),
            inventory: RefCell::new(None),
        })
    }

    /// New player.
    pub fn player(id: impl Into<String>) -> Rc<Self> {
        let player = Self::new(id, PLAYER_TYPE);
        player.set_families(["player"]);
        player.set_health(20.0, 20.0);
        player.eye_height.set(PLAYER_EYE_HEIGHT);
        player.game_mode.set(Some(GameMode::Survival));
        player.give_inventory(MockContainer::new(36));
        player
    }

    /// Type-erased handle.
    pub fn handle(self: &Rc<Self>) -> EntityRef {
        Rc::clone(self) as EntityRef
    }

    /// Set the jump flag.
    pub fn set_jumping(&self, jumping: bool) {
        self.jumping.set(jumping);
    }

    /// Set ground contact.
    pub fn set_on_ground(&self, on_ground: bool) {
        self.on_ground.set(on_ground);
    }

    /// Set the sneak flag.
    pub fn set_sneaking(&self, sneaking: bool) {
        self.sneaking.set(sneaking);
    }

    /// Put `item` in `slot`, replacing what was there.
    pub fn equip(&self, slot: EquipmentSlot, item: ItemStack) {
        self.equipment.borrow_mut().insert(slot, item);
    }

    /// Empty `slot`, returning what was there.
    pub fn unequip(&self, slot: EquipmentSlot) -> Option<ItemStack> {
        self.equipment.borrow_mut().remove(&slot)
    }

    /// Invalidate the handle; every later query fails with
    /// [`HostError::InvalidEntity`].
    pub fn remove(&self) {
        trace!(entity = %self.id, "mock entity removed");
        self.valid.set(false);
    }

    /// Make every state query fail (or succeed again).
    pub fn fail_queries(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Replace the type families.
    pub fn set_families<I, S>(&self, families: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.families.borrow_mut() = families.into_iter().map(Into::into).collect();
    }

    /// Add a tag.
    pub fn add_tag(&self, tag: impl Into<String>) {
        self.tags.borrow_mut().push(tag.into());
    }

    /// Set current and maximum health.
    pub fn set_health(&self, current: f32, max: f32) {
        self.health.set(Some((current, max)));
    }

    /// Record a dynamic property id.
    pub fn add_dynamic_property(&self, id: impl Into<String>) {
        self.dynamic_properties.borrow_mut().push(id.into());
    }

    /// Set the entity returned by view raycasts.
    pub fn look_at_entity(&self, target: Option<EntityRef>) {
        *self.entity_in_view.borrow_mut() = target;
    }

    /// Set the block returned by view raycasts.
    pub fn look_at_block(&self, hit: Option<BlockHit>) {
        *self.block_in_view.borrow_mut() = hit;
    }

    /// Move the feet to `location`.
    pub fn teleport(&self, location: Vector3) {
        self.location.set(location);
    }

    /// Look along `direction` (normalized on the way in).
    pub fn look_along(&self, direction: Vector3) {
        self.view_direction.set(direction.normalized());
    }

    /// Switch game mode.
    pub fn set_game_mode(&self, mode: GameMode) {
        self.game_mode.set(Some(mode));
    }

    /// Attach an inventory, replacing any previous one.
    pub fn give_inventory(&self, inventory: Rc<MockContainer>) {
        *self.inventory.borrow_mut() = Some(inventory);
    }

    /// The attached inventory.
    pub fn inventory_handle(&self) -> Option<Rc<MockContainer>> {
        self.inventory.borrow().clone()
    }

    /// Every action bar message shown so far, oldest first.
    pub fn action_bar_history(&self) -> Vec<RawMessage> {
        self.action_bar.borrow().clone()
    }

    /// Latest action bar message.
    pub fn last_action_bar(&self) -> Option<RawMessage> {
        self.action_bar.borrow().last().cloned()
    }

    fn check(&self) -> Result<(), HostError> {
        if !self.valid.get() {
            return Err(HostError::InvalidEntity(self.id.clone()));
        }
        if self.failing.get() {
            return Err(HostError::Query(format!("injected failure on {}", self.id)));
        }
        Ok(())
    }
}

impl Entity for MockEntity {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn is_valid(&self) -> bool {
        self.valid.get()
    }

    fn is_jumping(&self) -> Result<bool, HostError> {
        self.check()?;
        Ok(self.jumping.get())
    }

    fn is_on_ground(&self) -> Result<bool, HostError> {
        self.check()?;
        Ok(self.on_ground.get())
    }

    fn is_sneaking(&self) -> Result<bool, HostError> {
        self.check()?;
        Ok(self.sneaking.get())
    }

    fn equipment(&self, slot: EquipmentSlot) -> Result<Option<ItemStack>, HostError> {
        self.check()?;
        Ok(self.equipment.borrow().get(&slot).cloned())
    }

    fn type_families(&self) -> Vec<String> {
        self.families.borrow().clone()
    }

    fn tags(&self) -> Vec<String> {
        self.tags.borrow().clone()
    }

    fn health(&self) -> Option<(f32, f32)> {
        self.health.get()
    }

    fn dynamic_property_ids(&self) -> Vec<String> {
        self.dynamic_properties.borrow().clone()
    }

    fn entity_in_view(&self) -> Option<EntityRef> {
        self.entity_in_view.borrow().clone()
    }

    fn block_in_view(&self, _max_distance: f32) -> Option<BlockHit> {
        self.block_in_view.borrow().clone()
    }

    fn set_action_bar(&self, message: &RawMessage) -> Result<(), HostError> {
        self.check()?;
        self.action_bar.borrow_mut().push(message.clone());
        Ok(())
    }

    fn location(&self) -> Result<Vector3, HostError> {
        self.check()?;
        Ok(self.location.get())
    }

    fn head_location(&self) -> Result<Vector3, HostError> {
        Ok(self.location()? + Vector3::new(0.0, self.eye_height.get(), 0.0))
    }

    fn view_direction(&self) -> Result<Vector3, HostError> {
        self.check()?;
        Ok(self.view_direction.get())
    }

    fn game_mode(&self) -> Option<GameMode> {
        self.game_mode.get()
    }

    fn set_equipment(
        &self,
        slot: EquipmentSlot,
        item: Option<ItemStack>,
    ) -> Result<(), HostError> {
        self.check()?;
        let mut equipment = self.equipment.borrow_mut();
        match item {
            Some(item) => equipment.insert(slot, item),
            None => equipment.remove(&slot),
        };
        Ok(())
    }

    fn inventory(&self) -> Option<Rc<dyn Container>> {
        self.inventory
            .borrow()
            .as_ref()
            .map(|inventory| Rc::clone(inventory) as Rc<dyn Container>)
    }
}

/// Fixed-size in-memory inventory.
#[derive(Debug)]
pub struct MockContainer {
    slots: RefCell<Vec<Option<ItemStack>>>,
}

impl MockContainer {
    /// Empty container with `size` slots.
    pub fn new(size: usize) -> Rc<Self> {
        Rc::new(Self {
            slots: RefCell::new(vec![None; size]),
        })
    }

    /// Put `item` in `slot`. Out-of-range slots are ignored.
    pub fn put(&self, slot: usize, item: ItemStack) {
        if let Some(target) = self.slots.borrow_mut().get_mut(slot) {
            *target = Some(item);
        }
    }

    /// Snapshot of every slot.
    pub fn slots(&self) -> Vec<Option<ItemStack>> {
        self.slots.borrow().clone()
    }
}

impl Container for MockContainer {
    fn size(&self) -> usize {
        self.slots.borrow().len()
    }

    fn item(&self, slot: usize) -> Result<Option<ItemStack>, HostError> {
        self.slots
            .borrow()
            .get(slot)
            .cloned()
            .ok_or_else(|| HostError::Query(format!("slot {slot} out of range")))
    }

    fn set_item(&self, slot: usize, item: Option<ItemStack>) -> Result<(), HostError> {
        let mut slots = self.slots.borrow_mut();
        let target = slots
            .get_mut(slot)
            .ok_or_else(|| HostError::Query(format!("slot {slot} out of range")))?;
        *target = item;
        Ok(())
    }
}

/// In-memory world. Enumeration fails with [`HostError::NotReady`] until the
/// world is marked loaded.
#[derive(Debug)]
pub struct MockWorld {
    ready: Cell<bool>,
    entities: RefCell<Vec<Rc<MockEntity>>>,
}

impl Default for MockWorld {
    fn default() -> Self {
        Self {
            ready: Cell::new(true),
            entities: RefCell::new(Vec::new()),
        }
    }
}

impl MockWorld {
    /// Loaded, empty world.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// World that refuses enumeration until [`MockWorld::set_ready`].
    pub fn loading() -> Rc<Self> {
        let world = Self::new();
        world.ready.set(false);
        world
    }

    /// Mark the world loaded (or not).
    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    /// Add `entity` to the population.
    pub fn spawn(&self, entity: &Rc<MockEntity>) {
        trace!(entity = %entity.id(), "mock entity spawned");
        self.entities.borrow_mut().push(Rc::clone(entity));
    }

    /// Remove `id` from the population and invalidate its handle.
    pub fn despawn(&self, id: &EntityId) -> Option<Rc<MockEntity>> {
        let mut entities = self.entities.borrow_mut();
        let index = entities.iter().position(|e| e.id() == id)?;
        let entity = entities.remove(index);
        entity.remove();
        Some(entity)
    }

    /// Look up a spawned entity.
    pub fn find(&self, id: &EntityId) -> Option<Rc<MockEntity>> {
        self.entities
            .borrow()
            .iter()
            .find(|e| e.id() == id)
            .cloned()
    }

    fn enumerate(&self, players_only: bool) -> Result<Vec<EntityRef>, HostError> {
        if !self.ready.get() {
            return Err(HostError::NotReady);
        }
        Ok(self
            .entities
            .borrow()
            .iter()
            .filter(|e| !players_only || e.is_player())
            .map(MockEntity::handle)
            .collect())
    }
}

impl World for MockWorld {
    fn entities(&self) -> Result<Vec<EntityRef>, HostError> {
        self.enumerate(false)
    }

    fn players(&self) -> Result<Vec<EntityRef>, HostError> {
        self.enumerate(true)
    }
}
