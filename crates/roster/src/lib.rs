#![warn(missing_docs)]
//! Player and entity rosters kept current from world notifications.
//!
//! Enumerating the whole world every tick is what the host charges most for,
//! and it is not permitted at all before the world has loaded. A roster does
//! one full enumeration on [`WorldEvent::WorldLoad`] and then follows spawn,
//! load, leave and remove notifications. [`RosterWorld`] puts the rosters
//! behind the [`World`] trait so signals can poll them instead of the host.

mod query;

use mcbe_core::{EntityId, EntityRef, HostError, World, WorldEvent};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, trace};

pub use query::EntityQuery;

/// Errors from roster access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RosterError {
    /// Read before the initial load completed.
    #[error("{0} roster read before the world finished loading")]
    NotReady(&'static str),
    /// The initial enumeration failed.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl From<RosterError> for HostError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::NotReady(_) => HostError::NotReady,
            RosterError::Host(err) => err,
        }
    }
}

#[derive(Default)]
struct Members {
    loaded: bool,
    list: Vec<EntityRef>,
}

impl Members {
    fn load(&mut self, list: Vec<EntityRef>) {
        self.list = list;
        self.loaded = true;
    }

    fn add(&mut self, entity: &EntityRef) -> bool {
        if self.list.iter().any(|e| e.id() == entity.id()) {
            return false;
        }
        self.list.push(Rc::clone(entity));
        true
    }

    fn remove(&mut self, id: &EntityId) -> bool {
        let before = self.list.len();
        self.list.retain(|e| e.id() != id);
        before != self.list.len()
    }

    fn snapshot(&self, label: &'static str) -> Result<Vec<EntityRef>, RosterError> {
        if !self.loaded {
            return Err(RosterError::NotReady(label));
        }
        Ok(self
            .list
            .iter()
            .filter(|e| e.is_valid())
            .cloned()
            .collect())
    }
}

/// Connected players.
pub struct PlayerRoster {
    world: Rc<dyn World>,
    members: RefCell<Members>,
}

impl PlayerRoster {
    const LABEL: &'static str = "player";

    /// Empty roster; nothing is enumerated until the world loads.
    pub fn new(world: Rc<dyn World>) -> Self {
        Self {
            world,
            members: RefCell::new(Members::default()),
        }
    }

    /// Apply one world notification. Only the initial load can fail.
    pub fn handle_event(&self, event: &WorldEvent) -> Result<(), RosterError> {
        let mut members = self.members.borrow_mut();
        match event {
            WorldEvent::WorldLoad => {
                if members.loaded {
                    return Ok(());
                }
                members.load(self.world.players()?);
                debug!(players = members.list.len(), "player roster loaded");
            }
            _ if !members.loaded => {}
            WorldEvent::PlayerSpawn {
                player,
                initial_spawn: true,
            } => {
                if members.add(player) {
                    trace!(player = %player.id(), "player joined");
                }
            }
            WorldEvent::PlayerLeave { player_id } => {
                if members.remove(player_id) {
                    trace!(player = %player_id, "player left");
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Current players, or [`RosterError::NotReady`] before the initial load.
    pub fn players(&self) -> Result<Vec<EntityRef>, RosterError> {
        self.members.borrow().snapshot(Self::LABEL)
    }

    /// Whether the initial load has completed.
    pub fn is_loaded(&self) -> bool {
        self.members.borrow().loaded
    }
}

/// Loaded entities admitted by an [`EntityQuery`].
pub struct EntityRoster {
    world: Rc<dyn World>,
    query: EntityQuery,
    members: RefCell<Members>,
}

impl EntityRoster {
    const LABEL: &'static str = "entity";

    /// Empty roster admitting entities that match `query`.
    pub fn new(world: Rc<dyn World>, query: EntityQuery) -> Self {
        Self {
            world,
            query,
            members: RefCell::new(Members::default()),
        }
    }

    /// Admission filter.
    pub fn query(&self) -> &EntityQuery {
        &self.query
    }

    /// Apply one world notification. Only the initial load can fail.
    pub fn handle_event(&self, event: &WorldEvent) -> Result<(), RosterError> {
        let mut members = self.members.borrow_mut();
        match event {
            WorldEvent::WorldLoad => {
                if members.loaded {
                    return Ok(());
                }
                let admitted = self
                    .world
                    .entities()?
                    .into_iter()
                    .filter(|e| self.query.matches(&**e))
                    .collect();
                members.load(admitted);
                debug!(entities = members.list.len(), "entity roster loaded");
            }
            _ if !members.loaded => {}
            WorldEvent::EntitySpawn { entity } | WorldEvent::EntityLoad { entity } => {
                if self.query.matches(&**entity) && members.add(entity) {
                    trace!(entity = %entity.id(), "entity admitted");
                }
            }
            WorldEvent::PlayerSpawn {
                player,
                initial_spawn: true,
            } => {
                if self.query.matches(&**player) {
                    members.add(player);
                }
            }
            WorldEvent::EntityRemove { entity_id: id } | WorldEvent::PlayerLeave { player_id: id } => {
                if members.remove(id) {
                    trace!(entity = %id, "entity dropped");
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Current entities, or [`RosterError::NotReady`] before the initial load.
    pub fn entities(&self) -> Result<Vec<EntityRef>, RosterError> {
        self.members.borrow().snapshot(Self::LABEL)
    }

    /// Whether the initial load has completed.
    pub fn is_loaded(&self) -> bool {
        self.members.borrow().loaded
    }
}

/// [`World`] served from rosters instead of host enumeration.
#[derive(Clone)]
pub struct RosterWorld {
    players: Rc<PlayerRoster>,
    entities: Rc<EntityRoster>,
}

impl RosterWorld {
    /// Rosters over `world`; the entity roster admits everything.
    pub fn new(world: Rc<dyn World>) -> Self {
        Self::with_query(world, EntityQuery::any())
    }

    /// Rosters over `world` with a custom entity filter.
    pub fn with_query(world: Rc<dyn World>, query: EntityQuery) -> Self {
        Self {
            players: Rc::new(PlayerRoster::new(Rc::clone(&world))),
            entities: Rc::new(EntityRoster::new(world, query)),
        }
    }

    /// Forward a notification to both rosters.
    pub fn handle_event(&self, event: &WorldEvent) -> Result<(), RosterError> {
        self.players.handle_event(event)?;
        self.entities.handle_event(event)
    }

    /// The player roster.
    pub fn player_roster(&self) -> &Rc<PlayerRoster> {
        &self.players
    }

    /// The entity roster.
    pub fn entity_roster(&self) -> &Rc<EntityRoster> {
        &self.entities
    }
}

impl World for RosterWorld {
    fn entities(&self) -> Result<Vec<EntityRef>, HostError> {
        Ok(self.entities.entities()?)
    }

    fn players(&self) -> Result<Vec<EntityRef>, HostError> {
        Ok(self.players.players()?)
    }
}
