//! Replay scenario files.

use mcbe_core::{EquipmentSlot, ItemStack};
use mcbe_signals::{EventKind, UnknownEventKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_TICKS: u64 = 100;
const DEFAULT_ENTITY_TYPE: &str = "minecraft:player";

/// Errors loading or validating a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The file could not be read.
    #[error("failed to read scenario {path}")]
    Io {
        /// Scenario path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid scenario TOML.
    #[error("invalid scenario TOML")]
    Parse(#[from] toml::de::Error),
    /// Two entities share an id.
    #[error("entity `{0}` is declared twice")]
    DuplicateEntity(String),
    /// A step refers to an entity that was never declared.
    #[error("step at tick {tick} refers to unknown entity `{entity}`")]
    UnknownEntity {
        /// Step tick.
        tick: u64,
        /// Referenced id.
        entity: String,
    },
    /// A step is scheduled for tick 0, before the first scan.
    #[error("step for `{0}` is at tick 0; steps start at tick 1")]
    StepAtTickZero(String),
    /// A signal name is not recognised.
    #[error(transparent)]
    UnknownSignal(#[from] UnknownEventKind),
}

/// An entity present when the scenario starts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EntitySpec {
    /// Host id.
    pub id: String,
    /// Type id; players use `minecraft:player`.
    #[serde(rename = "type")]
    pub type_id: String,
    /// Initial ground contact.
    pub on_ground: bool,
    /// Initial jump flag.
    pub jumping: bool,
    /// Initial sneak flag.
    pub sneaking: bool,
    /// Initial equipment.
    pub equipment: Vec<SlotItem>,
}

impl Default for EntitySpec {
    fn default() -> Self {
        Self {
            id: String::new(),
            type_id: DEFAULT_ENTITY_TYPE.to_string(),
            on_ground: true,
            jumping: false,
            sneaking: false,
            equipment: Vec::new(),
        }
    }
}

/// An item placed in a slot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlotItem {
    /// Target slot.
    pub slot: EquipmentSlot,
    /// Item stack.
    pub item: ItemStack,
}

/// State changes applied to one entity just before a tick is scanned.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Step {
    /// Tick whose scan first observes the change.
    pub tick: u64,
    /// Entity id.
    pub entity: String,
    /// New jump flag.
    pub jumping: Option<bool>,
    /// New ground contact.
    pub on_ground: Option<bool>,
    /// New sneak flag.
    pub sneaking: Option<bool>,
    /// Items to put in slots.
    pub equip: Vec<SlotItem>,
    /// Slots to empty.
    pub unequip: Vec<EquipmentSlot>,
    /// Remove the entity from the world.
    pub despawn: bool,
}

/// A scripted run of the host.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Scenario {
    /// Ticks to simulate.
    pub ticks: u64,
    /// Signals to subscribe; empty means every signal.
    pub signals: Vec<String>,
    /// Poll rosters maintained from world notifications instead of the
    /// world directly.
    pub use_roster: bool,
    /// Optional JSONL output path.
    pub events_out: Option<PathBuf>,
    /// Entities present at tick 0.
    pub entities: Vec<EntitySpec>,
    /// Scripted changes.
    pub steps: Vec<Step>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            ticks: DEFAULT_TICKS,
            signals: Vec::new(),
            use_roster: false,
            events_out: None,
            entities: Vec::new(),
            steps: Vec::new(),
        }
    }
}

impl Scenario {
    /// Read and validate a scenario file.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate scenario TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(contents)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        let mut ids = BTreeSet::new();
        for entity in &self.entities {
            if !ids.insert(entity.id.as_str()) {
                return Err(ScenarioError::DuplicateEntity(entity.id.clone()));
            }
        }
        for step in &self.steps {
            if step.tick == 0 {
                return Err(ScenarioError::StepAtTickZero(step.entity.clone()));
            }
            if !ids.contains(step.entity.as_str()) {
                return Err(ScenarioError::UnknownEntity {
                    tick: step.tick,
                    entity: step.entity.clone(),
                });
            }
        }
        self.signal_kinds()?;
        Ok(())
    }

    /// Selected signal kinds, in registry order.
    pub fn signal_kinds(&self) -> Result<Vec<EventKind>, ScenarioError> {
        parse_kinds(&self.signals)
    }
}

/// Parse signal names; an empty list selects every kind.
pub fn parse_kinds(names: &[String]) -> Result<Vec<EventKind>, ScenarioError> {
    if names.is_empty() {
        return Ok(EventKind::ALL.to_vec());
    }
    let mut kinds = names
        .iter()
        .map(|name| name.trim().parse::<EventKind>())
        .collect::<Result<Vec<_>, _>>()?;
    kinds.sort();
    kinds.dedup();
    Ok(kinds)
}
