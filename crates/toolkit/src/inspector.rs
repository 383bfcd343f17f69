//! Action-bar inspector for players holding a debug stick.

use anyhow::Result;
use mcbe_core::{BlockHit, Entity, EquipmentSlot, HostError, RawMessage, SimTick, World};
use mcbe_scheduler::TickHandler;
use serde_json::json;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Item that enables inspection when held in the main hand.
pub const DEBUG_STICK: &str = "minecraft:debug_stick";

/// Block raycast reach, in blocks.
const BLOCK_REACH: f32 = 7.0;

/// Every tick, shows what each debug-stick holder is looking at.
///
/// Entities in view take precedence over blocks. Drive it with a
/// [`Manager`](mcbe_scheduler::Manager).
pub struct DebugStickInspector {
    world: Rc<dyn World>,
}

impl DebugStickInspector {
    /// Inspector over `world`'s players.
    pub fn new(world: Rc<dyn World>) -> Self {
        Self { world }
    }

    /// Action-bar message for `player`'s current view.
    pub fn describe(player: &dyn Entity) -> Result<RawMessage> {
        if let Some(entity) = player.entity_in_view() {
            return describe_entity(&*entity);
        }
        match player.block_in_view(BLOCK_REACH) {
            Some(hit) => describe_block(&hit),
            None => Ok(RawMessage::plain("No selected Block/Entity")),
        }
    }
}

fn describe_block(hit: &BlockHit) -> Result<RawMessage> {
    let states = serde_json::to_string_pretty(&hit.states)?;
    let mut message = RawMessage::default();
    message.push(format!("§bBlock§r: §f{}\n§r", hit.type_id));
    message.push(format!("§bFace§r: §f{}\n§r", hit.face));
    message.push(format!("§bData§r: §f{states}§r"));
    Ok(message)
}

fn describe_entity(entity: &dyn Entity) -> Result<RawMessage> {
    let health = match entity.health() {
        Some((current, max)) => format!("{current}/{max}"),
        None => "-/-".to_string(),
    };
    let data = serde_json::to_string_pretty(&json!({
        "dynamicProperties": entity.dynamic_property_ids(),
    }))?;
    let mut message = RawMessage::default();
    message.push(format!("§bEntity§r: §f{}\n§r", entity.type_id()));
    message.push(format!("§bHealth§r: §f{health}\n§r"));
    message.push(format!(
        "§bFamilies§r: §f[{}]\n§r",
        entity.type_families().join(",")
    ));
    message.push(format!("§bData§r: §f{data}§r"));
    Ok(message)
}

impl TickHandler for DebugStickInspector {
    fn on_tick(&mut self, tick: SimTick) -> Result<()> {
        let players = match self.world.players() {
            Ok(players) => players,
            Err(HostError::NotReady) => {
                debug!(tick = tick.0, "players unavailable: world not loaded");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        for player in players {
            let holding = match player.equipment(EquipmentSlot::Mainhand) {
                Ok(Some(item)) => item.type_id == DEBUG_STICK,
                Ok(None) => false,
                Err(err) => {
                    trace!(player = %player.id(), "skipping player: {err}");
                    false
                }
            };
            if !holding {
                continue;
            }
            let message = match Self::describe(&*player) {
                Ok(message) => message,
                Err(err) => {
                    warn!(player = %player.id(), tick = tick.0, "inspection failed: {err:#}");
                    continue;
                }
            };
            if let Err(err) = player.set_action_bar(&message) {
                debug!(player = %player.id(), tick = tick.0, "action bar update failed: {err}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcbe_core::ItemStack;
    use mcbe_scheduler::{Manager, SchedulerRef, TickScheduler};
    use mcbe_testkit::{MockEntity, MockWorld};
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    fn holder(world: &MockWorld, id: &str) -> Rc<MockEntity> {
        let player = MockEntity::player(id);
        player.equip(EquipmentSlot::Mainhand, ItemStack::new(DEBUG_STICK, 1));
        world.spawn(&player);
        player
    }

    #[test]
    fn block_report_has_type_face_and_states() {
        let world = MockWorld::new();
        let player = holder(&world, "steve");
        let mut states = BTreeMap::new();
        states.insert("facing_direction".to_string(), json!(3));
        player.look_at_block(Some(BlockHit {
            type_id: "minecraft:furnace".into(),
            face: "North".into(),
            states,
        }));

        let mut inspector = DebugStickInspector::new(world.clone());
        inspector.on_tick(SimTick(1)).unwrap();

        let shown = player.last_action_bar().unwrap();
        assert_eq!(shown.rawtext.len(), 3);
        assert_eq!(shown.rawtext[0].text, "§bBlock§r: §fminecraft:furnace\n§r");
        assert_eq!(shown.rawtext[1].text, "§bFace§r: §fNorth\n§r");
        assert_eq!(
            shown.rawtext[2].text,
            "§bData§r: §f{\n  \"facing_direction\": 3\n}§r"
        );
    }

    #[test]
    fn entity_in_view_wins_over_block() {
        let world = MockWorld::new();
        let player = holder(&world, "steve");
        let zombie = MockEntity::new("z", "minecraft:zombie");
        zombie.set_health(12.0, 20.0);
        zombie.set_families(["zombie", "undead", "mob"]);
        zombie.add_dynamic_property("spawn_wave");
        player.look_at_entity(Some(zombie.handle()));
        player.look_at_block(Some(BlockHit {
            type_id: "minecraft:stone".into(),
            face: "Up".into(),
            states: BTreeMap::new(),
        }));

        let mut inspector = DebugStickInspector::new(world.clone());
        inspector.on_tick(SimTick(1)).unwrap();

        let text = player.last_action_bar().unwrap().to_plain_string();
        assert!(text.starts_with("§bEntity§r: §fminecraft:zombie\n§r"));
        assert!(text.contains("§bHealth§r: §f12/20\n§r"));
        assert!(text.contains("§bFamilies§r: §f[zombie,undead,mob]\n§r"));
        assert!(text.contains("\"spawn_wave\""));
    }

    #[test]
    fn loading_world_is_skipped_quietly() {
        let world = MockWorld::loading();
        let player = holder(&world, "steve");
        let mut inspector = DebugStickInspector::new(world.clone());

        inspector.on_tick(SimTick(1)).unwrap();
        assert!(player.action_bar_history().is_empty());

        world.set_ready(true);
        inspector.on_tick(SimTick(2)).unwrap();
        assert_eq!(player.action_bar_history().len(), 1);
    }

    #[test]
    fn broken_player_does_not_block_the_rest() {
        let world = MockWorld::new();
        let broken = holder(&world, "alex");
        broken.fail_queries(true);
        let steve = holder(&world, "steve");

        let mut inspector = DebugStickInspector::new(world.clone());
        inspector.on_tick(SimTick(1)).unwrap();

        assert!(broken.action_bar_history().is_empty());
        assert_eq!(
            steve.last_action_bar().unwrap().to_plain_string(),
            "No selected Block/Entity"
        );
    }

    #[test]
    fn nothing_in_view_and_non_holders() {
        let world = MockWorld::new();
        let holder = holder(&world, "steve");
        let bystander = MockEntity::player("alex");
        world.spawn(&bystander);

        let ticker = Rc::new(TickScheduler::new());
        let shared: SchedulerRef = ticker.clone();
        let inspector = Rc::new(RefCell::new(DebugStickInspector::new(world.clone())));
        let manager = Manager::start(&shared, "debug_stick", inspector);
        ticker.run_ticks(3);
        manager.dispose();

        assert_eq!(holder.action_bar_history().len(), 3);
        assert_eq!(
            holder.last_action_bar().unwrap().to_plain_string(),
            "No selected Block/Entity"
        );
        assert!(bystander.action_bar_history().is_empty());
    }
}
