//! Runs a scenario against the in-memory host.

use crate::config::{EntitySpec, Scenario, Step};
use anyhow::{Context, Result};
use mcbe_core::{EntityId, EquipmentSlot, SimTick, World, WorldEvent};
use mcbe_roster::RosterWorld;
use mcbe_scheduler::{Scheduler, SchedulerRef, TickScheduler};
use mcbe_signals::{EventKind, SignalEvent, Subscription, WorldSignals};
use mcbe_testkit::{EventRecord, JsonlSink, MockEntity, MockWorld};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Write;
use std::rc::Rc;
use tracing::{debug, info};

/// One delivered event, detached from host handles.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivered {
    /// Delivery tick.
    pub tick: SimTick,
    /// Event kind.
    pub kind: EventKind,
    /// Entity or player id.
    pub entity: EntityId,
    /// Equipment slot and item type, for equipment events.
    pub equipment: Option<(EquipmentSlot, String)>,
}

impl Delivered {
    fn from_event(tick: SimTick, event: &SignalEvent) -> Self {
        Self {
            tick,
            kind: event.kind(),
            entity: event.entity().id().clone(),
            equipment: event
                .equipment()
                .map(|payload| (payload.slot, payload.item.type_id.clone())),
        }
    }

    /// JSONL form.
    pub fn record(&self) -> EventRecord<'_> {
        EventRecord {
            tick: self.tick,
            kind: self.kind.as_str(),
            entity: &self.entity,
            slot: self.equipment.as_ref().map(|(slot, _)| *slot),
            item: self.equipment.as_ref().map(|(_, item)| item.as_str()),
        }
    }
}

/// Outcome of a replay.
#[derive(Debug, Default)]
pub struct Report {
    /// Every delivered event, in delivery order.
    pub events: Vec<Delivered>,
}

impl Report {
    /// Event count per kind.
    pub fn counts(&self) -> BTreeMap<EventKind, usize> {
        let mut counts = BTreeMap::new();
        for event in &self.events {
            *counts.entry(event.kind).or_insert(0) += 1;
        }
        counts
    }
}

struct Host {
    world: Rc<MockWorld>,
    rosters: Option<RosterWorld>,
}

impl Host {
    fn new(scenario: &Scenario) -> Self {
        let world = MockWorld::new();
        for spec in &scenario.entities {
            world.spawn(&build_entity(spec));
        }
        let rosters = scenario
            .use_roster
            .then(|| RosterWorld::new(world.clone()));
        Self { world, rosters }
    }

    fn polled(&self) -> Rc<dyn World> {
        match &self.rosters {
            Some(rosters) => Rc::new(rosters.clone()),
            None => self.world.clone(),
        }
    }

    fn notify(&self, event: WorldEvent) -> Result<()> {
        if let Some(rosters) = &self.rosters {
            rosters.handle_event(&event)?;
        }
        Ok(())
    }

    fn apply(&self, step: &Step) -> Result<()> {
        let id = EntityId::new(step.entity.as_str());
        let entity = self
            .world
            .find(&id)
            .with_context(|| format!("entity `{id}` is not in the world at tick {}", step.tick))?;
        if let Some(jumping) = step.jumping {
            entity.set_jumping(jumping);
        }
        if let Some(on_ground) = step.on_ground {
            entity.set_on_ground(on_ground);
        }
        if let Some(sneaking) = step.sneaking {
            entity.set_sneaking(sneaking);
        }
        for slot in &step.unequip {
            entity.unequip(*slot);
        }
        for placed in &step.equip {
            entity.equip(placed.slot, placed.item.clone());
        }
        if step.despawn {
            self.world.despawn(&id);
            self.notify(WorldEvent::EntityRemove { entity_id: id })?;
        }
        debug!(tick = step.tick, entity = %step.entity, "applied step");
        Ok(())
    }
}

fn build_entity(spec: &EntitySpec) -> Rc<MockEntity> {
    let entity = if spec.type_id == mcbe_testkit::PLAYER_TYPE {
        MockEntity::player(spec.id.as_str())
    } else {
        MockEntity::new(spec.id.as_str(), spec.type_id.as_str())
    };
    entity.set_on_ground(spec.on_ground);
    entity.set_jumping(spec.jumping);
    entity.set_sneaking(spec.sneaking);
    for placed in &spec.equipment {
        entity.equip(placed.slot, placed.item.clone());
    }
    entity
}

/// Simulate `scenario`, writing each event to `sink` if given.
pub fn run<W: Write>(
    scenario: &Scenario,
    kinds: &[EventKind],
    mut sink: Option<&mut JsonlSink<W>>,
) -> Result<Report> {
    let host = Host::new(scenario);
    host.notify(WorldEvent::WorldLoad)?;

    let ticker = Rc::new(TickScheduler::new());
    let scheduler: SchedulerRef = ticker.clone();
    let signals = WorldSignals::new(Rc::clone(&scheduler), host.polled());

    let inbox: Rc<RefCell<Vec<Delivered>>> = Rc::new(RefCell::new(Vec::new()));
    let mut subscriptions: Vec<Subscription> = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let inbox = Rc::clone(&inbox);
        let clock = Rc::clone(&ticker);
        let subscription = signals
            .subscribe(kind, move |event| {
                inbox
                    .borrow_mut()
                    .push(Delivered::from_event(clock.current_tick(), event));
            })
            .with_context(|| format!("subscribing to {kind}"))?;
        subscriptions.push(subscription);
    }

    let mut steps: Vec<&Step> = scenario.steps.iter().collect();
    steps.sort_by_key(|step| step.tick);
    let mut pending = steps.into_iter().peekable();

    let mut report = Report::default();
    for tick in 1..=scenario.ticks {
        while let Some(step) = pending.next_if(|step| step.tick <= tick) {
            host.apply(step)?;
        }
        ticker.step();

        for delivered in inbox.borrow_mut().drain(..) {
            info!(
                tick = delivered.tick.0,
                kind = %delivered.kind,
                entity = %delivered.entity,
                "signal"
            );
            if let Some(sink) = sink.as_deref_mut() {
                sink.write(&delivered.record())?;
            }
            report.events.push(delivered);
        }
    }

    for subscription in &subscriptions {
        subscription.unsubscribe();
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(toml: &str) -> Scenario {
        Scenario::from_toml_str(toml).unwrap()
    }

    const JUMP: &str = r#"
        ticks = 8
        [[entities]]
        id = "steve"

        [[steps]]
        tick = 2
        entity = "steve"
        jumping = true
        on_ground = false

        [[steps]]
        tick = 4
        entity = "steve"
        jumping = false

        [[steps]]
        tick = 6
        entity = "steve"
        on_ground = true
    "#;

    #[test]
    fn jump_scenario_fires_each_edge_once() {
        let scenario = scenario(JUMP);
        let kinds = [
            EventKind::EntityStartJumping,
            EventKind::EntityStopJumping,
            EventKind::PlayerLand,
        ];
        let report = run::<Vec<u8>>(&scenario, &kinds, None).unwrap();
        let seen: Vec<(u64, EventKind)> = report
            .events
            .iter()
            .map(|event| (event.tick.0, event.kind))
            .collect();
        assert_eq!(
            seen,
            vec![
                (2, EventKind::EntityStartJumping),
                (4, EventKind::EntityStopJumping),
                (6, EventKind::PlayerLand),
            ]
        );
    }

    #[test]
    fn roster_and_direct_polling_agree() {
        let direct = scenario(JUMP);
        let mut rostered = direct.clone();
        rostered.use_roster = true;
        let kinds = EventKind::ALL;
        let a = run::<Vec<u8>>(&direct, &kinds, None).unwrap();
        let b = run::<Vec<u8>>(&rostered, &kinds, None).unwrap();
        assert_eq!(a.events, b.events);
    }

    #[test]
    fn equipment_events_reach_the_sink() {
        let scenario = scenario(
            r#"
            ticks = 3
            [[entities]]
            id = "alex"
            equipment = [{ slot = "Mainhand", item = { type_id = "minecraft:diamond_sword" } }]

            [[steps]]
            tick = 2
            entity = "alex"
            equip = [{ slot = "Mainhand", item = { type_id = "minecraft:bow" } }]
            "#,
        );
        let mut sink = JsonlSink::from_writer(Vec::new());
        let report = run(&scenario, &[EventKind::PlayerEquip], Some(&mut sink)).unwrap();
        assert_eq!(report.counts().get(&EventKind::PlayerEquip), Some(&1));

        let text = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert_eq!(
            text.trim(),
            r#"{"tick":2,"kind":"player_equip","entity":"alex","slot":"Mainhand","item":"minecraft:bow"}"#
        );
    }

    #[test]
    fn despawn_mid_jump_is_silent() {
        let scenario = scenario(
            r#"
            ticks = 5
            use_roster = true
            [[entities]]
            id = "slime"
            type = "minecraft:slime"
            on_ground = false

            [[steps]]
            tick = 3
            entity = "slime"
            despawn = true
            "#,
        );
        let report = run::<Vec<u8>>(&scenario, &EventKind::ALL, None).unwrap();
        assert!(report.events.is_empty());
    }
}
