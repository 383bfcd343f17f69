//! End-to-end signal behavior on a stepped scheduler.

use mcbe_core::{Entity, EquipmentSlot, ItemStack, World};
use mcbe_scheduler::{Scheduler, SchedulerRef, TickScheduler};
use mcbe_signals::{EventKind, SignalError, SignalEvent, SignalState, Subscription, WorldSignals};
use mcbe_testkit::{MockEntity, MockWorld};
use std::cell::RefCell;
use std::rc::Rc;

struct Harness {
    ticker: Rc<TickScheduler>,
    world: Rc<MockWorld>,
    signals: WorldSignals,
    log: Rc<RefCell<Vec<(u64, EventKind, String)>>>,
}

impl Harness {
    fn new() -> Self {
        let ticker = Rc::new(TickScheduler::new());
        let world = MockWorld::new();
        let scheduler: SchedulerRef = ticker.clone();
        let shared: Rc<dyn World> = world.clone();
        Self {
            signals: WorldSignals::new(scheduler, shared),
            ticker,
            world,
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn recorder(&self) -> impl FnMut(&SignalEvent) + 'static {
        let log = self.log.clone();
        let ticker = self.ticker.clone();
        move |event: &SignalEvent| {
            log.borrow_mut().push((
                ticker.current_tick().0,
                event.kind(),
                event.entity().id().to_string(),
            ));
        }
    }

    fn step(&self) -> Vec<(u64, EventKind, String)> {
        self.ticker.step();
        self.log.borrow_mut().drain(..).collect()
    }
}

#[test]
fn jump_start_stop_and_land_fire_once_each() {
    let h = Harness::new();
    let steve = MockEntity::player("steve");
    h.world.spawn(&steve);

    let _start = h
        .signals
        .subscribe(EventKind::EntityStartJumping, h.recorder())
        .unwrap();
    let _stop = h
        .signals
        .subscribe(EventKind::EntityStopJumping, h.recorder())
        .unwrap();
    let _land = h
        .signals
        .subscribe(EventKind::PlayerLand, h.recorder())
        .unwrap();

    assert!(h.step().is_empty());

    steve.set_on_ground(false);
    steve.set_jumping(true);
    let fired = h.step();
    assert_eq!(fired, vec![(2, EventKind::EntityStartJumping, "steve".into())]);
    assert!(h.step().is_empty());

    steve.set_jumping(false);
    assert_eq!(
        h.step(),
        vec![(4, EventKind::EntityStopJumping, "steve".into())]
    );

    steve.set_on_ground(true);
    assert_eq!(h.step(), vec![(5, EventKind::PlayerLand, "steve".into())]);
    assert!(h.step().is_empty());
}

#[test]
fn sword_to_bow_is_one_mainhand_equip() {
    let h = Harness::new();
    let alex = MockEntity::player("alex");
    alex.equip(
        EquipmentSlot::Mainhand,
        ItemStack::new("minecraft:diamond_sword", 1).with_durability(1561),
    );
    h.world.spawn(&alex);

    let equips = Rc::new(RefCell::new(Vec::new()));
    let sink = equips.clone();
    let _sub = h
        .signals
        .player_equip()
        .subscribe(move |event| {
            if let Some(payload) = event.equipment() {
                sink.borrow_mut().push((payload.slot, payload.item.clone()));
            }
        })
        .unwrap();

    h.step();
    let bow = ItemStack::new("minecraft:bow", 1).with_durability(384);
    alex.equip(EquipmentSlot::Mainhand, bow.clone());
    h.step();
    h.step();

    assert_eq!(*equips.borrow(), vec![(EquipmentSlot::Mainhand, bow)]);
}

#[test]
fn two_slots_changing_together_report_in_slot_order() {
    let h = Harness::new();
    let alex = MockEntity::player("alex");
    h.world.spawn(&alex);

    let slots = Rc::new(RefCell::new(Vec::new()));
    let sink = slots.clone();
    let _sub = h
        .signals
        .player_equip()
        .subscribe(move |event| {
            if let Some(payload) = event.equipment() {
                sink.borrow_mut().push(payload.slot);
            }
        })
        .unwrap();

    h.step();
    alex.equip(EquipmentSlot::Feet, ItemStack::new("minecraft:iron_boots", 1));
    alex.equip(EquipmentSlot::Head, ItemStack::new("minecraft:iron_helmet", 1));
    h.step();

    assert_eq!(*slots.borrow(), vec![EquipmentSlot::Head, EquipmentSlot::Feet]);
}

#[test]
fn swap_reports_equip_and_unequip_separately() {
    let h = Harness::new();
    let alex = MockEntity::player("alex");
    alex.equip(EquipmentSlot::Mainhand, ItemStack::new("minecraft:stick", 1));
    h.world.spawn(&alex);

    let _equip = h
        .signals
        .subscribe(EventKind::PlayerEquip, h.recorder())
        .unwrap();
    let _unequip = h
        .signals
        .subscribe(EventKind::PlayerUnequip, h.recorder())
        .unwrap();

    h.step();
    alex.equip(EquipmentSlot::Mainhand, ItemStack::new("minecraft:torch", 1));
    let kinds: Vec<EventKind> = h.step().into_iter().map(|(_, kind, _)| kind).collect();
    assert_eq!(kinds, vec![EventKind::PlayerEquip, EventKind::PlayerUnequip]);
}

#[test]
fn unsubscribe_inside_callback_stops_the_rest_of_the_scan() {
    let h = Harness::new();
    for id in ["a", "b", "c"] {
        let zombie = MockEntity::new(id, "minecraft:zombie");
        zombie.set_sneaking(true);
        h.world.spawn(&zombie);
    }

    let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
    let count = Rc::new(RefCell::new(0));
    let (inner_slot, inner_count) = (slot.clone(), count.clone());
    let subscription = h
        .signals
        .entity_sneak()
        .subscribe(move |_| {
            *inner_count.borrow_mut() += 1;
            if let Some(subscription) = inner_slot.borrow().as_ref() {
                subscription.unsubscribe();
            }
        })
        .unwrap();
    *slot.borrow_mut() = Some(subscription.clone());

    h.step();
    h.step();
    assert_eq!(*count.borrow(), 1);
    assert!(!subscription.is_active());
    assert_eq!(h.ticker.pending(), 0);
}

#[test]
fn disposed_signal_rejects_new_subscribers() {
    let h = Harness::new();
    let signal = h.signals.entity_unsneak();
    assert_eq!(signal.state(), SignalState::Idle);

    let sub = signal.subscribe(|_| {}).unwrap();
    assert_eq!(signal.state(), SignalState::Polling);

    signal.unsubscribe();
    assert_eq!(signal.state(), SignalState::Disposed);
    assert!(!sub.is_active());
    assert_eq!(
        signal.subscribe(|_| {}).unwrap_err(),
        SignalError::Disposed("entity_unsneak")
    );
}

#[test]
fn removed_entity_is_pruned_without_event() {
    let h = Harness::new();
    let slime = MockEntity::new("slime", "minecraft:slime");
    h.world.spawn(&slime);

    let sub = h
        .signals
        .subscribe(EventKind::EntityOnGround, h.recorder())
        .unwrap();

    slime.set_on_ground(false);
    h.step();
    assert_eq!(sub.tracked(), 1);

    h.world.despawn(slime.id());
    assert!(h.step().is_empty());
    assert_eq!(sub.tracked(), 0);
}

#[test]
fn subscriptions_track_independently() {
    let h = Harness::new();
    let zombie = MockEntity::new("z", "minecraft:zombie");
    h.world.spawn(&zombie);
    let signal = h.signals.entity_sneak();

    let _early = signal.subscribe(h.recorder()).unwrap();
    zombie.set_sneaking(true);
    assert_eq!(h.step().len(), 1);

    let _late = signal.subscribe(h.recorder()).unwrap();
    assert_eq!(h.step().len(), 1);
    assert!(h.step().is_empty());
}

#[test]
fn world_not_ready_skips_the_tick() {
    let ticker = Rc::new(TickScheduler::new());
    let world = MockWorld::loading();
    let zombie = MockEntity::new("z", "minecraft:zombie");
    zombie.set_sneaking(true);
    world.spawn(&zombie);

    let scheduler: SchedulerRef = ticker.clone();
    let shared: Rc<dyn World> = world.clone();
    let signals = WorldSignals::new(scheduler, shared);
    let count = Rc::new(RefCell::new(0));
    let seen = count.clone();
    let sub = signals
        .entity_sneak()
        .subscribe(move |_| *seen.borrow_mut() += 1)
        .unwrap();

    ticker.run_ticks(3);
    assert_eq!(*count.borrow(), 0);
    assert!(sub.is_active());

    world.set_ready(true);
    ticker.step();
    assert_eq!(*count.borrow(), 1);
}
