//! The shared entity/update loop
//!
//! One call to [`Engine::tick`] per frame:
//! 1. rebuild the collision map over the current live set
//! 2. update every entity in list order
//! 3. remove finished entities (running their removal hooks), then append
//!    everything spawned during the tick
//!
//! Updates and hooks are not isolated from each other; a panic in either
//! halts the frame.

use super::clock::Clock;
use super::collision::{CollisionMap, detect_collisions};
use super::entity::{Entity, EntityId, Slot, Spawner, Tick};

/// Receives the engine after each completed tick
pub trait Renderer<E: Entity> {
    fn render(&mut self, engine: &Engine<E>);
}

/// Owner of the live entity set and the simulation clock
pub struct Engine<E: Entity> {
    entities: Vec<Slot<E>>,
    collisions: CollisionMap,
    /// Clock reading that maps to simulation time zero
    epoch: Option<f64>,
    /// Latest clock reading, cleared by reset
    last_now: Option<f64>,
    time: f64,
    ticks: u64,
    next_id: u32,
}

impl<E: Entity> Default for Engine<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Engine<E> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            collisions: CollisionMap::default(),
            epoch: None,
            last_now: None,
            time: 0.0,
            ticks: 0,
            next_id: 1,
        }
    }

    /// Add an entity to the live set; it updates from the next tick on
    pub fn add(&mut self, entity: E) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Slot { id, entity });
        id
    }

    /// Current simulation time in milliseconds
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Ticks run since construction (not cleared by reset)
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|slot| slot.id == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&E> {
        self.entities
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| &slot.entity)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut E> {
        self.entities
            .iter_mut()
            .find(|slot| slot.id == id)
            .map(|slot| &mut slot.entity)
    }

    /// Live entities in update order
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &E)> {
        self.entities.iter().map(|slot| (slot.id, &slot.entity))
    }

    /// Result of the most recent collision pass
    pub fn collisions(&self) -> &CollisionMap {
        &self.collisions
    }

    /// Read the clock, tick, then hand the settled state to the renderer
    pub fn frame<R>(&mut self, clock: &dyn Clock, context: &E::Context, renderer: &mut R)
    where
        R: Renderer<E> + ?Sized,
    {
        self.tick(clock.now_ms(), context);
        renderer.render(self);
    }

    /// Advance the simulation to clock reading `now` (milliseconds)
    pub fn tick(&mut self, now: f64, context: &E::Context) {
        let now = match self.last_now {
            Some(last) if now < last => {
                log::warn!("Clock went backwards ({} -> {}), holding", last, now);
                last
            }
            _ => now,
        };
        self.last_now = Some(now);
        let epoch = *self.epoch.get_or_insert(now);
        self.time = now - epoch;
        self.ticks += 1;

        self.collisions = detect_collisions(
            self.entities
                .iter()
                .filter_map(|slot| slot.entity.collidable().map(|c| (slot.id, c))),
        );

        let mut pending = Vec::new();
        for index in 0..self.entities.len() {
            let (before, rest) = self.entities.split_at_mut(index);
            let Some((current, after)) = rest.split_first_mut() else {
                break;
            };
            let mut tick = Tick::new(
                self.time,
                current.id,
                self.collisions.get(current.id),
                before,
                after,
                Spawner::new(&mut self.next_id, &mut pending),
                context,
            );
            current.entity.update(&mut tick);
        }

        self.remove_finished(&mut pending);
        if !pending.is_empty() {
            log::trace!("Tick {}: {} entities spawned", self.ticks, pending.len());
        }
        self.entities.append(&mut pending);
    }

    /// Drop finished entities, running each removal hook once
    fn remove_finished(&mut self, pending: &mut Vec<Slot<E>>) {
        if !self.entities.iter().any(|slot| slot.entity.is_finished()) {
            return;
        }
        let (mut finished, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entities)
            .into_iter()
            .partition(|slot| slot.entity.is_finished());
        self.entities = live;

        let mut spawner = Spawner::new(&mut self.next_id, pending);
        for slot in &mut finished {
            slot.entity.on_remove(&mut spawner);
        }
        log::trace!("Tick {}: removed {} entities", self.ticks, finished.len());
    }

    /// Keep only the entities matching `keep` and restart the clock: the
    /// next reading passed to [`Engine::tick`] becomes time zero. Removal
    /// hooks do not run for the dropped entities.
    pub fn reset<F>(&mut self, mut keep: F)
    where
        F: FnMut(&E) -> bool,
    {
        let before = self.entities.len();
        self.entities.retain(|slot| keep(&slot.entity));
        self.collisions = CollisionMap::default();
        self.epoch = None;
        self.last_now = None;
        self.time = 0.0;
        log::info!(
            "Engine reset: kept {} of {} entities",
            self.entities.len(),
            before
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use glam::Vec2;

    use super::*;
    use crate::sim::clock::ManualClock;
    use crate::sim::collision::Collidable;
    use crate::sim::geometry::Rect;

    /// Events recorded by probes, shared through the context
    #[derive(Default)]
    struct Log {
        events: RefCell<Vec<String>>,
    }

    impl Log {
        fn push(&self, event: String) {
            self.events.borrow_mut().push(event);
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.events.borrow_mut())
        }
    }

    struct Probe {
        name: &'static str,
        pos: Vec2,
        rect: Option<Rect>,
        finish_at: Option<f64>,
        finished: bool,
        spawn_child: bool,
        seen_collisions: Vec<EntityId>,
        last_time: Option<f64>,
    }

    impl Probe {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                pos: Vec2::ZERO,
                rect: None,
                finish_at: None,
                finished: false,
                spawn_child: false,
                seen_collisions: Vec::new(),
                last_time: None,
            }
        }

        fn boxed_at(name: &'static str, x: f32, y: f32) -> Self {
            Self {
                pos: Vec2::new(x, y),
                rect: Some(Rect::new(-5.0, -5.0, 10.0, 10.0)),
                ..Self::new(name)
            }
        }
    }

    impl Collidable for Probe {
        fn position(&self) -> Vec2 {
            self.pos
        }

        fn collision_rect(&self) -> Rect {
            self.rect.unwrap_or_default()
        }
    }

    impl Entity for Probe {
        type Context = Log;

        fn update(&mut self, tick: &mut Tick<'_, Self>) {
            tick.context().push(format!("update {} @{}", self.name, tick.time()));
            self.seen_collisions = tick.collisions().to_vec();
            self.last_time = Some(tick.time());
            if self.finish_at.is_some_and(|t| tick.time() >= t) {
                self.finished = true;
            }
            if self.spawn_child {
                self.spawn_child = false;
                tick.spawn(Probe::new("child"));
            }
        }

        fn is_finished(&self) -> bool {
            self.finished
        }

        fn collidable(&self) -> Option<&dyn Collidable> {
            self.rect.is_some().then_some(self as &dyn Collidable)
        }
    }

    struct Counter {
        frames: usize,
        last_len: usize,
    }

    impl Renderer<Probe> for Counter {
        fn render(&mut self, engine: &Engine<Probe>) {
            self.frames += 1;
            self.last_len = engine.len();
        }
    }

    #[test]
    fn test_overlapping_entities_see_each_other() {
        let log = Log::default();
        let mut engine = Engine::new();
        let a = engine.add(Probe::boxed_at("a", 0.0, 0.0));
        let b = engine.add(Probe::boxed_at("b", 6.0, 6.0));
        let c = engine.add(Probe::boxed_at("c", 100.0, 100.0));
        let plain = engine.add(Probe::new("plain"));

        engine.tick(0.0, &log);

        assert_eq!(engine.get(a).unwrap().seen_collisions, vec![b]);
        assert_eq!(engine.get(b).unwrap().seen_collisions, vec![a]);
        assert!(engine.get(c).unwrap().seen_collisions.is_empty());
        assert!(engine.get(plain).unwrap().seen_collisions.is_empty());
        assert_eq!(engine.collisions().pair_count(), 1);
    }

    #[test]
    fn test_finished_entity_updates_then_leaves() {
        let log = Log::default();
        let mut engine = Engine::new();
        let mut doomed = Probe::boxed_at("doomed", 0.0, 0.0);
        doomed.finish_at = Some(16.0);
        let doomed = engine.add(doomed);
        let other = engine.add(Probe::boxed_at("other", 4.0, 0.0));

        engine.tick(100.0, &log);
        assert!(engine.contains(doomed));
        log.take();

        engine.tick(116.0, &log);
        // Still updated in the tick that finished it
        assert_eq!(log.take(), vec!["update doomed @16", "update other @16"]);
        assert!(!engine.contains(doomed));
        assert_eq!(engine.len(), 1);

        engine.tick(132.0, &log);
        assert_eq!(log.take(), vec!["update other @32"]);
        assert!(engine.get(other).unwrap().seen_collisions.is_empty());
        assert!(engine.collisions().is_empty());
    }

    #[test]
    fn test_removal_hook_runs_once() {
        struct Mortal {
            ghost: bool,
            finished: bool,
            removals: u32,
        }

        impl Entity for Mortal {
            type Context = ();

            fn update(&mut self, _tick: &mut Tick<'_, Self>) {
                if !self.ghost {
                    self.finished = true;
                }
            }

            fn is_finished(&self) -> bool {
                self.finished
            }

            fn on_remove(&mut self, spawner: &mut Spawner<'_, Self>) {
                self.removals += 1;
                spawner.spawn(Mortal {
                    ghost: true,
                    finished: false,
                    removals: self.removals,
                });
            }
        }

        let mut engine = Engine::new();
        engine.add(Mortal {
            ghost: false,
            finished: false,
            removals: 0,
        });
        engine.tick(0.0, &());
        engine.tick(16.0, &());

        // Only the ghost spawned by the hook is left, carrying the hook count
        assert_eq!(engine.len(), 1);
        let (_, ghost) = engine.entities().next().unwrap();
        assert!(ghost.ghost);
        assert_eq!(ghost.removals, 1);
    }

    #[test]
    fn test_spawned_entity_joins_next_tick() {
        let log = Log::default();
        let mut engine = Engine::new();
        let mut parent = Probe::new("parent");
        parent.spawn_child = true;
        engine.add(parent);

        engine.tick(0.0, &log);
        assert_eq!(log.take(), vec!["update parent @0"]);
        assert_eq!(engine.len(), 2);

        engine.tick(10.0, &log);
        assert_eq!(log.take(), vec!["update parent @10", "update child @10"]);
    }

    #[test]
    fn test_tick_sees_other_entities() {
        struct Pusher;
        struct Ctx;

        enum Thing {
            Pusher(Pusher),
            Target(f32),
        }

        impl Entity for Thing {
            type Context = Ctx;

            fn update(&mut self, tick: &mut Tick<'_, Self>) {
                if matches!(self, Thing::Pusher(_)) {
                    assert_eq!(tick.others().count(), 2);
                    for (_, other) in tick.others_mut() {
                        if let Thing::Target(x) = other {
                            *x += 1.0;
                        }
                    }
                }
            }

            fn is_finished(&self) -> bool {
                false
            }
        }

        let mut engine = Engine::new();
        let t1 = engine.add(Thing::Target(0.0));
        engine.add(Thing::Pusher(Pusher));
        let t2 = engine.add(Thing::Target(5.0));
        engine.tick(0.0, &Ctx);

        assert!(matches!(engine.get(t1), Some(Thing::Target(x)) if *x == 1.0));
        assert!(matches!(engine.get(t2), Some(Thing::Target(x)) if *x == 6.0));
    }

    #[test]
    fn test_clock_is_relative_and_monotonic() {
        let log = Log::default();
        let mut engine = Engine::new();
        let probe = engine.add(Probe::new("p"));

        engine.tick(1000.0, &log);
        assert_eq!(engine.time(), 0.0);
        engine.tick(1050.0, &log);
        assert_eq!(engine.time(), 50.0);
        // A reading from the past holds the clock
        engine.tick(1020.0, &log);
        assert_eq!(engine.time(), 50.0);
        assert_eq!(engine.get(probe).unwrap().last_time, Some(50.0));
    }

    #[test]
    fn test_reset_keeps_subset_and_rezeroes_clock() {
        let log = Log::default();
        let mut engine = Engine::new();
        let keep = engine.add(Probe::new("menu"));
        let drop = engine.add(Probe::new("level"));
        engine.tick(500.0, &log);
        engine.tick(800.0, &log);
        assert_eq!(engine.time(), 300.0);

        engine.reset(|p| p.name == "menu");
        assert!(engine.contains(keep));
        assert!(!engine.contains(drop));
        assert_eq!(engine.time(), 0.0);

        engine.tick(900.0, &log);
        assert_eq!(engine.time(), 0.0);
        engine.tick(916.0, &log);
        assert_eq!(engine.time(), 16.0);
    }

    #[test]
    fn test_reset_accepts_restarted_clock_source() {
        let log = Log::default();
        let mut engine = Engine::new();
        engine.add(Probe::new("p"));
        engine.tick(5000.0, &log);
        engine.tick(5100.0, &log);

        engine.reset(|_| true);
        // New source starting over from a smaller reading
        engine.tick(100.0, &log);
        assert_eq!(engine.time(), 0.0);
        engine.tick(116.0, &log);
        assert_eq!(engine.time(), 16.0);
    }

    /// Panics during its first update or its removal
    struct Fragile {
        in_update: bool,
        finished: bool,
    }

    impl Entity for Fragile {
        type Context = ();

        fn update(&mut self, _tick: &mut Tick<'_, Self>) {
            if self.in_update {
                panic!("update failed");
            }
            self.finished = true;
        }

        fn is_finished(&self) -> bool {
            self.finished
        }

        fn on_remove(&mut self, _spawner: &mut Spawner<'_, Self>) {
            panic!("removal failed");
        }
    }

    #[test]
    #[should_panic(expected = "update failed")]
    fn test_update_panic_halts_the_tick() {
        let mut engine = Engine::new();
        engine.add(Fragile {
            in_update: true,
            finished: false,
        });
        engine.tick(0.0, &());
    }

    #[test]
    #[should_panic(expected = "removal failed")]
    fn test_removal_hook_panic_halts_the_tick() {
        let mut engine = Engine::new();
        engine.add(Fragile {
            in_update: false,
            finished: false,
        });
        engine.tick(0.0, &());
    }

    #[test]
    fn test_frame_renders_after_tick() {
        let log = Log::default();
        let mut engine = Engine::new();
        let mut parent = Probe::new("parent");
        parent.spawn_child = true;
        engine.add(parent);

        let mut clock = ManualClock::new(0.0);
        let mut renderer = Counter {
            frames: 0,
            last_len: 0,
        };
        engine.frame(&clock, &log, &mut renderer);
        clock.advance(16.0);
        engine.frame(&clock, &log, &mut renderer);

        assert_eq!(renderer.frames, 2);
        assert_eq!(renderer.last_len, 2);
        assert_eq!(engine.time(), 16.0);
    }
}
