//! Entity contracts shared by every game
//!
//! A game provides one closed enum of its entity variants and implements
//! [`Entity`] for it. The [`Engine`](super::Engine) owns the live set and
//! hands each entity a [`Tick`] view while it updates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::collision::Collidable;

/// Stable handle to a live entity, assigned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub(crate) u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behaviour every live entity provides to the engine
pub trait Entity: Sized {
    /// Collaborators injected into every update (input, settings, storage...)
    type Context;

    /// Advance this entity to `tick.time()`
    fn update(&mut self, tick: &mut Tick<'_, Self>);

    /// Finished entities are removed at the end of the tick that set the flag
    fn is_finished(&self) -> bool;

    /// Entities without a collision shape are skipped by the detector
    fn collidable(&self) -> Option<&dyn Collidable> {
        None
    }

    /// Called exactly once, after the entity's last update
    fn on_remove(&mut self, _spawner: &mut Spawner<'_, Self>) {}
}

/// A live entity together with its handle
#[derive(Debug, Clone)]
pub(crate) struct Slot<E> {
    pub(crate) id: EntityId,
    pub(crate) entity: E,
}

/// Queues new entities; they join the live set after the current tick
pub struct Spawner<'a, E> {
    next_id: &'a mut u32,
    pending: &'a mut Vec<Slot<E>>,
}

impl<'a, E> Spawner<'a, E> {
    pub(crate) fn new(next_id: &'a mut u32, pending: &'a mut Vec<Slot<E>>) -> Self {
        Self { next_id, pending }
    }

    pub fn spawn(&mut self, entity: E) -> EntityId {
        let id = EntityId(*self.next_id);
        *self.next_id += 1;
        self.pending.push(Slot { id, entity });
        id
    }
}

/// What an entity can see and touch during its update.
///
/// The updating entity itself is borrowed separately, so `others*` never
/// yields it.
pub struct Tick<'a, E: Entity> {
    time: f64,
    id: EntityId,
    collisions: &'a [EntityId],
    before: &'a mut [Slot<E>],
    after: &'a mut [Slot<E>],
    spawner: Spawner<'a, E>,
    context: &'a E::Context,
}

impl<'a, E: Entity> Tick<'a, E> {
    pub(crate) fn new(
        time: f64,
        id: EntityId,
        collisions: &'a [EntityId],
        before: &'a mut [Slot<E>],
        after: &'a mut [Slot<E>],
        spawner: Spawner<'a, E>,
        context: &'a E::Context,
    ) -> Self {
        Self {
            time,
            id,
            collisions,
            before,
            after,
            spawner,
            context,
        }
    }

    /// Simulation time in milliseconds
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Handle of the updating entity
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn context(&self) -> &'a E::Context {
        self.context
    }

    /// Entities this one overlapped in this tick's collision pass
    pub fn collisions(&self) -> &'a [EntityId] {
        self.collisions
    }

    /// Every other live entity, in live-set order
    pub fn others(&self) -> impl Iterator<Item = (EntityId, &E)> {
        self.before
            .iter()
            .chain(self.after.iter())
            .map(|slot| (slot.id, &slot.entity))
    }

    pub fn others_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut E)> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .map(|slot| (slot.id, &mut slot.entity))
    }

    pub fn get(&self, id: EntityId) -> Option<&E> {
        self.others().find(|(other, _)| *other == id).map(|(_, e)| e)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut E> {
        self.others_mut()
            .find(|(other, _)| *other == id)
            .map(|(_, e)| e)
    }

    /// Queue a new entity; it first updates on the next tick
    pub fn spawn(&mut self, entity: E) -> EntityId {
        self.spawner.spawn(entity)
    }
}
