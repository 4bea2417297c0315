//! Broad-phase pairwise collision detection
//!
//! Every tick the engine tests each pair of collidable entities with the
//! corner-containment rectangle test and records the hits in a
//! [`CollisionMap`]. The map is rebuilt from scratch each tick, so nothing
//! stale survives into the next one.
//!
//! Cost is O(n²) in the number of collidable entities; there is no spatial
//! partitioning, which is fine while counts stay in the low hundreds.

use std::collections::BTreeMap;

use glam::Vec2;

use super::entity::EntityId;
use super::geometry::{Rect, rect_in_rect};

/// Capability of entities that take part in collision detection
pub trait Collidable {
    /// World position the collision rect is relative to
    fn position(&self) -> Vec2;
    /// Collision rect, relative to [`Collidable::position`]
    fn collision_rect(&self) -> Rect;
}

/// Symmetric collision lists for one tick
#[derive(Debug, Clone, Default)]
pub struct CollisionMap {
    hits: BTreeMap<EntityId, Vec<EntityId>>,
}

impl CollisionMap {
    /// Entities overlapping `id` this tick (empty if none)
    pub fn get(&self, id: EntityId) -> &[EntityId] {
        self.hits.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn collides(&self, a: EntityId, b: EntityId) -> bool {
        self.get(a).contains(&b)
    }

    /// Number of distinct colliding pairs
    pub fn pair_count(&self) -> usize {
        self.hits.values().map(Vec::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &[EntityId])> {
        self.hits.iter().map(|(id, list)| (*id, list.as_slice()))
    }

    fn record(&mut self, a: EntityId, b: EntityId) {
        self.hits.entry(a).or_default().push(b);
        self.hits.entry(b).or_default().push(a);
    }
}

/// Compute this tick's collision lists.
///
/// Each unordered pair is tested in both directions so that a rect nested
/// fully inside another is still caught, and recorded once per side.
pub fn detect_collisions<'a, I>(candidates: I) -> CollisionMap
where
    I: IntoIterator<Item = (EntityId, &'a dyn Collidable)>,
{
    let shapes: Vec<(EntityId, Vec2, Rect)> = candidates
        .into_iter()
        .map(|(id, c)| (id, c.position(), c.collision_rect()))
        .collect();

    let mut map = CollisionMap::default();
    for (i, (id_a, pos_a, rect_a)) in shapes.iter().enumerate() {
        for (id_b, pos_b, rect_b) in &shapes[i + 1..] {
            if rect_in_rect(*pos_a, rect_a, *pos_b, rect_b)
                || rect_in_rect(*pos_b, rect_b, *pos_a, rect_a)
            {
                map.record(*id_a, *id_b);
            }
        }
    }
    map
}
