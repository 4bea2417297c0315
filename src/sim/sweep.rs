//! Continuous (swept) ball motion against rectangular obstacles
//!
//! The ball never moves in one unchecked jump. Its motion for the tick is a
//! segment from the current position to the naive end position; the segment
//! is tested against every edge of every obstacle rect inflated by the ball
//! radius (turning circle-vs-rect into point-vs-rect). The nearest crossing
//! is resolved by mirroring the end position back across that edge and
//! flipping the matching velocity component, then the remainder of the
//! motion is swept again from the contact point. A single tick can therefore
//! bounce several times (corners, narrow gaps) without tunnelling.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Edge, Rect, distance, inflate_rectangle, line_intersect, rotate};
use crate::consts::*;

/// Contacts closer than this to the sweep origin count as touching it
const ORIGIN_EPSILON: f32 = 1e-3;

/// How an obstacle reacts to being hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Ordinary brick
    #[default]
    #[serde(rename = "Brick", alias = "Normal")]
    Normal,
    /// Player paddle: top hits redirect the ball by hit offset
    Bat,
    /// Playfield wall
    Border,
    /// Touching it ends the ball
    Death,
}

/// Capability of anything the ball can bounce off
pub trait Obstacle {
    /// World rect, top-left anchored at the obstacle position
    fn bounds(&self) -> Rect;
    fn kind(&self) -> ObstacleKind;
    fn is_indestructible(&self) -> bool;
    /// Request removal at the end of the current tick
    fn mark_finished(&mut self);
}

/// Tuning for the sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Ball speed the bat redirects to (units per `time_scale` ms)
    pub base_speed: f32,
    /// Elapsed milliseconds are divided by this before scaling the velocity
    pub time_scale: f32,
    /// Bounces resolved per tick before the ball is parked at its last contact
    pub max_bounces: usize,
    /// Horizontal widening of the bat redirection
    pub bat_stretch: f32,
    /// Which edge wins when several are hit at exactly the same point
    pub edge_order: [Edge; 4],
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            base_speed: BALL_SPEED,
            time_scale: SPEED_TIME_SCALE,
            max_bounces: MAX_BOUNCES_PER_TICK,
            bat_stretch: BAT_DEFLECTION_STRETCH,
            edge_order: Edge::DEFAULT_ORDER,
        }
    }
}

/// What a single bounce did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BounceEffect {
    /// Plain reflection
    Reflected,
    /// Reflection (or bat redirect) that also destroyed the obstacle
    Destroyed,
    /// Hit a death surface; the mover is finished
    Ended,
    /// Bat top hit; velocity replaced by the angled redirect
    Redirected,
}

/// One resolved contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    /// Index into the obstacle slice passed to [`Mover::sweep`]
    pub obstacle: usize,
    pub edge: Edge,
    pub point: Vec2,
    pub effect: BounceEffect,
}

/// Everything that happened during one sweep
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub bounces: Vec<Bounce>,
    /// The bounce limit was hit and the mover was stopped short
    pub truncated: bool,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.bounces.is_empty()
    }

    /// Indices of obstacles destroyed during the sweep
    pub fn destroyed(&self) -> impl Iterator<Item = usize> + '_ {
        self.bounces
            .iter()
            .filter(|b| b.effect == BounceEffect::Destroyed)
            .map(|b| b.obstacle)
    }
}

/// Candidate contact found while scanning edges
#[derive(Debug, Clone, Copy)]
struct Contact {
    obstacle: usize,
    edge: Edge,
    point: Vec2,
    rect: Rect,
}

/// A round body moved by sweeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    /// Centre position
    pub pos: Vec2,
    /// Velocity in units per `time_scale` milliseconds
    pub speed: Vec2,
    pub radius: f32,
    pub finished: bool,
}

impl Mover {
    pub fn new(pos: Vec2, speed: Vec2, radius: f32) -> Self {
        Self {
            pos,
            speed,
            radius,
            finished: false,
        }
    }

    /// Obstacle bounds grown by this mover's radius
    pub fn inflated(&self, bounds: &Rect) -> Rect {
        inflate_rectangle(bounds, self.radius)
    }

    /// Move for `delta_ms`, bouncing off `obstacles` as needed.
    ///
    /// With no edge crossed the new position is exactly the straight-line
    /// displacement. Obstacles already marked finished this tick are still
    /// solid until the engine removes them.
    pub fn sweep<O>(
        &mut self,
        delta_ms: f32,
        obstacles: &mut [&mut O],
        config: &SweepConfig,
    ) -> SweepReport
    where
        O: Obstacle + ?Sized,
    {
        let mut report = SweepReport::default();
        let mut origin = self.pos;
        let mut end = self.pos + self.speed * (delta_ms / config.time_scale);
        let mut resolved = None;

        while let Some(contact) = self.nearest_contact(origin, end, obstacles, resolved, config) {
            if report.bounces.len() >= config.max_bounces {
                log::warn!(
                    "Bounce limit ({}) reached, parking mover at {:?}",
                    config.max_bounces,
                    origin
                );
                report.truncated = true;
                end = origin;
                break;
            }
            let obstacle = &mut *obstacles[contact.obstacle];
            let effect = self.resolve(&contact, &mut end, obstacle, config);
            log::debug!(
                "Bounce {:?} on obstacle {} at {:?}: {:?}",
                contact.edge,
                contact.obstacle,
                contact.point,
                effect
            );
            report.bounces.push(Bounce {
                obstacle: contact.obstacle,
                edge: contact.edge,
                point: contact.point,
                effect,
            });
            origin = contact.point;
            resolved = Some(contact.obstacle);
        }

        self.pos = end;
        report
    }

    /// Closest edge the motion `origin -> end` enters through; the first one
    /// found wins ties.
    ///
    /// Only edges crossed from outside count, so the edge just bounced off
    /// (now behind the motion) cannot trigger again. Other edges of the
    /// obstacle in `resolved` that meet the origin are its corner and are
    /// skipped too. A neighbouring obstacle's edge through the origin is a
    /// real contact.
    fn nearest_contact<O>(
        &self,
        origin: Vec2,
        end: Vec2,
        obstacles: &[&mut O],
        resolved: Option<usize>,
        config: &SweepConfig,
    ) -> Option<Contact>
    where
        O: Obstacle + ?Sized,
    {
        let motion = [origin, end];
        let mut nearest: Option<(f32, Contact)> = None;
        for (index, obstacle) in obstacles.iter().enumerate() {
            let rect = self.inflated(&obstacle.bounds());
            for edge in config.edge_order {
                if !enters(edge, end - origin) {
                    continue;
                }
                let point = match line_intersect(motion, rect.edge(edge)) {
                    Some(point) => point,
                    // Origin rounded onto the wrong side of an edge it sits on
                    None if touches(&rect, edge, origin) => origin,
                    None => continue,
                };
                let d = distance(origin, point);
                if d <= ORIGIN_EPSILON && resolved == Some(index) {
                    continue;
                }
                if nearest.as_ref().is_none_or(|(best, _)| d < *best) {
                    nearest = Some((
                        d,
                        Contact {
                            obstacle: index,
                            edge,
                            point,
                            rect,
                        },
                    ));
                }
            }
        }
        nearest.map(|(_, contact)| contact)
    }

    /// Mirror `end` back across the hit edge, flip velocity, apply the
    /// obstacle's side effects
    fn resolve<O>(
        &mut self,
        contact: &Contact,
        end: &mut Vec2,
        obstacle: &mut O,
        config: &SweepConfig,
    ) -> BounceEffect
    where
        O: Obstacle + ?Sized,
    {
        let r = contact.rect;
        let kind = obstacle.kind();
        let mut effect = BounceEffect::Reflected;

        if kind == ObstacleKind::Death {
            self.finished = true;
            effect = BounceEffect::Ended;
        } else if !obstacle.is_indestructible() && !self.finished {
            obstacle.mark_finished();
            effect = BounceEffect::Destroyed;
        }

        match contact.edge {
            Edge::Top => {
                end.y = 2.0 * r.top() - end.y;
                self.speed.y = -self.speed.y;
                if kind == ObstacleKind::Bat {
                    let offset = end.x - r.center().x;
                    self.speed = bat_redirect(offset, config);
                    // A breakable bat still reports the destruction
                    if effect == BounceEffect::Reflected {
                        effect = BounceEffect::Redirected;
                    }
                }
            }
            Edge::Bottom => {
                end.y = 2.0 * r.bottom() - end.y;
                self.speed.y = -self.speed.y;
            }
            Edge::Left => {
                end.x = 2.0 * r.left() - end.x;
                self.speed.x = -self.speed.x;
            }
            Edge::Right => {
                end.x = 2.0 * r.right() - end.x;
                self.speed.x = -self.speed.x;
            }
        }
        effect
    }
}

/// True when `motion` crosses `edge` from outside the rect to inside
#[inline]
fn enters(edge: Edge, motion: Vec2) -> bool {
    match edge {
        Edge::Top => motion.y > 0.0,
        Edge::Bottom => motion.y < 0.0,
        Edge::Left => motion.x > 0.0,
        Edge::Right => motion.x < 0.0,
    }
}

/// `point` lies on `edge` of `rect`, within [`ORIGIN_EPSILON`] of its line
fn touches(rect: &Rect, edge: Edge, point: Vec2) -> bool {
    let [a, b] = rect.edge(edge);
    if edge.is_horizontal() {
        (point.y - a.y).abs() <= ORIGIN_EPSILON && (a.x..=b.x).contains(&point.x)
    } else {
        (point.x - a.x).abs() <= ORIGIN_EPSILON && (a.y..=b.y).contains(&point.y)
    }
}

/// Velocity after a bat top hit `offset` units from the bat centre.
///
/// The offset is used directly as degrees to rotate the straight-up base
/// velocity, so hits farther from the centre leave at steeper angles.
pub fn bat_redirect(offset: f32, config: &SweepConfig) -> Vec2 {
    let dir = rotate(Vec2::new(0.0, -config.base_speed), Vec2::ZERO, offset);
    Vec2::new(dir.x * config.bat_stretch, dir.y)
}
