//! Simulation core shared by every game
//!
//! - Geometry kernel: pure point/rect/segment math
//! - Collision detector: per-tick pairwise overlap lists
//! - Engine: live entity set, clock, update and removal loop
//! - Sweep: tunnelling-safe ball motion against rectangular obstacles
//!
//! Nothing here renders, plays audio or reads input devices; those
//! collaborators drive the engine from outside.

pub mod clock;
pub mod collision;
pub mod engine;
pub mod entity;
pub mod geometry;
pub mod sweep;

pub use clock::{Clock, FrameTimer, ManualClock, SystemClock};
pub use collision::{Collidable, CollisionMap, detect_collisions};
pub use engine::{Engine, Renderer};
pub use entity::{Entity, EntityId, Spawner, Tick};
pub use geometry::{
    Edge, Rect, distance, inflate_rectangle, line_intersect, move_rectangle, point_in_rect,
    rect_in_rect, rotate,
};
pub use sweep::{
    Bounce, BounceEffect, Mover, Obstacle, ObstacleKind, SweepConfig, SweepReport, bat_redirect,
};
