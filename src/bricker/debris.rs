//! Short-lived burst left behind by a destroyed brick

use glam::Vec2;

use crate::consts::DEBRIS_LIFETIME;
use crate::sim::{Rect, rotate};

/// Fragment edge length
const FRAGMENT_SIZE: f32 = 5.0;
/// Outward drift per update
const FRAGMENT_SPREAD: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Debris {
    pub pos: Vec2,
    pub color: String,
    age: u32,
    finished: bool,
}

impl Debris {
    pub fn new(pos: Vec2, color: impl Into<String>) -> Self {
        Self {
            pos,
            color: color.into(),
            age: 0,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn update(&mut self) {
        self.age += 1;
        if self.age > DEBRIS_LIFETIME {
            self.finished = true;
        }
    }

    /// World rects of the centre piece and the four fragments flying out
    /// at right angles
    pub fn fragments(&self) -> [Rect; 5] {
        let half = FRAGMENT_SIZE / 2.0;
        let reach = Vec2::new(-FRAGMENT_SPREAD * self.age as f32, 0.0);
        let piece = |offset: Vec2| {
            Rect::new(
                self.pos.x + offset.x - half,
                self.pos.y + offset.y - half,
                FRAGMENT_SIZE,
                FRAGMENT_SIZE,
            )
        };
        [
            piece(Vec2::ZERO),
            piece(rotate(reach, Vec2::ZERO, 0.0)),
            piece(rotate(reach, Vec2::ZERO, 90.0)),
            piece(rotate(reach, Vec2::ZERO, 180.0)),
            piece(rotate(reach, Vec2::ZERO, 270.0)),
        ]
    }
}
