//! Bricks, walls, the death floor and the bat
//!
//! All of them are the same rectangular obstacle; only the kind and the
//! indestructible flag change how the ball treats them.

use glam::Vec2;

use super::debris::Debris;
use super::level::{BrickRecord, PointRecord};
use crate::settings::Settings;
use crate::sim::{Collidable, Obstacle, ObstacleKind, Rect};

#[derive(Debug, Clone, PartialEq)]
pub struct Brick {
    pub kind: ObstacleKind,
    pub color: String,
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub indestructible: bool,
    pub finished: bool,
}

impl Brick {
    pub fn from_record(record: &BrickRecord) -> Self {
        Self {
            kind: record.kind,
            color: record.color.clone(),
            pos: Vec2::new(record.position.x, record.position.y),
            width: record.width,
            height: record.height,
            indestructible: record.indestructible,
            finished: false,
        }
    }

    pub fn to_record(&self) -> BrickRecord {
        BrickRecord {
            kind: self.kind,
            color: self.color.clone(),
            width: self.width,
            height: self.height,
            indestructible: self.indestructible,
            position: PointRecord {
                x: self.pos.x,
                y: self.pos.y,
            },
        }
    }

    /// The player's bat, centred near the bottom of the world
    pub fn bat(settings: &Settings) -> Self {
        Self {
            kind: ObstacleKind::Bat,
            color: "#FFF".to_string(),
            pos: Vec2::new(
                (settings.world_width - settings.bat_width) / 2.0,
                settings.world_height - settings.bat_bottom_offset,
            ),
            width: settings.bat_width,
            height: settings.bat_height,
            indestructible: true,
            finished: false,
        }
    }

    /// World rect
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    /// Destructible ordinary brick, one of those that must go to clear a level
    pub fn is_target(&self) -> bool {
        self.kind == ObstacleKind::Normal && !self.indestructible
    }

    /// Burst left behind when an ordinary brick goes away
    pub fn debris(&self) -> Option<Debris> {
        (self.kind == ObstacleKind::Normal).then(|| Debris::new(self.rect().center(), self.color.clone()))
    }
}

impl Obstacle for Brick {
    fn bounds(&self) -> Rect {
        self.rect()
    }

    fn kind(&self) -> ObstacleKind {
        self.kind
    }

    fn is_indestructible(&self) -> bool {
        self.indestructible
    }

    fn mark_finished(&mut self) {
        self.finished = true;
    }
}

impl Collidable for Brick {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn collision_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}
