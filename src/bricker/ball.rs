//! The ball: a swept mover bouncing off every brick in play

use glam::Vec2;

use super::BrickerEntity;
use super::brick::Brick;
use crate::settings::Settings;
use crate::sim::{Collidable, FrameTimer, Mover, Rect, Tick};

#[derive(Debug, Clone)]
pub struct Ball {
    pub mover: Mover,
    timer: FrameTimer,
    /// Bricks this ball has destroyed
    pub destroyed: u32,
}

impl Ball {
    pub fn new(pos: Vec2, speed: Vec2, radius: f32) -> Self {
        Self {
            mover: Mover::new(pos, speed, radius),
            timer: FrameTimer::default(),
            destroyed: 0,
        }
    }

    /// Fresh ball above the bat, falling straight down
    pub fn spawn(settings: &Settings) -> Self {
        Self::new(
            Vec2::new(
                settings.world_width / 2.0,
                settings.world_height - crate::consts::BALL_SPAWN_HEIGHT,
            ),
            Vec2::new(0.0, settings.ball.base_speed),
            settings.ball_radius,
        )
    }

    pub fn pos(&self) -> Vec2 {
        self.mover.pos
    }

    pub fn is_finished(&self) -> bool {
        self.mover.finished
    }

    pub fn update(&mut self, tick: &mut Tick<'_, BrickerEntity>) {
        let delta = self.timer.delta(tick.time());
        if delta <= 0.0 {
            return;
        }
        let config = &tick.context().settings.ball;
        let mut bricks: Vec<&mut Brick> = tick
            .others_mut()
            .filter_map(|(_, entity)| match entity {
                BrickerEntity::Brick(brick) => Some(brick),
                _ => None,
            })
            .collect();

        let was_finished = self.mover.finished;
        let report = self.mover.sweep(delta, &mut bricks, config);
        for index in report.destroyed() {
            self.destroyed += 1;
            log::debug!("Ball destroyed {} brick at {:?}", bricks[index].color, bricks[index].pos);
        }
        if self.mover.finished && !was_finished {
            log::info!("Ball lost at {:?}", self.mover.pos);
        }
    }
}

impl Collidable for Ball {
    fn position(&self) -> Vec2 {
        self.mover.pos
    }

    fn collision_rect(&self) -> Rect {
        Rect::centered(self.mover.radius)
    }
}
