//! Session driver: spawns the level, steers the bat, counts lives
//!
//! The logic is itself an entity. It is added first, so it always updates
//! before the ball and sees the ball's state from the previous tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::BrickerEntity;
use super::ball::Ball;
use super::brick::Brick;
use crate::consts::BAT_PUSH_RATE;
use crate::persistence::load_level_or_generate;
use crate::sim::{
    EntityId, FrameTimer, ObstacleKind, Rect, Tick, inflate_rectangle, point_in_rect, rect_in_rect,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing spawned yet; the first update sets the session up
    #[default]
    Starting,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Default)]
pub struct GameLogic {
    phase: Phase,
    level: u32,
    lives: u8,
    ball: Option<EntityId>,
    bat: Option<EntityId>,
    /// Bat velocity in units per update (relative/keyboard control)
    bat_speed: f32,
    /// The current level started with bricks to clear
    level_has_targets: bool,
    timer: FrameTimer,
}

impl GameLogic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn ball(&self) -> Option<EntityId> {
        self.ball
    }

    pub fn bat(&self) -> Option<EntityId> {
        self.bat
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn update(&mut self, tick: &mut Tick<'_, BrickerEntity>) {
        let delta = self.timer.delta(tick.time());
        match self.phase {
            Phase::Starting => self.start(tick),
            Phase::Playing => {
                self.drive_bat(tick, delta);
                if self.level_cleared(tick) {
                    self.advance_level(tick);
                } else {
                    self.check_ball(tick);
                }
            }
            Phase::GameOver => {}
        }
    }

    fn start(&mut self, tick: &mut Tick<'_, BrickerEntity>) {
        let settings = &tick.context().settings;
        self.lives = settings.starting_lives;
        self.level = settings.first_level;
        self.bat_speed = 0.0;
        self.bat = Some(tick.spawn(BrickerEntity::Brick(Brick::bat(settings))));
        self.ball = Some(tick.spawn(BrickerEntity::Ball(Ball::spawn(settings))));
        self.load_level(tick);
        self.phase = Phase::Playing;
        log::info!("Session started on level {} with {} lives", self.level, self.lives);
    }

    fn load_level(&mut self, tick: &mut Tick<'_, BrickerEntity>) {
        let context = tick.context();
        let level = load_level_or_generate(
            context.store.as_ref(),
            self.level,
            context.generator.as_ref(),
            &context.settings,
        );
        self.level_has_targets = level.target_count() > 0;
        for record in &level.bricks {
            if record.kind == ObstacleKind::Bat {
                log::debug!("Ignoring stored bat in level {}", self.level);
                continue;
            }
            tick.spawn(BrickerEntity::Brick(Brick::from_record(record)));
        }
    }

    /// A level with targets is cleared once none of them is left standing
    fn level_cleared(&self, tick: &Tick<'_, BrickerEntity>) -> bool {
        self.level_has_targets
            && !tick.others().any(|(_, entity)| {
                matches!(entity, BrickerEntity::Brick(brick) if brick.is_target() && !brick.finished)
            })
    }

    fn advance_level(&mut self, tick: &mut Tick<'_, BrickerEntity>) {
        self.level += 1;
        log::info!("Level cleared, advancing to level {}", self.level);
        let bat = self.bat;
        for (id, entity) in tick.others_mut() {
            match entity {
                BrickerEntity::Brick(brick) if Some(id) != bat => brick.finished = true,
                _ => {}
            }
        }
        self.load_level(tick);
        self.respawn_ball(tick);
    }

    fn check_ball(&mut self, tick: &mut Tick<'_, BrickerEntity>) {
        // A ball finished this tick is still present until the engine removes it
        if self.ball.is_some_and(|id| tick.get(id).is_some()) {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.ball = None;
            self.phase = Phase::GameOver;
            log::info!("Game over on level {}", self.level);
        } else {
            log::info!("Ball lost, {} lives left", self.lives);
            self.respawn_ball(tick);
        }
    }

    /// Put the ball back above the bat, reusing the live ball if there is one
    fn respawn_ball(&mut self, tick: &mut Tick<'_, BrickerEntity>) {
        let settings = &tick.context().settings;
        match self.ball.and_then(|id| tick.get_mut(id)) {
            Some(BrickerEntity::Ball(ball)) if !ball.is_finished() => {
                *ball = Ball::spawn(settings);
                return;
            }
            _ => {}
        }
        self.ball = Some(tick.spawn(BrickerEntity::Ball(Ball::spawn(settings))));
    }

    fn drive_bat(&mut self, tick: &mut Tick<'_, BrickerEntity>, delta: f32) {
        let Some(bat_id) = self.bat else {
            return;
        };
        let context = tick.context();
        let controller = context.controller;
        let settings = &context.settings;

        let obstacles: Vec<Rect> = tick
            .others()
            .filter_map(|(id, entity)| match entity {
                BrickerEntity::Brick(brick) if id != bat_id && !brick.finished => Some(brick.rect()),
                _ => None,
            })
            .collect();
        let ball_shape = self.ball.and_then(|id| match tick.get(id) {
            Some(BrickerEntity::Ball(ball)) => Some((ball.pos(), ball.mover.radius)),
            _ => None,
        });

        let Some(BrickerEntity::Brick(bat)) = tick.get_mut(bat_id) else {
            return;
        };
        let step = if controller.absolute {
            let limit = (settings.world_width - bat.width).max(0.0);
            (controller.pointer.x - bat.width / 2.0).clamp(0.0, limit) - bat.pos.x
        } else {
            self.bat_speed = accelerate(self.bat_speed, controller.steering(), settings.bat_max_speed);
            self.bat_speed
        };
        bat.pos.x += step;
        if correct_bat(bat, step, &obstacles, settings.bat_clearance) {
            self.bat_speed = 0.0;
        }
        let bat_rect = bat.rect();

        // Moving bat overlapping the ball shoves it sideways
        let Some((ball_pos, radius)) = ball_shape else {
            return;
        };
        if step == 0.0 || !point_in_rect(ball_pos, Vec2::ZERO, &inflate_rectangle(&bat_rect, radius)) {
            return;
        }
        if let Some(BrickerEntity::Ball(ball)) = self.ball.and_then(|id| tick.get_mut(id)) {
            let shove = step.signum() * BAT_PUSH_RATE * delta;
            ball.mover.pos = push_ball(ball.mover.pos, shove, radius, &obstacles);
        }
    }
}

/// Ball centre after a sideways shove of `dx`, stopped at the first
/// radius-inflated obstacle in the way
fn push_ball(pos: Vec2, dx: f32, radius: f32, obstacles: &[Rect]) -> Vec2 {
    let mut x = pos.x + dx;
    for rect in obstacles {
        let inflated = inflate_rectangle(rect, radius);
        if pos.y <= inflated.top() || pos.y >= inflated.bottom() {
            continue;
        }
        if dx > 0.0 && pos.x <= inflated.left() {
            x = x.min(inflated.left());
        } else if dx < 0.0 && pos.x >= inflated.right() {
            x = x.max(inflated.right());
        }
    }
    Vec2::new(x, pos.y)
}

/// One update of bat acceleration: held directions add one unit each up to
/// `max`, no input decays the speed by one unit towards rest
fn accelerate(speed: f32, (left, right): (bool, bool), max: f32) -> f32 {
    let mut speed = speed;
    if left && speed > -max {
        speed -= 1.0;
    }
    if right && speed < max {
        speed += 1.0;
    }
    if !left && !right {
        if speed > 0.0 {
            speed = (speed - 1.0).max(0.0);
        } else if speed < 0.0 {
            speed = (speed + 1.0).min(0.0);
        }
    }
    speed
}

/// Push the bat back out of any brick it moved into. Returns whether it was
/// stopped.
fn correct_bat(bat: &mut Brick, step: f32, obstacles: &[Rect], clearance: f32) -> bool {
    let mut blocked = false;
    for rect in obstacles {
        let bat_rect = bat.rect();
        let overlapping = rect_in_rect(Vec2::ZERO, &bat_rect, Vec2::ZERO, rect)
            || rect_in_rect(Vec2::ZERO, rect, Vec2::ZERO, &bat_rect);
        if !overlapping {
            continue;
        }
        if step > 0.0 && rect.left() <= bat_rect.right() {
            bat.pos.x = rect.left() - clearance - bat.width;
            blocked = true;
        } else if step < 0.0 && rect.right() >= bat_rect.left() {
            bat.pos.x = rect.right() + clearance;
            blocked = true;
        }
    }
    blocked
}
