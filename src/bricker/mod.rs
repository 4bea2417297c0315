//! Ball bricker - the brick-breaker game built on the simulation core
//!
//! Entities:
//! - `GameLogic`: session driver (level loading, bat control, lives)
//! - `Ball`: swept mover bouncing off every brick
//! - `Brick`: bricks, walls, the death floor and the bat
//! - `Debris`: burst left behind by a destroyed brick

pub mod ball;
pub mod brick;
pub mod debris;
pub mod level;
pub mod logic;

pub use ball::Ball;
pub use brick::Brick;
pub use debris::Debris;
pub use level::{BorderLevel, BrickRecord, ClassicLevel, Level, LevelGenerator, PointRecord};
pub use logic::{GameLogic, Phase};

use glam::Vec2;

use crate::controller::ControllerState;
use crate::persistence::{LevelStore, MemoryStore};
use crate::settings::Settings;
use crate::sim::{Collidable, Engine, Entity, Spawner, Tick};

/// Every entity the game puts in the engine
#[derive(Debug, Clone)]
pub enum BrickerEntity {
    Logic(GameLogic),
    Ball(Ball),
    Brick(Brick),
    Debris(Debris),
}

impl BrickerEntity {
    pub fn as_logic(&self) -> Option<&GameLogic> {
        match self {
            Self::Logic(logic) => Some(logic),
            _ => None,
        }
    }

    pub fn as_ball(&self) -> Option<&Ball> {
        match self {
            Self::Ball(ball) => Some(ball),
            _ => None,
        }
    }

    pub fn as_brick(&self) -> Option<&Brick> {
        match self {
            Self::Brick(brick) => Some(brick),
            _ => None,
        }
    }
}

impl Entity for BrickerEntity {
    type Context = BrickerContext;

    fn update(&mut self, tick: &mut Tick<'_, Self>) {
        match self {
            Self::Logic(logic) => logic.update(tick),
            Self::Ball(ball) => ball.update(tick),
            Self::Brick(_) => {}
            Self::Debris(debris) => debris.update(),
        }
    }

    fn is_finished(&self) -> bool {
        match self {
            Self::Logic(_) => false,
            Self::Ball(ball) => ball.is_finished(),
            Self::Brick(brick) => brick.finished,
            Self::Debris(debris) => debris.is_finished(),
        }
    }

    fn collidable(&self) -> Option<&dyn Collidable> {
        match self {
            Self::Ball(ball) => Some(ball),
            Self::Brick(brick) => Some(brick),
            _ => None,
        }
    }

    fn on_remove(&mut self, spawner: &mut Spawner<'_, Self>) {
        if let Some(debris) = self.as_brick().and_then(Brick::debris) {
            spawner.spawn(Self::Debris(debris));
        }
    }
}

/// Collaborators handed to every bricker entity
pub struct BrickerContext {
    pub controller: ControllerState,
    pub settings: Settings,
    pub store: Box<dyn LevelStore>,
    pub generator: Box<dyn LevelGenerator>,
}

impl BrickerContext {
    /// Empty in-memory store, seeded classic levels
    pub fn new(settings: Settings) -> Self {
        let generator = ClassicLevel::new(settings.level_seed);
        Self {
            controller: ControllerState::default(),
            settings,
            store: Box::new(MemoryStore::new()),
            generator: Box::new(generator),
        }
    }

    pub fn with_store(mut self, store: impl LevelStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn with_generator(mut self, generator: impl LevelGenerator + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }
}

/// Engine holding just the session driver; it sets up the rest on its
/// first update
pub fn new_session() -> Engine<BrickerEntity> {
    let mut engine = Engine::new();
    engine.add(BrickerEntity::Logic(GameLogic::new()));
    engine
}

/// The session driver, if the engine has one
pub fn session(engine: &Engine<BrickerEntity>) -> Option<&GameLogic> {
    engine.entities().find_map(|(_, entity)| entity.as_logic())
}

/// Computer player: keeps the bat under the ball, `lean` units off centre
/// so bounces come off at an angle
pub fn autopilot(engine: &Engine<BrickerEntity>, lean: f32) -> ControllerState {
    let ball = session(engine)
        .and_then(GameLogic::ball)
        .and_then(|id| engine.get(id))
        .and_then(BrickerEntity::as_ball);
    match ball {
        Some(ball) => ControllerState::absolute(Vec2::new(ball.pos().x + lean, 0.0)),
        None => ControllerState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::persistence::save_level;
    use crate::sim::ObstacleKind;

    fn run(engine: &mut Engine<BrickerEntity>, context: &BrickerContext, frames: u32) {
        for _ in 0..frames {
            let now = engine.ticks() as f64 * FRAME_MS;
            engine.tick(now, context);
        }
    }

    fn targets(engine: &Engine<BrickerEntity>) -> usize {
        engine
            .entities()
            .filter_map(|(_, e)| e.as_brick())
            .filter(|b| b.is_target())
            .count()
    }

    fn ball(engine: &Engine<BrickerEntity>) -> Option<&Ball> {
        engine.entities().find_map(|(_, e)| e.as_ball())
    }

    #[test]
    fn test_session_setup() {
        let context = BrickerContext::new(Settings::default());
        let mut engine = new_session();
        run(&mut engine, &context, 1);

        let logic = session(&engine).unwrap();
        assert_eq!(logic.phase(), Phase::Playing);
        assert_eq!(logic.lives(), context.settings.starting_lives);
        assert_eq!(logic.level(), 1);
        assert!(engine.contains(logic.bat().unwrap()));
        assert!(engine.contains(logic.ball().unwrap()));

        let generated = ClassicLevel::new(context.settings.level_seed).generate(1, &context.settings);
        assert_eq!(targets(&engine), generated.target_count());
        let bat = engine.get(logic.bat().unwrap()).and_then(BrickerEntity::as_brick).unwrap();
        assert_eq!(bat.kind, ObstacleKind::Bat);
    }

    #[test]
    fn test_ball_bounces_off_bat_and_breaks_a_brick() {
        let context = BrickerContext::new(Settings::default());
        let mut engine = new_session();
        run(&mut engine, &context, 1);
        let before = targets(&engine);

        let mut bounced = false;
        let mut saw_debris = false;
        for _ in 0..160 {
            run(&mut engine, &context, 1);
            bounced |= ball(&engine).is_some_and(|b| b.mover.speed.y < 0.0);
            saw_debris |= engine.entities().any(|(_, e)| matches!(e, BrickerEntity::Debris(_)));
        }

        assert!(bounced);
        assert!(saw_debris);
        assert_eq!(targets(&engine), before - 1);
        assert_eq!(session(&engine).unwrap().lives(), context.settings.starting_lives);
    }

    #[test]
    fn test_lost_ball_costs_a_life() {
        let mut context = BrickerContext::new(Settings::default());
        // Park the bat at the far left so the ball drops past it
        context.controller = ControllerState::absolute(Vec2::new(60.0, 0.0));
        let mut engine = new_session();
        run(&mut engine, &context, 40);

        let logic = session(&engine).unwrap();
        assert_eq!(logic.lives(), context.settings.starting_lives - 1);
        assert_eq!(logic.phase(), Phase::Playing);
        assert!(ball(&engine).is_some());
    }

    #[test]
    fn test_game_over_when_lives_run_out() {
        let mut settings = Settings::default();
        settings.starting_lives = 1;
        let mut context = BrickerContext::new(settings);
        context.controller = ControllerState::absolute(Vec2::new(60.0, 0.0));
        let mut engine = new_session();
        run(&mut engine, &context, 40);

        let logic = session(&engine).unwrap();
        assert!(logic.is_game_over());
        assert_eq!(logic.ball(), None);
        assert!(ball(&engine).is_none());

        // No respawn after game over
        run(&mut engine, &context, 40);
        assert!(ball(&engine).is_none());
    }

    #[test]
    fn test_cleared_level_advances() {
        let settings = Settings::default();
        let mut level = BorderLevel.generate(1, &settings);
        // Single target right under the falling ball
        level.bricks.push(BrickRecord {
            kind: ObstacleKind::Normal,
            color: "#0F0".to_string(),
            width: 50.0,
            height: 20.0,
            indestructible: false,
            position: PointRecord { x: 375.0, y: 515.0 },
        });
        let mut store = MemoryStore::new();
        save_level(&mut store, 1, &level).unwrap();

        let context = BrickerContext::new(settings).with_store(store);
        let mut engine = new_session();
        run(&mut engine, &context, 10);

        let logic = session(&engine).unwrap();
        assert_eq!(logic.level(), 2);
        assert!(targets(&engine) > 0);
        assert!(ball(&engine).is_some());
    }

    #[test]
    fn test_level_without_targets_never_advances() {
        // Plain walls all round: the ball bounces between bat and ceiling forever
        let context = BrickerContext::new(Settings::default()).with_generator(BorderLevel);
        let mut engine = new_session();
        run(&mut engine, &context, 240);
        let logic = session(&engine).unwrap();
        assert_eq!(logic.level(), 1);
        assert_eq!(logic.lives(), context.settings.starting_lives);
        assert!(ball(&engine).is_some());
    }

    #[test]
    fn test_autopilot_tracks_ball() {
        let context = BrickerContext::new(Settings::default());
        let mut engine = new_session();
        assert_eq!(autopilot(&engine, 5.0), ControllerState::default());
        run(&mut engine, &context, 2);
        let state = autopilot(&engine, 5.0);
        assert!(state.absolute);
        assert_eq!(state.pointer.x, ball(&engine).unwrap().pos().x + 5.0);
    }
}
