//! Arcade core headless runner
//!
//! Plays ball bricker with the autopilot at a fixed 60 Hz and logs what
//! happens. Usage: `arcade-core [settings.json] [frames] [levels-dir]`

use std::path::Path;

use arcade_core::Settings;
use arcade_core::bricker::{self, BrickerContext, BrickerEntity};
use arcade_core::consts::FRAME_MS;
use arcade_core::persistence::DirectoryStore;
use arcade_core::sim::{Engine, ManualClock, Renderer};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// One minute of play
const DEFAULT_FRAMES: u64 = 60 * 60;
/// Frames between autopilot lean changes
const LEAN_INTERVAL: u64 = 120;
/// Frames between status lines
const REPORT_INTERVAL: u64 = 600;

/// Stands in for a real renderer: tracks peaks, logs a status line now and then
#[derive(Default)]
struct LogRenderer {
    frames: u64,
    peak_entities: usize,
    peak_pairs: usize,
}

impl Renderer<BrickerEntity> for LogRenderer {
    fn render(&mut self, engine: &Engine<BrickerEntity>) {
        self.frames += 1;
        self.peak_entities = self.peak_entities.max(engine.len());
        self.peak_pairs = self.peak_pairs.max(engine.collisions().pair_count());
        if self.frames % REPORT_INTERVAL != 0 {
            return;
        }
        if let Some(logic) = bricker::session(engine) {
            log::info!(
                "t={:.1}s level {} lives {} bricks left {}",
                engine.time() / 1000.0,
                logic.level(),
                logic.lives(),
                remaining_bricks(engine)
            );
        }
    }
}

fn remaining_bricks(engine: &Engine<BrickerEntity>) -> usize {
    engine
        .entities()
        .filter_map(|(_, entity)| entity.as_brick())
        .filter(|brick| brick.is_target())
        .count()
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings = args
        .next()
        .map(|path| Settings::load(Path::new(&path)))
        .unwrap_or_default();
    let frames = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);
    let mut context = BrickerContext::new(settings);
    if let Some(dir) = args.next() {
        log::info!("Reading levels from {}", dir);
        context = context.with_store(DirectoryStore::new(dir));
    }
    log::info!("Arcade core starting: {} frames of ball bricker", frames);

    let mut engine = bricker::new_session();
    let mut clock = ManualClock::new(0.0);
    let mut renderer = LogRenderer::default();
    let mut rng = Pcg32::seed_from_u64(context.settings.level_seed);
    let mut lean = 0.0f32;

    for frame in 0..frames {
        if frame % LEAN_INTERVAL == 0 {
            lean = rng.random_range(-30.0..30.0);
        }
        context.controller = bricker::autopilot(&engine, lean);
        engine.frame(&clock, &context, &mut renderer);
        clock.advance(FRAME_MS);

        if bricker::session(&engine).is_some_and(|logic| logic.is_game_over()) {
            log::info!("Game over after {} frames", frame + 1);
            break;
        }
    }

    if let Some(logic) = bricker::session(&engine) {
        log::info!(
            "Finished at {:.1}s: level {}, {} lives, {} bricks left",
            engine.time() / 1000.0,
            logic.level(),
            logic.lives(),
            remaining_bricks(&engine)
        );
    }
    log::info!(
        "Peak {} entities, {} overlapping pairs",
        renderer.peak_entities,
        renderer.peak_pairs
    );
}
