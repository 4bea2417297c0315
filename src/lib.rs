//! Arcade core - the simulation engine shared by a set of small arcade games
//!
//! Core modules:
//! - `sim`: Entity loop, collision detection and swept ball physics
//! - `bricker`: The brick-breaker game built on the core
//! - `controller`: Input state handed to game entities
//! - `settings`: Data-driven tuning
//! - `persistence`: Level storage with fallback generation

pub mod bricker;
pub mod controller;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use controller::ControllerState;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Logical playfield size (renderers scale this to the screen)
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Frame length used by headless drivers (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 9.0;
    pub const BALL_SPEED: f32 = 0.8;
    /// Elapsed ms are divided by this before applying ball speed
    pub const SPEED_TIME_SCALE: f32 = 3.0;
    /// Ball spawns this far above the bottom of the world
    pub const BALL_SPAWN_HEIGHT: f32 = 100.0;
    /// Safety cap on bounces resolved within one tick
    pub const MAX_BOUNCES_PER_TICK: usize = 16;

    /// Bat defaults
    pub const BAT_WIDTH: f32 = 100.0;
    pub const BAT_HEIGHT: f32 = 18.0;
    pub const BAT_BOTTOM_OFFSET: f32 = 50.0;
    /// Bat speed in units per update
    pub const BAT_MAX_SPEED: f32 = 10.0;
    /// Gap kept between the bat and a brick it runs into
    pub const BAT_CLEARANCE: f32 = 2.0;
    /// Horizontal widening of bat bounces
    pub const BAT_DEFLECTION_STRETCH: f32 = 1.4;
    /// Rate (units per ms) at which the bat shoves an overlapping ball
    pub const BAT_PUSH_RATE: f32 = 0.6;

    /// Level layout
    pub const BORDER_WIDTH: f32 = 20.0;
    pub const BRICK_WIDTH: f32 = 50.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_GAP: f32 = 4.0;

    /// Updates a debris burst stays alive
    pub const DEBRIS_LIFETIME: u32 = 10;

    pub const STARTING_LIVES: u8 = 3;
}
