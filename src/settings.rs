//! Game settings and tuning
//!
//! Stored as JSON next to the level data. Missing fields take their
//! defaults so older files keep loading after new knobs are added.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::PersistenceError;
use crate::sim::SweepConfig;

/// Game settings/tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === World ===
    /// Logical playfield width
    pub world_width: f32,
    /// Logical playfield height
    pub world_height: f32,

    // === Ball ===
    pub ball_radius: f32,
    /// Sweep tuning (speed, time scale, bounce cap, corner policy)
    pub ball: SweepConfig,

    // === Bat ===
    pub bat_width: f32,
    pub bat_height: f32,
    /// Distance from the bottom of the world to the bat's top edge
    pub bat_bottom_offset: f32,
    /// Top speed in units per update under relative/keyboard control
    pub bat_max_speed: f32,
    /// Gap left between the bat and a brick it runs into
    pub bat_clearance: f32,

    // === Session ===
    pub starting_lives: u8,
    pub first_level: u32,
    /// Seed for generated levels (same seed, same layout)
    pub level_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,

            ball_radius: BALL_RADIUS,
            ball: SweepConfig::default(),

            bat_width: BAT_WIDTH,
            bat_height: BAT_HEIGHT,
            bat_bottom_offset: BAT_BOTTOM_OFFSET,
            bat_max_speed: BAT_MAX_SPEED,
            bat_clearance: BAT_CLEARANCE,

            starting_lives: STARTING_LIVES,
            first_level: 1,
            level_seed: 0x5eed,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults when the
    /// file is missing or unreadable
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(PersistenceError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring settings at {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, PersistenceError> {
        let json = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&json)?;
        Ok(settings.sanitized())
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Clamp values that would stall or break the simulation
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !positive(self.ball.time_scale) {
            log::warn!("time_scale must be positive, using {}", defaults.ball.time_scale);
            self.ball.time_scale = defaults.ball.time_scale;
        }
        if self.ball.max_bounces == 0 {
            self.ball.max_bounces = 1;
        }
        if !(self.ball_radius.is_finite() && self.ball_radius >= 0.0) {
            self.ball_radius = defaults.ball_radius;
        }
        if !positive(self.world_width) || !positive(self.world_height) {
            log::warn!("World size must be positive, using defaults");
            self.world_width = defaults.world_width;
            self.world_height = defaults.world_height;
        }
        self.starting_lives = self.starting_lives.max(1);
        self.first_level = self.first_level.max(1);
        self
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
