//! Level data and level generators
//!
//! The JSON shape matches level files already in circulation, which is
//! why the indestructible flag keeps its historical spelling on disk.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::{PersistenceError, PersistenceResult};
use crate::settings::Settings;
use crate::sim::ObstacleKind;

/// The 16 brick colours
pub const PALETTE: [&str; 16] = [
    "#000", // Black
    "#FFF", // White
    "#F00", // Red
    "#0FF", // Cyan
    "#F0F", // Purple
    "#0F0", // Green
    "#00F", // Blue
    "#FF0", // Yellow
    "#FA0", // Orange
    "#A53", // Brown
    "#F88", // Light red
    "#666", // Dark grey
    "#AAA", // Grey
    "#8F8", // Light green
    "#88F", // Light blue
    "#CCC", // Light grey
];

pub const BORDER_COLOR: &str = "#AAA";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f32,
    pub y: f32,
}

/// One stored brick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickRecord {
    #[serde(default)]
    pub kind: ObstacleKind,
    pub color: String,
    pub width: f32,
    pub height: f32,
    #[serde(rename = "indestructable", alias = "indestructible", default)]
    pub indestructible: bool,
    pub position: PointRecord,
}

impl BrickRecord {
    /// Counts towards clearing the level
    pub fn is_target(&self) -> bool {
        self.kind == ObstacleKind::Normal && !self.indestructible
    }

    fn wall(kind: ObstacleKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            kind,
            color: BORDER_COLOR.to_string(),
            width,
            height,
            indestructible: true,
            position: PointRecord { x, y },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Level {
    pub bricks: Vec<BrickRecord>,
}

impl Level {
    pub fn target_count(&self) -> usize {
        self.bricks.iter().filter(|b| b.is_target()).count()
    }

    pub fn validate(&self, number: u32) -> PersistenceResult<()> {
        for (index, brick) in self.bricks.iter().enumerate() {
            let values = [brick.width, brick.height, brick.position.x, brick.position.y];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(invalid(number, format!("brick {index} has a non-finite value")));
            }
            if brick.width <= 0.0 || brick.height <= 0.0 {
                return Err(invalid(
                    number,
                    format!("brick {index} has size {}x{}", brick.width, brick.height),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(level: u32, reason: String) -> PersistenceError {
    PersistenceError::InvalidLevel { level, reason }
}

/// Produces a level when none is stored
pub trait LevelGenerator {
    fn generate(&self, number: u32, settings: &Settings) -> Level;
}

/// Four indestructible walls just outside the world, nothing else
#[derive(Debug, Clone, Copy, Default)]
pub struct BorderLevel;

impl LevelGenerator for BorderLevel {
    fn generate(&self, _number: u32, settings: &Settings) -> Level {
        Level {
            bricks: border_bricks(settings, ObstacleKind::Border),
        }
    }
}

/// Walls, a death floor and a seeded grid of coloured bricks
#[derive(Debug, Clone, Copy)]
pub struct ClassicLevel {
    pub seed: u64,
}

impl ClassicLevel {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rows(number: u32) -> usize {
        (2 + number as usize).min(8)
    }
}

impl LevelGenerator for ClassicLevel {
    fn generate(&self, number: u32, settings: &Settings) -> Level {
        let mut rng = Pcg32::seed_from_u64(self.seed ^ (number as u64).wrapping_mul(0x9E37_79B9));
        let mut bricks = border_bricks(settings, ObstacleKind::Death);

        let pitch = BRICK_WIDTH + BRICK_GAP;
        let usable = settings.world_width - 2.0 * BORDER_WIDTH;
        let cols = (((usable + BRICK_GAP) / pitch).floor() as usize).max(1);
        let row_width = cols as f32 * pitch - BRICK_GAP;
        let left = (settings.world_width - row_width) / 2.0;
        let top = 3.0 * BORDER_WIDTH;

        for row in 0..Self::rows(number) {
            // Skip white and black so bricks stand out from the background
            let color = PALETTE[rng.random_range(2..PALETTE.len())];
            let armoured_row = number >= 3 && row % 5 == 4;
            for col in 0..cols {
                let indestructible = armoured_row && col % 2 == 0;
                bricks.push(BrickRecord {
                    kind: ObstacleKind::Normal,
                    color: if indestructible { BORDER_COLOR } else { color }.to_string(),
                    width: BRICK_WIDTH,
                    height: BRICK_HEIGHT,
                    indestructible,
                    position: PointRecord {
                        x: left + col as f32 * pitch,
                        y: top + row as f32 * (BRICK_HEIGHT + BRICK_GAP),
                    },
                });
            }
        }

        log::debug!(
            "Generated level {} with {} targets (seed {:#x})",
            number,
            bricks.iter().filter(|b| b.is_target()).count(),
            self.seed
        );
        Level { bricks }
    }
}

/// Top, left and right walls plus a floor of kind `floor`, all hugging
/// the outside of the world
fn border_bricks(settings: &Settings, floor: ObstacleKind) -> Vec<BrickRecord> {
    let (w, h, b) = (settings.world_width, settings.world_height, BORDER_WIDTH);
    vec![
        BrickRecord::wall(ObstacleKind::Border, -b, -b, w + 2.0 * b, b),
        BrickRecord::wall(ObstacleKind::Border, -b, 0.0, b, h),
        BrickRecord::wall(ObstacleKind::Border, w, 0.0, b, h),
        BrickRecord::wall(floor, -b, h, w + 2.0 * b, b),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_level_encloses_world() {
        let settings = Settings::default();
        let level = BorderLevel.generate(1, &settings);
        assert_eq!(level.bricks.len(), 4);
        assert!(level.bricks.iter().all(|b| b.indestructible));
        assert_eq!(level.target_count(), 0);
        let floor = &level.bricks[3];
        assert_eq!(floor.position, PointRecord { x: -BORDER_WIDTH, y: settings.world_height });
        assert_eq!(floor.kind, ObstacleKind::Border);
    }

    #[test]
    fn test_classic_level_is_seeded() {
        let settings = Settings::default();
        let a = ClassicLevel::new(7).generate(2, &settings);
        let b = ClassicLevel::new(7).generate(2, &settings);
        assert_eq!(a, b);
        assert!(a.target_count() > 0);
        assert_eq!(a.bricks[3].kind, ObstacleKind::Death);
        a.validate(2).unwrap();
    }

    #[test]
    fn test_classic_level_fits_inside_walls() {
        let settings = Settings::default();
        let level = ClassicLevel::new(1).generate(6, &settings);
        for brick in level.bricks.iter().filter(|b| b.kind == ObstacleKind::Normal) {
            assert!(brick.position.x >= BORDER_WIDTH);
            assert!(brick.position.x + brick.width <= settings.world_width - BORDER_WIDTH);
            assert!(brick.position.y + brick.height < settings.world_height / 2.0);
        }
    }

    #[test]
    fn test_armoured_row_from_level_three() {
        let settings = Settings::default();
        let early = ClassicLevel::new(3).generate(2, &settings);
        assert!(early.bricks.iter().all(|b| b.kind != ObstacleKind::Normal || !b.indestructible));

        let later = ClassicLevel::new(3).generate(3, &settings);
        let armoured = later
            .bricks
            .iter()
            .filter(|b| b.kind == ObstacleKind::Normal && b.indestructible)
            .count();
        assert!(armoured > 0);
        assert!(later.target_count() > 0);
    }

    #[test]
    fn test_kind_spellings() {
        let record: BrickRecord = serde_json::from_str(
            r##"{"kind":"Normal","color":"#F00","width":10,"height":10,"indestructible":true,"position":{"x":0,"y":0}}"##,
        )
        .unwrap();
        assert_eq!(record.kind, ObstacleKind::Normal);
        assert!(record.indestructible);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""kind":"Brick""#));
        assert!(json.contains(r#""indestructable":true"#));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut level = BorderLevel.generate(1, &Settings::default());
        level.bricks[0].position.x = f32::NAN;
        assert!(level.validate(1).is_err());
    }
}
