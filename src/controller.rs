//! Controller state read by game entities
//!
//! Filled in by whatever owns the input devices (mouse, touch, keyboard)
//! once per frame. The core never reads devices itself.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Snapshot of player input for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerState {
    /// Pointer position in world units when `absolute`, otherwise the
    /// pointer movement since the previous frame
    pub pointer: Vec2,
    pub button_down: bool,
    /// Pointer reports positions rather than movement
    pub absolute: bool,
    /// Keyboard left/right held
    pub left_held: bool,
    pub right_held: bool,
}

impl ControllerState {
    /// Pointer at a world position (mouse without pointer lock, touch)
    pub fn absolute(pointer: Vec2) -> Self {
        Self {
            pointer,
            absolute: true,
            ..Self::default()
        }
    }

    /// Pointer movement since the last frame (pointer lock)
    pub fn relative(movement: Vec2) -> Self {
        Self {
            pointer: movement,
            absolute: false,
            ..Self::default()
        }
    }

    /// Horizontal steering requested in relative mode: (left, right)
    pub fn steering(&self) -> (bool, bool) {
        if self.absolute {
            return (false, false);
        }
        (
            self.pointer.x < 0.0 || self.left_held,
            self.pointer.x > 0.0 || self.right_held,
        )
    }
}
