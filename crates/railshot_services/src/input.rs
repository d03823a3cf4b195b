//! Normalized per-frame input
//!
//! Device polling lives in the host. The simulation only ever sees an
//! [`InputSnapshot`]; axes are already in `[-1, 1]` and button edges are
//! already resolved.

use serde::{Deserialize, Serialize};

/// One frame of player intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub move_x: f32,
    pub move_y: f32,
    /// Reticle position in normalized screen space.
    pub aim_x: f32,
    pub aim_y: f32,
    /// Fire held this frame.
    pub fire: bool,
    pub fire_pressed: bool,
    pub fire_released: bool,
    pub overdrive: bool,
    pub pause: bool,
    pub shield: bool,
}

impl InputSnapshot {
    /// Clamp axes into range and zero out NaNs.
    pub fn normalized(mut self) -> Self {
        for axis in [
            &mut self.move_x,
            &mut self.move_y,
            &mut self.aim_x,
            &mut self.aim_y,
        ] {
            *axis = if axis.is_nan() { 0.0 } else { axis.clamp(-1.0, 1.0) };
        }
        self
    }
}

/// Turns a raw "fire is down" level into press/release edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct FireEdges {
    was_down: bool,
}

impl FireEdges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill `fire`, `fire_pressed` and `fire_released` from the level.
    pub fn apply(&mut self, mut snapshot: InputSnapshot, down: bool) -> InputSnapshot {
        snapshot.fire = down;
        snapshot.fire_pressed = down && !self.was_down;
        snapshot.fire_released = !down && self.was_down;
        self.was_down = down;
        snapshot
    }
}
