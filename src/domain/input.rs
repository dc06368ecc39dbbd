use crate::domain::geometry::Vec2;
use serde::Serialize;

/// Held-input snapshot the tick reads at its start.
///
/// Producers overwrite fields independently between ticks; the tick never writes back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pointer position in arena coordinates.
    pub aim: Vec2,
    pub fire: bool,
    /// Cyber Beam key is held; releasing it ends the charge or channel.
    pub beam_held: bool,
}

impl PlayerInput {
    /// Unnormalised movement direction from the held keys.
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::default();
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir
    }
}
