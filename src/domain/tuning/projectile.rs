use serde::Deserialize;

/// Gameplay tuning for standard cannon shells.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Travel speed in pixels per tick.
    pub speed: f32,

    /// Square hit box edge in pixels.
    pub size: f32,

    /// Damage dealt on a direct hit.
    pub damage: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 3.0,
            size: 8.0,
            damage: 1.0,
        }
    }
}
