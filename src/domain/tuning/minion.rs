use crate::domain::Millis;
use crate::domain::geometry::Size;
use serde::Deserialize;

/// Gameplay tuning for boss-summoned minions.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MinionTuning {
    pub health: f32,
    pub size: Size,
    pub spawn_duration: Millis,
    pub fire_cooldown: Millis,
    /// Upper bound of the random extra fire cooldown.
    pub fire_jitter: Millis,
    /// Shell speed in pixels per tick.
    pub projectile_speed: f32,
    pub damage: f32,
    pub kill_score: u32,
    /// Distance from centre to muzzle.
    pub muzzle_distance: f32,
}

impl Default for MinionTuning {
    fn default() -> Self {
        Self {
            health: 4.0,
            size: Size::new(40.0, 40.0),
            spawn_duration: 1500,
            fire_cooldown: 2500,
            fire_jitter: 500,
            projectile_speed: 2.5,
            damage: 0.5,
            kill_score: 25,
            muzzle_distance: 50.0,
        }
    }
}
