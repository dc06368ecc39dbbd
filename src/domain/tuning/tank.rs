use crate::domain::Millis;
use crate::domain::geometry::Size;
use serde::Deserialize;

/// Gameplay tuning shared by the player tank and enemy tanks.
///
/// Keep this separate from runtime/server configuration (tick rates, ports, etc.).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TankTuning {
    /// Hull footprint in pixels.
    pub size: Size,

    /// Distance from hull centre to muzzle in pixels.
    pub barrel_length: f32,

    /// Player movement speed in pixels per tick.
    pub speed: f32,

    /// Starting and maximum health.
    pub health: f32,

    /// Minimum time between player shots in milliseconds.
    pub fire_cooldown: Millis,

    /// Score awarded for destroying a tank.
    pub kill_score: u32,

    /// Delay after the death animation before an enemy respawns, in milliseconds.
    pub respawn_delay: Millis,

    /// Time spent in the spawning state before becoming active.
    pub spawn_duration: Millis,

    /// Invulnerability window measured from spawn time.
    pub spawn_invulnerability: Millis,

    /// Length of the dying state before respawn/removal.
    pub death_duration: Millis,

    /// Base enemy fire cooldown before difficulty scaling, in milliseconds.
    pub enemy_fire_cooldown: Millis,

    /// Upper bound of the random extra enemy fire cooldown.
    pub enemy_fire_jitter: Millis,

    /// Spread offsets (degrees) for intermediate-tier volleys.
    pub spread_angles: [f32; 3],

    /// An enemy that moved less than this over `stuck_window` is considered stuck.
    pub stuck_threshold: f32,
    pub stuck_window: Millis,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            size: Size::new(40.0, 50.0),
            barrel_length: 50.0 / 1.6,
            speed: 1.75,
            health: 8.0,
            fire_cooldown: 425,
            kill_score: 75,
            respawn_delay: 3000,
            spawn_duration: 1000,
            spawn_invulnerability: 1500,
            death_duration: 500,
            enemy_fire_cooldown: 1500,
            enemy_fire_jitter: 500,
            spread_angles: [-15.0, 0.0, 15.0],
            stuck_threshold: 0.5,
            stuck_window: 500,
        }
    }
}
