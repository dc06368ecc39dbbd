use crate::domain::Millis;
use crate::domain::geometry::Size;
use serde::Deserialize;

/// Gameplay tuning for world pickups and the effects they grant.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    pub spawn_interval: Millis,
    pub max_on_field: usize,
    /// Square pickup footprint in pixels.
    pub size: f32,

    pub dual_cannon_duration: Millis,
    /// Lateral barrel offset as a fraction of tank width.
    pub dual_cannon_offset: f32,

    pub shield_hits: u32,
    pub shield_duration: Millis,

    pub regensule_duration: Millis,
    pub regensule_health_bonus: f32,
    pub regensule_regen: f32,
    pub regensule_interval: Millis,

    pub reflector_duration: Millis,

    pub life_leech_duration: Millis,
    /// Fraction of dealt damage returned as healing.
    pub life_leech_fraction: f32,

    pub homing_count: u32,
    pub homing_duration: Millis,
    pub homing_speed: f32,
    /// Degrees per tick.
    pub homing_turn_rate: f32,
    pub homing_size: Size,
    pub homing_direct_damage: f32,
    pub homing_splash_damage: f32,
    pub homing_splash_radius: f32,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            spawn_interval: 8000,
            max_on_field: 3,
            size: 30.0,
            dual_cannon_duration: 10000,
            dual_cannon_offset: 0.15,
            shield_hits: 3,
            shield_duration: 10000,
            regensule_duration: 15000,
            regensule_health_bonus: 1.0,
            regensule_regen: 0.1,
            regensule_interval: 500,
            reflector_duration: 10000,
            life_leech_duration: 15000,
            life_leech_fraction: 0.1,
            homing_count: 8,
            homing_duration: 60000,
            homing_speed: 3.0,
            homing_turn_rate: 5.0,
            homing_size: Size::new(10.0, 15.0),
            homing_direct_damage: 1.5,
            homing_splash_damage: 0.75,
            homing_splash_radius: 40.0,
        }
    }
}
