use crate::domain::Millis;
use serde::Deserialize;

/// Lifetimes of presentation-only records (animations, floating numbers, shakes).
///
/// These never affect combat; they only control how long the renderer sees each record.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EffectsTuning {
    pub muzzle_flash: Millis,
    pub hit: Millis,
    pub shield_hit: Millis,
    pub shield_break: Millis,
    pub barrage_impact: Millis,
    pub homing_explosion: Millis,
    pub chrono_shard_impact: Millis,
    pub lane_attack: Millis,
    pub mortar_strike: Millis,
    pub damage_number: Millis,
    pub beam_damage_number: Millis,
    pub damage_indicator: Millis,
    pub mastery_notification: Millis,
}

impl Default for EffectsTuning {
    fn default() -> Self {
        Self {
            muzzle_flash: 100,
            hit: 200,
            shield_hit: 300,
            shield_break: 400,
            barrage_impact: 400,
            homing_explosion: 500,
            chrono_shard_impact: 300,
            lane_attack: 400,
            mortar_strike: 700,
            damage_number: 1000,
            beam_damage_number: 800,
            damage_indicator: 1500,
            mastery_notification: 4000,
        }
    }
}
