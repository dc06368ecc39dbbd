use crate::domain::Millis;
use crate::domain::geometry::Size;
use serde::Deserialize;

/// Gameplay tuning for the six player abilities.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct AbilitiesTuning {
    pub overdrive: OverdriveTuning,
    pub cyber_beam: CyberBeamTuning,
    pub chrono_bubble: ChronoBubbleTuning,
    pub barrage: BarrageTuning,
    pub toxic_rounds: ToxicRoundsTuning,
    pub time_stop: TimeStopTuning,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct OverdriveTuning {
    pub duration: Millis,
    pub cooldown: Millis,
    pub speed_multiplier: f32,
    /// Multiplier applied to the player's fire cooldown while active.
    pub fire_cooldown_multiplier: f32,

    /// Kills required to unlock mastery.
    pub mastery_kills: u32,
    pub mastered_duration: Millis,
    pub mastered_cooldown: Millis,
    pub mastered_fire_cooldown_multiplier: f32,
    /// Flat damage added to every shell while mastered Overdrive is active.
    pub mastered_damage_bonus: f32,
}

impl Default for OverdriveTuning {
    fn default() -> Self {
        Self {
            duration: 8000,
            cooldown: 20000,
            speed_multiplier: 1.6,
            fire_cooldown_multiplier: 0.5,
            mastery_kills: 10,
            mastered_duration: 12000,
            mastered_cooldown: 15000,
            mastered_fire_cooldown_multiplier: 0.35,
            mastered_damage_bonus: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CyberBeamTuning {
    pub charge_time: Millis,
    pub duration: Millis,
    pub cooldown: Millis,
    /// Damage per target per `damage_interval`.
    pub damage: f32,
    pub damage_interval: Millis,
    /// Fraction of the remaining distance the beam end closes on the cursor each tick.
    pub smoothing: f32,
    /// Minimum time between poison applications per target while Toxic Rounds is active.
    pub poison_interval: Millis,
}

impl Default for CyberBeamTuning {
    fn default() -> Self {
        Self {
            charge_time: 4000,
            duration: 14000,
            cooldown: 20000,
            damage: 0.30,
            damage_interval: 50,
            smoothing: 0.1,
            poison_interval: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ChronoBubbleTuning {
    pub radius: f32,
    pub duration: Millis,
    pub cooldown: Millis,
    /// Speed multiplier for anything inside the bubble.
    pub slow_factor: f32,
}

impl Default for ChronoBubbleTuning {
    fn default() -> Self {
        Self {
            radius: 120.0,
            duration: 8000,
            cooldown: 25000,
            slow_factor: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BarrageTuning {
    pub radius: f32,
    /// Player speed multiplier while aiming Barrage or Chrono Bubble.
    pub aim_slow_factor: f32,
    pub warning: Millis,
    pub strike_duration: Millis,
    pub cooldown: Millis,
    pub damage_per_tick: f32,
    pub impact_interval: Millis,
    /// Radius and impact interval multipliers when targeted inside a chrono bubble.
    pub chrono_radius_factor: f32,
    pub chrono_interval_factor: f32,
    pub shake_intensity: f32,
}

impl Default for BarrageTuning {
    fn default() -> Self {
        Self {
            radius: 100.0,
            aim_slow_factor: 0.4,
            warning: 1500,
            strike_duration: 2000,
            cooldown: 20000,
            damage_per_tick: 0.05,
            impact_interval: 75,
            chrono_radius_factor: 0.7,
            chrono_interval_factor: 0.6,
            shake_intensity: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ToxicRoundsTuning {
    pub duration: Millis,
    pub cooldown: Millis,
    pub poison: PoisonTuning,
}

impl Default for ToxicRoundsTuning {
    fn default() -> Self {
        Self {
            duration: 12000,
            cooldown: 25000,
            poison: PoisonTuning::default(),
        }
    }
}

/// Poison applied by Toxic Rounds hits.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PoisonTuning {
    /// Damage per stack per tick.
    pub tick_damage: f32,
    pub tick_interval: Millis,
    /// Lifetime measured from the most recent application.
    pub duration: Millis,
    pub max_stacks: u32,
}

impl Default for PoisonTuning {
    fn default() -> Self {
        Self {
            tick_damage: 0.02,
            tick_interval: 500,
            duration: 5000,
            max_stacks: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TimeStopTuning {
    pub charge_duration: Millis,
    pub duration: Millis,
    pub cooldown: Millis,

    /// Interval between shards banked from an active Cyber Beam.
    pub shard_interval: Millis,
    pub shard_damage: f32,
    pub shard_stun: Millis,
    pub shard_speed: f32,
    /// Homing turn rate in degrees per tick.
    pub shard_turn_rate: f32,
    pub shard_size: Size,
}

impl Default for TimeStopTuning {
    fn default() -> Self {
        Self {
            charge_duration: 2000,
            duration: 5000,
            cooldown: 20000,
            shard_interval: 120,
            shard_damage: 2.0,
            shard_stun: 1500,
            shard_speed: 4.5,
            shard_turn_rate: 8.0,
            shard_size: Size::new(12.0, 24.0),
        }
    }
}
