use crate::domain::Millis;
use crate::domain::geometry::{Rect, Size, Vec2};
use serde::Deserialize;

/// Gameplay tuning for the boss encounter.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    /// Player score that triggers the encounter.
    pub spawn_score: u32,
    pub spawn_position: Vec2,
    pub health: f32,
    pub size: Size,

    /// Patrol speed in pixels per tick.
    pub speed: f32,

    /// Pause between attacks in milliseconds.
    pub idle_duration: Millis,

    /// Turret tracking speed in degrees per tick.
    pub turret_turn_rate: f32,

    /// Region patrol targets are sampled from.
    pub patrol_area: Rect,

    /// Distance at which a patrol target counts as reached.
    pub patrol_arrive_distance: f32,

    pub kill_score: u32,

    pub mortar: MortarTuning,
    pub laser: LaserTuning,
    pub multi_lane: MultiLaneTuning,
    pub x_pattern: XPatternTuning,
    pub last_stand: LastStandTuning,
    pub summon: SummonTuning,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            spawn_score: 350,
            spawn_position: Vec2::new(500.0, 120.0),
            health: 100.0,
            size: Size::new(120.0, 150.0),
            speed: 0.5,
            idle_duration: 3000,
            turret_turn_rate: 2.5,
            patrol_area: Rect::new(100.0, 80.0, 800.0, 100.0),
            patrol_arrive_distance: 20.0,
            kill_score: 1000,
            mortar: MortarTuning::default(),
            laser: LaserTuning::default(),
            multi_lane: MultiLaneTuning::default(),
            x_pattern: XPatternTuning::default(),
            last_stand: LastStandTuning::default(),
            summon: SummonTuning::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MortarTuning {
    pub telegraph: Millis,
    pub attack: Millis,
    pub strikes: u32,
    pub radius: f32,
    pub damage: f32,
    /// Impact points are jittered up to this far from the player on each axis.
    pub spread: f32,
}

impl Default for MortarTuning {
    fn default() -> Self {
        Self {
            telegraph: 2000,
            attack: 500,
            strikes: 5,
            radius: 40.0,
            damage: 1.5,
            spread: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LaserTuning {
    pub telegraph: Millis,
    pub attack: Millis,
    pub range: f32,
    /// Angular half-width of the beam in degrees.
    pub half_width: f32,
    pub damage: f32,
    pub damage_interval: Millis,
    /// Total sweep in degrees, centred on the recorded turret angle.
    pub sweep_arc: f32,
}

impl Default for LaserTuning {
    fn default() -> Self {
        Self {
            telegraph: 1500,
            attack: 3000,
            range: 800.0,
            half_width: 5.0,
            damage: 0.15,
            damage_interval: 100,
            sweep_arc: 90.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MultiLaneTuning {
    pub telegraph: Millis,
    pub attack: Millis,
    pub damage: f32,
    pub lane_width: f32,
    pub lane_spacing: f32,
}

impl Default for MultiLaneTuning {
    fn default() -> Self {
        Self {
            telegraph: 1800,
            attack: 500,
            damage: 1.2,
            lane_width: 80.0,
            lane_spacing: 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct XPatternTuning {
    pub telegraph: Millis,
    pub attack: Millis,
    pub damage: f32,
    pub lane_width: f32,
    /// Lane length as a multiple of arena width.
    pub length_factor: f32,
}

impl Default for XPatternTuning {
    fn default() -> Self {
        Self {
            telegraph: 1500,
            attack: 500,
            damage: 1.5,
            lane_width: 60.0,
            length_factor: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LastStandTuning {
    /// Health ratio at or below which the last stand triggers.
    pub health_fraction: f32,
    pub telegraph: Millis,
    pub radius: f32,
    pub attack: Millis,
    /// Portion of the attack phase during which the blast is lethal.
    pub lethal_window: Millis,
}

impl Default for LastStandTuning {
    fn default() -> Self {
        Self {
            health_fraction: 0.15,
            telegraph: 6500,
            radius: 500.0,
            attack: 2500,
            lethal_window: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SummonTuning {
    pub telegraph: Millis,
    pub count: u32,
    /// Arc in degrees the minions are spread over.
    pub arc: f32,
    /// Summon distance as a fraction of boss width.
    pub distance_factor: f32,
}

impl Default for SummonTuning {
    fn default() -> Self {
        Self {
            telegraph: 2000,
            count: 4,
            arc: 120.0,
            distance_factor: 0.7,
        }
    }
}
