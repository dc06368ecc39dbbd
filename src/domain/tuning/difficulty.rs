use crate::domain::Millis;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// Enemy AI parameters for one difficulty level.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Basic-tier movement speed in pixels per tick.
    pub enemy_speed: f32,
    /// Enemies only fire at a player within this distance.
    pub detection_radius: f32,
    /// Divides the enemy fire cooldown; higher fires faster.
    pub fire_rate_modifier: f32,
    pub path_recalc_interval: Millis,
    /// Enemies path toward where the player was this long ago.
    pub pathing_target_lag: Millis,
    pub path_smoothing: bool,
    /// Uniform aim jitter bound in degrees.
    pub aim_error: f32,
    /// Upper bound of the random firing hesitation.
    pub hesitation: Millis,
    /// Turret tracking speed in degrees per tick.
    pub turret_turn_rate: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        DifficultyTable::default().medium
    }
}

/// Per-level AI parameters plus the intermediate-tier multipliers.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    pub easy: DifficultyTuning,
    pub medium: DifficultyTuning,
    pub hard: DifficultyTuning,
    pub intermediate_speed_factor: f32,
    pub intermediate_fire_rate_factor: f32,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultyTuning {
                enemy_speed: 0.5,
                detection_radius: 250.0,
                fire_rate_modifier: 0.4,
                path_recalc_interval: 4000,
                pathing_target_lag: 700,
                path_smoothing: false,
                aim_error: 5.0,
                hesitation: 500,
                turret_turn_rate: 1.0,
            },
            medium: DifficultyTuning {
                enemy_speed: 0.75,
                detection_radius: 350.0,
                fire_rate_modifier: 1.0,
                path_recalc_interval: 2000,
                pathing_target_lag: 0,
                path_smoothing: true,
                aim_error: 2.0,
                hesitation: 100,
                turret_turn_rate: 2.0,
            },
            hard: DifficultyTuning {
                enemy_speed: 0.95,
                detection_radius: 500.0,
                fire_rate_modifier: 2.2,
                path_recalc_interval: 800,
                pathing_target_lag: 0,
                path_smoothing: true,
                aim_error: 0.0,
                hesitation: 0,
                turret_turn_rate: 4.0,
            },
            intermediate_speed_factor: 1.1,
            intermediate_fire_rate_factor: 1.2,
        }
    }
}

impl DifficultyTable {
    pub fn level(&self, difficulty: Difficulty) -> &DifficultyTuning {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }
}
