// Gameplay balance table. Every value has a shipped default; a TOML file can override any subset.

pub mod abilities;
pub mod arena;
pub mod boss;
pub mod difficulty;
pub mod effects;
pub mod minion;
pub mod power_ups;
pub mod projectile;
pub mod tank;

pub use abilities::{AbilitiesTuning, PoisonTuning};
pub use arena::ArenaTuning;
pub use boss::BossTuning;
pub use difficulty::{Difficulty, DifficultyTable, DifficultyTuning};
pub use effects::EffectsTuning;
pub use minion::MinionTuning;
pub use power_ups::PowerUpTuning;
pub use projectile::ProjectileTuning;
pub use tank::TankTuning;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub tank: TankTuning,
    pub projectile: ProjectileTuning,
    pub boss: BossTuning,
    pub minion: MinionTuning,
    pub abilities: AbilitiesTuning,
    pub power_ups: PowerUpTuning,
    pub difficulty: DifficultyTable,
    pub effects: EffectsTuning,
}
