// Cross-tick bookkeeping that is not part of the rendered state.

use crate::domain::geometry::Vec2;
use crate::domain::{ActorId, Millis};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, VecDeque};

/// How far back the player position trail reaches.
const PLAYER_HISTORY_WINDOW: Millis = 4000;

/// First id handed out for projectiles, minions, and presentation records.
/// Lower ids are reserved for the player, the boss, and the fixed enemy slots.
const FIRST_DYNAMIC_ID: u64 = 1000;

/// Timers and samples the tick carries from one call to the next.
///
/// Owned by the session next to the `GameState`; `advance` receives it mutably.
#[derive(Debug, Clone)]
pub struct EngineMemory {
    pub rng: ChaCha8Rng,
    pub(crate) next_id: u64,
    pub last_fire: HashMap<ActorId, Millis>,
    pub last_power_up_spawn: Millis,
    pub last_regen: Millis,
    pub last_laser_damage: Millis,
    pub last_chrono_shard: Millis,
    pub beam_damage: HashMap<ActorId, Millis>,
    pub beam_poison: HashMap<ActorId, Millis>,
    pub last_path_recalc: HashMap<ActorId, Millis>,
    /// Position sample used for stuck detection, per enemy.
    pub last_position: HashMap<ActorId, (Millis, Vec2)>,
    player_history: VecDeque<(Millis, Vec2)>,
}

impl EngineMemory {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_id: FIRST_DYNAMIC_ID,
            last_fire: HashMap::new(),
            last_power_up_spawn: 0,
            last_regen: 0,
            last_laser_damage: 0,
            last_chrono_shard: 0,
            beam_damage: HashMap::new(),
            beam_poison: HashMap::new(),
            last_path_recalc: HashMap::new(),
            last_position: HashMap::new(),
            player_history: VecDeque::new(),
        }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn last_fire(&self, id: ActorId) -> Millis {
        self.last_fire.get(&id).copied().unwrap_or(0)
    }

    pub fn record_player_position(&mut self, now: Millis, position: Vec2) {
        self.player_history.push_back((now, position));
        while self
            .player_history
            .front()
            .is_some_and(|&(t, _)| t + PLAYER_HISTORY_WINDOW <= now)
        {
            self.player_history.pop_front();
        }
    }

    /// Oldest recorded player position no older than `at`, or the newest one if all are older.
    pub fn player_position_at(&self, at: Millis) -> Option<Vec2> {
        self.player_history
            .iter()
            .find(|&&(t, _)| t >= at)
            .or_else(|| self.player_history.back())
            .map(|&(_, p)| p)
    }

    /// Drops per-actor timers for an actor that left the match.
    pub fn forget(&mut self, id: ActorId) {
        self.last_fire.remove(&id);
        self.beam_damage.remove(&id);
        self.beam_poison.remove(&id);
        self.last_path_recalc.remove(&id);
        self.last_position.remove(&id);
    }
}
