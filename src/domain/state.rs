// Match state: actors, projectiles, world items, and the presentation records the renderer reads.

use crate::domain::abilities::{Abilities, AbilityId};
use crate::domain::geometry::{OrientedRect, Rect, Size, Vec2};
use crate::domain::status::StatusEffects;
use crate::domain::tuning::Tuning;
use crate::domain::{ActorId, Millis};
use rand::Rng;
use serde::Serialize;

pub const PLAYER_ID: ActorId = 1;
pub const BOSS_ID: ActorId = 2;
pub const FIRST_ENEMY_ID: ActorId = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActorStatus {
    Spawning,
    Active,
    Dying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    Basic,
    Intermediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PowerUpType {
    DualCannon,
    Shield,
    Regensule,
    ReflectorField,
    LifeLeech,
    HomingMissiles,
}

impl PowerUpType {
    pub const ALL: [PowerUpType; 6] = [
        PowerUpType::DualCannon,
        PowerUpType::Shield,
        PowerUpType::Regensule,
        PowerUpType::ReflectorField,
        PowerUpType::LifeLeech,
        PowerUpType::HomingMissiles,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttackKind {
    None,
    MortarVolley,
    LaserSweep,
    MultiLane,
    XPattern,
    LastStand,
    SummonMinions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttackPhase {
    Idle,
    Telegraphing,
    Attacking,
}

/// Parameters fixed when an attack is chosen; resolution never re-targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttackData {
    Mortar { targets: Vec<Vec2> },
    Laser { sweep_start: f32 },
    Lanes { origin: Vec2, angle: f32 },
    Summon { targets: Vec<Vec2> },
    LastStand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttackState {
    pub kind: AttackKind,
    pub phase: AttackPhase,
    pub phase_start: Millis,
    pub telegraph: Millis,
    pub attack: Millis,
    pub data: Option<AttackData>,
}

impl AttackState {
    pub fn idle(now: Millis) -> Self {
        Self {
            kind: AttackKind::None,
            phase: AttackPhase::Idle,
            phase_start: now,
            telegraph: 0,
            attack: 0,
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ActorKind {
    Player {
        homing_missiles: u32,
    },
    Enemy {
        tier: Tier,
        patrol_target: Option<Vec2>,
        path: Vec<Vec2>,
        respawn_time: Millis,
    },
    Boss {
        patrol_target: Option<Vec2>,
        attack: AttackState,
        has_used_last_stand: bool,
    },
    Minion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub name: String,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Body facing in degrees.
    pub angle: f32,
    /// Aim facing in degrees. Minions aim with their body.
    pub turret_angle: f32,
    pub size: Size,
    pub health: f32,
    pub max_health: f32,
    pub status: ActorStatus,
    pub spawn_time: Millis,
    pub death_time: Millis,
    pub last_hit_time: Millis,
    /// Credited with the kill if this life ends.
    pub last_damaged_by: Option<ActorId>,
    pub status_effects: StatusEffects,
    pub active_power_up: Option<PowerUpType>,
    pub power_up_expire_time: Millis,
    pub shield_health: u32,
    pub score: u32,
    pub kills: u32,
    pub deaths: u32,
}

impl Actor {
    fn base(id: ActorId, kind: ActorKind, name: String, position: Vec2, size: Size) -> Self {
        Self {
            id,
            kind,
            name,
            position,
            velocity: Vec2::default(),
            angle: 180.0,
            turret_angle: 180.0,
            size,
            health: 0.0,
            max_health: 0.0,
            status: ActorStatus::Spawning,
            spawn_time: 0,
            death_time: 0,
            last_hit_time: 0,
            last_damaged_by: None,
            status_effects: StatusEffects::default(),
            active_power_up: None,
            power_up_expire_time: 0,
            shield_health: 0,
            score: 0,
            kills: 0,
            deaths: 0,
        }
    }

    fn spawned(mut self, health: f32, now: Millis) -> Self {
        self.health = health;
        self.max_health = health;
        self.spawn_time = now;
        self
    }

    pub fn player(name: String, position: Vec2, now: Millis, tuning: &Tuning) -> Self {
        let mut player = Self::base(
            PLAYER_ID,
            ActorKind::Player { homing_missiles: 0 },
            name,
            position,
            tuning.tank.size,
        )
        .spawned(tuning.tank.health, now);
        player.angle = 0.0;
        player.turret_angle = 0.0;
        player
    }

    pub fn enemy(
        id: ActorId,
        name: String,
        position: Vec2,
        tier: Tier,
        now: Millis,
        tuning: &Tuning,
    ) -> Self {
        Self::base(
            id,
            ActorKind::Enemy {
                tier,
                patrol_target: None,
                path: Vec::new(),
                respawn_time: 0,
            },
            name,
            position,
            tuning.tank.size,
        )
        .spawned(tuning.tank.health, now)
    }

    pub fn boss(now: Millis, tuning: &Tuning) -> Self {
        Self::base(
            BOSS_ID,
            ActorKind::Boss {
                patrol_target: None,
                attack: AttackState::idle(now),
                has_used_last_stand: false,
            },
            "Goliath".to_string(),
            tuning.boss.spawn_position,
            tuning.boss.size,
        )
        .spawned(tuning.boss.health, now)
    }

    pub fn minion(id: ActorId, position: Vec2, now: Millis, tuning: &Tuning) -> Self {
        Self::base(
            id,
            ActorKind::Minion,
            format!("minion-{id}"),
            position,
            tuning.minion.size,
        )
        .spawned(tuning.minion.health, now)
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.position, self.size)
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, ActorKind::Boss { .. })
    }

    /// The boss's current attack; `None` for every other kind.
    pub fn attack(&self) -> Option<&AttackState> {
        match &self.kind {
            ActorKind::Boss { attack, .. } => Some(attack),
            _ => None,
        }
    }

    pub fn attack_mut(&mut self) -> Option<&mut AttackState> {
        match &mut self.kind {
            ActorKind::Boss { attack, .. } => Some(attack),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ActorStatus::Active
    }

    /// Active or spawning actors block movement and spawn points.
    pub fn is_solid(&self) -> bool {
        matches!(self.status, ActorStatus::Active | ActorStatus::Spawning)
    }

    pub fn is_invulnerable(&self, now: Millis, window: Millis) -> bool {
        self.status == ActorStatus::Spawning && now.saturating_sub(self.spawn_time) < window
    }

    pub fn tier(&self) -> Option<Tier> {
        match self.kind {
            ActorKind::Enemy { tier, .. } => Some(tier),
            _ => None,
        }
    }

    /// Subtracts health and records the attacker. No status checks.
    pub fn take_damage(&mut self, amount: f32, source: Option<ActorId>, now: Millis) {
        self.health -= amount;
        self.last_hit_time = now;
        if source.is_some() {
            self.last_damaged_by = source;
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProjectileKind {
    Standard,
    HomingMissile,
    ChronoShard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projectile {
    pub id: u64,
    pub owner_id: ActorId,
    pub position: Vec2,
    pub angle: f32,
    pub size: Size,
    /// Pixels per tick before chrono slow.
    pub speed: f32,
    pub damage: f32,
    pub kind: ProjectileKind,
    /// Degrees per tick for homing kinds.
    pub turn_rate: f32,
    pub target_id: Option<ActorId>,
    pub is_frozen: bool,
}

impl Projectile {
    pub fn rect_at(&self, position: Vec2) -> Rect {
        Rect::centered(position, self.size)
    }

    pub fn is_homing(&self) -> bool {
        matches!(
            self.kind,
            ProjectileKind::HomingMissile | ProjectileKind::ChronoShard
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnimationKind {
    MuzzleFlash,
    Hit,
    Explosion,
    ShieldHit,
    ShieldBreak,
    BarrageImpact,
    LaneAttack,
    MortarStrike,
    FinalBlast,
    HomingExplosion,
    ChronoShardImpact,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    pub id: u64,
    pub kind: AnimationKind,
    pub created_at: Millis,
    pub duration: Millis,
    pub position: Vec2,
    pub angle: f32,
    /// Footprint for shaped animations (lanes, final blast).
    pub size: Option<Size>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TelegraphShape {
    Circle { center: Vec2, radius: f32 },
    Lane(OrientedRect),
}

/// Display-only warning. Attack resolution recomputes its own geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Telegraph {
    pub shape: TelegraphShape,
    pub created_at: Millis,
    pub duration: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectZone {
    pub id: u64,
    pub position: Vec2,
    pub radius: f32,
    pub created_at: Millis,
    pub duration: Millis,
    pub slow_factor: f32,
}

impl EffectZone {
    pub fn contains(&self, p: Vec2) -> bool {
        self.position.distance(p) < self.radius
    }
}

/// Which kind of hit produced a floating number; the renderer maps it to a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DamageTone {
    PlayerShot,
    HostileShot,
    Toxic,
    Beam,
    Barrage,
    Poison,
    HomingDirect,
    HomingSplash,
    ChronoShard,
    BossAttack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageNumber {
    pub id: u64,
    pub text: String,
    pub position: Vec2,
    pub created_at: Millis,
    pub duration: Millis,
    pub tone: DamageTone,
}

/// Direction (degrees, math convention) from the player toward a damage source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DamageIndicator {
    pub id: u64,
    pub angle: f32,
    pub created_at: Millis,
    pub duration: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerUp {
    pub id: u64,
    pub kind: PowerUpType,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarrageStrike {
    pub target: Vec2,
    pub chrono_boosted: bool,
    pub strike_start: Millis,
    pub last_impact: Millis,
}

/// Beam shot banked during time stop, released when time resumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendingShard {
    pub position: Vec2,
    pub angle: f32,
    pub created_at: Millis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasteryNotification {
    pub text: String,
    pub start_time: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchPhase {
    PreBoss,
    Boss,
    PostBoss,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameState {
    pub player: Actor,
    /// Enemies, the boss, and minions.
    pub hostiles: Vec<Actor>,
    pub projectiles: Vec<Projectile>,
    pub animations: Vec<Animation>,
    pub power_ups: Vec<PowerUp>,
    pub abilities: Abilities,
    pub aiming: Option<AbilityId>,
    pub barrage: Option<BarrageStrike>,
    pub cyber_beam_target: Option<Vec2>,
    pub telegraphs: Vec<Telegraph>,
    pub effect_zones: Vec<EffectZone>,
    pub mastery_notification: Option<MasteryNotification>,
    pub is_time_stopped: bool,
    pub damage_numbers: Vec<DamageNumber>,
    pub damage_indicators: Vec<DamageIndicator>,
    pub chrono_shards: Vec<PendingShard>,
    pub match_phase: MatchPhase,
}

impl GameState {
    /// Fresh match: player at the bottom, three basic enemies along the top.
    pub fn new<R: Rng + ?Sized>(now: Millis, tuning: &Tuning, rng: &mut R) -> Self {
        let player = Actor::player(
            "Player_One".to_string(),
            tuning.arena.player_spawn,
            now,
            tuning,
        );
        Self {
            player,
            hostiles: starting_enemies(Tier::Basic, now, tuning, rng),
            projectiles: Vec::new(),
            animations: Vec::new(),
            power_ups: Vec::new(),
            abilities: Abilities::new(&tuning.abilities),
            aiming: None,
            barrage: None,
            cyber_beam_target: None,
            telegraphs: Vec::new(),
            effect_zones: Vec::new(),
            mastery_notification: None,
            is_time_stopped: false,
            damage_numbers: Vec::new(),
            damage_indicators: Vec::new(),
            chrono_shards: Vec::new(),
            match_phase: MatchPhase::PreBoss,
        }
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        if id == self.player.id {
            return Some(&self.player);
        }
        self.hostiles.iter().find(|a| a.id == id)
    }

    pub fn boss(&self) -> Option<&Actor> {
        self.hostiles.iter().find(|a| a.is_boss())
    }

    pub fn boss_mut(&mut self) -> Option<&mut Actor> {
        self.hostiles.iter_mut().find(|a| a.is_boss())
    }

    pub fn is_in_chrono_zone(&self, p: Vec2) -> bool {
        self.effect_zones.iter().any(|zone| zone.contains(p))
    }

    /// Slow factor of the first zone covering `p`, or 1.0.
    pub fn zone_speed_factor(&self, p: Vec2) -> f32 {
        self.effect_zones
            .iter()
            .find(|zone| zone.contains(p))
            .map_or(1.0, |zone| zone.slow_factor)
    }
}

/// The three fixed enemy slots, used at match start and after the boss falls.
pub fn starting_enemies<R: Rng + ?Sized>(
    tier: Tier,
    now: Millis,
    tuning: &Tuning,
    rng: &mut R,
) -> Vec<Actor> {
    tuning
        .arena
        .enemy_spawns
        .iter()
        .zip(FIRST_ENEMY_ID..)
        .map(|(&position, id)| Actor::enemy(id, callsign(rng), position, tier, now, tuning))
        .collect()
}

const CALLSIGN_PREFIXES: [&str; 12] = [
    "Cypher", "Glitch", "Void", "Data", "Hex", "Neuro", "Synth", "Zero", "Ghost", "Chrome",
    "Blade", "Pulse",
];
const CALLSIGN_SUFFIXES: [&str; 12] = [
    "Runner", "Specter", "Byte", "Jacker", "Mancer", "Drifter", "Warden", "Freak", "Nomad",
    "Tech", "Rogue", "Hunter",
];

/// Random `Prefix_SuffixNN` handle for an enemy tank.
pub fn callsign<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix = CALLSIGN_PREFIXES[rng.gen_range(0..CALLSIGN_PREFIXES.len())];
    let suffix = CALLSIGN_SUFFIXES[rng.gen_range(0..CALLSIGN_SUFFIXES.len())];
    let number = rng.gen_range(10..100);
    format!("{prefix}_{suffix}{number}")
}
