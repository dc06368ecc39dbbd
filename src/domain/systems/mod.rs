// The simulation tick and the per-step systems it runs.
//
// `advance` clones the previous snapshot, runs every step once in a fixed order against
// that copy, and hands back the next snapshot with the side effects raised on the way.

pub mod ability_tick;
pub mod boss;
pub mod collision;
pub mod deaths;
pub mod enemy_ai;
pub mod firing;
pub mod lifecycle;
pub mod persistent;
pub mod player;
pub mod projectiles;

use crate::domain::cues::{Cue, SideEffect};
use crate::domain::geometry::{Size, Vec2};
use crate::domain::input::PlayerInput;
use crate::domain::memory::EngineMemory;
use crate::domain::pathfinding::{NavGrid, build_nav_grid};
use crate::domain::state::{
    Actor, Animation, AnimationKind, DamageIndicator, DamageNumber, DamageTone, GameState, Tier,
};
use crate::domain::tuning::{Difficulty, DifficultyTuning, Tuning};
use crate::domain::Millis;

/// Everything fixed for the lifetime of a match: balance values, difficulty, and the nav grid.
#[derive(Debug, Clone)]
pub struct Rules {
    pub tuning: Tuning,
    pub difficulty: Difficulty,
    pub nav: NavGrid,
}

impl Rules {
    pub fn new(tuning: Tuning, difficulty: Difficulty) -> Self {
        let arena = &tuning.arena;
        let nav = build_nav_grid(
            arena.width,
            arena.height,
            arena.nav_cell_size,
            &arena.walls,
            tuning.tank.size,
        );
        Self {
            tuning,
            difficulty,
            nav,
        }
    }

    pub fn level(&self) -> &DifficultyTuning {
        self.tuning.difficulty.level(self.difficulty)
    }
}

/// Result of one tick.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub state: GameState,
    pub effects: Vec<SideEffect>,
}

/// Read-only inputs shared by every step of a tick.
#[derive(Clone, Copy)]
pub(crate) struct Ctx<'a> {
    pub now: Millis,
    pub tuning: &'a Tuning,
    pub level: &'a DifficultyTuning,
    pub nav: &'a NavGrid,
    pub input: &'a PlayerInput,
    /// Time-stop flag as it stood when the tick began.
    pub time_stopped: bool,
}

impl Ctx<'_> {
    pub fn enemy_speed(&self, tier: Tier) -> f32 {
        match tier {
            Tier::Basic => self.level.enemy_speed,
            Tier::Intermediate => {
                self.level.enemy_speed * self.tuning.difficulty.intermediate_speed_factor
            }
        }
    }

    pub fn fire_rate_modifier(&self, tier: Tier) -> f32 {
        match tier {
            Tier::Basic => self.level.fire_rate_modifier,
            Tier::Intermediate => {
                self.level.fire_rate_modifier * self.tuning.difficulty.intermediate_fire_rate_factor
            }
        }
    }
}

/// Presentation records and side effects raised during a tick, merged into the snapshot at the end.
pub(crate) struct Outbox {
    now: Millis,
    next_id: u64,
    pub animations: Vec<Animation>,
    pub damage_numbers: Vec<DamageNumber>,
    pub damage_indicators: Vec<DamageIndicator>,
    pub effects: Vec<SideEffect>,
}

impl Outbox {
    fn new(now: Millis, next_id: u64) -> Self {
        Self {
            now,
            next_id,
            animations: Vec::new(),
            damage_numbers: Vec::new(),
            damage_indicators: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn animate(&mut self, kind: AnimationKind, position: Vec2, duration: Millis) {
        self.animate_shaped(kind, position, 0.0, None, duration);
    }

    pub fn animate_shaped(
        &mut self,
        kind: AnimationKind,
        position: Vec2,
        angle: f32,
        size: Option<Size>,
        duration: Millis,
    ) {
        let id = self.alloc_id();
        self.animations.push(Animation {
            id,
            kind,
            created_at: self.now,
            duration,
            position,
            angle,
            size,
        });
    }

    pub fn damage_number(
        &mut self,
        text: String,
        position: Vec2,
        tone: DamageTone,
        duration: Millis,
    ) {
        let id = self.alloc_id();
        self.damage_numbers.push(DamageNumber {
            id,
            text,
            position,
            created_at: self.now,
            duration,
            tone,
        });
    }

    /// Indicator pointing from `target` toward `source`, in math degrees.
    pub fn indicator(&mut self, target: Vec2, source: Vec2, duration: Millis) {
        let id = self.alloc_id();
        let angle = (source.y - target.y).atan2(source.x - target.x).to_degrees();
        self.damage_indicators.push(DamageIndicator {
            id,
            angle,
            created_at: self.now,
            duration,
        });
    }

    pub fn play(&mut self, cue: Cue) {
        self.effects.push(SideEffect::PlayCue { cue });
    }

    pub fn stop(&mut self, cue: Cue) {
        self.effects.push(SideEffect::StopCue { cue });
    }

    pub fn shake(&mut self, intensity: f32, duration: Millis) {
        self.effects.push(SideEffect::Shake {
            intensity,
            duration,
        });
    }
}

/// Working set for one tick.
pub(crate) struct Frame<'a> {
    pub state: GameState,
    pub memory: &'a mut EngineMemory,
    pub out: Outbox,
    pub ctx: Ctx<'a>,
}

impl Frame<'_> {
    fn finish(self) -> TickOutcome {
        let Frame {
            mut state,
            memory,
            out,
            ..
        } = self;
        memory.next_id = out.next_id;
        state.animations.extend(out.animations);
        state.damage_numbers.extend(out.damage_numbers);
        state.damage_indicators.extend(out.damage_indicators);
        TickOutcome {
            state,
            effects: out.effects,
        }
    }
}

/// Runs one simulation tick at wall-clock `now`.
///
/// Steps run in this order, each seeing the results of the ones before it:
/// expiry, lifecycles, player, AI, firing, persistent effects, projectiles,
/// deaths, ability timers, boss director.
pub fn advance(
    prev: &GameState,
    memory: &mut EngineMemory,
    input: &PlayerInput,
    now: Millis,
    rules: &Rules,
) -> TickOutcome {
    let ctx = Ctx {
        now,
        tuning: &rules.tuning,
        level: rules.level(),
        nav: &rules.nav,
        input,
        time_stopped: prev.is_time_stopped,
    };
    let next_id = memory.next_id;
    let mut frame = Frame {
        state: prev.clone(),
        memory,
        out: Outbox::new(now, next_id),
        ctx,
    };

    lifecycle::expire(&mut frame);
    lifecycle::update(&mut frame);
    player::update(&mut frame);
    enemy_ai::update(&mut frame);
    firing::update(&mut frame);
    persistent::update(&mut frame);
    projectiles::update(&mut frame);
    deaths::update(&mut frame);
    ability_tick::update(&mut frame);
    boss::update(&mut frame);

    frame.finish()
}

/// Anchor for floating numbers: just above the actor's hull.
pub(crate) fn label_position(actor: &Actor) -> Vec2 {
    Vec2::new(actor.position.x, actor.position.y - actor.size.height / 2.0)
}

/// Whole numbers without decimals, everything else with one.
pub(crate) fn hit_text(damage: f32) -> String {
    if damage.fract() == 0.0 {
        format!("{damage:.0}")
    } else {
        format!("{damage:.1}")
    }
}

pub(crate) fn tick_text(damage: f32) -> String {
    format!("{damage:.2}")
}

pub(crate) fn heavy_text(damage: f32) -> String {
    format!("{damage:.1}")
}
