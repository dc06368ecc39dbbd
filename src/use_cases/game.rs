use super::input::{Binding, ControlScheme, Direction};
use super::types::{
    Clock, EffectError, EffectSink, FrameUpdate, FrameView, SessionCommand, SessionOutput,
};
use crate::domain::abilities::{AbilityId, AbilityState, Press, Release};
use crate::domain::geometry::Vec2;
use crate::domain::state::{AttackKind, AttackPhase, BarrageStrike, EffectZone, GameState};
use crate::domain::{
    Cue, EngineMemory, Millis, PlayerInput, Rules, SideEffect, TickOutcome, advance,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Notify, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const LAST_STAND_MAX_TINT: f32 = 0.4;
const LOG_THROTTLE: Duration = Duration::from_secs(2);

/// One tick's worth of output.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub frame: FrameUpdate,
    pub effects: Vec<SideEffect>,
}

/// A single-player match: the world snapshot, its cross-tick memory, and the held input.
pub struct Engine {
    state: GameState,
    memory: EngineMemory,
    input: PlayerInput,
    rules: Rules,
    controls: ControlScheme,
    paused: bool,
    tick: u64,
}

impl Engine {
    pub fn new(rules: Rules, controls: ControlScheme, seed: u64, now: Millis) -> Self {
        let mut memory = EngineMemory::new(seed);
        let state = GameState::new(now, &rules.tuning, &mut memory.rng);
        memory.last_power_up_spawn = now;
        info!(difficulty = %rules.difficulty, %controls, seed, "match started");
        Self {
            state,
            memory,
            input: PlayerInput::default(),
            rules,
            controls,
            paused: false,
            tick: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn input(&self) -> &PlayerInput {
        &self.input
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Applies one input edge. Returns the side effects it raised directly (beam charge cue,
    /// barrage shake); everything else happens on the next tick.
    pub fn handle(&mut self, command: SessionCommand, now: Millis) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        match command {
            SessionCommand::KeyDown { key } => match self.controls.binding(&key) {
                Some(Binding::Move(direction)) => self.set_direction(direction, true),
                Some(Binding::Fire) => self.input.fire = true,
                Some(Binding::Ability(id)) => self.press(id, now, &mut effects),
                None => {}
            },
            SessionCommand::KeyUp { key } => match self.controls.binding(&key) {
                Some(Binding::Move(direction)) => self.set_direction(direction, false),
                Some(Binding::Fire) => self.input.fire = false,
                Some(Binding::Ability(id)) => self.release(id, now),
                None => {}
            },
            SessionCommand::PointerMove { x, y } => self.input.aim = Vec2::new(x, y),
            SessionCommand::ScreenPointer {
                x,
                y,
                width,
                height,
            } => {
                if width <= 0.0 || height <= 0.0 {
                    return effects;
                }
                let arena = &self.rules.tuning.arena;
                self.input.aim = Vec2::new(x * arena.width / width, y * arena.height / height);
            }
            SessionCommand::PointerDown => self.confirm(now, &mut effects),
            SessionCommand::Visibility { visible } => {
                if self.paused == visible {
                    debug!(paused = !visible, "visibility changed");
                }
                self.paused = !visible;
            }
        }
        effects
    }

    /// Runs one tick unless the session is paused.
    pub fn tick(&mut self, now: Millis) -> Option<TickReport> {
        if self.paused {
            return None;
        }
        let TickOutcome { state, effects } =
            advance(&self.state, &mut self.memory, &self.input, now, &self.rules);
        self.state = state;
        self.tick += 1;
        Some(TickReport {
            frame: FrameUpdate {
                tick: self.tick,
                state: self.state.clone(),
                view: self.view(now),
            },
            effects,
        })
    }

    /// Renderer-facing values derived from the current snapshot.
    pub fn view(&self, now: Millis) -> FrameView {
        let state = &self.state;
        let beam = state.abilities[AbilityId::CyberBeam].state;
        let cursor_shooting = self.input.fire
            || matches!(beam, AbilityState::Charging | AbilityState::Active)
            || state.aiming.is_some();

        let last_stand_tint = state
            .boss()
            .and_then(|boss| boss.attack())
            .filter(|attack| {
                attack.kind == AttackKind::LastStand && attack.phase == AttackPhase::Telegraphing
            })
            .map_or(0.0, |attack| {
                let elapsed = now.saturating_sub(attack.phase_start) as f32;
                let progress = (elapsed / attack.telegraph.max(1) as f32).min(1.0);
                LAST_STAND_MAX_TINT * progress * progress
            });

        let mastery_window = self.rules.tuning.effects.mastery_notification;
        FrameView {
            cursor_shooting,
            last_stand_tint,
            time_stop_progress: state.abilities[AbilityId::TimeStop].charge_progress(now),
            mastery_visible: state
                .mastery_notification
                .as_ref()
                .is_some_and(|note| now.saturating_sub(note.start_time) < mastery_window),
        }
    }

    fn set_direction(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.input.up = held,
            Direction::Down => self.input.down = held,
            Direction::Left => self.input.left = held,
            Direction::Right => self.input.right = held,
        }
    }

    fn press(&mut self, id: AbilityId, now: Millis, effects: &mut Vec<SideEffect>) {
        if id == AbilityId::CyberBeam {
            self.input.beam_held = true;
        }
        if !self.state.player.is_active() {
            return;
        }
        match self
            .state
            .abilities
            .press(id, now, &self.rules.tuning.abilities)
        {
            Press::Aiming => self.state.aiming = Some(id),
            Press::Charging => effects.push(SideEffect::PlayCue {
                cue: Cue::BeamCharge,
            }),
            Press::Activated => debug!(ability = ?id, "ability activated"),
            Press::ChargingHold | Press::Ignored => {}
        }
    }

    fn release(&mut self, id: AbilityId, now: Millis) {
        match id {
            AbilityId::CyberBeam => self.input.beam_held = false,
            AbilityId::ChronoBubble | AbilityId::Barrage => {
                if self.state.aiming == Some(id) {
                    self.state.aiming = None;
                }
            }
            AbilityId::TimeStop => match self.state.abilities.release(id, now) {
                Release::Committed => {
                    self.state.is_time_stopped = true;
                    info!("time stopped");
                }
                Release::Cancelled => debug!("time stop charge released early"),
                Release::Ignored => {}
            },
            AbilityId::Overdrive | AbilityId::ToxicRounds => {}
        }
    }

    fn confirm(&mut self, now: Millis, effects: &mut Vec<SideEffect>) {
        let Some(id) = self.state.aiming.take() else {
            return;
        };
        if !self.state.player.is_active() {
            return;
        }
        let tuning = &self.rules.tuning.abilities;
        if !self.state.abilities.confirm(id, now, tuning) {
            return;
        }
        let target = self.input.aim;
        match id {
            AbilityId::Barrage => {
                let barrage = &tuning.barrage;
                self.state.barrage = Some(BarrageStrike {
                    target,
                    chrono_boosted: self.state.is_in_chrono_zone(target),
                    strike_start: now + barrage.warning,
                    last_impact: 0,
                });
                effects.push(SideEffect::Shake {
                    intensity: barrage.shake_intensity,
                    duration: barrage.warning + barrage.strike_duration,
                });
            }
            AbilityId::ChronoBubble => {
                let bubble = &tuning.chrono_bubble;
                self.state.effect_zones.push(EffectZone {
                    id: self.memory.next_id(),
                    position: target,
                    radius: bubble.radius,
                    created_at: now,
                    duration: bubble.duration,
                    slow_factor: bubble.slow_factor,
                });
            }
            _ => {}
        }
        debug!(ability = ?id, x = target.x, y = target.y, "aimed ability confirmed");
    }
}

/// Counts and throttles delivery failures so a stalled consumer does not flood the log.
struct Delivery {
    dropped: u64,
    last_warn: Option<Instant>,
}

impl Delivery {
    fn send(&mut self, sink: &mut impl EffectSink, output: SessionOutput) {
        let Err(err) = sink.deliver(output) else {
            return;
        };
        self.dropped += 1;
        if self.last_warn.is_none_or(|at| at.elapsed() >= LOG_THROTTLE) {
            self.last_warn = Some(Instant::now());
            match err {
                EffectError::Full => warn!(dropped = self.dropped, %err, "session output dropped"),
                EffectError::Closed => warn!(dropped = self.dropped, %err, "session output undeliverable"),
            }
        }
    }
}

/// Drives one session at `tick_interval` until the command channel closes or `shutdown` fires.
///
/// Each iteration drains queued commands without blocking, then (unless paused) reads the clock
/// once and runs exactly one tick. Frames and side effects go to `sink`.
pub async fn world_task(
    mut engine: Engine,
    mut commands: mpsc::Receiver<SessionCommand>,
    mut sink: impl EffectSink,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut interval = tokio::time::interval(tick_interval);
    // Hidden or slow frames are never caught up.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut delivery = Delivery {
        dropped: 0,
        last_warn: None,
    };

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!("session shut down");
                break;
            }
            _ = interval.tick() => {}
        }

        let now = clock.now();
        let mut input_closed = false;
        loop {
            match commands.try_recv() {
                Ok(command) => {
                    for effect in engine.handle(command, now) {
                        delivery.send(&mut sink, SessionOutput::Effect(effect));
                    }
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    input_closed = true;
                    break;
                }
            }
        }
        if input_closed {
            info!(ticks = engine.ticks(), "session input closed");
            break;
        }

        let Some(report) = engine.tick(now) else {
            continue;
        };
        for effect in report.effects {
            delivery.send(&mut sink, SessionOutput::Effect(effect));
        }
        delivery.send(&mut sink, SessionOutput::Frame(Box::new(report.frame)));
    }
}
