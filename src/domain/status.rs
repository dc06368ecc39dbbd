// Timed status effects carried by any actor: stacking poison and stun.

use crate::domain::tuning::PoisonTuning;
use crate::domain::{ActorId, Millis};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Poison {
    pub owner_id: ActorId,
    pub stacks: u32,
    pub last_applied: Millis,
    pub last_tick: Millis,
    pub duration: Millis,
    pub tick_interval: Millis,
    pub tick_damage: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stun {
    pub start_time: Millis,
    pub duration: Millis,
}

/// At most one poison and one stun at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusEffects {
    pub poison: Option<Poison>,
    pub stun: Option<Stun>,
}

/// Poison damage dealt during a tick, with the actor to credit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoisonTick {
    pub damage: f32,
    pub owner_id: ActorId,
}

impl StatusEffects {
    /// Adds stacks (capped) and refreshes the lifetime; duration never accumulates.
    pub fn apply_poison(
        &mut self,
        stacks: u32,
        owner_id: ActorId,
        now: Millis,
        tuning: &PoisonTuning,
    ) {
        match self.poison.as_mut() {
            Some(poison) => {
                poison.stacks = (poison.stacks + stacks).min(tuning.max_stacks);
                poison.last_applied = now;
                poison.owner_id = owner_id;
            }
            None => {
                self.poison = Some(Poison {
                    owner_id,
                    stacks: stacks.min(tuning.max_stacks),
                    last_applied: now,
                    last_tick: now,
                    duration: tuning.duration,
                    tick_interval: tuning.tick_interval,
                    tick_damage: tuning.tick_damage,
                });
            }
        }
    }

    /// Replaces any running stun with a fresh one starting now.
    pub fn apply_stun(&mut self, duration: Millis, now: Millis) {
        self.stun = Some(Stun {
            start_time: now,
            duration,
        });
    }

    pub fn is_stunned(&self, now: Millis) -> bool {
        self.stun
            .is_some_and(|stun| now.saturating_sub(stun.start_time) <= stun.duration)
    }

    /// Expires finished effects and returns poison damage due this tick, if any.
    pub fn tick(&mut self, now: Millis) -> Option<PoisonTick> {
        if let Some(stun) = self.stun {
            if now.saturating_sub(stun.start_time) > stun.duration {
                self.stun = None;
            }
        }

        let poison = self.poison.as_mut()?;
        if now.saturating_sub(poison.last_applied) > poison.duration {
            self.poison = None;
            return None;
        }
        if now.saturating_sub(poison.last_tick) > poison.tick_interval {
            poison.last_tick = now;
            return Some(PoisonTick {
                damage: poison.tick_damage * poison.stacks as f32,
                owner_id: poison.owner_id,
            });
        }
        None
    }
}
