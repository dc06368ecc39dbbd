// Player ability loadout and its per-ability state machine.
//
// ready -> (charging | chargingHold | aiming | active) -> active -> cooldown -> ready

use crate::domain::Millis;
use crate::domain::tuning::AbilitiesTuning;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityId {
    Overdrive,
    CyberBeam,
    ChronoBubble,
    Barrage,
    ToxicRounds,
    TimeStop,
}

impl AbilityId {
    pub const ALL: [AbilityId; 6] = [
        AbilityId::Overdrive,
        AbilityId::CyberBeam,
        AbilityId::ChronoBubble,
        AbilityId::Barrage,
        AbilityId::ToxicRounds,
        AbilityId::TimeStop,
    ];

    fn index(self) -> usize {
        match self {
            AbilityId::Overdrive => 0,
            AbilityId::CyberBeam => 1,
            AbilityId::ChronoBubble => 2,
            AbilityId::Barrage => 3,
            AbilityId::ToxicRounds => 4,
            AbilityId::TimeStop => 5,
        }
    }

    /// Abilities that need a pointer confirmation before they go active.
    pub fn requires_target(self) -> bool {
        matches!(self, AbilityId::ChronoBubble | AbilityId::Barrage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AbilityState {
    Ready,
    Charging,
    ChargingHold,
    Active,
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ability {
    pub id: AbilityId,
    pub state: AbilityState,
    /// Start of the current `Charging`, `Active`, or `Cooldown` state.
    pub start_time: Millis,
    pub duration: Millis,
    pub cooldown: Millis,
    pub mastered: bool,
    /// Whether the current activation runs with mastered values.
    pub empowered: bool,
    pub charge_start_time: Millis,
    pub charge_duration: Millis,
}

impl Ability {
    fn new(id: AbilityId, duration: Millis, cooldown: Millis) -> Self {
        Self {
            id,
            state: AbilityState::Ready,
            start_time: 0,
            duration,
            cooldown,
            mastered: false,
            empowered: false,
            charge_start_time: 0,
            charge_duration: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == AbilityState::Ready
    }

    pub fn is_active(&self) -> bool {
        self.state == AbilityState::Active
    }

    /// Hold-charge progress in `0.0..=1.0`; zero outside `ChargingHold`.
    pub fn charge_progress(&self, now: Millis) -> f32 {
        if self.state != AbilityState::ChargingHold || self.charge_duration == 0 {
            return 0.0;
        }
        (now.saturating_sub(self.charge_start_time) as f32 / self.charge_duration as f32).min(1.0)
    }
}

/// What a key press did to an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    Ignored,
    /// Caller enters aiming mode; activation waits for `confirm`.
    Aiming,
    Charging,
    ChargingHold,
    Activated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Ignored,
    Committed,
    Cancelled,
}

/// Transitions emitted by `Abilities::tick` so the caller can run their side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityEvent {
    BeamCharged,
    BeamCancelled,
    /// The channel was released early or the player stopped being active.
    BeamInterrupted,
    Expired(AbilityId),
    Recovered(AbilityId),
}

/// Held inputs the state machine needs each tick.
#[derive(Debug, Clone, Copy)]
pub struct AbilityInputs {
    pub beam_held: bool,
    pub player_active: bool,
}

/// One slot per `AbilityId`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Abilities([Ability; 6]);

impl Abilities {
    pub fn new(tuning: &AbilitiesTuning) -> Self {
        let mut time_stop = Ability::new(
            AbilityId::TimeStop,
            tuning.time_stop.duration,
            tuning.time_stop.cooldown,
        );
        time_stop.charge_duration = tuning.time_stop.charge_duration;

        Self([
            Ability::new(
                AbilityId::Overdrive,
                tuning.overdrive.duration,
                tuning.overdrive.cooldown,
            ),
            Ability::new(
                AbilityId::CyberBeam,
                tuning.cyber_beam.duration,
                tuning.cyber_beam.cooldown,
            ),
            Ability::new(
                AbilityId::ChronoBubble,
                tuning.chrono_bubble.duration,
                tuning.chrono_bubble.cooldown,
            ),
            Ability::new(
                AbilityId::Barrage,
                tuning.barrage.warning + tuning.barrage.strike_duration,
                tuning.barrage.cooldown,
            ),
            Ability::new(
                AbilityId::ToxicRounds,
                tuning.toxic_rounds.duration,
                tuning.toxic_rounds.cooldown,
            ),
            time_stop,
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.0.iter()
    }

    pub fn is_active(&self, id: AbilityId) -> bool {
        self[id].is_active()
    }

    /// Key-down handling. Only a `Ready` ability reacts; everything else is ignored.
    pub fn press(&mut self, id: AbilityId, now: Millis, tuning: &AbilitiesTuning) -> Press {
        if !self[id].is_ready() {
            return Press::Ignored;
        }
        if id.requires_target() {
            return Press::Aiming;
        }
        match id {
            AbilityId::CyberBeam => {
                let beam = &mut self[id];
                beam.state = AbilityState::Charging;
                beam.start_time = now;
                Press::Charging
            }
            AbilityId::TimeStop => {
                let time_stop = &mut self[id];
                time_stop.state = AbilityState::ChargingHold;
                time_stop.charge_start_time = now;
                Press::ChargingHold
            }
            _ => {
                self.activate(id, now, tuning);
                Press::Activated
            }
        }
    }

    /// Pointer confirmation for an aimed ability.
    pub fn confirm(&mut self, id: AbilityId, now: Millis, tuning: &AbilitiesTuning) -> bool {
        if !self[id].is_ready() {
            return false;
        }
        self.activate(id, now, tuning);
        true
    }

    /// Key-up for the hold-to-charge ability: commit at full charge, otherwise lose it.
    pub fn release(&mut self, id: AbilityId, now: Millis) -> Release {
        let ability = &mut self[id];
        if ability.state != AbilityState::ChargingHold {
            return Release::Ignored;
        }
        if ability.charge_progress(now) >= 1.0 {
            ability.state = AbilityState::Active;
            ability.start_time = now;
            Release::Committed
        } else {
            ability.state = AbilityState::Ready;
            ability.charge_start_time = 0;
            Release::Cancelled
        }
    }

    fn activate(&mut self, id: AbilityId, now: Millis, tuning: &AbilitiesTuning) {
        let ability = &mut self[id];
        ability.state = AbilityState::Active;
        ability.start_time = now;
        if id == AbilityId::Overdrive {
            ability.empowered = ability.mastered;
            let overdrive = &tuning.overdrive;
            (ability.duration, ability.cooldown) = if ability.mastered {
                (overdrive.mastered_duration, overdrive.mastered_cooldown)
            } else {
                (overdrive.duration, overdrive.cooldown)
            };
        }
    }

    /// Forces an ability into cooldown starting now.
    pub fn start_cooldown(&mut self, id: AbilityId, now: Millis) {
        let ability = &mut self[id];
        ability.state = AbilityState::Cooldown;
        ability.start_time = now;
    }

    /// Advances every ability's timers and reports the transitions taken.
    pub fn tick(
        &mut self,
        now: Millis,
        inputs: AbilityInputs,
        tuning: &AbilitiesTuning,
    ) -> Vec<AbilityEvent> {
        let mut events = Vec::new();
        for ability in self.0.iter_mut() {
            if ability.id == AbilityId::CyberBeam {
                let keep_channel = inputs.beam_held && inputs.player_active;
                match ability.state {
                    AbilityState::Charging => {
                        if now >= ability.start_time + tuning.cyber_beam.charge_time {
                            ability.state = AbilityState::Active;
                            ability.start_time = now;
                            events.push(AbilityEvent::BeamCharged);
                        } else if !keep_channel {
                            ability.state = AbilityState::Ready;
                            ability.start_time = 0;
                            events.push(AbilityEvent::BeamCancelled);
                        }
                        continue;
                    }
                    AbilityState::Active if !keep_channel => {
                        ability.state = AbilityState::Cooldown;
                        ability.start_time = now;
                        events.push(AbilityEvent::BeamInterrupted);
                        continue;
                    }
                    _ => {}
                }
            }

            match ability.state {
                AbilityState::Active if now >= ability.start_time + ability.duration => {
                    ability.state = AbilityState::Cooldown;
                    ability.start_time = now;
                    events.push(AbilityEvent::Expired(ability.id));
                }
                AbilityState::Cooldown if now >= ability.start_time + ability.cooldown => {
                    ability.state = AbilityState::Ready;
                    ability.start_time = 0;
                    events.push(AbilityEvent::Recovered(ability.id));
                }
                _ => {}
            }
        }
        events
    }

    /// Flips Overdrive mastery once the kill threshold is reached. True only on the unlocking call.
    pub fn unlock_overdrive_mastery(&mut self, kills: u32, tuning: &AbilitiesTuning) -> bool {
        let overdrive = &mut self[AbilityId::Overdrive];
        if overdrive.mastered || kills < tuning.overdrive.mastery_kills {
            return false;
        }
        overdrive.mastered = true;
        true
    }

    pub fn speed_multiplier(&self, tuning: &AbilitiesTuning) -> f32 {
        if self.is_active(AbilityId::Overdrive) {
            tuning.overdrive.speed_multiplier
        } else {
            1.0
        }
    }

    pub fn fire_cooldown_multiplier(&self, tuning: &AbilitiesTuning) -> f32 {
        let overdrive = &self[AbilityId::Overdrive];
        match (overdrive.is_active(), overdrive.empowered) {
            (true, true) => tuning.overdrive.mastered_fire_cooldown_multiplier,
            (true, false) => tuning.overdrive.fire_cooldown_multiplier,
            _ => 1.0,
        }
    }

    pub fn damage_bonus(&self, tuning: &AbilitiesTuning) -> f32 {
        let overdrive = &self[AbilityId::Overdrive];
        if overdrive.is_active() && overdrive.empowered {
            tuning.overdrive.mastered_damage_bonus
        } else {
            0.0
        }
    }
}

impl Index<AbilityId> for Abilities {
    type Output = Ability;

    fn index(&self, id: AbilityId) -> &Ability {
        &self.0[id.index()]
    }
}

impl IndexMut<AbilityId> for Abilities {
    fn index_mut(&mut self, id: AbilityId) -> &mut Ability {
        &mut self.0[id.index()]
    }
}
