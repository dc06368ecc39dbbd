// Step 9: ability timers and the side effects of their transitions.

use super::Frame;
use super::projectiles::chrono_shard;
use crate::domain::abilities::{AbilityEvent, AbilityId, AbilityInputs};
use crate::domain::cues::Cue;
use crate::domain::geometry::Vec2;
use crate::domain::state::GameState;
use tracing::info;

pub(crate) fn update(frame: &mut Frame<'_>) {
    let Frame { state, out, ctx, .. } = frame;
    let now = ctx.now;
    let tuning = &ctx.tuning.abilities;
    let aim = ctx.input.aim;

    let inputs = AbilityInputs {
        beam_held: ctx.input.beam_held,
        player_active: state.player.is_active(),
    };
    let mut just_charged = false;
    for event in state.abilities.tick(now, inputs, tuning) {
        match event {
            AbilityEvent::BeamCharged => {
                just_charged = true;
                state.cyber_beam_target = Some(aim);
                out.stop(Cue::BeamCharge);
                out.play(Cue::BeamActive);
            }
            AbilityEvent::BeamCancelled => out.stop(Cue::BeamCharge),
            AbilityEvent::BeamInterrupted | AbilityEvent::Expired(AbilityId::CyberBeam) => {
                out.stop(Cue::BeamActive);
                state.cyber_beam_target = None;
            }
            AbilityEvent::Expired(AbilityId::Barrage) => state.barrage = None,
            AbilityEvent::Expired(AbilityId::TimeStop) => unfreeze(state),
            AbilityEvent::Expired(_) | AbilityEvent::Recovered(_) => {}
        }
    }

    if state.abilities.is_active(AbilityId::CyberBeam) && !state.is_time_stopped && !just_charged {
        let from = state.cyber_beam_target.unwrap_or(aim);
        let t = tuning.cyber_beam.smoothing;
        state.cyber_beam_target = Some(Vec2::new(
            from.x + (aim.x - from.x) * t,
            from.y + (aim.y - from.y) * t,
        ));
    }

    if state.is_time_stopped && !state.abilities.is_active(AbilityId::TimeStop) {
        state.is_time_stopped = false;
        unfreeze(state);

        let shards = std::mem::take(&mut state.chrono_shards);
        if shards.is_empty() {
            return;
        }
        let targets: Vec<_> = state
            .hostiles
            .iter()
            .filter(|h| h.is_active())
            .map(|h| h.id)
            .collect();
        for (i, shard) in shards.iter().enumerate() {
            let target = (!targets.is_empty()).then(|| targets[i % targets.len()]);
            let id = out.alloc_id();
            state
                .projectiles
                .push(chrono_shard(id, shard.position, shard.angle, target, *ctx));
        }
        info!(shards = shards.len(), "time resumed, chrono shards released");

        if state.abilities.is_active(AbilityId::CyberBeam) {
            state.abilities.start_cooldown(AbilityId::CyberBeam, now);
        }
        out.stop(Cue::BeamActive);
        state.cyber_beam_target = None;
    }
}

fn unfreeze(state: &mut GameState) {
    for projectile in &mut state.projectiles {
        projectile.is_frozen = false;
    }
}
