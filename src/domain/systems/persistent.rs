// Step 6: effects that persist across ticks once triggered (Barrage strikes, the Cyber Beam).

use super::{Frame, label_position, tick_text};
use crate::domain::abilities::AbilityId;
use crate::domain::cues::Cue;
use crate::domain::geometry::{Vec2, segment_intersects_rect};
use crate::domain::state::{AnimationKind, DamageTone, PLAYER_ID, PendingShard, PowerUpType};
use rand::Rng;

pub(crate) fn update(frame: &mut Frame<'_>) {
    barrage(frame);
    cyber_beam(frame);
}

fn barrage(frame: &mut Frame<'_>) {
    let Frame {
        state,
        memory,
        out,
        ctx,
    } = frame;
    let now = ctx.now;
    let tuning = &ctx.tuning.abilities.barrage;
    let Some(strike) = state.barrage.as_mut() else {
        return;
    };
    if ctx.time_stopped || now < strike.strike_start {
        return;
    }
    if now > strike.strike_start + tuning.strike_duration {
        return;
    }

    let (radius, interval) = if strike.chrono_boosted {
        (
            tuning.radius * tuning.chrono_radius_factor,
            tuning.impact_interval as f32 * tuning.chrono_interval_factor,
        )
    } else {
        (tuning.radius, tuning.impact_interval as f32)
    };
    let target = strike.target;

    for hostile in state.hostiles.iter_mut().filter(|h| h.is_active()) {
        let reach = if hostile.is_boss() {
            radius + hostile.size.width / 2.0
        } else {
            radius
        };
        if hostile.position.distance(target) > reach {
            continue;
        }
        hostile.take_damage(tuning.damage_per_tick, Some(PLAYER_ID), now);
        out.damage_number(
            tick_text(tuning.damage_per_tick),
            label_position(hostile),
            DamageTone::Barrage,
            ctx.tuning.effects.damage_number,
        );
    }

    if now.saturating_sub(strike.last_impact) as f32 > interval {
        strike.last_impact = now;
        out.play(Cue::Shot);
        let rng = &mut memory.rng;
        let impact = Vec2::new(
            target.x + rng.gen_range(-1.0..1.0) * radius,
            target.y + rng.gen_range(-1.0..1.0) * radius,
        );
        out.animate(
            AnimationKind::BarrageImpact,
            impact,
            ctx.tuning.effects.barrage_impact,
        );
    }
}

fn cyber_beam(frame: &mut Frame<'_>) {
    let Frame {
        state,
        memory,
        out,
        ctx,
    } = frame;
    let now = ctx.now;
    let tuning = ctx.tuning;
    let beam = &tuning.abilities.cyber_beam;
    if !state.abilities.is_active(AbilityId::CyberBeam) {
        return;
    }

    let player = &mut state.player;
    let angle = player.turret_angle;
    let muzzle = player.position.offset(angle, tuning.tank.barrel_length);

    if ctx.time_stopped {
        if now.saturating_sub(memory.last_chrono_shard) > tuning.abilities.time_stop.shard_interval {
            memory.last_chrono_shard = now;
            state.chrono_shards.push(PendingShard {
                position: muzzle,
                angle,
                created_at: now,
            });
        }
        state.cyber_beam_target = None;
        return;
    }

    let Some(end) = state.cyber_beam_target else {
        return;
    };
    let starts = if player.active_power_up == Some(PowerUpType::DualCannon) {
        let spacing = player.size.width * tuning.power_ups.dual_cannon_offset;
        vec![
            muzzle.offset(angle + 90.0, spacing),
            muzzle.offset(angle - 90.0, spacing),
        ]
    } else {
        vec![muzzle]
    };
    let toxic = state.abilities.is_active(AbilityId::ToxicRounds);
    let leech = player.active_power_up == Some(PowerUpType::LifeLeech);

    for target in state.hostiles.iter_mut().filter(|h| h.is_active()) {
        let rect = target.rect();
        if !starts.iter().any(|&start| segment_intersects_rect(start, end, &rect)) {
            continue;
        }
        let last = memory.beam_damage.get(&target.id).copied().unwrap_or(0);
        if now.saturating_sub(last) <= beam.damage_interval {
            continue;
        }
        memory.beam_damage.insert(target.id, now);
        if target.health <= 0.0 {
            continue;
        }

        target.take_damage(beam.damage, Some(PLAYER_ID), now);
        let tone = if toxic {
            DamageTone::Toxic
        } else {
            DamageTone::Beam
        };
        out.damage_number(
            tick_text(beam.damage),
            label_position(target),
            tone,
            tuning.effects.beam_damage_number,
        );
        if leech {
            player.heal(beam.damage * tuning.power_ups.life_leech_fraction);
        }
        if toxic {
            let last_poison = memory.beam_poison.get(&target.id).copied().unwrap_or(0);
            if now.saturating_sub(last_poison) > beam.poison_interval {
                memory.beam_poison.insert(target.id, now);
                target.status_effects.apply_poison(
                    1,
                    PLAYER_ID,
                    now,
                    &tuning.abilities.toxic_rounds.poison,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Rules;
    use super::super::test_support::{active_match, with_frame};
    use super::*;
    use crate::domain::abilities::AbilityState;
    use crate::domain::cues::SideEffect;
    use crate::domain::input::PlayerInput;
    use crate::domain::state::{BarrageStrike, GameState};
    use crate::domain::tuning::{Difficulty, Tuning};

    fn rules() -> Rules {
        Rules::new(Tuning::default(), Difficulty::Medium)
    }

    fn beam_on(state: &mut GameState, now: u64) {
        let beam = &mut state.abilities[AbilityId::CyberBeam];
        beam.state = AbilityState::Active;
        beam.start_time = now;
    }

    #[test]
    fn when_barrage_is_striking_then_enemies_in_radius_take_tick_damage() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        let target = state.hostiles[0].position;
        state.barrage = Some(BarrageStrike {
            target,
            chrono_boosted: false,
            strike_start: 1_000,
            last_impact: 0,
        });

        let outcome = with_frame(&state, &mut memory, &PlayerInput::default(), 1_500, &rules, update);

        let enemy = &outcome.state.hostiles[0];
        let expected = rules.tuning.tank.health - rules.tuning.abilities.barrage.damage_per_tick;
        assert!((enemy.health - expected).abs() < 1e-6);
        assert_eq!(enemy.last_damaged_by, Some(PLAYER_ID));
        assert_eq!(outcome.state.hostiles[1].health, rules.tuning.tank.health);
        assert_eq!(outcome.state.damage_numbers[0].text, "0.05");
        assert!(outcome
            .effects
            .contains(&SideEffect::PlayCue { cue: Cue::Shot }));
        assert_eq!(outcome.state.barrage.map(|b| b.last_impact), Some(1_500));
    }

    #[test]
    fn when_barrage_is_still_in_warning_then_nothing_is_hit() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.barrage = Some(BarrageStrike {
            target: state.hostiles[0].position,
            chrono_boosted: false,
            strike_start: 2_000,
            last_impact: 0,
        });

        let outcome = with_frame(&state, &mut memory, &PlayerInput::default(), 1_500, &rules, update);

        assert_eq!(outcome.state.hostiles[0].health, rules.tuning.tank.health);
        assert!(outcome.effects.is_empty());
    }

    #[test]
    fn when_beam_crosses_an_enemy_then_it_deals_damage_once_per_interval() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.position = Vec2::new(100.0, 400.0);
        state.player.turret_angle = 0.0;
        state.cyber_beam_target = Some(Vec2::new(100.0, 50.0));
        beam_on(&mut state, 0);

        let first = with_frame(&state, &mut memory, &PlayerInput::default(), 1_000, &rules, update);
        let hit = rules.tuning.tank.health - rules.tuning.abilities.cyber_beam.damage;
        assert!((first.state.hostiles[0].health - hit).abs() < 1e-6);
        assert_eq!(first.state.damage_numbers[0].tone, DamageTone::Beam);

        let second = with_frame(&first.state, &mut memory, &PlayerInput::default(), 1_020, &rules, update);
        assert!((second.state.hostiles[0].health - hit).abs() < 1e-6);
    }

    #[test]
    fn when_time_is_stopped_then_beam_banks_chrono_shards_instead() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.position = Vec2::new(100.0, 400.0);
        state.cyber_beam_target = Some(Vec2::new(100.0, 50.0));
        state.is_time_stopped = true;
        beam_on(&mut state, 0);

        let outcome = with_frame(&state, &mut memory, &PlayerInput::default(), 1_000, &rules, update);

        assert_eq!(outcome.state.chrono_shards.len(), 1);
        assert_eq!(outcome.state.cyber_beam_target, None);
        assert_eq!(outcome.state.hostiles[0].health, rules.tuning.tank.health);
    }
}
