// Steps 1 and 2: expire presentation records, then move every actor through
// spawning -> active -> dying -> respawn/removal. Also owns world power-up spawns,
// power-up expiry, regen, and status-effect ticks.

use super::collision::find_safe_spawn_point;
use super::{Frame, label_position, tick_text};
use crate::domain::geometry::Size;
use crate::domain::state::{
    Actor, ActorKind, ActorStatus, DamageTone, MatchPhase, PowerUp, PowerUpType, Tier,
    starting_enemies,
};
use crate::domain::tuning::Tuning;
use crate::domain::Millis;
use rand::Rng;
use std::iter;
use tracing::{debug, info};

pub(crate) fn expire(frame: &mut Frame<'_>) {
    let now = frame.ctx.now;
    let state = &mut frame.state;
    let live = |created_at: Millis, duration: Millis| now.saturating_sub(created_at) < duration;

    state.animations.retain(|a| live(a.created_at, a.duration));
    state.damage_numbers.retain(|d| live(d.created_at, d.duration));
    state
        .damage_indicators
        .retain(|d| live(d.created_at, d.duration));
    state.effect_zones.retain(|z| live(z.created_at, z.duration));
    // Telegraph countdowns are suspended while time is stopped.
    if !frame.ctx.time_stopped {
        state.telegraphs.retain(|t| live(t.created_at, t.duration));
    }
    let mastery_duration = frame.ctx.tuning.effects.mastery_notification;
    if state
        .mastery_notification
        .as_ref()
        .is_some_and(|n| !live(n.start_time, mastery_duration))
    {
        state.mastery_notification = None;
    }
}

pub(crate) fn update(frame: &mut Frame<'_>) {
    spawn_power_up(frame);
    update_player(frame);
    if !frame.ctx.time_stopped {
        update_hostiles(frame);
        tick_hostile_status(frame);
    }
}

fn spawn_power_up(frame: &mut Frame<'_>) {
    let Frame {
        state,
        memory,
        out,
        ctx,
    } = frame;
    let tuning = &ctx.tuning.power_ups;
    if ctx.time_stopped
        || ctx.now.saturating_sub(memory.last_power_up_spawn) <= tuning.spawn_interval
        || state.power_ups.len() >= tuning.max_on_field
    {
        return;
    }
    memory.last_power_up_spawn = ctx.now;

    let kind = PowerUpType::ALL[memory.rng.gen_range(0..PowerUpType::ALL.len())];
    let size = Size::new(tuning.size, tuning.size);
    let solid = iter::once(&state.player).chain(state.hostiles.iter());
    let position = find_safe_spawn_point(&mut memory.rng, &ctx.tuning.arena, size, solid);
    debug!(?kind, x = position.x, y = position.y, "power-up spawned");
    state.power_ups.push(PowerUp {
        id: out.alloc_id(),
        kind,
        position,
    });
}

/// Clears a timed-out power-up. Regensule gives back its bonus max health.
fn expire_power_up(actor: &mut Actor, now: Millis, base_health: f32) {
    if actor.active_power_up.is_none() || now <= actor.power_up_expire_time {
        return;
    }
    if actor.active_power_up == Some(PowerUpType::Regensule) {
        actor.max_health = base_health;
        actor.health = actor.health.min(base_health);
    }
    actor.active_power_up = None;
    actor.power_up_expire_time = 0;
    actor.shield_health = 0;
    if let ActorKind::Player { homing_missiles } = &mut actor.kind {
        *homing_missiles = 0;
    }
}

fn update_player(frame: &mut Frame<'_>) {
    let Frame {
        state,
        memory,
        ctx,
        ..
    } = frame;
    let now = ctx.now;
    let tuning = ctx.tuning;

    match state.player.status {
        ActorStatus::Spawning
            if now >= state.player.spawn_time + tuning.tank.spawn_duration =>
        {
            state.player.status = ActorStatus::Active;
        }
        ActorStatus::Dying if now >= state.player.death_time + tuning.tank.death_duration => {
            let avoid = state
                .hostiles
                .iter()
                .filter(|a| a.is_boss() || a.tier().is_some());
            let position =
                find_safe_spawn_point(&mut memory.rng, &tuning.arena, tuning.tank.size, avoid);
            let old = &state.player;
            let mut fresh = Actor::player(old.name.clone(), position, now, tuning);
            fresh.score = old.score;
            fresh.kills = old.kills;
            fresh.deaths = old.deaths + 1;
            info!(deaths = fresh.deaths, "player respawned");
            state.player = fresh;
        }
        _ => {}
    }

    expire_power_up(&mut state.player, now, tuning.tank.health);

    let power_ups = &tuning.power_ups;
    if state.player.active_power_up == Some(PowerUpType::Regensule)
        && now.saturating_sub(memory.last_regen) > power_ups.regensule_interval
    {
        state.player.heal(power_ups.regensule_regen);
        memory.last_regen = now;
    }
}

enum Transition {
    Activate,
    Respawn,
    Remove,
}

fn transition(actor: &Actor, now: Millis, tuning: &Tuning) -> Option<Transition> {
    match (&actor.kind, actor.status) {
        (ActorKind::Minion, ActorStatus::Spawning) => {
            (now >= actor.spawn_time + tuning.minion.spawn_duration).then_some(Transition::Activate)
        }
        (_, ActorStatus::Spawning) => {
            (now >= actor.spawn_time + tuning.tank.spawn_duration).then_some(Transition::Activate)
        }
        (ActorKind::Enemy { respawn_time, .. }, ActorStatus::Dying) => {
            (now >= *respawn_time).then_some(Transition::Respawn)
        }
        (ActorKind::Minion, ActorStatus::Dying) => {
            (now >= actor.death_time + tuning.tank.death_duration).then_some(Transition::Remove)
        }
        (ActorKind::Boss { .. }, ActorStatus::Dying) => {
            (now >= actor.death_time + tuning.tank.death_duration * 2).then_some(Transition::Remove)
        }
        _ => None,
    }
}

fn update_hostiles(frame: &mut Frame<'_>) {
    let Frame {
        state, memory, ctx, ..
    } = frame;
    let now = ctx.now;
    let tuning: &Tuning = ctx.tuning;
    let respawn_tier = match state.match_phase {
        MatchPhase::PostBoss => Tier::Intermediate,
        _ => Tier::Basic,
    };

    let mut boss_removed = false;
    let mut removed = Vec::new();
    for i in 0..state.hostiles.len() {
        match transition(&state.hostiles[i], now, tuning) {
            Some(Transition::Activate) => {
                let actor = &mut state.hostiles[i];
                actor.status = ActorStatus::Active;
                if let ActorKind::Boss { attack, .. } = &mut actor.kind {
                    attack.phase_start = now;
                    info!("boss active");
                }
            }
            Some(Transition::Respawn) => {
                let id = state.hostiles[i].id;
                let avoid = iter::once(&state.player)
                    .chain(state.hostiles.iter().filter(move |a| a.id != id));
                let position =
                    find_safe_spawn_point(&mut memory.rng, &tuning.arena, tuning.tank.size, avoid);
                let old = &state.hostiles[i];
                let mut fresh =
                    Actor::enemy(id, old.name.clone(), position, respawn_tier, now, tuning);
                fresh.score = old.score;
                fresh.kills = old.kills;
                fresh.deaths = old.deaths + 1;
                debug!(actor_id = id, deaths = fresh.deaths, "enemy respawned");
                state.hostiles[i] = fresh;
                memory.last_position.remove(&id);
            }
            Some(Transition::Remove) => {
                let actor = &state.hostiles[i];
                boss_removed |= actor.is_boss();
                removed.push(actor.id);
            }
            None => {}
        }

        if state.hostiles[i].tier().is_some() {
            expire_power_up(&mut state.hostiles[i], now, tuning.tank.health);
        }
    }

    if !removed.is_empty() {
        state.hostiles.retain(|a| !removed.contains(&a.id));
        for id in removed {
            memory.forget(id);
        }
    }

    if boss_removed && state.match_phase == MatchPhase::Boss {
        state.match_phase = MatchPhase::PostBoss;
        state
            .hostiles
            .extend(starting_enemies(Tier::Intermediate, now, tuning, &mut memory.rng));
        info!("boss defeated, intermediate enemies deployed");
    }
}

/// Poison ticks and stun expiry for hostiles that are in play.
fn tick_hostile_status(frame: &mut Frame<'_>) {
    let Frame {
        state,
        memory,
        out,
        ctx,
    } = frame;
    let now = ctx.now;
    for actor in state.hostiles.iter_mut().filter(|a| a.is_active()) {
        let Some(tick) = actor.status_effects.tick(now) else {
            continue;
        };
        actor.take_damage(tick.damage, Some(tick.owner_id), now);
        let mut position = label_position(actor);
        position.x += memory.rng.gen_range(-10.0..10.0);
        out.damage_number(
            tick_text(tick.damage),
            position,
            DamageTone::Poison,
            ctx.tuning.effects.damage_number,
        );
    }
}
