// Step 3: player movement, aim, and power-up pickup.

use super::Frame;
use super::collision::{is_blocked_by_environment, slide};
use crate::domain::geometry::{Rect, Size, Vec2, heading, rect_overlap};
use crate::domain::state::{Actor, ActorKind, PowerUpType};
use crate::domain::tuning::{PowerUpTuning, Tuning};
use crate::domain::Millis;

pub(crate) fn update(frame: &mut Frame<'_>) {
    let Frame {
        state,
        memory,
        ctx,
        ..
    } = frame;
    let tuning = ctx.tuning;
    let zone_factor = state.zone_speed_factor(state.player.position);
    let player = &mut state.player;

    if !player.is_active() {
        player.velocity = Vec2::default();
        memory.record_player_position(ctx.now, player.position);
        return;
    }

    let dir = ctx.input.direction();
    if dir != Vec2::default() {
        let aim_slow = if state.aiming.is_some() {
            tuning.abilities.barrage.aim_slow_factor
        } else {
            1.0
        };
        let speed = tuning.tank.speed
            * state.abilities.speed_multiplier(&tuning.abilities)
            * aim_slow
            * zone_factor;
        let len = dir.x.hypot(dir.y);
        let velocity = Vec2::new(dir.x / len * speed, dir.y / len * speed);

        let hostiles = &state.hostiles;
        player.position = slide(player.position, velocity, player.size, |rect| {
            is_blocked_by_environment(rect, &tuning.arena, hostiles)
        });
        player.angle = heading(dir.x, dir.y);
        player.velocity = velocity;
    } else {
        player.velocity = Vec2::default();
    }
    player.turret_angle = player.position.heading_to(ctx.input.aim);
    memory.record_player_position(ctx.now, player.position);

    let reach = player.rect();
    let pickup_size = Size::new(tuning.power_ups.size, tuning.power_ups.size);
    if let Some(index) = state
        .power_ups
        .iter()
        .position(|p| rect_overlap(&reach, &Rect::centered(p.position, pickup_size)))
    {
        let power_up = state.power_ups.remove(index);
        grant_player_power_up(player, power_up.kind, ctx.now, tuning);
    }
}

/// Replaces whatever the player was carrying with `kind`.
pub(crate) fn grant_player_power_up(
    player: &mut Actor,
    kind: PowerUpType,
    now: Millis,
    tuning: &Tuning,
) {
    let p: &PowerUpTuning = &tuning.power_ups;
    if player.active_power_up == Some(PowerUpType::Regensule) && kind != PowerUpType::Regensule {
        player.max_health = tuning.tank.health;
        player.health = player.health.min(player.max_health);
    }
    player.active_power_up = Some(kind);
    player.power_up_expire_time = now
        + match kind {
            PowerUpType::Shield => {
                player.shield_health = p.shield_hits;
                p.shield_duration
            }
            PowerUpType::DualCannon => p.dual_cannon_duration,
            PowerUpType::Regensule => {
                player.max_health += p.regensule_health_bonus;
                player.health += p.regensule_health_bonus;
                p.regensule_duration
            }
            PowerUpType::ReflectorField => p.reflector_duration,
            PowerUpType::LifeLeech => p.life_leech_duration,
            PowerUpType::HomingMissiles => {
                if let ActorKind::Player { homing_missiles } = &mut player.kind {
                    *homing_missiles = p.homing_count;
                }
                p.homing_duration
            }
        };
}
