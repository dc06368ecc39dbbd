// Step 4: enemy steering, patrol, and turret tracking; minion aim.
//
// Nothing here runs while time is stopped.

use super::collision::{find_safe_spawn_point, is_blocked_by_environment, slide};
use super::{Ctx, Frame};
use crate::domain::Millis;
use crate::domain::geometry::{Rect, Size, Vec2, normalize_degrees, rect_overlap, turn_towards};
use crate::domain::memory::EngineMemory;
use crate::domain::pathfinding::{find_path, has_line_of_sight, smooth_path};
use crate::domain::state::{Actor, ActorKind, GameState, PowerUp, PowerUpType};
use crate::domain::tuning::Tuning;
use std::iter;

pub(crate) fn update(frame: &mut Frame<'_>) {
    let Frame {
        state, memory, ctx, ..
    } = frame;
    let ctx = *ctx;
    if ctx.time_stopped {
        return;
    }

    for index in 0..state.hostiles.len() {
        let hostile = &state.hostiles[index];
        if !hostile.is_active() || hostile.status_effects.is_stunned(ctx.now) {
            continue;
        }
        match hostile.kind {
            ActorKind::Enemy { .. } => drive_enemy(state, memory, ctx, index),
            ActorKind::Minion => {
                let target = state.player.position;
                let minion = &mut state.hostiles[index];
                minion.angle = minion.position.heading_to(target);
                minion.turret_angle = minion.angle;
            }
            ActorKind::Player { .. } | ActorKind::Boss { .. } => {}
        }
    }
}

fn drive_enemy(state: &mut GameState, memory: &mut EngineMemory, ctx: Ctx<'_>, index: usize) {
    let now = ctx.now;
    let tuning = ctx.tuning;
    let level = ctx.level;
    let arena = &tuning.arena;
    let reach = ctx.nav.cell_size();

    let mut enemy = state.hostiles[index].clone();
    let (tier, mut patrol_target, mut path) = match &mut enemy.kind {
        ActorKind::Enemy {
            tier,
            patrol_target,
            path,
            ..
        } => (*tier, patrol_target.take(), std::mem::take(path)),
        _ => return,
    };
    collect_power_up(&mut enemy, &mut state.power_ups, now, tuning);

    let id = enemy.id;
    let start = enemy.position;
    let player_pos = state.player.position;
    let targetable = state.player.is_solid();
    let zone = state.zone_speed_factor(start);
    let others = state
        .hostiles
        .iter()
        .filter(move |a| a.id != id)
        .chain(iter::once(&state.player));

    let goal = if targetable && has_line_of_sight(start, player_pos, &arena.walls) {
        path.clear();
        Some(player_pos)
    } else if targetable {
        let last_recalc = memory.last_path_recalc.get(&id).copied().unwrap_or(0);
        if path.is_empty() || now.saturating_sub(last_recalc) >= level.path_recalc_interval {
            let lagged = memory
                .player_position_at(now.saturating_sub(level.pathing_target_lag))
                .unwrap_or(player_pos);
            path = plan_path(ctx, start, lagged);
            memory.last_path_recalc.insert(id, now);
        }
        next_waypoint(&mut path, start, reach).or(Some(player_pos))
    } else {
        let arrived = patrol_target.is_none_or(|t| t.distance(start) < reach);
        if arrived || path.is_empty() {
            let target = find_safe_spawn_point(&mut memory.rng, arena, enemy.size, others.clone());
            path = plan_path(ctx, start, target);
            patrol_target = Some(target);
        }
        next_waypoint(&mut path, start, reach).or(patrol_target)
    };

    let speed = ctx.enemy_speed(tier) * zone;
    let mut next = start;
    if let Some(goal) = goal {
        let distance = start.distance(goal);
        if distance > speed {
            let velocity = Vec2::new(
                (goal.x - start.x) / distance * speed,
                (goal.y - start.y) / distance * speed,
            );
            next = slide(start, velocity, enemy.size, |rect| {
                is_blocked_by_environment(rect, arena, others.clone())
            });
        }
    }
    if start.distance(next) > 0.1 {
        enemy.angle = start.heading_to(next);
    }
    enemy.velocity = Vec2::new(next.x - start.x, next.y - start.y);
    enemy.position = next;

    if is_stuck(memory, id, now, next, tuning) && goal.is_some() {
        path.clear();
        patrol_target = None;
    }

    if targetable {
        let wanted = next.heading_to(player_pos);
        enemy.turret_angle = normalize_degrees(turn_towards(
            enemy.turret_angle,
            wanted,
            level.turret_turn_rate * zone,
        ));
    }

    if let ActorKind::Enemy {
        patrol_target: slot_target,
        path: slot_path,
        ..
    } = &mut enemy.kind
    {
        *slot_target = patrol_target;
        *slot_path = path;
    }
    state.hostiles[index] = enemy;
}

/// Enemies pick up anything they drive over but only benefit from shields and dual cannons.
fn collect_power_up(enemy: &mut Actor, power_ups: &mut Vec<PowerUp>, now: Millis, tuning: &Tuning) {
    let body = enemy.rect();
    let size = Size::new(tuning.power_ups.size, tuning.power_ups.size);
    let Some(index) = power_ups
        .iter()
        .position(|p| rect_overlap(&body, &Rect::centered(p.position, size)))
    else {
        return;
    };
    let power_up = power_ups.remove(index);
    match power_up.kind {
        PowerUpType::Shield => {
            enemy.active_power_up = Some(PowerUpType::Shield);
            enemy.shield_health = tuning.power_ups.shield_hits;
            enemy.power_up_expire_time = now + tuning.power_ups.shield_duration;
        }
        PowerUpType::DualCannon => {
            enemy.active_power_up = Some(PowerUpType::DualCannon);
            enemy.power_up_expire_time = now + tuning.power_ups.dual_cannon_duration;
        }
        _ => {}
    }
}

fn plan_path(ctx: Ctx<'_>, from: Vec2, to: Vec2) -> Vec<Vec2> {
    let walls = &ctx.tuning.arena.walls;
    find_path(ctx.nav, from, to)
        .map(|path| {
            if ctx.level.path_smoothing {
                smooth_path(&path, walls)
            } else {
                path
            }
        })
        .unwrap_or_default()
}

/// Drops waypoints already reached and returns the next one to steer at.
fn next_waypoint(path: &mut Vec<Vec2>, position: Vec2, reach: f32) -> Option<Vec2> {
    let reached = path
        .iter()
        .take_while(|w| w.distance(position) < reach / 2.0)
        .count();
    path.drain(..reached);
    path.first().copied()
}

/// Samples the position once per stuck window; true when the enemy barely moved across it.
fn is_stuck(
    memory: &mut EngineMemory,
    id: u64,
    now: Millis,
    position: Vec2,
    tuning: &Tuning,
) -> bool {
    match memory.last_position.get(&id).copied() {
        Some((sampled_at, sampled)) if now.saturating_sub(sampled_at) >= tuning.tank.stuck_window => {
            memory.last_position.insert(id, (now, position));
            sampled.distance(position) < tuning.tank.stuck_threshold
        }
        Some(_) => false,
        None => {
            memory.last_position.insert(id, (now, position));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Rules;
    use super::super::test_support::{active_match, with_frame};
    use super::*;
    use crate::domain::input::PlayerInput;
    use crate::domain::state::ActorStatus;
    use crate::domain::tuning::Difficulty;

    fn rules() -> Rules {
        Rules::new(Tuning::default(), Difficulty::Medium)
    }

    fn enemy_kind(actor: &Actor) -> (Option<Vec2>, &[Vec2]) {
        match &actor.kind {
            ActorKind::Enemy {
                patrol_target,
                path,
                ..
            } => (*patrol_target, path.as_slice()),
            _ => panic!("not an enemy"),
        }
    }

    #[test]
    fn when_player_is_in_sight_then_enemy_steers_straight_at_them() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.position = Vec2::new(100.0, 600.0);

        let outcome = with_frame(&state, &mut memory, &PlayerInput::default(), 100, &rules, update);

        let enemy = &outcome.state.hostiles[0];
        assert_eq!(enemy.position.x, 100.0);
        assert!((enemy.position.y - (100.0 + rules.level().enemy_speed)).abs() < 1e-4);
        assert!((enemy.angle - 180.0).abs() < 1e-3);
        assert!(enemy_kind(enemy).1.is_empty());
    }

    #[test]
    fn when_player_is_behind_a_wall_then_enemy_follows_a_path() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.hostiles[0].position = Vec2::new(275.0, 100.0);
        state.player.position = Vec2::new(275.0, 400.0);

        let outcome = with_frame(&state, &mut memory, &PlayerInput::default(), 100, &rules, update);

        assert!(!enemy_kind(&outcome.state.hostiles[0]).1.is_empty());
        assert_eq!(memory.last_path_recalc.get(&10), Some(&100));
    }

    #[test]
    fn when_player_is_dying_then_enemy_picks_a_patrol_target() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.status = ActorStatus::Dying;

        let outcome = with_frame(&state, &mut memory, &PlayerInput::default(), 100, &rules, update);

        assert!(enemy_kind(&outcome.state.hostiles[0]).0.is_some());
    }

    #[test]
    fn when_time_is_stopped_or_enemy_is_stunned_then_it_stays_put() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.position = Vec2::new(100.0, 600.0);
        state.hostiles[0].status_effects.apply_stun(1500, 50);

        let stunned = with_frame(&state, &mut memory, &PlayerInput::default(), 100, &rules, update);
        assert_eq!(stunned.state.hostiles[0].position, state.hostiles[0].position);

        state.is_time_stopped = true;
        let frozen = with_frame(&state, &mut memory, &PlayerInput::default(), 100, &rules, update);
        for (before, after) in state.hostiles.iter().zip(&frozen.state.hostiles) {
            assert_eq!(before.position, after.position);
        }
    }

    #[test]
    fn when_enemy_drives_over_regensule_then_it_is_consumed_without_effect() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.power_ups.push(PowerUp {
            id: 500,
            kind: PowerUpType::Regensule,
            position: state.hostiles[0].position,
        });

        let outcome = with_frame(&state, &mut memory, &PlayerInput::default(), 100, &rules, update);

        assert!(outcome.state.power_ups.is_empty());
        assert_eq!(outcome.state.hostiles[0].active_power_up, None);
        assert_eq!(outcome.state.hostiles[0].max_health, rules.tuning.tank.health);
    }

    #[test]
    fn when_minion_is_active_then_it_faces_the_player() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        let mut minion = Actor::minion(2000, Vec2::new(500.0, 300.0), 0, &rules.tuning);
        minion.status = ActorStatus::Active;
        state.hostiles.push(minion);

        let outcome = with_frame(&state, &mut memory, &PlayerInput::default(), 100, &rules, update);

        let minion = outcome.state.hostiles.last().expect("minion kept");
        assert!((minion.angle - 180.0).abs() < 1e-3);
        assert_eq!(minion.turret_angle, minion.angle);
        assert_eq!(minion.position, Vec2::new(500.0, 300.0));
    }
}
