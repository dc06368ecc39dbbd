// Step 5: player, enemy, and minion gunfire.

use super::{Ctx, Frame, Outbox};
use crate::domain::cues::Cue;
use crate::domain::geometry::{Size, Vec2};
use crate::domain::pathfinding::has_line_of_sight;
use crate::domain::state::{
    Actor, ActorKind, AnimationKind, PLAYER_ID, PowerUpType, Projectile, ProjectileKind, Tier,
};
use crate::domain::ActorId;
use rand::Rng;

pub(crate) fn update(frame: &mut Frame<'_>) {
    let Frame {
        state,
        memory,
        out,
        ctx,
    } = frame;
    let ctx = *ctx;
    let now = ctx.now;
    let tuning = ctx.tuning;

    let cooldown = tuning.tank.fire_cooldown as f32
        * state.abilities.fire_cooldown_multiplier(&tuning.abilities);
    let since_last = now.saturating_sub(memory.last_fire(PLAYER_ID)) as f32;
    if state.player.is_active() && ctx.input.fire && since_last > cooldown {
        memory.last_fire.insert(PLAYER_ID, now);
        let damage = tuning.projectile.damage + state.abilities.damage_bonus(&tuning.abilities);
        fire_player(&mut state.player, damage, &mut state.projectiles, out, ctx);
    }

    if ctx.time_stopped {
        return;
    }

    let player_pos = state.player.position;
    let walls = &tuning.arena.walls;
    for hostile in &state.hostiles {
        if !hostile.is_active() || hostile.status_effects.is_stunned(now) {
            continue;
        }
        let since_last = now.saturating_sub(memory.last_fire(hostile.id)) as f32;
        match hostile.kind {
            ActorKind::Enemy { tier, .. } => {
                let in_range = hostile.position.distance(player_pos) <= ctx.level.detection_radius;
                if !in_range || !has_line_of_sight(hostile.position, player_pos, walls) {
                    continue;
                }
                let rng = &mut memory.rng;
                let jitter = rng.gen_range(0.0..1.0) * tuning.tank.enemy_fire_jitter as f32;
                let base = (tuning.tank.enemy_fire_cooldown as f32 + jitter)
                    / ctx.fire_rate_modifier(tier);
                let hesitation = rng.gen_range(0.0..1.0) * ctx.level.hesitation as f32;
                if since_last <= base + hesitation {
                    continue;
                }
                memory.last_fire.insert(hostile.id, now);
                let error = ctx.level.aim_error;
                let aim_jitter = if error > 0.0 {
                    memory.rng.gen_range(-error..=error)
                } else {
                    0.0
                };
                fire_cannon(
                    hostile,
                    hostile.turret_angle + aim_jitter,
                    tuning.projectile.damage,
                    tier == Tier::Intermediate,
                    &mut state.projectiles,
                    out,
                    ctx,
                );
            }
            ActorKind::Minion => {
                if !has_line_of_sight(hostile.position, player_pos, walls) {
                    continue;
                }
                let minion = &tuning.minion;
                let cooldown = minion.fire_cooldown as f32
                    + memory.rng.gen_range(0.0..1.0) * minion.fire_jitter as f32;
                if since_last <= cooldown {
                    continue;
                }
                memory.last_fire.insert(hostile.id, now);
                out.play(Cue::Shot);
                let angle = hostile.angle;
                let muzzle = hostile.position.offset(angle, minion.muzzle_distance);
                let size = tuning.projectile.size;
                state.projectiles.push(shell(
                    out.alloc_id(),
                    hostile.id,
                    muzzle,
                    angle,
                    minion.damage,
                    minion.projectile_speed,
                    Size::new(size, size),
                ));
                out.animate_shaped(
                    AnimationKind::MuzzleFlash,
                    muzzle,
                    angle,
                    None,
                    tuning.effects.muzzle_flash,
                );
            }
            ActorKind::Player { .. } | ActorKind::Boss { .. } => {}
        }
    }
}

/// Fires a homing missile while any are left, otherwise the main gun.
fn fire_player(
    player: &mut Actor,
    damage: f32,
    projectiles: &mut Vec<Projectile>,
    out: &mut Outbox,
    ctx: Ctx<'_>,
) {
    let angle = player.turret_angle;
    if let ActorKind::Player { homing_missiles } = &mut player.kind {
        if *homing_missiles > 0 {
            *homing_missiles -= 1;
            if *homing_missiles == 0 {
                player.active_power_up = None;
                player.power_up_expire_time = 0;
            }
            out.play(Cue::Shot);
            let p = &ctx.tuning.power_ups;
            let muzzle = player.position.offset(angle, ctx.tuning.tank.barrel_length);
            projectiles.push(Projectile {
                id: out.alloc_id(),
                owner_id: PLAYER_ID,
                position: muzzle,
                angle,
                size: p.homing_size,
                speed: p.homing_speed,
                damage,
                kind: ProjectileKind::HomingMissile,
                turn_rate: p.homing_turn_rate,
                target_id: None,
                is_frozen: false,
            });
            return;
        }
    }
    fire_cannon(player, angle, damage, false, projectiles, out, ctx);
}

/// Tank main gun: a three-way spread, twin barrels, or a single shell.
fn fire_cannon(
    tank: &Actor,
    angle: f32,
    damage: f32,
    spread: bool,
    projectiles: &mut Vec<Projectile>,
    out: &mut Outbox,
    ctx: Ctx<'_>,
) {
    let tuning = ctx.tuning;
    let barrel = tuning.tank.barrel_length;
    let speed = tuning.projectile.speed;
    let size = Size::new(tuning.projectile.size, tuning.projectile.size);
    let flash = tuning.effects.muzzle_flash;
    out.play(Cue::Shot);

    let muzzle = tank.position.offset(angle, barrel);
    if spread {
        for offset in tuning.tank.spread_angles {
            let shot_angle = angle + offset;
            let position = tank.position.offset(shot_angle, barrel);
            projectiles.push(shell(out.alloc_id(), tank.id, position, shot_angle, damage, speed, size));
        }
        out.animate_shaped(AnimationKind::MuzzleFlash, muzzle, angle, None, flash);
    } else if tank.active_power_up == Some(PowerUpType::DualCannon) {
        let spacing = tank.size.width * tuning.power_ups.dual_cannon_offset;
        for side in [90.0, -90.0] {
            let position = muzzle.offset(angle + side, spacing);
            projectiles.push(shell(out.alloc_id(), tank.id, position, angle, damage, speed, size));
            out.animate_shaped(AnimationKind::MuzzleFlash, position, angle, None, flash);
        }
    } else {
        projectiles.push(shell(out.alloc_id(), tank.id, muzzle, angle, damage, speed, size));
        out.animate_shaped(AnimationKind::MuzzleFlash, muzzle, angle, None, flash);
    }
}

fn shell(
    id: u64,
    owner_id: ActorId,
    position: Vec2,
    angle: f32,
    damage: f32,
    speed: f32,
    size: Size,
) -> Projectile {
    Projectile {
        id,
        owner_id,
        position,
        angle,
        size,
        speed,
        damage,
        kind: ProjectileKind::Standard,
        turn_rate: 0.0,
        target_id: None,
        is_frozen: false,
    }
}

#[cfg(test)]
mod tests {
    use super::super::Rules;
    use super::super::test_support::{active_match, with_frame};
    use super::*;
    use crate::domain::cues::SideEffect;
    use crate::domain::input::PlayerInput;
    use crate::domain::tuning::{Difficulty, Tuning};

    fn rules() -> Rules {
        Rules::new(Tuning::default(), Difficulty::Medium)
    }

    fn firing() -> PlayerInput {
        PlayerInput {
            fire: true,
            ..PlayerInput::default()
        }
    }

    fn shots(effects: &[SideEffect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, SideEffect::PlayCue { cue: Cue::Shot }))
            .count()
    }

    #[test]
    fn when_fire_is_held_then_player_shoots_once_per_cooldown() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.position = Vec2::new(900.0, 600.0);

        let first = with_frame(&state, &mut memory, &firing(), 1_000, &rules, update);
        let player_shots: Vec<_> = first
            .state
            .projectiles
            .iter()
            .filter(|p| p.owner_id == PLAYER_ID)
            .collect();
        assert_eq!(player_shots.len(), 1);
        assert_eq!(player_shots[0].damage, 1.0);
        assert_eq!(shots(&first.effects), 1);
        assert_eq!(first.state.animations.len(), 1);

        let second = with_frame(&first.state, &mut memory, &firing(), 1_100, &rules, update);
        let count = second
            .state
            .projectiles
            .iter()
            .filter(|p| p.owner_id == PLAYER_ID)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn when_dual_cannon_is_active_then_two_offset_shells_leave_the_barrels() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.position = Vec2::new(900.0, 600.0);
        state.player.active_power_up = Some(PowerUpType::DualCannon);

        let outcome = with_frame(&state, &mut memory, &firing(), 1_000, &rules, update);

        let shells: Vec<_> = outcome
            .state
            .projectiles
            .iter()
            .filter(|p| p.owner_id == PLAYER_ID)
            .collect();
        assert_eq!(shells.len(), 2);
        let gap = shells[0].position.distance(shells[1].position);
        let expected = 2.0 * rules.tuning.tank.size.width * rules.tuning.power_ups.dual_cannon_offset;
        assert!((gap - expected).abs() < 1e-3);
        assert_eq!(outcome.state.animations.len(), 2);
    }

    #[test]
    fn when_last_homing_missile_is_fired_then_the_power_up_ends() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.position = Vec2::new(900.0, 600.0);
        state.player.active_power_up = Some(PowerUpType::HomingMissiles);
        state.player.kind = ActorKind::Player { homing_missiles: 1 };

        let outcome = with_frame(&state, &mut memory, &firing(), 1_000, &rules, update);

        let missile = outcome
            .state
            .projectiles
            .iter()
            .find(|p| p.owner_id == PLAYER_ID)
            .expect("missile fired");
        assert_eq!(missile.kind, ProjectileKind::HomingMissile);
        assert_eq!(outcome.state.player.active_power_up, None);
        assert_eq!(
            outcome.state.player.kind,
            ActorKind::Player { homing_missiles: 0 }
        );
        assert!(outcome.state.animations.is_empty());
    }

    #[test]
    fn when_intermediate_enemy_sees_the_player_then_it_fires_a_spread() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.position = Vec2::new(100.0, 300.0);
        if let ActorKind::Enemy { tier, .. } = &mut state.hostiles[0].kind {
            *tier = Tier::Intermediate;
        }

        let outcome = with_frame(
            &state,
            &mut memory,
            &PlayerInput::default(),
            10_000,
            &rules,
            update,
        );

        let spread: Vec<_> = outcome
            .state
            .projectiles
            .iter()
            .filter(|p| p.owner_id == state.hostiles[0].id)
            .collect();
        assert_eq!(spread.len(), 3);
        assert_eq!(outcome.state.projectiles.len(), 3);
        assert_eq!(memory.last_fire(state.hostiles[0].id), 10_000);
    }

    #[test]
    fn when_time_is_stopped_then_only_the_player_fires() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.position = Vec2::new(100.0, 300.0);
        state.is_time_stopped = true;

        let outcome = with_frame(&state, &mut memory, &firing(), 10_000, &rules, update);

        assert_eq!(outcome.state.projectiles.len(), 1);
        assert_eq!(outcome.state.projectiles[0].owner_id, PLAYER_ID);
    }
}
