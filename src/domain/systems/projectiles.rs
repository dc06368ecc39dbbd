// Step 7: projectile flight, homing, and hit resolution.

use super::{Ctx, Frame, Outbox, hit_text, label_position, tick_text};
use crate::domain::abilities::AbilityId;
use crate::domain::geometry::{Rect, Vec2, rect_overlap, turn_towards};
use crate::domain::memory::EngineMemory;
use crate::domain::state::{
    Actor, ActorKind, AnimationKind, DamageTone, GameState, PLAYER_ID, PowerUpType, Projectile,
    ProjectileKind,
};
use rand::Rng;

/// Where a struck actor lives in the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Player,
    Hostile(usize),
}

fn actor_at(state: &mut GameState, slot: Slot) -> &mut Actor {
    match slot {
        Slot::Player => &mut state.player,
        Slot::Hostile(index) => &mut state.hostiles[index],
    }
}

pub(crate) fn update(frame: &mut Frame<'_>) {
    let Frame {
        state,
        memory,
        out,
        ctx,
    } = frame;
    let ctx = *ctx;
    let arena = &ctx.tuning.arena;
    let effects = &ctx.tuning.effects;

    let in_flight = std::mem::take(&mut state.projectiles);
    let mut kept = Vec::with_capacity(in_flight.len());
    for mut projectile in in_flight {
        if projectile.is_frozen {
            kept.push(projectile);
            continue;
        }

        let mut next = projectile.position;
        if projectile.owner_id == PLAYER_ID || !ctx.time_stopped {
            let zone = state.zone_speed_factor(projectile.position);
            if projectile.is_homing() {
                steer(&mut projectile, state);
            }
            next = projectile
                .position
                .offset(projectile.angle, projectile.speed * zone);
        }

        let rect = projectile.rect_at(next);
        let freezes = ctx.time_stopped
            && projectile.owner_id == PLAYER_ID
            && projectile.kind != ProjectileKind::ChronoShard;

        if !arena.contains(next) || arena.walls.iter().any(|wall| rect_overlap(&rect, wall)) {
            if freezes {
                projectile.position = next;
                projectile.is_frozen = true;
                kept.push(projectile);
            } else if projectile.kind == ProjectileKind::ChronoShard {
                out.animate(
                    AnimationKind::ChronoShardImpact,
                    projectile.position,
                    effects.chrono_shard_impact,
                );
            } else {
                out.animate(AnimationKind::Hit, projectile.position, effects.hit);
            }
            continue;
        }

        let Some(slot) = struck(state, &projectile, &rect) else {
            projectile.position = next;
            kept.push(projectile);
            continue;
        };

        if freezes {
            projectile.position = next;
            projectile.is_frozen = true;
            kept.push(projectile);
        } else if slot == Slot::Player
            && state.player.active_power_up == Some(PowerUpType::ReflectorField)
        {
            projectile.angle += 180.0;
            projectile.owner_id = PLAYER_ID;
            kept.push(projectile);
        } else {
            resolve_hit(state, memory, out, ctx, &projectile, slot);
        }
    }
    state.projectiles = kept;
}

/// First solid actor other than the owner whose body overlaps `rect`; the player is tested first.
fn struck(state: &GameState, projectile: &Projectile, rect: &Rect) -> Option<Slot> {
    let hits = |actor: &Actor| {
        actor.id != projectile.owner_id && actor.is_solid() && rect_overlap(rect, &actor.rect())
    };
    if hits(&state.player) {
        return Some(Slot::Player);
    }
    state.hostiles.iter().position(hits).map(Slot::Hostile)
}

/// Keeps a homing projectile on its target, re-acquiring for missiles when it is gone.
fn steer(projectile: &mut Projectile, state: &GameState) {
    let mut target = projectile
        .target_id
        .and_then(|id| state.actor(id))
        .filter(|actor| actor.is_active());
    if target.is_none() {
        projectile.target_id = None;
    }
    if target.is_none() && projectile.kind == ProjectileKind::HomingMissile {
        let from = projectile.position;
        target = state
            .hostiles
            .iter()
            .filter(|h| {
                h.is_active() && matches!(h.kind, ActorKind::Enemy { .. } | ActorKind::Boss { .. })
            })
            .min_by(|a, b| from.distance(a.position).total_cmp(&from.distance(b.position)));
        projectile.target_id = target.map(|t| t.id);
    }
    if let Some(target) = target {
        let wanted = projectile.position.heading_to(target.position);
        projectile.angle = turn_towards(projectile.angle, wanted, projectile.turn_rate);
    }
}

fn resolve_hit(
    state: &mut GameState,
    memory: &mut EngineMemory,
    out: &mut Outbox,
    ctx: Ctx<'_>,
    projectile: &Projectile,
    slot: Slot,
) {
    let now = ctx.now;
    let tuning = ctx.tuning;
    let effects = &tuning.effects;
    let owner = projectile.owner_id;
    let owner_pos = state.actor(owner).map(|a| a.position);
    let by_player = owner == PLAYER_ID;
    let toxic = state.abilities.is_active(AbilityId::ToxicRounds);
    let overdrive = state.abilities.is_active(AbilityId::Overdrive);
    let leech = state.player.active_power_up == Some(PowerUpType::LifeLeech);

    let target = actor_at(state, slot);
    if target.is_invulnerable(now, tuning.tank.spawn_invulnerability) {
        return;
    }

    if target.active_power_up == Some(PowerUpType::Shield) && target.shield_health > 0 {
        target.shield_health -= 1;
        out.animate(AnimationKind::ShieldHit, projectile.position, effects.shield_hit);
        if target.shield_health == 0 {
            target.active_power_up = None;
            target.power_up_expire_time = 0;
            out.animate(AnimationKind::ShieldBreak, target.position, effects.shield_break);
            out.shake(8.0, 300);
        }
        return;
    }

    if target.health <= 0.0 {
        return;
    }

    if projectile.kind == ProjectileKind::HomingMissile {
        let p = &tuning.power_ups;
        let target_id = target.id;
        out.animate(
            AnimationKind::HomingExplosion,
            projectile.position,
            effects.homing_explosion,
        );
        out.shake(12.0, 400);
        target.take_damage(p.homing_direct_damage, Some(owner), now);
        out.damage_number(
            hit_text(p.homing_direct_damage),
            label_position(target),
            DamageTone::HomingDirect,
            effects.damage_number,
        );

        let blast = projectile.position;
        let splashed = std::iter::once(&mut state.player).chain(state.hostiles.iter_mut());
        for actor in splashed {
            if actor.id == target_id
                || !actor.is_active()
                || actor.position.distance(blast) >= p.homing_splash_radius
            {
                continue;
            }
            actor.take_damage(p.homing_splash_damage, Some(owner), now);
            out.damage_number(
                tick_text(p.homing_splash_damage),
                label_position(actor),
                DamageTone::HomingSplash,
                effects.damage_number,
            );
        }
        return;
    }

    let shard = projectile.kind == ProjectileKind::ChronoShard;
    let damage = if shard {
        tuning.abilities.time_stop.shard_damage
    } else {
        projectile.damage
    };
    target.take_damage(damage, Some(owner), now);
    if shard {
        out.animate(
            AnimationKind::ChronoShardImpact,
            projectile.position,
            effects.chrono_shard_impact,
        );
        target
            .status_effects
            .apply_stun(tuning.abilities.time_stop.shard_stun, now);
    } else {
        out.animate(AnimationKind::Hit, projectile.position, effects.hit);
    }

    let tone = match (by_player, shard, toxic) {
        (false, _, _) => DamageTone::HostileShot,
        (true, true, _) => DamageTone::ChronoShard,
        (true, false, true) => DamageTone::Toxic,
        (true, false, false) => DamageTone::PlayerShot,
    };
    let mut label = label_position(target);
    label.x += memory.rng.gen_range(-10.0..10.0);
    out.damage_number(hit_text(damage), label, tone, effects.damage_number);

    if by_player && toxic {
        let stacks = if overdrive { 2 } else { 1 };
        target.status_effects.apply_poison(
            stacks,
            PLAYER_ID,
            now,
            &tuning.abilities.toxic_rounds.poison,
        );
    }

    let target_pos = target.position;
    if slot == Slot::Player {
        if let Some(source) = owner_pos {
            out.indicator(target_pos, source, effects.damage_indicator);
        }
    } else if by_player && leech {
        state
            .player
            .heal(damage * tuning.power_ups.life_leech_fraction);
    }
}

/// Starting point for a released chrono shard: a straight shot that homes once a target is set.
pub(crate) fn chrono_shard(
    id: u64,
    position: Vec2,
    angle: f32,
    target_id: Option<u64>,
    ctx: Ctx<'_>,
) -> Projectile {
    let time_stop = &ctx.tuning.abilities.time_stop;
    Projectile {
        id,
        owner_id: PLAYER_ID,
        position,
        angle,
        size: time_stop.shard_size,
        speed: time_stop.shard_speed,
        damage: time_stop.shard_damage,
        kind: ProjectileKind::ChronoShard,
        turn_rate: time_stop.shard_turn_rate,
        target_id,
        is_frozen: false,
    }
}

#[cfg(test)]
mod tests {
    use super::super::Rules;
    use super::super::test_support::{active_match, with_frame};
    use super::*;
    use crate::domain::cues::SideEffect;
    use crate::domain::geometry::Size;
    use crate::domain::input::PlayerInput;
    use crate::domain::state::ActorStatus;
    use crate::domain::tuning::{Difficulty, Tuning};

    fn rules() -> Rules {
        Rules::new(Tuning::default(), Difficulty::Medium)
    }

    fn shot(owner_id: u64, position: Vec2, angle: f32) -> Projectile {
        Projectile {
            id: 4000,
            owner_id,
            position,
            angle,
            size: Size::new(8.0, 8.0),
            speed: 3.0,
            damage: 1.0,
            kind: ProjectileKind::Standard,
            turn_rate: 0.0,
            target_id: None,
            is_frozen: false,
        }
    }

    fn tick(state: &GameState, memory: &mut EngineMemory, now: u64, rules: &Rules) -> GameState {
        with_frame(state, memory, &PlayerInput::default(), now, rules, update).state
    }

    #[test]
    fn when_player_shell_hits_a_healthy_enemy_then_it_loses_one_health() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.projectiles.push(shot(PLAYER_ID, Vec2::new(100.0, 130.0), 0.0));

        let next = tick(&state, &mut memory, 1_000, &rules);

        let enemy = &next.hostiles[0];
        assert_eq!(enemy.health, 7.0);
        assert_eq!(enemy.status, ActorStatus::Active);
        assert_eq!(enemy.last_damaged_by, Some(PLAYER_ID));
        assert!(next.projectiles.is_empty());
        assert_eq!(next.damage_numbers.len(), 1);
        assert_eq!(next.damage_numbers[0].text, "1");
        assert_eq!(next.damage_numbers[0].tone, DamageTone::PlayerShot);
    }

    #[test]
    fn when_last_shield_charge_absorbs_a_hit_then_shield_breaks_and_health_holds() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.hostiles[0].active_power_up = Some(PowerUpType::Shield);
        state.hostiles[0].shield_health = 1;
        state.projectiles.push(shot(PLAYER_ID, Vec2::new(100.0, 130.0), 0.0));

        let outcome = with_frame(&state, &mut memory, &PlayerInput::default(), 1_000, &rules, update);

        let enemy = &outcome.state.hostiles[0];
        assert_eq!(enemy.shield_health, 0);
        assert_eq!(enemy.active_power_up, None);
        assert_eq!(enemy.health, rules.tuning.tank.health);
        assert!(
            outcome
                .state
                .animations
                .iter()
                .any(|a| a.kind == AnimationKind::ShieldBreak)
        );
        assert!(outcome.effects.contains(&SideEffect::Shake {
            intensity: 8.0,
            duration: 300
        }));
    }

    #[test]
    fn when_reflector_is_up_then_incoming_shell_turns_around_as_a_player_shot() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.active_power_up = Some(PowerUpType::ReflectorField);
        let start = Vec2::new(500.0, 570.0);
        state.projectiles.push(shot(10, start, 180.0));

        let next = tick(&state, &mut memory, 1_000, &rules);

        assert_eq!(next.player.health, rules.tuning.tank.health);
        let reflected = &next.projectiles[0];
        assert_eq!(reflected.owner_id, PLAYER_ID);
        assert_eq!(reflected.angle, 360.0);
        assert_eq!(reflected.position, start);
    }

    #[test]
    fn when_enemy_shell_hits_the_player_then_an_indicator_points_at_the_shooter() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.projectiles.push(shot(10, Vec2::new(500.0, 570.0), 180.0));

        let next = tick(&state, &mut memory, 1_000, &rules);

        assert_eq!(next.player.health, rules.tuning.tank.health - 1.0);
        assert_eq!(next.player.last_damaged_by, Some(10));
        assert_eq!(next.damage_indicators.len(), 1);
        assert_eq!(next.damage_numbers[0].tone, DamageTone::HostileShot);
    }

    #[test]
    fn when_target_is_still_spawning_then_shell_is_absorbed_without_damage() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.hostiles[0].status = ActorStatus::Spawning;
        state.hostiles[0].spawn_time = 500;
        state.projectiles.push(shot(PLAYER_ID, Vec2::new(100.0, 130.0), 0.0));

        let next = tick(&state, &mut memory, 1_000, &rules);

        assert_eq!(next.hostiles[0].health, rules.tuning.tank.health);
        assert!(next.projectiles.is_empty());
    }

    #[test]
    fn when_time_is_stopped_then_hostile_shells_hold_and_player_shells_freeze_on_contact() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.is_time_stopped = true;
        let hostile_start = Vec2::new(700.0, 400.0);
        state.projectiles.push(shot(10, hostile_start, 90.0));
        state.projectiles.push(shot(PLAYER_ID, Vec2::new(100.0, 130.0), 0.0));

        let next = tick(&state, &mut memory, 1_000, &rules);

        assert_eq!(next.projectiles.len(), 2);
        assert_eq!(next.projectiles[0].position, hostile_start);
        assert!(!next.projectiles[0].is_frozen);
        assert!(next.projectiles[1].is_frozen);
        assert_eq!(next.hostiles[0].health, rules.tuning.tank.health);
    }

    #[test]
    fn when_homing_missile_hits_then_it_explodes_for_direct_damage() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        let mut missile = shot(PLAYER_ID, Vec2::new(100.0, 130.0), 0.0);
        missile.kind = ProjectileKind::HomingMissile;
        missile.turn_rate = 5.0;
        state.projectiles.push(missile);

        let outcome = with_frame(&state, &mut memory, &PlayerInput::default(), 1_000, &rules, update);

        let expected = rules.tuning.tank.health - rules.tuning.power_ups.homing_direct_damage;
        assert_eq!(outcome.state.hostiles[0].health, expected);
        assert_eq!(outcome.state.damage_numbers[0].text, "1.5");
        assert!(
            outcome
                .state
                .animations
                .iter()
                .any(|a| a.kind == AnimationKind::HomingExplosion)
        );
    }

    #[test]
    fn when_shell_leaves_the_arena_then_it_is_dropped_with_a_hit_flash() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.projectiles.push(shot(PLAYER_ID, Vec2::new(998.0, 400.0), 90.0));

        let next = tick(&state, &mut memory, 1_000, &rules);

        assert!(next.projectiles.is_empty());
        assert_eq!(next.animations[0].kind, AnimationKind::Hit);
    }
}
