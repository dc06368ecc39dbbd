// Step 10: the boss encounter director.
//
// Spawns the boss once the player's score crosses the threshold, then drives its
// patrol, its turret, and the idle -> telegraphing -> attacking cycle. Attack
// parameters are fixed when the attack is chosen. Telegraphs are display-only;
// resolution recomputes its geometry from the stored parameters via `attack_lanes`.

use super::{Ctx, Frame, Outbox, heavy_text, label_position, tick_text};
use crate::domain::cues::Cue;
use crate::domain::geometry::{
    OrientedRect, Rect, Size, Vec2, angle_delta, heading, normalize_degrees, turn_towards,
};
use crate::domain::Millis;
use crate::domain::memory::EngineMemory;
use crate::domain::state::{
    Actor, ActorKind, ActorStatus, AnimationKind, AttackData, AttackKind, AttackPhase,
    AttackState, BOSS_ID, DamageTone, MatchPhase, Telegraph, TelegraphShape,
};
use crate::domain::systems::collision::is_blocked_by_environment;
use crate::domain::tuning::Tuning;
use rand::Rng;
use std::iter;
use tracing::{debug, info, warn};

const ATTACKS: [AttackKind; 5] = [
    AttackKind::MortarVolley,
    AttackKind::LaserSweep,
    AttackKind::MultiLane,
    AttackKind::XPattern,
    AttackKind::SummonMinions,
];

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

    if state.match_phase == MatchPhase::PreBoss && state.player.score >= tuning.boss.spawn_score {
        state.match_phase = MatchPhase::Boss;
        for enemy in state.hostiles.drain(..) {
            memory.forget(enemy.id);
        }
        state.hostiles.push(Actor::boss(now, tuning));
        info!(score = state.player.score, "boss encounter started");
    }

    if ctx.time_stopped {
        return;
    }
    let Some(index) = state.hostiles.iter().position(|a| a.is_boss()) else {
        return;
    };

    let mut attack = {
        let boss = &mut state.hostiles[index];
        if !boss.is_active() || boss.status_effects.is_stunned(now) {
            return;
        }
        if last_stand_due(boss, tuning) {
            enter_last_stand(boss, out, now, tuning);
            state.telegraphs.clear();
        }
        let aim = boss.position.heading_to(state.player.position);
        boss.turret_angle = normalize_degrees(turn_towards(
            boss.turret_angle,
            aim,
            tuning.boss.turret_turn_rate,
        ));
        patrol(boss, &state.player, &mut memory.rng, tuning);

        let ActorKind::Boss { attack, .. } = &mut boss.kind else {
            return;
        };
        std::mem::replace(attack, AttackState::idle(now))
    };

    match attack.phase {
        AttackPhase::Idle => {
            if now >= attack.phase_start + tuning.boss.idle_duration {
                attack = choose_attack(&state.hostiles[index], &state.player, &mut memory.rng, ctx);
                debug!(kind = ?attack.kind, "boss attack chosen");
            }
        }
        AttackPhase::Telegraphing => {
            let minions = telegraph(
                &state.hostiles[index],
                &mut attack,
                &mut state.telegraphs,
                out,
                ctx,
            );
            state.hostiles.extend(minions);
        }
        AttackPhase::Attacking => resolve(
            &mut state.hostiles[index],
            &mut state.player,
            &mut attack,
            memory,
            out,
            ctx,
        ),
    }

    if let ActorKind::Boss { attack: stored, .. } = &mut state.hostiles[index].kind {
        *stored = attack;
    }
}

fn last_stand_due(boss: &Actor, tuning: &Tuning) -> bool {
    match boss.kind {
        ActorKind::Boss {
            has_used_last_stand,
            ..
        } => {
            !has_used_last_stand
                && boss.health / boss.max_health <= tuning.boss.last_stand.health_fraction
        }
        _ => false,
    }
}

/// Interrupts whatever the boss is doing; this can only happen once per match.
fn enter_last_stand(boss: &mut Actor, out: &mut Outbox, now: Millis, tuning: &Tuning) {
    let t = &tuning.boss.last_stand;
    let ActorKind::Boss {
        attack,
        has_used_last_stand,
        ..
    } = &mut boss.kind
    else {
        return;
    };
    if attack.kind == AttackKind::LaserSweep {
        out.stop(Cue::BossLaserSweep);
    }
    *has_used_last_stand = true;
    *attack = AttackState {
        kind: AttackKind::LastStand,
        phase: AttackPhase::Telegraphing,
        phase_start: now,
        telegraph: t.telegraph,
        attack: t.attack,
        data: Some(AttackData::LastStand),
    };
    out.play(Cue::LastStandCharge);
    info!(health = boss.health, "boss entering last stand");
}

/// Wanders between random points of the patrol area. Frozen during the last stand.
fn patrol<R: Rng + ?Sized>(boss: &mut Actor, player: &Actor, rng: &mut R, tuning: &Tuning) {
    let t = &tuning.boss;
    let ActorKind::Boss {
        patrol_target,
        attack,
        ..
    } = &mut boss.kind
    else {
        return;
    };

    let target = match *patrol_target {
        Some(target) if boss.position.distance(target) >= t.patrol_arrive_distance => target,
        _ => {
            let area = t.patrol_area;
            let target = Vec2::new(
                area.x + rng.gen_range(0.0..1.0) * area.width,
                area.y + rng.gen_range(0.0..1.0) * area.height,
            );
            *patrol_target = Some(target);
            target
        }
    };
    if attack.kind == AttackKind::LastStand {
        return;
    }

    let distance = boss.position.distance(target);
    if distance <= t.speed {
        return;
    }
    let dx = (target.x - boss.position.x) / distance * t.speed;
    let dy = (target.y - boss.position.y) / distance * t.speed;
    let next = Vec2::new(boss.position.x + dx, boss.position.y + dy);
    if is_blocked_by_environment(
        &Rect::centered(next, boss.size),
        &tuning.arena,
        iter::once(player),
    ) {
        *patrol_target = None;
        return;
    }
    boss.position = next;
    boss.angle = heading(dx, dy);
}

fn choose_attack<R: Rng + ?Sized>(
    boss: &Actor,
    player: &Actor,
    rng: &mut R,
    ctx: Ctx<'_>,
) -> AttackState {
    let now = ctx.now;
    let t = &ctx.tuning.boss;
    let kind = ATTACKS[rng.gen_range(0..ATTACKS.len())];
    let origin = player.position;

    let (telegraph, attack, data) = match kind {
        AttackKind::MortarVolley => {
            let spread = t.mortar.spread;
            let targets = (0..t.mortar.strikes)
                .map(|_| {
                    Vec2::new(
                        origin.x + rng.gen_range(-1.0..1.0) * spread,
                        origin.y + rng.gen_range(-1.0..1.0) * spread,
                    )
                })
                .collect();
            (
                t.mortar.telegraph,
                t.mortar.attack,
                AttackData::Mortar { targets },
            )
        }
        AttackKind::LaserSweep => (
            t.laser.telegraph,
            t.laser.attack,
            AttackData::Laser {
                sweep_start: boss.turret_angle,
            },
        ),
        AttackKind::MultiLane => (
            t.multi_lane.telegraph,
            t.multi_lane.attack,
            AttackData::Lanes {
                origin,
                angle: boss.position.heading_to(origin),
            },
        ),
        AttackKind::XPattern => (
            t.x_pattern.telegraph,
            t.x_pattern.attack,
            AttackData::Lanes {
                origin,
                angle: boss.position.heading_to(origin),
            },
        ),
        AttackKind::SummonMinions => (
            t.summon.telegraph,
            0,
            AttackData::Summon {
                targets: summon_points(boss, ctx.tuning),
            },
        ),
        AttackKind::None | AttackKind::LastStand => return AttackState::idle(now),
    };

    AttackState {
        kind,
        phase: AttackPhase::Telegraphing,
        phase_start: now,
        telegraph,
        attack,
        data: Some(data),
    }
}

/// Minion drop points spread evenly over an arc in front of the boss.
fn summon_points(boss: &Actor, tuning: &Tuning) -> Vec<Vec2> {
    let s = &tuning.boss.summon;
    let base = boss.angle - 90.0;
    let distance = boss.size.width * s.distance_factor;
    let step = if s.count > 1 {
        s.arc / (s.count - 1) as f32
    } else {
        0.0
    };
    (0..s.count)
        .map(|i| {
            let rad = (base - s.arc / 2.0 + i as f32 * step).to_radians();
            Vec2::new(
                boss.position.x + rad.cos() * distance,
                boss.position.y + rad.sin() * distance,
            )
        })
        .collect()
}

/// Hit boxes of a lane attack.
///
/// Multi-lane fires three parallel lanes along `angle`, spaced sideways; the X pattern
/// crosses two lanes at ±45° over `origin` and ignores `angle`.
pub(crate) fn attack_lanes(
    kind: AttackKind,
    origin: Vec2,
    angle: f32,
    tuning: &Tuning,
) -> Vec<OrientedRect> {
    match kind {
        AttackKind::MultiLane => {
            let t = &tuning.boss.multi_lane;
            let rad = angle.to_radians();
            let (dx, dy) = (t.lane_spacing * rad.cos(), t.lane_spacing * rad.sin());
            [-1.0, 0.0, 1.0]
                .into_iter()
                .map(|side: f32| OrientedRect {
                    center: Vec2::new(origin.x + side * dx, origin.y + side * dy),
                    width: t.lane_width,
                    height: tuning.arena.height,
                    angle,
                })
                .collect()
        }
        AttackKind::XPattern => {
            let t = &tuning.boss.x_pattern;
            [45.0, -45.0]
                .into_iter()
                .map(|lane_angle| OrientedRect {
                    center: origin,
                    width: t.lane_width,
                    height: tuning.arena.width * t.length_factor,
                    angle: lane_angle,
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Rebuilds the warning markers, then commits to the attack when the telegraph runs out.
/// Returns the minions a finished summon brings in.
fn telegraph(
    boss: &Actor,
    attack: &mut AttackState,
    telegraphs: &mut Vec<Telegraph>,
    out: &mut Outbox,
    ctx: Ctx<'_>,
) -> Vec<Actor> {
    let now = ctx.now;
    let tuning = ctx.tuning;
    let (created_at, duration) = (attack.phase_start, attack.telegraph);
    let mark = |shape| Telegraph {
        shape,
        created_at,
        duration,
    };

    if attack.data.is_none() {
        warn!(kind = ?attack.kind, "boss attack has no parameters, returning to idle");
        *attack = AttackState::idle(now);
        return Vec::new();
    }

    telegraphs.clear();
    match &attack.data {
        Some(AttackData::LastStand) => {
            telegraphs.push(mark(TelegraphShape::Circle {
                center: boss.position,
                radius: tuning.boss.last_stand.radius,
            }));
            let progress = now.saturating_sub(created_at) as f32 / duration.max(1) as f32;
            out.shake(5.0 + 25.0 * progress * progress, 100);
        }
        Some(AttackData::Summon { targets }) => {
            let radius = tuning.minion.size.width / 2.0;
            telegraphs.extend(
                targets
                    .iter()
                    .map(|&center| mark(TelegraphShape::Circle { center, radius })),
            );
        }
        Some(AttackData::Mortar { targets }) => {
            let radius = tuning.boss.mortar.radius;
            telegraphs.extend(
                targets
                    .iter()
                    .map(|&center| mark(TelegraphShape::Circle { center, radius })),
            );
        }
        Some(AttackData::Lanes { origin, angle }) => {
            telegraphs.extend(
                attack_lanes(attack.kind, *origin, *angle, tuning)
                    .into_iter()
                    .map(|lane| mark(TelegraphShape::Lane(lane))),
            );
        }
        Some(AttackData::Laser { .. }) | None => {}
    }

    if now < created_at + duration {
        return Vec::new();
    }

    telegraphs.clear();
    attack.phase = AttackPhase::Attacking;
    attack.phase_start = now;

    let mut minions = Vec::new();
    let mut summoned = false;
    match (&attack.kind, &attack.data) {
        (AttackKind::SummonMinions, Some(AttackData::Summon { targets })) => {
            minions = targets
                .iter()
                .map(|&position| Actor::minion(out.alloc_id(), position, now, tuning))
                .collect();
            info!(count = minions.len(), "boss summoned minions");
            summoned = true;
        }
        (AttackKind::LastStand, _) => {
            out.stop(Cue::LastStandCharge);
            out.play(Cue::LastStandExplosion);
            let diameter = tuning.boss.last_stand.radius * 2.0;
            out.animate_shaped(
                AnimationKind::FinalBlast,
                boss.position,
                0.0,
                Some(Size::new(diameter, diameter)),
                attack.attack,
            );
            out.shake(50.0, 800);
        }
        (kind @ (AttackKind::MultiLane | AttackKind::XPattern), Some(AttackData::Lanes { origin, angle })) => {
            for lane in attack_lanes(*kind, *origin, *angle, tuning) {
                out.animate_shaped(
                    AnimationKind::LaneAttack,
                    lane.center,
                    lane.angle,
                    Some(Size::new(lane.width, lane.height)),
                    tuning.effects.lane_attack,
                );
            }
            out.play(if *kind == AttackKind::MultiLane {
                Cue::BossMultiLane
            } else {
                Cue::BossXPattern
            });
        }
        (AttackKind::MortarVolley, _) => out.play(Cue::BossMortar),
        (AttackKind::LaserSweep, _) => out.play(Cue::BossLaserSweep),
        _ => {}
    }
    if summoned {
        *attack = AttackState::idle(now);
    }
    minions
}

/// Applies the attack's damage for this tick and returns to idle once its window closes.
fn resolve(
    boss: &mut Actor,
    player: &mut Actor,
    attack: &mut AttackState,
    memory: &mut EngineMemory,
    out: &mut Outbox,
    ctx: Ctx<'_>,
) {
    let now = ctx.now;
    let tuning = ctx.tuning;
    let t = &tuning.boss;
    let elapsed = now.saturating_sub(attack.phase_start);
    let finished = now >= attack.phase_start + attack.attack;

    let done = match (attack.kind, &attack.data) {
        (AttackKind::LastStand, _) => {
            if elapsed < t.last_stand.lethal_window
                && player.status != ActorStatus::Dying
                && player.position.distance(boss.position) <= t.last_stand.radius
            {
                player.health = 0.0;
                player.status = ActorStatus::Dying;
                player.death_time = now;
                player.last_damaged_by = Some(BOSS_ID);
                out.animate(
                    AnimationKind::Explosion,
                    player.position,
                    tuning.tank.death_duration,
                );
                info!("player caught in the last stand blast");
            }
            if finished {
                boss.health = 0.0;
            }
            false
        }
        (AttackKind::MortarVolley, Some(AttackData::Mortar { targets })) => {
            if !finished {
                for &target in targets {
                    out.animate(
                        AnimationKind::MortarStrike,
                        target,
                        tuning.effects.mortar_strike,
                    );
                    if player.is_active() && player.position.distance(target) <= t.mortar.radius {
                        out.shake(10.0, 300);
                        hit_player(player, t.mortar.damage, heavy_text(t.mortar.damage), target, out, ctx);
                    }
                }
            }
            finished
        }
        (AttackKind::LaserSweep, Some(AttackData::Laser { sweep_start })) => {
            let progress = elapsed as f32 / attack.attack.max(1) as f32;
            let laser_angle = sweep_start + progress * t.laser.sweep_arc - t.laser.sweep_arc / 2.0;
            let to_player = boss.position.heading_to(player.position);
            if player.is_active()
                && player.position.distance(boss.position) < t.laser.range
                && angle_delta(laser_angle, to_player).abs() < t.laser.half_width
                && now.saturating_sub(memory.last_laser_damage) > t.laser.damage_interval
            {
                memory.last_laser_damage = now;
                hit_player(player, t.laser.damage, tick_text(t.laser.damage), boss.position, out, ctx);
            }
            if finished {
                out.stop(Cue::BossLaserSweep);
            }
            finished
        }
        (
            kind @ (AttackKind::MultiLane | AttackKind::XPattern),
            Some(AttackData::Lanes { origin, angle }),
        ) => {
            if !finished && player.is_active() {
                let corners = player.rect().corners();
                let struck = attack_lanes(kind, *origin, *angle, tuning)
                    .iter()
                    .any(|lane| corners.iter().any(|&c| lane.contains(c)));
                if struck {
                    let damage = if kind == AttackKind::MultiLane {
                        t.multi_lane.damage
                    } else {
                        t.x_pattern.damage
                    };
                    out.shake(12.0, 300);
                    hit_player(player, damage, heavy_text(damage), boss.position, out, ctx);
                }
            }
            finished
        }
        (kind, data) => {
            warn!(?kind, has_data = data.is_some(), "boss attack parameters do not match, returning to idle");
            true
        }
    };

    if done {
        *attack = AttackState::idle(now);
    }
}

fn hit_player(
    player: &mut Actor,
    damage: f32,
    text: String,
    source: Vec2,
    out: &mut Outbox,
    ctx: Ctx<'_>,
) {
    player.take_damage(damage, Some(BOSS_ID), ctx.now);
    out.damage_number(
        text,
        label_position(player),
        DamageTone::BossAttack,
        ctx.tuning.effects.damage_number,
    );
    out.indicator(player.position, source, ctx.tuning.effects.damage_indicator);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{active_match, with_frame};
    use super::super::{Rules, TickOutcome};
    use super::*;
    use crate::domain::cues::SideEffect;
    use crate::domain::input::PlayerInput;
    use crate::domain::state::{GameState, PowerUpType};
    use crate::domain::tuning::Difficulty;

    fn rules() -> Rules {
        Rules::new(Tuning::default(), Difficulty::Medium)
    }

    /// Boss fight in progress: active boss at its spawn point, player straight below it.
    fn boss_fight(rules: &Rules) -> (GameState, EngineMemory) {
        let (mut state, memory) = active_match(0, rules);
        let mut boss = Actor::boss(0, &rules.tuning);
        boss.status = ActorStatus::Active;
        state.hostiles = vec![boss];
        state.match_phase = MatchPhase::Boss;
        state.player.position = Vec2::new(500.0, 600.0);
        (state, memory)
    }

    fn set_attack(state: &mut GameState, attack: AttackState) {
        if let Some(ActorKind::Boss { attack: slot, .. }) = state.boss_mut().map(|b| &mut b.kind) {
            *slot = attack;
        }
    }

    fn attack_of(state: &GameState) -> AttackState {
        match state.boss().map(|b| &b.kind) {
            Some(ActorKind::Boss { attack, .. }) => attack.clone(),
            _ => panic!("no boss"),
        }
    }

    fn attacking(kind: AttackKind, attack: u64, data: AttackData) -> AttackState {
        AttackState {
            kind,
            phase: AttackPhase::Attacking,
            phase_start: 1_000,
            telegraph: 0,
            attack,
            data: Some(data),
        }
    }

    fn tick(state: &GameState, memory: &mut EngineMemory, now: u64, rules: &Rules) -> TickOutcome {
        with_frame(state, memory, &PlayerInput::default(), now, rules, update)
    }

    #[test]
    fn when_score_crosses_threshold_then_boss_replaces_the_enemies() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.score = rules.tuning.boss.spawn_score;

        let next = tick(&state, &mut memory, 1_000, &rules).state;

        assert_eq!(next.match_phase, MatchPhase::Boss);
        assert_eq!(next.hostiles.len(), 1);
        let boss = next.boss().expect("boss spawned");
        assert_eq!(boss.status, ActorStatus::Spawning);
        assert_eq!(boss.position, rules.tuning.boss.spawn_position);
    }

    #[test]
    fn when_idle_time_elapses_then_an_attack_starts_telegraphing() {
        let rules = rules();
        let (state, mut memory) = boss_fight(&rules);

        let next = tick(&state, &mut memory, 3_500, &rules).state;

        let attack = attack_of(&next);
        assert!(ATTACKS.contains(&attack.kind));
        assert_eq!(attack.phase, AttackPhase::Telegraphing);
        assert_eq!(attack.phase_start, 3_500);
        assert!(attack.data.is_some());
    }

    #[test]
    fn when_summon_telegraph_ends_then_minions_appear_and_boss_idles() {
        let rules = rules();
        let (mut state, mut memory) = boss_fight(&rules);
        let boss = state.boss().cloned().expect("boss");
        set_attack(
            &mut state,
            AttackState {
                kind: AttackKind::SummonMinions,
                phase: AttackPhase::Telegraphing,
                phase_start: 1_000,
                telegraph: rules.tuning.boss.summon.telegraph,
                attack: 0,
                data: Some(AttackData::Summon {
                    targets: summon_points(&boss, &rules.tuning),
                }),
            },
        );

        let during = tick(&state, &mut memory, 2_000, &rules).state;
        assert_eq!(during.telegraphs.len(), 4);

        let after = tick(&during, &mut memory, 3_000, &rules).state;
        let minions: Vec<_> = after
            .hostiles
            .iter()
            .filter(|a| a.kind == ActorKind::Minion)
            .collect();
        assert_eq!(minions.len(), 4);
        assert!(minions.iter().all(|m| m.status == ActorStatus::Spawning));
        assert!(after.telegraphs.is_empty());
        assert_eq!(attack_of(&after).phase, AttackPhase::Idle);
    }

    #[test]
    fn when_mortar_lands_on_the_player_then_they_take_heavy_damage() {
        let rules = rules();
        let (mut state, mut memory) = boss_fight(&rules);
        let target = state.player.position;
        set_attack(
            &mut state,
            attacking(
                AttackKind::MortarVolley,
                500,
                AttackData::Mortar {
                    targets: vec![target, Vec2::new(100.0, 600.0)],
                },
            ),
        );

        let outcome = tick(&state, &mut memory, 1_100, &rules);

        let player = &outcome.state.player;
        let expected = rules.tuning.tank.health - rules.tuning.boss.mortar.damage;
        assert!((player.health - expected).abs() < 1e-6);
        assert_eq!(player.last_damaged_by, Some(BOSS_ID));
        assert_eq!(outcome.state.damage_numbers[0].text, "1.5");
        assert_eq!(outcome.state.damage_numbers[0].tone, DamageTone::BossAttack);
        assert_eq!(outcome.state.damage_indicators.len(), 1);
        let strikes = outcome
            .state
            .animations
            .iter()
            .filter(|a| a.kind == AnimationKind::MortarStrike)
            .count();
        assert_eq!(strikes, 2);
        assert!(outcome.effects.contains(&SideEffect::Shake {
            intensity: 10.0,
            duration: 300
        }));
    }

    #[test]
    fn when_laser_sweeps_across_the_player_then_damage_is_rate_limited() {
        let rules = rules();
        let (mut state, mut memory) = boss_fight(&rules);
        state.player.position = Vec2::new(500.0, 500.0);
        set_attack(
            &mut state,
            attacking(
                AttackKind::LaserSweep,
                3_000,
                AttackData::Laser { sweep_start: 180.0 },
            ),
        );

        let first = tick(&state, &mut memory, 2_500, &rules).state;
        let hit = rules.tuning.tank.health - rules.tuning.boss.laser.damage;
        assert!((first.player.health - hit).abs() < 1e-6);

        let second = tick(&first, &mut memory, 2_520, &rules).state;
        assert!((second.player.health - hit).abs() < 1e-6);
    }

    #[test]
    fn when_player_stands_in_a_lane_then_it_hits_but_the_gap_is_safe() {
        let rules = rules();
        let (mut state, mut memory) = boss_fight(&rules);
        let origin = state.player.position;
        set_attack(
            &mut state,
            attacking(
                AttackKind::MultiLane,
                500,
                AttackData::Lanes {
                    origin,
                    angle: 180.0,
                },
            ),
        );

        let struck = tick(&state, &mut memory, 1_100, &rules).state;
        let expected = rules.tuning.tank.health - rules.tuning.boss.multi_lane.damage;
        assert!((struck.player.health - expected).abs() < 1e-6);

        state.player.position = Vec2::new(origin.x - 75.0, origin.y);
        let safe = tick(&state, &mut memory, 1_100, &rules).state;
        assert_eq!(safe.player.health, rules.tuning.tank.health);
    }

    #[test]
    fn when_lanes_are_built_then_multi_lane_runs_along_the_attack_angle() {
        let tuning = Tuning::default();
        let lanes = attack_lanes(AttackKind::MultiLane, Vec2::new(500.0, 400.0), 180.0, &tuning);

        assert_eq!(lanes.len(), 3);
        assert!((lanes[0].center.x - 650.0).abs() < 1e-3);
        assert!((lanes[2].center.x - 350.0).abs() < 1e-3);
        assert!(lanes[1].contains(Vec2::new(500.0, 100.0)));
        assert!(!lanes[1].contains(Vec2::new(560.0, 400.0)));

        let cross = attack_lanes(AttackKind::XPattern, Vec2::new(500.0, 400.0), 0.0, &tuning);
        assert_eq!(cross.len(), 2);
        assert!(cross.iter().all(|lane| lane.contains(Vec2::new(500.0, 400.0))));
    }

    #[test]
    fn when_boss_health_drops_low_then_last_stand_starts_exactly_once() {
        let rules = rules();
        let (mut state, mut memory) = boss_fight(&rules);
        set_attack(
            &mut state,
            attacking(
                AttackKind::LaserSweep,
                3_000,
                AttackData::Laser { sweep_start: 0.0 },
            ),
        );
        if let Some(boss) = state.boss_mut() {
            boss.health = 15.0;
        }

        let first = tick(&state, &mut memory, 2_000, &rules);
        let attack = attack_of(&first.state);
        assert_eq!(attack.kind, AttackKind::LastStand);
        assert_eq!(attack.phase_start, 2_000);
        assert!(first.effects.contains(&SideEffect::StopCue {
            cue: Cue::BossLaserSweep
        }));
        assert!(first.effects.contains(&SideEffect::PlayCue {
            cue: Cue::LastStandCharge
        }));

        let second = tick(&first.state, &mut memory, 3_000, &rules);
        assert_eq!(attack_of(&second.state).phase_start, 2_000);
        assert_eq!(second.state.telegraphs.len(), 1);
    }

    #[test]
    fn when_last_stand_detonates_then_nearby_player_dies_despite_shield_and_boss_falls() {
        let rules = rules();
        let (mut state, mut memory) = boss_fight(&rules);
        state.player.active_power_up = Some(PowerUpType::Shield);
        state.player.shield_health = 3;
        set_attack(
            &mut state,
            attacking(AttackKind::LastStand, 2_500, AttackData::LastStand),
        );

        let blast = tick(&state, &mut memory, 1_050, &rules).state;
        assert_eq!(blast.player.health, 0.0);
        assert_eq!(blast.player.status, ActorStatus::Dying);
        assert!(blast.boss().is_some_and(|b| b.health > 0.0));

        let end = tick(&blast, &mut memory, 3_500, &rules).state;
        assert_eq!(end.boss().map(|b| b.health), Some(0.0));
    }

    #[test]
    fn when_time_is_stopped_then_the_boss_holds_still() {
        let rules = rules();
        let (mut state, mut memory) = boss_fight(&rules);
        state.is_time_stopped = true;

        let next = tick(&state, &mut memory, 5_000, &rules).state;

        assert_eq!(next.boss(), state.boss());
    }
}
