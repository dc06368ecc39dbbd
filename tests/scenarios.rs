// Whole-tick scenarios driven over scripted `now` timelines.

use arena_core::domain::abilities::{AbilityId, AbilityState};
use arena_core::domain::geometry::{Size, Vec2, rect_overlap};
use arena_core::domain::state::{
    Actor, ActorStatus, AttackKind, DamageTone, PLAYER_ID, PowerUpType, Projectile,
    ProjectileKind,
};
use arena_core::domain::tuning::{Difficulty, Tuning};
use arena_core::domain::{EngineMemory, GameState, PlayerInput, Rules, advance};
use arena_core::use_cases::{ControlScheme, Engine, SessionCommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

fn rules() -> Rules {
    Rules::new(Tuning::default(), Difficulty::Medium)
}

/// Fresh match with everyone past spawn protection.
fn live_match(rules: &Rules, now: u64) -> (GameState, EngineMemory) {
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let mut state = GameState::new(0, &rules.tuning, &mut rng);
    state.player.status = ActorStatus::Active;
    for enemy in &mut state.hostiles {
        enemy.status = ActorStatus::Active;
    }
    let mut memory = EngineMemory::new(21);
    memory.last_power_up_spawn = now;
    (state, memory)
}

fn shot(id: u64, owner_id: u64, position: Vec2, speed: f32) -> Projectile {
    Projectile {
        id,
        owner_id,
        position,
        angle: 0.0,
        size: Size::new(5.0, 5.0),
        speed,
        damage: 1.0,
        kind: ProjectileKind::Standard,
        turn_rate: 0.0,
        target_id: None,
        is_frozen: false,
    }
}

fn key(key: &str, down: bool) -> SessionCommand {
    let key = key.to_string();
    if down {
        SessionCommand::KeyDown { key }
    } else {
        SessionCommand::KeyUp { key }
    }
}

#[test]
fn when_player_shot_hits_a_fresh_enemy_then_one_point_of_damage_is_shown() {
    let rules = rules();
    let now = 5_000;
    let (mut state, mut memory) = live_match(&rules, now);
    let target = state.hostiles[0].id;
    let position = state.hostiles[0].position;
    state.projectiles.push(shot(900, PLAYER_ID, position, 0.1));

    let outcome = advance(&state, &mut memory, &PlayerInput::default(), now, &rules);

    let enemy = outcome.state.actor(target).expect("enemy");
    assert_eq!(enemy.health, rules.tuning.tank.health - 1.0);
    assert_eq!(enemy.status, ActorStatus::Active);
    assert!(
        outcome
            .state
            .damage_numbers
            .iter()
            .any(|n| n.text == "1" && n.tone == DamageTone::PlayerShot)
    );
    assert!(outcome.state.projectiles.iter().all(|p| p.id != 900));
}

#[test]
fn when_two_shots_finish_an_enemy_in_one_tick_then_death_is_credited_once() {
    let rules = rules();
    let now = 5_000;
    let (mut state, mut memory) = live_match(&rules, now);
    let target = state.hostiles[0].id;
    let position = state.hostiles[0].position;
    state.hostiles[0].health = 1.0;
    state.projectiles.push(shot(900, PLAYER_ID, position, 0.1));
    state.projectiles.push(shot(901, PLAYER_ID, position, 0.1));

    let first = advance(&state, &mut memory, &PlayerInput::default(), now, &rules);
    let second = advance(&first.state, &mut memory, &PlayerInput::default(), now + 16, &rules);

    let enemy = second.state.actor(target).expect("enemy");
    assert_eq!(enemy.status, ActorStatus::Dying);
    assert_eq!(enemy.death_time, now);
    assert_eq!(second.state.player.kills, 1);
    assert_eq!(second.state.player.score, rules.tuning.tank.kill_score);
}

#[test]
fn when_an_enemy_respawns_then_its_record_survives() {
    let rules = rules();
    let now = 5_000;
    let (mut state, mut memory) = live_match(&rules, now);
    let id = state.hostiles[0].id;
    {
        let enemy = &mut state.hostiles[0];
        enemy.kills = 3;
        enemy.deaths = 1;
        enemy.score = 150;
        enemy.health = 0.0;
    }

    let died = advance(&state, &mut memory, &PlayerInput::default(), now, &rules);
    let tank = &rules.tuning.tank;
    let back_at = now + tank.death_duration + tank.respawn_delay;
    let respawned = advance(&died.state, &mut memory, &PlayerInput::default(), back_at, &rules);

    let enemy = respawned.state.actor(id).expect("enemy");
    assert_eq!(enemy.kills, 3);
    assert_eq!(enemy.score, 150);
    assert_eq!(enemy.deaths, 2);
    assert_eq!(enemy.health, enemy.max_health);
    assert_ne!(enemy.status, ActorStatus::Dying);
    // Checked against where the others stood when the spawn point was chosen.
    let overlaps = died
        .state
        .hostiles
        .iter()
        .filter(|other| other.id != id)
        .any(|other| rect_overlap(&other.rect(), &enemy.rect()));
    assert!(!overlaps);
}

#[test]
fn when_time_is_stopped_then_hostiles_and_their_shots_hold_still() {
    let rules = rules();
    let now = 5_000;
    let (mut state, mut memory) = live_match(&rules, now);
    state.is_time_stopped = true;
    let time_stop = &mut state.abilities[AbilityId::TimeStop];
    time_stop.state = AbilityState::Active;
    time_stop.start_time = now - 100;
    let enemy_id = state.hostiles[0].id;
    state
        .projectiles
        .push(shot(900, enemy_id, Vec2::new(700.0, 400.0), 6.0));
    let input = PlayerInput {
        right: true,
        ..PlayerInput::default()
    };

    let mut current = state.clone();
    for step in 0..10 {
        current = advance(&current, &mut memory, &input, now + step * 16, &rules).state;
    }

    for (before, after) in state.hostiles.iter().zip(&current.hostiles) {
        assert_eq!(before.position, after.position);
    }
    let frozen = current
        .projectiles
        .iter()
        .find(|p| p.id == 900)
        .expect("enemy shot");
    assert_eq!(frozen.position, Vec2::new(700.0, 400.0));
    assert!(current.player.position.x > state.player.position.x);
}

#[test]
fn when_overdrive_is_pressed_mid_move_then_the_tank_speeds_up_until_it_expires() {
    let rules = rules();
    let base_speed = rules.tuning.tank.speed;
    let overdrive = rules.tuning.abilities.overdrive;
    let mut engine = Engine::new(rules, ControlScheme::Wasd, 5, 0);
    engine.tick(1_000);
    assert!(engine.state().player.is_active());

    let step = |engine: &mut Engine, now: u64| {
        let before = engine.state().player.position.x;
        engine.tick(now);
        engine.state().player.position.x - before
    };
    let phase = |engine: &Engine| engine.state().abilities[AbilityId::Overdrive].state;

    engine.handle(key("d", true), 1_000);
    assert!((step(&mut engine, 1_016) - base_speed).abs() < 1e-3);

    engine.handle(key("q", true), 2_000);
    engine.handle(key("q", false), 2_010);
    assert_eq!(phase(&engine), AbilityState::Active);
    let boosted = base_speed * overdrive.speed_multiplier;
    assert!((step(&mut engine, 2_016) - boosted).abs() < 1e-3);

    // Movement runs before the ability timers, so the expiring tick still moves boosted.
    let expires = 2_000 + overdrive.duration;
    assert!((step(&mut engine, expires) - boosted).abs() < 1e-3);
    assert_eq!(phase(&engine), AbilityState::Cooldown);
    assert!((step(&mut engine, expires + 16) - base_speed).abs() < 1e-3);

    engine.handle(key("d", false), expires + 20);
    assert_eq!(step(&mut engine, expires + 32), 0.0);
    engine.tick(expires + overdrive.cooldown);
    assert_eq!(phase(&engine), AbilityState::Ready);
}

#[test]
fn when_two_sessions_share_a_seed_and_inputs_then_they_stay_identical() {
    let mut a = Engine::new(rules(), ControlScheme::Wasd, 77, 0);
    let mut b = Engine::new(rules(), ControlScheme::Wasd, 77, 0);
    let script = [
        (1_200, key("d", true)),
        (1_200, key(" ", true)),
        (1_504, SessionCommand::PointerMove { x: 120.0, y: 90.0 }),
        (2_400, key("d", false)),
        (2_400, key("w", true)),
    ];

    for step in 0..200u64 {
        let now = step * 16;
        for (at, command) in &script {
            if *at == now {
                a.handle(command.clone(), now);
                b.handle(command.clone(), now);
            }
        }
        a.tick(now);
        b.tick(now);
    }

    assert_eq!(a.state(), b.state());
    assert_eq!(a.ticks(), 200);
}

#[test]
fn when_a_tick_deals_no_damage_then_no_actor_loses_health() {
    let rules = Rules::new(Tuning::default(), Difficulty::Hard);
    let headings = [
        PlayerInput { right: true, ..PlayerInput::default() },
        PlayerInput { up: true, ..PlayerInput::default() },
        PlayerInput { left: true, ..PlayerInput::default() },
        PlayerInput { down: true, ..PlayerInput::default() },
    ];

    for seed in 0..4u64 {
        let mut memory = EngineMemory::new(seed);
        let mut state = GameState::new(0, &rules.tuning, &mut memory.rng);

        for step in 1..=1_500u64 {
            let now = step * 16;
            let aim = state
                .hostiles
                .first()
                .map_or(state.player.position, |enemy| enemy.position);
            let input = PlayerInput {
                aim,
                fire: true,
                ..headings[(step / 120) as usize % headings.len()]
            };

            let next = advance(&state, &mut memory, &input, now, &rules).state;

            let shown: HashSet<u64> = state.damage_numbers.iter().map(|n| n.id).collect();
            let damage_shown = next.damage_numbers.iter().any(|n| !shown.contains(&n.id));
            let last_stand = [&state, &next].iter().any(|s| {
                s.boss()
                    .and_then(Actor::attack)
                    .is_some_and(|attack| attack.kind == AttackKind::LastStand)
            });
            for after in iter_actors(&next) {
                let Some(before) = state.actor(after.id) else {
                    continue;
                };
                if after.health >= before.health {
                    continue;
                }
                // Losing a Regensule takes its bonus max health with it.
                let lost_regensule = before.active_power_up == Some(PowerUpType::Regensule)
                    && after.active_power_up != Some(PowerUpType::Regensule);
                assert!(
                    damage_shown || lost_regensule || last_stand,
                    "seed {seed} at {now}: actor {} dropped {} -> {} with no damage dealt",
                    after.id,
                    before.health,
                    after.health,
                );
            }
            state = next;
        }
    }
}

fn iter_actors(state: &GameState) -> impl Iterator<Item = &Actor> {
    std::iter::once(&state.player).chain(&state.hostiles)
}
