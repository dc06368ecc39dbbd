// Step 8: death transitions and kill credit.

use super::Frame;
use crate::domain::ActorId;
use crate::domain::state::{
    ActorKind, ActorStatus, AnimationKind, MasteryNotification, PLAYER_ID,
};
use std::iter;
use tracing::{debug, info};

const MASTERY_TEXT: &str = "OVERDRIVE MASTERY UNLOCKED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Victim {
    Player,
    Tank,
    Boss,
    Minion,
}

pub(crate) fn update(frame: &mut Frame<'_>) {
    let Frame { state, out, ctx, .. } = frame;
    let now = ctx.now;
    let tuning = ctx.tuning;

    let mut fallen: Vec<(Victim, Option<ActorId>)> = Vec::new();
    for actor in iter::once(&mut state.player).chain(state.hostiles.iter_mut()) {
        if actor.status == ActorStatus::Dying || actor.health > 0.0 {
            continue;
        }
        actor.status = ActorStatus::Dying;
        actor.death_time = now;
        out.animate(
            AnimationKind::Explosion,
            actor.position,
            tuning.tank.death_duration,
        );
        out.shake(7.0, 400);

        let victim = match &mut actor.kind {
            ActorKind::Player { .. } => Victim::Player,
            ActorKind::Enemy { respawn_time, .. } => {
                *respawn_time = now + tuning.tank.death_duration + tuning.tank.respawn_delay;
                Victim::Tank
            }
            ActorKind::Boss { .. } => Victim::Boss,
            ActorKind::Minion => Victim::Minion,
        };
        debug!(actor_id = actor.id, killer = ?actor.last_damaged_by, ?victim, "actor destroyed");
        fallen.push((victim, actor.last_damaged_by));
    }

    for (victim, killer) in fallen {
        match (victim, killer) {
            (Victim::Player, Some(id)) => {
                if let Some(enemy) = state
                    .hostiles
                    .iter_mut()
                    .find(|h| h.id == id && matches!(h.kind, ActorKind::Enemy { .. }))
                {
                    enemy.kills += 1;
                    enemy.score += tuning.tank.kill_score;
                }
            }
            (Victim::Player, None) => {}
            (_, Some(PLAYER_ID)) => {
                let player = &mut state.player;
                match victim {
                    Victim::Tank => {
                        player.kills += 1;
                        player.score += tuning.tank.kill_score;
                    }
                    Victim::Boss => {
                        player.kills += 1;
                        player.score += tuning.boss.kill_score;
                    }
                    Victim::Minion | Victim::Player => {
                        player.score += tuning.minion.kill_score;
                    }
                }
                if state
                    .abilities
                    .unlock_overdrive_mastery(player.kills, &tuning.abilities)
                {
                    info!(kills = player.kills, "overdrive mastery unlocked");
                    state.mastery_notification = Some(MasteryNotification {
                        text: MASTERY_TEXT.to_string(),
                        start_time: now,
                    });
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Rules;
    use super::super::test_support::{active_match, with_frame};
    use super::*;
    use crate::domain::abilities::AbilityId;
    use crate::domain::geometry::Vec2;
    use crate::domain::input::PlayerInput;
    use crate::domain::memory::EngineMemory;
    use crate::domain::state::{Actor, GameState};
    use crate::domain::tuning::{Difficulty, Tuning};

    fn rules() -> Rules {
        Rules::new(Tuning::default(), Difficulty::Medium)
    }

    fn tick(state: &GameState, memory: &mut EngineMemory, now: u64, rules: &Rules) -> GameState {
        with_frame(state, memory, &PlayerInput::default(), now, rules, update).state
    }

    #[test]
    fn when_health_is_driven_far_below_zero_then_death_and_credit_happen_once() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.hostiles[0].take_damage(5.0, Some(PLAYER_ID), 900);
        state.hostiles[0].take_damage(5.0, Some(PLAYER_ID), 900);

        let first = tick(&state, &mut memory, 1_000, &rules);
        let second = tick(&first, &mut memory, 1_016, &rules);

        let enemy = &second.hostiles[0];
        assert_eq!(enemy.status, ActorStatus::Dying);
        assert_eq!(enemy.death_time, 1_000);
        assert_eq!(second.player.kills, 1);
        assert_eq!(second.player.score, rules.tuning.tank.kill_score);
        assert_eq!(
            first
                .animations
                .iter()
                .filter(|a| a.kind == AnimationKind::Explosion)
                .count(),
            1
        );
        assert!(second.animations.len() == first.animations.len());
    }

    #[test]
    fn when_minion_falls_to_the_player_then_only_score_is_awarded() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        let mut minion = Actor::minion(3000, Vec2::new(600.0, 300.0), 0, &rules.tuning);
        minion.status = ActorStatus::Active;
        minion.take_damage(10.0, Some(PLAYER_ID), 900);
        state.hostiles.push(minion);

        let next = tick(&state, &mut memory, 1_000, &rules);

        assert_eq!(next.player.kills, 0);
        assert_eq!(next.player.score, rules.tuning.minion.kill_score);
    }

    #[test]
    fn when_boss_falls_to_the_player_then_boss_bounty_is_paid() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        let mut boss = Actor::boss(0, &rules.tuning);
        boss.status = ActorStatus::Active;
        boss.take_damage(200.0, Some(PLAYER_ID), 900);
        state.hostiles = vec![boss];

        let next = tick(&state, &mut memory, 1_000, &rules);

        assert_eq!(next.player.kills, 1);
        assert_eq!(next.player.score, rules.tuning.boss.kill_score);
    }

    #[test]
    fn when_kill_count_reaches_threshold_then_mastery_unlocks_exactly_once() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        state.player.kills = rules.tuning.abilities.overdrive.mastery_kills - 1;
        state.hostiles[0].take_damage(10.0, Some(PLAYER_ID), 900);

        let first = tick(&state, &mut memory, 1_000, &rules);
        assert!(first.abilities[AbilityId::Overdrive].mastered);
        let note = first.mastery_notification.clone().expect("notification");
        assert_eq!(note.text, MASTERY_TEXT);
        assert_eq!(note.start_time, 1_000);

        let mut later = first.clone();
        later.hostiles[1].take_damage(10.0, Some(PLAYER_ID), 1_900);
        let second = tick(&later, &mut memory, 2_000, &rules);
        assert_eq!(second.player.kills, rules.tuning.abilities.overdrive.mastery_kills + 1);
        assert_eq!(
            second.mastery_notification.map(|n| n.start_time),
            Some(1_000)
        );
    }

    #[test]
    fn when_enemy_kills_the_player_then_that_enemy_is_credited() {
        let rules = rules();
        let (mut state, mut memory) = active_match(0, &rules);
        let shooter = state.hostiles[1].id;
        state.player.take_damage(20.0, Some(shooter), 900);

        let next = tick(&state, &mut memory, 1_000, &rules);

        assert_eq!(next.player.status, ActorStatus::Dying);
        assert_eq!(next.hostiles[1].kills, 1);
        assert_eq!(next.hostiles[1].score, rules.tuning.tank.kill_score);
        assert_eq!(next.player.kills, 0);
    }
}
