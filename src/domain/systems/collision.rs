// Environment collision: arena bounds, static walls, and solid actors.

use crate::domain::geometry::{Rect, Size, Vec2, rect_overlap};
use crate::domain::state::Actor;
use crate::domain::tuning::ArenaTuning;
use rand::Rng;

/// True when `rect` leaves the arena, overlaps a wall, or overlaps a solid actor in `others`.
///
/// Callers leave the moving actor out of `others`.
pub fn is_blocked_by_environment<'a>(
    rect: &Rect,
    arena: &ArenaTuning,
    others: impl IntoIterator<Item = &'a Actor>,
) -> bool {
    if rect.x < 0.0
        || rect.y < 0.0
        || rect.x + rect.width > arena.width
        || rect.y + rect.height > arena.height
    {
        return true;
    }
    if arena.walls.iter().any(|wall| rect_overlap(rect, wall)) {
        return true;
    }
    others
        .into_iter()
        .any(|actor| actor.is_solid() && rect_overlap(rect, &actor.rect()))
}

/// Applies `velocity` one axis at a time, keeping each axis only if the body stays unblocked.
/// Lets bodies slide along walls instead of sticking on diagonal contact.
pub fn slide(
    position: Vec2,
    velocity: Vec2,
    size: Size,
    blocked: impl Fn(&Rect) -> bool,
) -> Vec2 {
    let mut next = position;
    let along_x = Vec2::new(next.x + velocity.x, next.y);
    if !blocked(&Rect::centered(along_x, size)) {
        next = along_x;
    }
    let along_y = Vec2::new(next.x, next.y + velocity.y);
    if !blocked(&Rect::centered(along_y, size)) {
        next = along_y;
    }
    next
}

/// Samples random points at least one body-size from the edges until one is clear of walls
/// and `avoid`; falls back to the arena centre.
pub fn find_safe_spawn_point<'a, R: Rng + ?Sized>(
    rng: &mut R,
    arena: &ArenaTuning,
    size: Size,
    avoid: impl IntoIterator<Item = &'a Actor> + Clone,
) -> Vec2 {
    for _ in 0..arena.safe_spawn_attempts {
        let x = rng.gen_range(0.0..1.0) * (arena.width - size.width * 2.0) + size.width;
        let y = rng.gen_range(0.0..1.0) * (arena.height - size.height * 2.0) + size.height;
        let candidate = Vec2::new(x, y);
        if !is_blocked_by_environment(&Rect::centered(candidate, size), arena, avoid.clone()) {
            return candidate;
        }
    }
    arena.center()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::{ActorStatus, Tier};
    use crate::domain::tuning::Tuning;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn no_actors() -> Vec<&'static Actor> {
        Vec::new()
    }

    fn tank_at(id: u64, position: Vec2, tuning: &Tuning) -> Actor {
        let mut tank = Actor::enemy(id, "t".into(), position, Tier::Basic, 0, tuning);
        tank.status = ActorStatus::Active;
        tank
    }

    #[test]
    fn when_moving_diagonally_into_a_wall_then_body_slides_along_it() {
        let tuning = Tuning::default();
        let arena = &tuning.arena;
        let size = tuning.tank.size;
        // Just below the first wall (200..350, 200..230), touching its bottom edge.
        let start = Vec2::new(275.0, 230.0 + size.height / 2.0);

        let next = slide(start, Vec2::new(1.0, -1.0), size, |rect| {
            is_blocked_by_environment(rect, arena, no_actors())
        });

        assert_eq!(next, Vec2::new(276.0, start.y));
    }

    #[test]
    fn when_rect_overlaps_a_solid_actor_then_it_is_blocked_unless_dying() {
        let tuning = Tuning::default();
        let mut other = tank_at(10, Vec2::new(500.0, 600.0), &tuning);
        let probe = Rect::centered(Vec2::new(520.0, 600.0), tuning.tank.size);

        assert!(is_blocked_by_environment(&probe, &tuning.arena, [&other]));
        other.status = ActorStatus::Dying;
        assert!(!is_blocked_by_environment(&probe, &tuning.arena, [&other]));
    }

    #[test]
    fn when_rect_leaves_arena_then_it_is_blocked() {
        let tuning = Tuning::default();
        let probe = Rect::centered(Vec2::new(10.0, 300.0), tuning.tank.size);
        assert!(is_blocked_by_environment(&probe, &tuning.arena, no_actors()));
    }

    #[test]
    fn when_safe_point_is_found_then_it_clears_walls_and_actors() {
        let tuning = Tuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let others = vec![
            tank_at(10, Vec2::new(300.0, 300.0), &tuning),
            tank_at(11, Vec2::new(700.0, 500.0), &tuning),
        ];

        for _ in 0..20 {
            let p = find_safe_spawn_point(&mut rng, &tuning.arena, tuning.tank.size, &others);
            let rect = Rect::centered(p, tuning.tank.size);
            assert!(!is_blocked_by_environment(&rect, &tuning.arena, &others));
        }
    }
}
