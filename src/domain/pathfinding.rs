// Grid navigation for enemy AI: inflated occupancy grid, A*, line of sight, smoothing.

use crate::domain::geometry::{Rect, Size, Vec2};
use pathfinding::prelude::astar;

// Integer step costs keep A* on `Ord` costs; diagonal approximates sqrt(2).
const CARDINAL_COST: u32 = 1000;
const DIAGONAL_COST: u32 = 1414;

/// Spacing between line-of-sight samples, in world units.
const SIGHT_STEP: f32 = 10.0;

type Cell = (i32, i32);

/// Binary occupancy grid over the arena.
#[derive(Debug, Clone)]
pub struct NavGrid {
    cols: i32,
    rows: i32,
    cell_size: f32,
    blocked: Vec<bool>,
}

impl NavGrid {
    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Out-of-range cells read as blocked.
    pub fn is_blocked(&self, (x, y): Cell) -> bool {
        if x < 0 || y < 0 || x >= self.cols || y >= self.rows {
            return true;
        }
        self.blocked[(y * self.cols + x) as usize]
    }

    pub fn cell_of(&self, p: Vec2) -> Cell {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    pub fn cell_center(&self, (x, y): Cell) -> Vec2 {
        Vec2::new(
            x as f32 * self.cell_size + self.cell_size / 2.0,
            y as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }

    fn successors(&self, (x, y): Cell) -> Vec<(Cell, u32)> {
        let mut out = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let next = (x + dx, y + dy);
                if self.is_blocked(next) {
                    continue;
                }
                if dx != 0 && dy != 0 {
                    // No corner cutting: both orthogonal neighbours must be open.
                    if self.is_blocked((x + dx, y)) || self.is_blocked((x, y + dy)) {
                        continue;
                    }
                    out.push((next, DIAGONAL_COST));
                } else {
                    out.push((next, CARDINAL_COST));
                }
            }
        }
        out
    }
}

/// Rasterizes the arena, blocking every cell whose centre lies closer than the
/// agent's half-extent to a wall.
pub fn build_nav_grid(
    arena_width: f32,
    arena_height: f32,
    cell_size: f32,
    walls: &[Rect],
    agent: Size,
) -> NavGrid {
    let cols = (arena_width / cell_size).floor().max(0.0) as i32;
    let rows = (arena_height / cell_size).floor().max(0.0) as i32;
    let agent_radius = agent.width.max(agent.height) / 2.0;

    let mut blocked = vec![false; (cols * rows) as usize];
    for y in 0..rows {
        for x in 0..cols {
            let center = Vec2::new(
                x as f32 * cell_size + cell_size / 2.0,
                y as f32 * cell_size + cell_size / 2.0,
            );
            blocked[(y * cols + x) as usize] = walls
                .iter()
                .any(|wall| center.distance(wall.closest_point(center)) < agent_radius);
        }
    }

    NavGrid {
        cols,
        rows,
        cell_size,
        blocked,
    }
}

fn octile(a: Cell, b: Cell) -> u32 {
    let dx = (a.0 - b.0).unsigned_abs();
    let dy = (a.1 - b.1).unsigned_abs();
    let (short, long) = if dx < dy { (dx, dy) } else { (dy, dx) };
    short * DIAGONAL_COST + (long - short) * CARDINAL_COST
}

/// A* over the grid with 8-way movement. Returns cell-centre waypoints from
/// start to end inclusive, or `None` when either end is blocked or unreachable.
pub fn find_path(grid: &NavGrid, start: Vec2, end: Vec2) -> Option<Vec<Vec2>> {
    let start_cell = grid.cell_of(start);
    let end_cell = grid.cell_of(end);
    if grid.is_blocked(start_cell) || grid.is_blocked(end_cell) {
        return None;
    }

    let (cells, _cost) = astar(
        &start_cell,
        |&cell| grid.successors(cell),
        |&cell| octile(cell, end_cell),
        |&cell| cell == end_cell,
    )?;

    Some(cells.into_iter().map(|c| grid.cell_center(c)).collect())
}

/// Samples the segment every few units; any sample inside a wall blocks sight.
pub fn has_line_of_sight(a: Vec2, b: Vec2, walls: &[Rect]) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let steps = (a.distance(b) / SIGHT_STEP).floor() as u32;
    if steps == 0 {
        return true;
    }

    (0..=steps).all(|i| {
        let t = i as f32 / steps as f32;
        let p = Vec2::new(a.x + t * dx, a.y + t * dy);
        !walls.iter().any(|wall| wall.contains(p))
    })
}

/// String-pulling: from each anchor keep the furthest waypoint still in sight.
pub fn smooth_path(path: &[Vec2], walls: &[Rect]) -> Vec<Vec2> {
    if path.len() < 2 {
        return path.to_vec();
    }

    let mut smoothed = vec![path[0]];
    let mut current = 0;
    while current < path.len() - 1 {
        let mut last_visible = current + 1;
        for i in current + 2..path.len() {
            if has_line_of_sight(path[current], path[i], walls) {
                last_visible = i;
            } else {
                break;
            }
        }
        smoothed.push(path[last_visible]);
        current = last_visible;
    }
    smoothed
}
