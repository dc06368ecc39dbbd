use crate::domain::geometry::{Rect, Vec2};
use serde::Deserialize;

/// Static arena layout: bounds, walls, and fixed spawn locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
    pub walls: Vec<Rect>,

    /// Navigation grid resolution in pixels.
    pub nav_cell_size: f32,

    pub player_spawn: Vec2,
    pub enemy_spawns: Vec<Vec2>,

    /// Random samples tried before a safe spawn search falls back to the arena centre.
    pub safe_spawn_attempts: u32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        let width = 1000.0;
        let height = 700.0;
        Self {
            width,
            height,
            walls: vec![
                Rect::new(200.0, 200.0, 150.0, 30.0),
                Rect::new(width - 350.0, 200.0, 150.0, 30.0),
                Rect::new(width / 2.0 - 15.0, 350.0, 30.0, 150.0),
            ],
            nav_cell_size: 20.0,
            player_spawn: Vec2::new(width / 2.0, height - 100.0),
            enemy_spawns: vec![
                Vec2::new(100.0, 100.0),
                Vec2::new(width - 100.0, 100.0),
                Vec2::new(width / 2.0, 150.0),
            ],
            safe_spawn_attempts: 50,
        }
    }
}

impl ArenaTuning {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}
