// Plane geometry shared by collision, pathfinding, and boss hit tests.
//
// Angles are in degrees with 0 pointing up (-Y) and increasing clockwise, which is
// the convention the renderer uses for tank bodies and turrets.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Heading from `self` towards `other` in game degrees.
    pub fn heading_to(self, other: Vec2) -> f32 {
        heading(other.x - self.x, other.y - self.y)
    }

    /// Point `distance` units away along a game-degree heading.
    pub fn offset(self, angle_deg: f32, distance: f32) -> Vec2 {
        let rad = (angle_deg - 90.0).to_radians();
        Vec2::new(self.x + rad.cos() * distance, self.y + rad.sin() * distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect of `size` centred on `center`.
    pub fn centered(center: Vec2, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    /// Inclusive containment (edges count as inside).
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.width, self.y),
            Vec2::new(self.x, self.y + self.height),
            Vec2::new(self.x + self.width, self.y + self.height),
        ]
    }

    /// Closest point of the rect to `p` (p itself when inside).
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.x, self.x + self.width),
            p.y.clamp(self.y, self.y + self.height),
        )
    }
}

/// A rect rotated about its centre, used for lane-shaped boss attacks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedRect {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
    /// Rotation in degrees.
    pub angle: f32,
}

impl OrientedRect {
    /// Strict point-in-box test in the rect's local frame.
    pub fn contains(&self, p: Vec2) -> bool {
        let rad = -self.angle.to_radians();
        let (sin, cos) = rad.sin_cos();
        let tx = p.x - self.center.x;
        let ty = p.y - self.center.y;
        let rx = tx * cos - ty * sin;
        let ry = tx * sin + ty * cos;
        rx > -self.width / 2.0
            && rx < self.width / 2.0
            && ry > -self.height / 2.0
            && ry < self.height / 2.0
    }
}

/// Game-degree heading of a direction vector.
pub fn heading(dx: f32, dy: f32) -> f32 {
    dy.atan2(dx).to_degrees() + 90.0
}

/// Signed shortest difference `to - from`, in (-180, 180].
pub fn angle_delta(from: f32, to: f32) -> f32 {
    let mut diff = to - from;
    while diff < -180.0 {
        diff += 360.0;
    }
    while diff > 180.0 {
        diff -= 360.0;
    }
    diff
}

/// Turns `current` towards `target` by at most `max_step` degrees.
pub fn turn_towards(current: f32, target: f32, max_step: f32) -> f32 {
    let diff = angle_delta(current, target);
    if diff.abs() < max_step {
        target
    } else {
        current + diff.signum() * max_step
    }
}

pub fn normalize_degrees(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}

/// Strict AABB overlap; touching edges do not overlap.
pub fn rect_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

fn segments_cross(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    let den = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if den == 0.0 {
        return false;
    }
    let t = ((p1.x - p3.x) * (p3.y - p4.y) - (p1.y - p3.y) * (p3.x - p4.x)) / den;
    let u = -((p1.x - p2.x) * (p1.y - p3.y) - (p1.y - p2.y) * (p1.x - p3.x)) / den;
    t > 0.0 && t < 1.0 && u > 0.0 && u < 1.0
}

/// Beam hit test: the segment crosses an edge of `rect`, or starts inside it.
pub fn segment_intersects_rect(p1: Vec2, p2: Vec2, rect: &Rect) -> bool {
    let r1 = Vec2::new(rect.x, rect.y);
    let r2 = Vec2::new(rect.x + rect.width, rect.y);
    let r3 = Vec2::new(rect.x + rect.width, rect.y + rect.height);
    let r4 = Vec2::new(rect.x, rect.y + rect.height);

    segments_cross(p1, p2, r1, r2)
        || segments_cross(p1, p2, r2, r3)
        || segments_cross(p1, p2, r3, r4)
        || segments_cross(p1, p2, r4, r1)
        || rect.contains(p1)
}
