//! Point, rectangle and line math
//!
//! Everything here is pure. Points are `glam::Vec2` in world units with y
//! growing downward (screen convention), so "top" is the smaller y.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle. Usually stored relative to an owning entity's
/// position and only combined with it when tested.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// One of the four sides of a [`Rect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// Enumeration order used when several edges are hit at the same point
    pub const DEFAULT_ORDER: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// True for edges parallel to the x axis
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Edge::Top | Edge::Bottom)
    }
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square of side `2 * radius` centred on the origin
    pub fn centered(radius: f32) -> Self {
        Self::new(-radius, -radius, radius * 2.0, radius * 2.0)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Corners in the order top-left, top-right, bottom-left, bottom-right
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left(), self.top()),
            Vec2::new(self.right(), self.top()),
            Vec2::new(self.left(), self.bottom()),
            Vec2::new(self.right(), self.bottom()),
        ]
    }

    /// The given side as a segment, ordered left-to-right or top-to-bottom
    pub fn edge(&self, edge: Edge) -> [Vec2; 2] {
        match edge {
            Edge::Top => [
                Vec2::new(self.left(), self.top()),
                Vec2::new(self.right(), self.top()),
            ],
            Edge::Bottom => [
                Vec2::new(self.left(), self.bottom()),
                Vec2::new(self.right(), self.bottom()),
            ],
            Edge::Left => [
                Vec2::new(self.left(), self.top()),
                Vec2::new(self.left(), self.bottom()),
            ],
            Edge::Right => [
                Vec2::new(self.right(), self.top()),
                Vec2::new(self.right(), self.bottom()),
            ],
        }
    }

    /// Inclusive containment (points on the border count)
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Exclusive containment (points on the border do not count)
    #[inline]
    pub fn strictly_contains(&self, point: Vec2) -> bool {
        point.x > self.left()
            && point.x < self.right()
            && point.y > self.top()
            && point.y < self.bottom()
    }
}

/// Rotate `point` about `center` by `angle_degrees`.
///
/// Works in polar form (atan2/cos/sin), so callers should rotate from a fixed
/// base vector each time rather than accumulating rotations.
pub fn rotate(point: Vec2, center: Vec2, angle_degrees: f32) -> Vec2 {
    let d = point - center;
    let dist = d.length();
    let angle = d.y.atan2(d.x) + angle_degrees.to_radians();
    center + Vec2::new(angle.cos() * dist, angle.sin() * dist)
}

/// Euclidean distance
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// True when `point` lies inside `rect` offset by `offset` (inclusive)
#[inline]
pub fn point_in_rect(point: Vec2, offset: Vec2, rect: &Rect) -> bool {
    move_rectangle(rect, offset).contains(point)
}

/// Corner containment test: true if any corner of `rect_a` (offset by
/// `offset_a`) lies inside `rect_b` (offset by `offset_b`).
///
/// This is not a full overlap test. When B sits entirely inside A no corner
/// of A is inside B, so callers that care about nesting test both directions.
pub fn rect_in_rect(offset_a: Vec2, rect_a: &Rect, offset_b: Vec2, rect_b: &Rect) -> bool {
    let b = move_rectangle(rect_b, offset_b);
    move_rectangle(rect_a, offset_a)
        .corners()
        .iter()
        .any(|corner| b.contains(*corner))
}

/// Intersection point of two segments, if they cross.
///
/// Uses the parametric form; both parameters must fall in `[0, 1]`. Parallel,
/// collinear and zero-length segments report no intersection.
pub fn line_intersect(a: [Vec2; 2], b: [Vec2; 2]) -> Option<Vec2> {
    let [p1, p2] = a;
    let [p3, p4] = b;
    let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    if denom == 0.0 {
        return None;
    }
    let ua = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / denom;
    let ub = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / denom;
    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(p1 + (p2 - p1) * ua)
    } else {
        None
    }
}

/// Grow a rectangle by `amount` on every side
pub fn inflate_rectangle(rect: &Rect, amount: f32) -> Rect {
    Rect {
        x: rect.x - amount,
        y: rect.y - amount,
        w: rect.w + amount * 2.0,
        h: rect.h + amount * 2.0,
    }
}

/// Translate a rectangle by `direction`
pub fn move_rectangle(rect: &Rect, direction: Vec2) -> Rect {
    Rect {
        x: rect.x + direction.x,
        y: rect.y + direction.y,
        ..*rect
    }
}
