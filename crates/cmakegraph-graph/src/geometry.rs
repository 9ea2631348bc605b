//! 2D geometry used by layout, connection projection and hit testing.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction. A zero vector stays zero.
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return Self::ZERO;
        }
        self / length
    }

    /// Rotates by 90 degrees clockwise: `(x, y)` becomes `(y, -x)`.
    pub fn rotated90(self) -> Self {
        Self::new(self.y, -self.x)
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn min(self, other: Vec2) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(self, other: Vec2) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Smallest rectangle containing every point, or `None` for an empty input.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::from_min_max(first, first), |rect, p| {
            rect.include(p)
        }))
    }

    pub fn include(self, point: Vec2) -> Self {
        Self::from_min_max(self.min.min(point), self.max.max(point))
    }

    pub fn union(self, other: Rect) -> Self {
        Self::from_min_max(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Scales both corners around the origin, then moves them by `offset`.
    pub fn transformed(&self, scale: f32, offset: Vec2) -> Self {
        Self::from_min_max(self.min * scale + offset, self.max * scale + offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    pub fn length(&self) -> f32 {
        self.direction().length()
    }

    pub fn point_at(&self, t: f32) -> Vec2 {
        self.start + self.direction() * t
    }

    /// Parameter along `self` at which it crosses `other`.
    ///
    /// Parallel and collinear segments never intersect. Both parameters must lie in `[0, 1]`.
    pub fn intersect(&self, other: &Segment) -> Option<f32> {
        let r = self.direction();
        let s = other.direction();
        let denominator = r.cross(s);
        if denominator == 0.0 {
            return None;
        }

        let qp = other.start - self.start;
        let t = qp.cross(s) / denominator;
        let u = qp.cross(r) / denominator;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(t)
        } else {
            None
        }
    }

    /// Moves both endpoints along the original segment.
    pub fn trimmed(&self, t_start: f32, t_end: f32) -> Segment {
        Segment::new(self.point_at(t_start), self.point_at(t_end))
    }
}

/// Winding number containment test.
///
/// # Panics
///
/// Panics if the polygon has fewer than 3 vertices.
pub fn is_inside_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    assert!(
        polygon.len() >= 3,
        "polygon needs at least 3 vertices, got {}",
        polygon.len()
    );

    let side = |a: Vec2, b: Vec2| (b.x - a.x) * (point.y - a.y) - (point.x - a.x) * (b.y - a.y);

    let mut winding_number = 0i32;
    for (i, &current) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        if current.y <= point.y {
            if next.y > point.y && side(current, next) > 0.0 {
                winding_number += 1;
            }
        } else if next.y <= point.y && side(current, next) < 0.0 {
            winding_number -= 1;
        }
    }
    winding_number != 0
}

/// Arrowhead triangle `[tip, left, right]` ending at `segment.end`.
///
/// Short segments get a proportionally smaller arrow. Below a fifth of the full size the arrow
/// collapses to three zero points.
pub fn arrow_coordinates(segment: &Segment, mut length: f32, mut width: f32) -> [Vec2; 3] {
    const SCALE_DOWN_THRESHOLD: f32 = 0.2;
    const SCALE_DOWN_MULTIPLIER: f32 = 0.8;

    let segment_length = segment.length();
    let ratio = segment_length * SCALE_DOWN_MULTIPLIER / length;
    if ratio.is_nan() || ratio < SCALE_DOWN_THRESHOLD {
        return [Vec2::ZERO; 3];
    }
    if ratio < 1.0 {
        length *= ratio;
        width *= ratio;
    }

    let direction = segment.direction() / segment_length;
    let lengthwise = direction * length;
    let across = direction.rotated90() * width;
    [
        segment.end,
        segment.end - lengthwise + across,
        segment.end - lengthwise - across,
    ]
}

/// Thin rectangle of half-width `width` around a segment, used for picking.
pub fn hover_quad(segment: &Segment, width: f32) -> [Vec2; 4] {
    let across = segment.direction().rotated90().normalized() * width;
    [
        segment.start + across,
        segment.start - across,
        segment.end - across,
        segment.end + across,
    ]
}

/// Maps `value` linearly from `[src_min, src_max]` to `[dst_min, dst_max]`.
pub fn interpolate(value: f32, src_min: f32, src_max: f32, dst_min: f32, dst_max: f32) -> f32 {
    (value - src_min) * (dst_max - dst_min) / (src_max - src_min) + dst_min
}
