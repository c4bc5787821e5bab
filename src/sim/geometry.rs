//! Line segment and polygon geometry
//!
//! Pure functions used by the cable sweep and the wall/containment checks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A directed line segment from `a` to `b`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn delta(&self) -> Vec2 {
        self.b - self.a
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.delta().length()
    }

    /// Point at parameter `t` along the segment (0 = a, 1 = b)
    #[inline]
    pub fn at(&self, t: f32) -> Vec2 {
        self.a.lerp(self.b, t)
    }
}

/// Result of intersecting the infinite lines through two segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Where the lines cross; `None` when they are parallel or degenerate
    pub point: Option<Vec2>,
    /// Crossing lies strictly inside the first segment
    pub on_first: bool,
    /// Crossing lies strictly inside the second segment
    pub on_second: bool,
}

impl Intersection {
    /// Sentinel for parallel, coincident or zero-length input
    pub fn none() -> Self {
        Self {
            point: None,
            on_first: false,
            on_second: false,
        }
    }

    /// Both segments genuinely cross each other
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.on_first && self.on_second
    }
}

/// Intersect two segments.
///
/// Parametric bounds are strict (`0 < t < 1`), so touching at an endpoint is
/// not a crossing. A zero denominator (parallel lines, zero-length segments,
/// a segment against itself) yields [`Intersection::none`].
pub fn intersect(first: Segment, second: Segment) -> Intersection {
    let d1 = first.delta();
    let d2 = second.delta();

    let denominator = d2.y * d1.x - d2.x * d1.y;
    if denominator == 0.0 || !denominator.is_finite() {
        return Intersection::none();
    }

    let offset = first.a - second.a;
    let t_first = (d2.x * offset.y - d2.y * offset.x) / denominator;
    let t_second = (d1.x * offset.y - d1.y * offset.x) / denominator;

    let point = first.a + d1 * t_first;
    if !point.is_finite() {
        return Intersection::none();
    }

    Intersection {
        point: Some(point),
        on_first: t_first > 0.0 && t_first < 1.0,
        on_second: t_second > 0.0 && t_second < 1.0,
    }
}

/// Even-odd containment test; polygons with fewer than 3 vertices contain nothing
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = polygon[i];
        let pj = polygon[j];
        // Straddle check guarantees pi.y != pj.y below
        if (pi.y > point.y) != (pj.y > point.y) {
            let crossing_x = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < crossing_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Closed edge loop of a polygon (last vertex connects back to the first)
pub fn polygon_edges(polygon: &[Vec2]) -> impl Iterator<Item = Segment> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| Segment::new(polygon[i], polygon[(i + 1) % n]))
}

/// True if `path` strictly crosses any edge of `polygon`
pub fn segment_crosses_polygon(path: Segment, polygon: &[Vec2]) -> bool {
    polygon_edges(polygon).any(|edge| intersect(edge, path).is_hit())
}
