//! Geometry primitives
//!
//! Line and cubic Bézier evaluation, arc length, distance and intersection
//! helpers shared by every engine. Cubic evaluation is delegated to
//! `lyon::geom::CubicBezierSegment<f64>`; everything here is deterministic and
//! bounded by explicit iteration limits.

use lyon::geom::{self, CubicBezierSegment};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::model::Point;

/// Distances below this are treated as zero.
pub const EPSILON: f64 = 1e-9;

/// Numeric tolerances used by the adaptive algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tolerances {
    /// Stop subdividing when the control polygon exceeds the chord by less
    /// than this fraction of the polygon length.
    pub arc_length_relative: f64,
    pub max_subdivision_depth: u32,
    /// Uniform samples taken before refining a closest-point query.
    pub closest_point_samples: u32,
    /// Golden-section refinement steps after sampling.
    pub closest_point_iterations: u32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            arc_length_relative: 1e-5,
            max_subdivision_depth: 16,
            closest_point_samples: 16,
            closest_point_iterations: 24,
        }
    }
}

pub(crate) fn to_lyon(p: Point) -> geom::Point<f64> {
    geom::point(p.x, p.y)
}

pub(crate) fn from_lyon(p: geom::Point<f64>) -> Point {
    Point::new(p.x, p.y)
}

/// Builds a lyon cubic from absolute control points.
pub fn bezier(from: Point, ctrl1: Point, ctrl2: Point, to: Point) -> CubicBezierSegment<f64> {
    CubicBezierSegment {
        from: to_lyon(from),
        ctrl1: to_lyon(ctrl1),
        ctrl2: to_lyon(ctrl2),
        to: to_lyon(to),
    }
}

pub fn lerp(a: Point, b: Point, t: f64) -> Point {
    a.lerp(b, t)
}

pub fn distance(a: Point, b: Point) -> f64 {
    a.distance_to(&b)
}

pub fn cubic_point(c: &CubicBezierSegment<f64>, t: f64) -> Point {
    from_lyon(c.sample(t))
}

/// First derivative at `t` (not normalized).
pub fn cubic_tangent(c: &CubicBezierSegment<f64>, t: f64) -> Point {
    let d = c.derivative(t);
    Point::new(d.x, d.y)
}

pub fn cubic_second_derivative(c: &CubicBezierSegment<f64>, t: f64) -> Point {
    let p0 = from_lyon(c.from);
    let p1 = from_lyon(c.ctrl1);
    let p2 = from_lyon(c.ctrl2);
    let p3 = from_lyon(c.to);
    let a = p2 - p1 * 2.0 + p0;
    let b = p3 - p2 * 2.0 + p1;
    a * (6.0 * (1.0 - t)) + b * (6.0 * t)
}

/// Signed curvature at `t`; `None` where the speed vanishes.
pub fn cubic_curvature(c: &CubicBezierSegment<f64>, t: f64) -> Option<f64> {
    let d1 = cubic_tangent(c, t);
    let speed = d1.length();
    if speed <= EPSILON {
        return None;
    }
    let d2 = cubic_second_derivative(c, t);
    Some(d1.cross(d2) / (speed * speed * speed))
}

/// Arc length by adaptive subdivision using Gravesen's estimate.
pub fn cubic_arc_length(c: &CubicBezierSegment<f64>, tol: &Tolerances) -> f64 {
    arc_length_rec(c, tol.arc_length_relative, 0, tol.max_subdivision_depth)
}

fn arc_length_rec(c: &CubicBezierSegment<f64>, rel_tol: f64, depth: u32, max_depth: u32) -> f64 {
    let chord = (c.to - c.from).length();
    let poly = (c.ctrl1 - c.from).length() + (c.ctrl2 - c.ctrl1).length() + (c.to - c.ctrl2).length();
    if poly - chord <= rel_tol * poly || depth >= max_depth {
        return (chord + poly) * 0.5;
    }
    let (left, right) = c.split(0.5);
    arc_length_rec(&left, rel_tol, depth + 1, max_depth)
        + arc_length_rec(&right, rel_tol, depth + 1, max_depth)
}

/// Polyline through a cubic, both end points included.
pub fn flatten_cubic(c: &CubicBezierSegment<f64>, tolerance_px: f64) -> Vec<Point> {
    let start = from_lyon(c.from);
    let mut points = vec![start];
    for p in c.flattened(tolerance_px.max(1e-6)) {
        let p = from_lyon(p);
        if points.last().map_or(true, |last| last.distance_to(&p) > EPSILON) {
            points.push(p);
        }
    }
    let end = from_lyon(c.to);
    if points.last().map_or(true, |last| last.distance_to(&end) > EPSILON) {
        points.push(end);
    }
    points
}

/// Closest point on segment `a`-`b`, with its parameter.
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> (Point, f64) {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq <= EPSILON * EPSILON {
        return (a, 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Closest point on a cubic by uniform sampling then golden-section
/// refinement around the best sample.
pub fn closest_point_on_cubic(
    p: Point,
    c: &CubicBezierSegment<f64>,
    tol: &Tolerances,
) -> (Point, f64) {
    let samples = tol.closest_point_samples.max(2);
    let dist = |t: f64| cubic_point(c, t).distance_to(&p);

    let mut best_t = 0.0;
    let mut best_d = f64::INFINITY;
    for i in 0..=samples {
        let t = i as f64 / samples as f64;
        let d = dist(t);
        if d < best_d {
            best_d = d;
            best_t = t;
        }
    }

    let step = 1.0 / samples as f64;
    let mut lo = (best_t - step).max(0.0);
    let mut hi = (best_t + step).min(1.0);
    let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
    let mut x1 = hi - ratio * (hi - lo);
    let mut x2 = lo + ratio * (hi - lo);
    let mut f1 = dist(x1);
    let mut f2 = dist(x2);
    for _ in 0..tol.closest_point_iterations {
        if f1 < f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - ratio * (hi - lo);
            f1 = dist(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + ratio * (hi - lo);
            f2 = dist(x2);
        }
    }
    let t = (lo + hi) * 0.5;
    if dist(t) < best_d {
        (cubic_point(c, t), t)
    } else {
        (cubic_point(c, best_t), best_t)
    }
}

/// Intersection of the infinite lines through `a1`-`a2` and `b1`-`b2`.
pub fn line_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let da = a2 - a1;
    let db = b2 - b1;
    let denom = da.cross(db);
    if denom.abs() <= EPSILON * da.length().max(1.0) * db.length().max(1.0) {
        return None;
    }
    let t = (b1 - a1).cross(db) / denom;
    Some(a1 + da * t)
}

/// Intersection of two closed segments, with the parameter on each.
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<(Point, f64, f64)> {
    let da = a2 - a1;
    let db = b2 - b1;
    let denom = da.cross(db);
    if denom.abs() <= EPSILON {
        return None;
    }
    let diff = b1 - a1;
    let t = diff.cross(db) / denom;
    let u = diff.cross(da) / denom;
    let range = -EPSILON..=1.0 + EPSILON;
    if range.contains(&t) && range.contains(&u) {
        Some((a1 + da * t, t, u))
    } else {
        None
    }
}

/// Shoelace area; positive when the points turn counter-clockwise in a
/// y-up frame (clockwise on screen).
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.cross(b);
    }
    sum * 0.5
}

pub fn polyline_length(points: &[Point], closed: bool) -> f64 {
    let open: f64 = points.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
    match (closed, points.first(), points.last()) {
        (true, Some(first), Some(last)) if points.len() > 2 => open + last.distance_to(first),
        _ => open,
    }
}

/// Geometry of one resolved edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line {
        from: Point,
        to: Point,
    },
    Cubic {
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
}

impl Segment {
    pub fn start(&self) -> Point {
        match *self {
            Segment::Line { from, .. } | Segment::Cubic { from, .. } => from,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            Segment::Line { to, .. } | Segment::Cubic { to, .. } => to,
        }
    }

    pub fn as_bezier(&self) -> Option<CubicBezierSegment<f64>> {
        match *self {
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => Some(bezier(from, ctrl1, ctrl2, to)),
            Segment::Line { .. } => None,
        }
    }

    /// End points plus, for cubics, both control points.
    pub fn control_points(&self) -> SmallVec<[Point; 4]> {
        match *self {
            Segment::Line { from, to } => smallvec![from, to],
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => smallvec![from, ctrl1, ctrl2, to],
        }
    }

    pub fn point_at(&self, t: f64) -> Point {
        match (self, self.as_bezier()) {
            (_, Some(c)) => cubic_point(&c, t),
            (Segment::Line { from, to }, None) => from.lerp(*to, t),
            _ => self.start(),
        }
    }

    /// Derivative with respect to `t`.
    pub fn tangent_at(&self, t: f64) -> Point {
        match (self, self.as_bezier()) {
            (_, Some(c)) => cubic_tangent(&c, t),
            (Segment::Line { from, to }, None) => *to - *from,
            _ => Point::ZERO,
        }
    }

    pub fn length(&self, tol: &Tolerances) -> f64 {
        match self.as_bezier() {
            Some(c) => cubic_arc_length(&c, tol),
            None => self.start().distance_to(&self.end()),
        }
    }

    /// Closest point and its parameter.
    pub fn closest_point(&self, p: Point, tol: &Tolerances) -> (Point, f64) {
        match self.as_bezier() {
            Some(c) => closest_point_on_cubic(p, &c, tol),
            None => closest_point_on_segment(p, self.start(), self.end()),
        }
    }

    /// Polyline approximation, both ends included.
    pub fn flatten(&self, tolerance_px: f64) -> Vec<Point> {
        match self.as_bezier() {
            Some(c) => flatten_cubic(&c, tolerance_px),
            None => vec![self.start(), self.end()],
        }
    }

    /// Parameter at which `target` px of arc length have been covered.
    pub fn param_at_length(&self, target: f64, tol: &Tolerances) -> f64 {
        let total = self.length(tol);
        if total <= EPSILON {
            return 0.0;
        }
        let Some(c) = self.as_bezier() else {
            return (target / total).clamp(0.0, 1.0);
        };
        if target <= 0.0 {
            return 0.0;
        }
        if target >= total {
            return 1.0;
        }
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..40 {
            let mid = (lo + hi) * 0.5;
            let len = cubic_arc_length(&c.split(mid).0, tol);
            if len < target {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo < 1e-9 {
                break;
            }
        }
        (lo + hi) * 0.5
    }

    /// Parameter at which half of the arc length has been covered.
    pub fn arc_length_midpoint(&self, tol: &Tolerances) -> f64 {
        self.param_at_length(self.length(tol) * 0.5, tol)
    }
}
