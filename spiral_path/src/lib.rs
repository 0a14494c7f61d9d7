//! # spiral_path
//!
//! Helical camera paths for cinematic flights.
//!
//! [`generate_spiral_path`] samples a tapering helix and fits a
//! [`Curve3D`] through the samples.  The curve is a centripetal
//! Catmull–Rom spline: it passes through every sample, never overshoots
//! into loops at tight corners, and has a continuous tangent.
//!
//! ## Parameterisations
//!
//! A spline has two useful parameters:
//!
//! * `t`: the raw spline parameter.  Each control-point segment gets an
//!   equal slice of `[0, 1]`, so stepping `t` at a constant rate moves
//!   *faster* along long segments than short ones.
//! * `u`: the arc-length parameter.  `u = 0.5` is exactly halfway along
//!   the curve's physical length.  Stepping `u` at a constant rate gives
//!   constant speed.
//!
//! The arc-length table that maps `u → t` is built once in
//! [`Curve3D::new`], so every curve is ready for time-uniform motion as
//! soon as it exists.
//!
//! ## Quick start
//!
//! ```rust
//! use spiral_path::generate_spiral_path;
//!
//! let path = generate_spiral_path(18.0, 16.0, 5.5).unwrap();
//! let start = path.point_at(0.0);      // bottom of the helix, wide radius
//! let heading = path.tangent_at(0.0);  // unit vector
//! assert!((heading.length() - 1.0).abs() < 1e-4);
//! assert!(start.y < 0.0);
//! ```

use glam::Vec3;
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

/// Number of helix steps sampled by [`generate_spiral_path`]
/// (the curve receives `SAMPLE_STEPS + 1` control points).
pub const SAMPLE_STEPS: usize = 100;

/// Radius left at the top of the helix so the tip never collapses to a point.
pub const TIP_RADIUS: f32 = 0.5;

/// Resolution of the arc-length table.
pub const ARC_LENGTH_DIVISIONS: usize = 200;

// ════════════════════════════════════════════════════════════════════════════
// PathError
// ════════════════════════════════════════════════════════════════════════════

/// Construction errors.  A path that cannot be arc-length parameterised is
/// rejected up front rather than producing NaN poses later.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("spiral height must be finite and positive, got {0}")]
    InvalidHeight(f32),

    #[error("spiral radius must be finite and non-negative, got {0}")]
    InvalidRadius(f32),

    #[error("spiral turns must be finite and non-negative, got {0}")]
    InvalidTurns(f32),

    #[error("curve needs at least 2 control points, got {0}")]
    TooFewPoints(usize),

    #[error("control point {0} is not finite")]
    NonFinitePoint(usize),

    #[error("curve has zero arc length")]
    ZeroLength,
}

// ════════════════════════════════════════════════════════════════════════════
// generate_spiral_path
// ════════════════════════════════════════════════════════════════════════════

/// Build a tapering helix centred on the Y axis.
///
/// The helix starts at `y = -height/2` with radius `max_radius + TIP_RADIUS`
/// and climbs to `y = +height/2` where the radius has shrunk to
/// [`TIP_RADIUS`].  The angle advances linearly through `turns` full
/// revolutions.
///
/// The result depends only on the three arguments, so callers may cache it
/// per `(height, max_radius, turns)`.
pub fn generate_spiral_path(height: f32, max_radius: f32, turns: f32) -> Result<Curve3D, PathError> {
    if !height.is_finite() || height <= 0.0 {
        return Err(PathError::InvalidHeight(height));
    }
    if !max_radius.is_finite() || max_radius < 0.0 {
        return Err(PathError::InvalidRadius(max_radius));
    }
    if !turns.is_finite() || turns < 0.0 {
        return Err(PathError::InvalidTurns(turns));
    }

    let points = (0..=SAMPLE_STEPS)
        .map(|i| {
            let t      = i as f32 / SAMPLE_STEPS as f32;
            let y      = t * height - height / 2.0;
            let radius = (1.0 - t) * max_radius + TIP_RADIUS;
            let angle  = t * std::f32::consts::TAU * turns;
            Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
        })
        .collect();

    Curve3D::new(points)
}

// ════════════════════════════════════════════════════════════════════════════
// Curve3D
// ════════════════════════════════════════════════════════════════════════════

/// An open centripetal Catmull–Rom spline with a precomputed arc-length table.
#[derive(Clone, Debug)]
pub struct Curve3D {
    points:  Vec<Vec3>,
    /// Cumulative length at `t = i / ARC_LENGTH_DIVISIONS`.
    lengths: Vec<f32>,
}

impl Curve3D {
    /// Fit a spline through `points` and run the arc-length pass.
    pub fn new(points: Vec<Vec3>) -> Result<Self, PathError> {
        if points.len() < 2 {
            return Err(PathError::TooFewPoints(points.len()));
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(PathError::NonFinitePoint(i));
        }

        let mut curve = Curve3D { points, lengths: Vec::new() };
        curve.lengths = curve.arc_lengths(ARC_LENGTH_DIVISIONS);

        if !(curve.length() > f32::EPSILON) {
            return Err(PathError::ZeroLength);
        }
        Ok(curve)
    }

    /// A copy of this curve with every control point shifted by `offset`.
    pub fn translated(&self, offset: Vec3) -> Result<Self, PathError> {
        Curve3D::new(self.points.iter().map(|&p| p + offset).collect())
    }

    pub fn points(&self) -> &[Vec3] { &self.points }

    /// Total arc length.
    pub fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    // ── raw-parameter evaluation ──────────────────────────────────────────

    /// Point at raw spline parameter `t ∈ [0, 1]`.
    pub fn point(&self, t: f32) -> Vec3 {
        let (seg, w) = self.segment(t);
        seg.value(w)
    }

    /// Unit tangent at raw spline parameter `t ∈ [0, 1]`.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let (seg, w) = self.segment(t);
        let d = seg.derivative(w).normalize_or_zero();
        if d != Vec3::ZERO {
            return d;
        }
        // Stationary point on the spline: fall back to a central difference.
        const DELTA: f32 = 1e-4;
        let a = self.point((t - DELTA).max(0.0));
        let b = self.point((t + DELTA).min(1.0));
        let d = (b - a).normalize_or_zero();
        if d != Vec3::ZERO { d } else { Vec3::Y }
    }

    // ── arc-length evaluation ─────────────────────────────────────────────

    /// Point at arc-length fraction `u ∈ [0, 1]`.
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at arc-length fraction `u ∈ [0, 1]`.
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        self.tangent(self.u_to_t(u))
    }

    /// Map an arc-length fraction to the raw spline parameter.
    pub fn u_to_t(&self, u: f32) -> f32 {
        let n = self.lengths.len();
        let target = u.clamp(0.0, 1.0) * self.length();

        // Last table entry whose length does not exceed the target.
        let i = self.lengths.partition_point(|&len| len <= target).saturating_sub(1);
        if i >= n - 1 {
            return 1.0;
        }

        let before  = self.lengths[i];
        let segment = self.lengths[i + 1] - before;
        let frac = if segment > 0.0 { (target - before) / segment } else { 0.0 };
        ((i as f32 + frac) / (n - 1) as f32).clamp(0.0, 1.0)
    }

    fn arc_lengths(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut last = self.point(0.0);
        let mut sum  = 0.0f32;
        lengths.push(0.0);
        for p in 1..=divisions {
            let cur = self.point(p as f32 / divisions as f32);
            sum += cur.distance(last);
            lengths.push(sum);
            last = cur;
        }
        lengths
    }

    /// Locate the cubic for raw parameter `t` and the local weight inside it.
    fn segment(&self, t: f32) -> (Cubic, f32) {
        let pts = &self.points;
        let l   = pts.len();

        let p = (l - 1) as f32 * t.clamp(0.0, 1.0);
        let mut i = p.floor() as usize;
        let mut w = p - i as f32;
        if i >= l - 1 {
            i = l - 2;
            w = 1.0;
        }

        let p1 = pts[i];
        let p2 = pts[i + 1];
        // Open ends: mirror the neighbour through the endpoint.
        let p0 = if i > 0     { pts[i - 1] } else { 2.0 * p1 - p2 };
        let p3 = if i + 2 < l { pts[i + 2] } else { 2.0 * p2 - p1 };

        (Cubic::centripetal(p0, p1, p2, p3), w)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Cubic: one Hermite segment
// ════════════════════════════════════════════════════════════════════════════

/// `c0 + c1·w + c2·w² + c3·w³`, evaluated componentwise.
#[derive(Clone, Copy, Debug)]
struct Cubic {
    c0: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
}

impl Cubic {
    /// Non-uniform Catmull–Rom with centripetal knot spacing (α = 0.5).
    fn centripetal(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);

        // Repeated points would divide by zero.
        if dt1 < 1e-4 { dt1 = 1.0; }
        if dt0 < 1e-4 { dt0 = dt1; }
        if dt2 < 1e-4 { dt2 = dt1; }

        let t1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
        let t2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

        Cubic::hermite(p1, p2, t1, t2)
    }

    fn hermite(x0: Vec3, x1: Vec3, t0: Vec3, t1: Vec3) -> Self {
        Cubic {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    fn value(&self, w: f32) -> Vec3 {
        self.c0 + w * (self.c1 + w * (self.c2 + w * self.c3))
    }

    fn derivative(&self, w: f32) -> Vec3 {
        self.c1 + w * (2.0 * self.c2 + 3.0 * w * self.c3)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn radius(p: Vec3) -> f32 { (p.x * p.x + p.z * p.z).sqrt() }

    #[test]
    fn start_is_wide_and_low() {
        let path = generate_spiral_path(18.0, 16.0, 5.5).unwrap();
        let p = path.point_at(0.0);
        assert!((p.y + 9.0).abs() < 1e-4, "y = {}", p.y);
        assert!((radius(p) - (16.0 + TIP_RADIUS)).abs() < 1e-3, "r = {}", radius(p));
    }

    #[test]
    fn end_is_narrow_and_high() {
        let path = generate_spiral_path(18.0, 16.0, 5.5).unwrap();
        let p = path.point_at(1.0);
        assert!((p.y - 9.0).abs() < 1e-3, "y = {}", p.y);
        assert!((radius(p) - TIP_RADIUS).abs() < 1e-3, "r = {}", radius(p));
        assert!(radius(p) > 0.0);
    }

    #[test]
    fn tangent_is_unit_everywhere() {
        let path = generate_spiral_path(18.0, 16.0, 5.5).unwrap();
        for k in 0..=500 {
            let u = k as f32 / 500.0;
            let t = path.tangent_at(u);
            assert!((t.length() - 1.0).abs() < 1e-4, "u={} |t|={}", u, t.length());
        }
    }

    #[test]
    fn tangent_climbs_with_the_helix() {
        let path = generate_spiral_path(18.0, 16.0, 5.5).unwrap();
        for k in 0..=20 {
            assert!(path.tangent_at(k as f32 / 20.0).y > 0.0);
        }
    }

    #[test]
    fn arc_length_steps_are_even() {
        let path = generate_spiral_path(18.0, 16.0, 5.5).unwrap();
        let n = 400;
        let expected = path.length() / n as f32;
        let mut prev = path.point_at(0.0);
        for k in 1..=n {
            let cur = path.point_at(k as f32 / n as f32);
            let step = cur.distance(prev);
            assert!(
                (step - expected).abs() / expected < 0.05,
                "step {} is {} vs expected {}", k, step, expected
            );
            prev = cur;
        }
    }

    #[test]
    fn raw_parameter_is_not_uniform() {
        // Wide bottom loops are longer than the tight top ones, so equal t-steps
        // cover unequal distances.  This is why point_at exists.
        let path = generate_spiral_path(18.0, 16.0, 5.5).unwrap();
        let low  = path.point(0.05).distance(path.point(0.0));
        let high = path.point(1.0).distance(path.point(0.95));
        assert!(low > 2.0 * high);
    }

    #[test]
    fn u_to_t_is_monotone_and_bounded() {
        let path = generate_spiral_path(10.0, 4.0, 3.0).unwrap();
        let mut last = -1.0;
        for k in 0..=1000 {
            let t = path.u_to_t(k as f32 / 1000.0);
            assert!((0.0..=1.0).contains(&t));
            assert!(t >= last);
            last = t;
        }
        assert_eq!(path.u_to_t(0.0), 0.0);
        assert_eq!(path.u_to_t(1.0), 1.0);
        assert_eq!(path.u_to_t(7.0), 1.0);
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_spiral_path(18.0, 16.0, 5.5).unwrap();
        let b = generate_spiral_path(18.0, 16.0, 5.5).unwrap();
        assert_eq!(a.points(), b.points());
        assert_eq!(a.length(), b.length());
    }

    #[test]
    fn translation_shifts_points_and_keeps_length() {
        let path  = generate_spiral_path(18.0, 16.0, 5.5).unwrap();
        let moved = path.translated(Vec3::new(0.0, -2.0, 0.0)).unwrap();
        assert!((moved.length() - path.length()).abs() < 1e-2);
        let d = moved.point_at(0.3) - path.point_at(0.3);
        assert!((d - Vec3::new(0.0, -2.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert_eq!(generate_spiral_path(0.0, 5.0, 2.0).unwrap_err(), PathError::InvalidHeight(0.0));
        assert_eq!(generate_spiral_path(-1.0, 5.0, 2.0).unwrap_err(), PathError::InvalidHeight(-1.0));
        assert!(matches!(generate_spiral_path(f32::NAN, 5.0, 2.0), Err(PathError::InvalidHeight(_))));
        assert_eq!(generate_spiral_path(5.0, -1.0, 2.0).unwrap_err(), PathError::InvalidRadius(-1.0));
        assert!(matches!(generate_spiral_path(5.0, 1.0, f32::INFINITY), Err(PathError::InvalidTurns(_))));
    }

    #[test]
    fn rejects_zero_length_curves() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Curve3D::new(vec![p, p, p]).unwrap_err(), PathError::ZeroLength);
        assert_eq!(Curve3D::new(vec![p]).unwrap_err(), PathError::TooFewPoints(1));
        assert_eq!(
            Curve3D::new(vec![p, Vec3::splat(f32::NAN)]).unwrap_err(),
            PathError::NonFinitePoint(1)
        );
    }

    #[test]
    fn straight_line_interpolates_exactly() {
        let line = Curve3D::new(vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0]).unwrap();
        assert!((line.length() - 2.0).abs() < 1e-4);
        assert!((line.point_at(0.25) - Vec3::X * 0.5).length() < 1e-3);
        assert!((line.tangent_at(0.5) - Vec3::X).length() < 1e-4);
    }
}
