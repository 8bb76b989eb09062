// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed-form intersection of cubic Bézier segments with axis-aligned lines.
//!
//! [`solve_for_axis_value`] answers "at which curve parameters does this cubic reach
//! coordinate `value` on `axis`?". The control points are first aligned so that the
//! line becomes the x-axis; the roots of the cubic formed by the aligned ordinates are
//! then found analytically, falling back to quadratic and linear solutions when the
//! leading coefficients vanish.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{CubicBez, ParamCurve, Point};
use smallvec::SmallVec;

/// Coefficients at or below this magnitude are treated as zero.
const COEFF_EPSILON: f64 = 1e-6;

/// Roots this far outside `[0, 1]` are rounding error at the segment ends.
const PARAM_EPSILON: f64 = 1e-9;

/// Roots this close to an end point lying on the line are moved onto it.
const SNAP_EPSILON: f64 = 1e-6;

const TAU: f64 = core::f64::consts::TAU;

/// Coordinate axis a line is perpendicular to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Vertical lines `x = value`.
    X,
    /// Horizontal lines `y = value`.
    Y,
}

/// A parameter value on a curve together with the point it evaluates to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveRoot {
    /// Curve parameter in `[0, 1]`.
    pub t: f64,
    /// Point on the original (unaligned) curve at `t`.
    pub point: Point,
}

/// Roots of a single segment; a cubic has at most three.
pub type Roots = SmallVec<[CurveRoot; 3]>;

/// Evaluate the cubic Bézier defined by `points` at `t`.
///
/// `t` is not clamped, so values outside `[0, 1]` extrapolate the curve.
pub fn evaluate_cubic(t: f64, points: &[Point; 4]) -> Point {
    CubicBez::new(points[0], points[1], points[2], points[3]).eval(t)
}

/// Find every `t` in `[0, 1]` where the curve's `axis` coordinate equals `value`.
///
/// Roots are returned in increasing `t`, each paired with its point on the original
/// curve. An end point lying exactly on the line is always reported, at exactly
/// `t = 0` or `t = 1`. A curve that lies entirely on the line (or never varies along
/// `axis`) yields no roots.
///
/// ```rust
/// use kurbo::Point;
/// use understory_edge_proxy::bezier::{Axis, solve_for_axis_value};
///
/// let line = [
///     Point::new(0.0, 0.0),
///     Point::new(10.0, 0.0),
///     Point::new(20.0, 0.0),
///     Point::new(30.0, 0.0),
/// ];
/// let roots = solve_for_axis_value(15.0, &line, Axis::X);
/// assert_eq!(roots.len(), 1);
/// assert!((roots[0].t - 0.5).abs() < 1e-9);
/// ```
pub fn solve_for_axis_value(value: f64, points: &[Point; 4], axis: Axis) -> Roots {
    let aligned = align(points, axis, value);
    let ordinates = [aligned[0].y, aligned[1].y, aligned[2].y, aligned[3].y];
    let [d, a, b, _] = power_basis(ordinates);
    if approx_zero(d) && approx_zero(a) && approx_zero(b) {
        // Constant along the axis.
        return Roots::new();
    }
    let mut ts: SmallVec<[f64; 4]> = polynomial_roots(ordinates)
        .into_iter()
        .filter(|t| (-PARAM_EPSILON..=1.0 + PARAM_EPSILON).contains(t))
        .map(|t| t.clamp(0.0, 1.0))
        .collect();
    for (end, ordinate) in [(0.0, ordinates[0]), (1.0, ordinates[3])] {
        if ordinate != 0.0 {
            continue;
        }
        match ts.iter_mut().find(|t| (**t - end).abs() <= SNAP_EPSILON) {
            Some(t) => *t = end,
            None => ts.push(end),
        }
    }
    ts.sort_by(f64::total_cmp);
    ts.dedup();
    ts.into_iter()
        .map(|t| CurveRoot {
            t,
            point: evaluate_cubic(t, points),
        })
        .collect()
}

/// Move the line `axis = value` onto the x-axis.
///
/// Horizontal lines only need a translation. Vertical lines are translated to the
/// origin and then turned a quarter turn clockwise, `(x, y) -> (y, -x)`.
fn align(points: &[Point; 4], axis: Axis, value: f64) -> [Point; 4] {
    points.map(|p| match axis {
        Axis::Y => Point::new(p.x, p.y - value),
        Axis::X => Point::new(p.y, -(p.x - value)),
    })
}

/// Real roots of the cubic Bézier polynomial with Bernstein coefficients `p`.
///
/// Roots are unfiltered; callers restrict them to the parameter range they need.
fn polynomial_roots(p: [f64; 4]) -> SmallVec<[f64; 3]> {
    let [d, mut a, mut b, mut c] = power_basis(p);

    let mut out = SmallVec::new();

    if approx_zero(d) {
        if approx_zero(a) {
            if approx_zero(b) {
                // Constant along the axis.
                return out;
            }
            out.push(-c / b);
            return out;
        }
        let q = (b * b - 4.0 * a * c).sqrt();
        let a2 = 2.0 * a;
        // A negative discriminant produces NaNs, which callers filter out.
        out.push((q - b) / a2);
        out.push((-b - q) / a2);
        return out;
    }

    // Normalize and solve the depressed cubic t^3 + p t + q.
    a /= d;
    b /= d;
    c /= d;

    let p = (3.0 * b - a * a) / 3.0;
    let p3 = p / 3.0;
    let q = (2.0 * a * a * a - 9.0 * a * b + 27.0 * c) / 27.0;
    let q2 = q / 2.0;
    let discriminant = q2 * q2 + p3 * p3 * p3;

    if discriminant < 0.0 {
        // Three distinct real roots: trigonometric form.
        let mp3 = -p / 3.0;
        let r = (mp3 * mp3 * mp3).sqrt();
        let cosphi = (-q / (2.0 * r)).clamp(-1.0, 1.0);
        let phi = cosphi.acos();
        let t1 = 2.0 * real_cbrt(r);
        out.push(t1 * (phi / 3.0).cos() - a / 3.0);
        out.push(t1 * ((phi + TAU) / 3.0).cos() - a / 3.0);
        out.push(t1 * ((phi + 2.0 * TAU) / 3.0).cos() - a / 3.0);
    } else if discriminant == 0.0 {
        // A repeated root; report it once next to the simple one.
        let u1 = if q2 < 0.0 {
            real_cbrt(-q2)
        } else {
            -real_cbrt(q2)
        };
        out.push(2.0 * u1 - a / 3.0);
        out.push(-u1 - a / 3.0);
    } else {
        // One real root: Cardano.
        let sd = discriminant.sqrt();
        let u1 = real_cbrt(-q2 + sd);
        let v1 = real_cbrt(q2 + sd);
        out.push(u1 - v1 - a / 3.0);
    }
    out
}

/// Power-basis coefficients `[t^3, t^2, t, 1]` of the Bernstein ordinates `p`.
fn power_basis(p: [f64; 4]) -> [f64; 4] {
    let [pa, pb, pc, pd] = p;
    [
        -pa + 3.0 * pb - 3.0 * pc + pd,
        3.0 * pa - 6.0 * pb + 3.0 * pc,
        -3.0 * pa + 3.0 * pb,
        pa,
    ]
}

#[inline]
fn approx_zero(v: f64) -> bool {
    v.abs() <= COEFF_EPSILON
}

/// Real cube root that keeps the sign of negative inputs.
#[inline]
fn real_cbrt(v: f64) -> f64 {
    if v < 0.0 { -(-v).cbrt() } else { v.cbrt() }
}
