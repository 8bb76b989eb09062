// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge selection, segmentation, and boundary crossings.
//!
//! The detector works entirely in the content frame. Each edge whose route bounding box
//! crosses the viewport is split into cubic segments; every segment that itself crosses
//! the viewport is solved against the boundary lines its bounding box straddles.

use alloc::vec::Vec;

use kurbo::{CubicBez, ParamCurveExtrema, Point, Rect};
use smallvec::SmallVec;

use crate::bezier::{Axis, CurveRoot, Roots, evaluate_cubic, solve_for_axis_value};
use crate::error::{Diagnostic, ProxyError};
use crate::graph::{ProxyGraph, ProxyNode};
use crate::types::{Anchor, Crossing, CrossingPoint, Side, Sides};

/// Points closer than this are treated as the same crossing.
const SAME_POINT_EPSILON: f64 = 1e-9;

/// The [`Crossing`] type produced for a particular graph.
pub type GraphCrossing<G> = Crossing<
    <G as ProxyGraph>::EdgeKey,
    <G as ProxyGraph>::NodeKey,
    <G as ProxyGraph>::Override,
>;

/// Tunables for [`find_crossings`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorParams {
    /// Tolerance, in content units, when matching roots against a boundary's extent.
    pub grace_offset: f64,
    /// Parameter step used to decide which side of a crossing is inside the viewport.
    pub direction_step: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            grace_offset: 1.0,
            direction_step: 0.03,
        }
    }
}

/// Whether `a` and `b` overlap without either strictly containing the other.
///
/// Overlap is inclusive, so touching rectangles count. Containment is strict, so a
/// rectangle sharing an edge with the other is not considered nested.
///
/// ```rust
/// use kurbo::Rect;
/// use understory_edge_proxy::is_crossing_bounds;
///
/// let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
/// assert!(is_crossing_bounds(Rect::new(50.0, 50.0, 150.0, 150.0), viewport));
/// assert!(!is_crossing_bounds(Rect::new(10.0, 10.0, 20.0, 20.0), viewport));
/// assert!(!is_crossing_bounds(Rect::new(200.0, 0.0, 300.0, 10.0), viewport));
/// ```
pub fn is_crossing_bounds(a: Rect, b: Rect) -> bool {
    overlaps_inclusive(a, b) && !strictly_contains(a, b) && !strictly_contains(b, a)
}

/// Inclusive AABB overlap.
pub(crate) fn overlaps_inclusive(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

fn strictly_contains(outer: Rect, inner: Rect) -> bool {
    outer.x0 < inner.x0 && inner.x1 < outer.x1 && outer.y0 < inner.y0 && inner.y1 < outer.y1
}

/// Inclusive point containment (kurbo's `Rect::contains` excludes the far edges).
pub(crate) fn contains_inclusive(r: Rect, p: Point) -> bool {
    r.x0 <= p.x && p.x <= r.x1 && r.y0 <= p.y && p.y <= r.y1
}

/// Boundary lines of `viewport` that lie strictly inside `bounds`.
pub(crate) fn straddled_sides(bounds: Rect, viewport: Rect) -> Sides {
    let mut sides = Sides::empty();
    let between = |lo: f64, v: f64, hi: f64| lo < v && v < hi;
    sides.set(Sides::WEST, between(bounds.x0, viewport.x0, bounds.x1));
    sides.set(Sides::EAST, between(bounds.x0, viewport.x1, bounds.x1));
    sides.set(Sides::NORTH, between(bounds.y0, viewport.y0, bounds.y1));
    sides.set(Sides::SOUTH, between(bounds.y0, viewport.y1, bounds.y1));
    sides
}

/// Roots of `points` on the `side` boundary of `rect`, restricted to the boundary's
/// extent widened by `grace`.
pub(crate) fn boundary_roots(points: &[Point; 4], rect: Rect, side: Side, grace: f64) -> Roots {
    let (axis, value, lo, hi) = match side {
        Side::West => (Axis::X, rect.x0, rect.y0, rect.y1),
        Side::East => (Axis::X, rect.x1, rect.y0, rect.y1),
        Side::North => (Axis::Y, rect.y0, rect.x0, rect.x1),
        Side::South => (Axis::Y, rect.y1, rect.x0, rect.x1),
    };
    let mut roots = solve_for_axis_value(value, points, axis);
    roots.retain(|r: &mut CurveRoot| {
        let along = match axis {
            Axis::X => r.point.y,
            Axis::Y => r.point.x,
        };
        lo - grace <= along && along <= hi + grace
    });
    roots
}

/// A route split into cubic segments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Segments {
    /// Control points of each segment.
    pub points: Vec<[Point; 4]>,
    /// Tight bounding box of each segment.
    pub bounds: Vec<Rect>,
}

/// Split a `3n + 1` point route into `n` cubic segments sharing their endpoints.
///
/// Returns [`ProxyError::MalformedRoute`] for any other length.
pub fn segment_route(route: &[Point]) -> Result<Segments, ProxyError> {
    let len = route.len();
    if len < 4 || (len - 1) % 3 != 0 {
        return Err(ProxyError::MalformedRoute { len });
    }
    let n = (len - 1) / 3;
    let mut segments = Segments {
        points: Vec::with_capacity(n),
        bounds: Vec::with_capacity(n),
    };
    for i in 0..n {
        let s = &route[3 * i..3 * i + 4];
        let pts = [s[0], s[1], s[2], s[3]];
        let curve = CubicBez::new(pts[0], pts[1], pts[2], pts[3]);
        segments.points.push(pts);
        segments.bounds.push(ParamCurveExtrema::bounding_box(&curve));
    }
    Ok(segments)
}

/// Whether the edge flows into `viewport` at parameter `t`.
///
/// The curve is sampled `step` toward its nearer end's interior: for `t > 0.5` the sample
/// is taken before `t`, otherwise after it. The curve is coming in when it lies outside
/// just before `t` and inside just after.
pub(crate) fn is_incoming(points: &[Point; 4], t: f64, viewport: Rect, step: f64) -> bool {
    let sample_t = if t > 0.5 { t - step } else { t + step };
    let inside = contains_inclusive(viewport, evaluate_cubic(sample_t, points));
    if t > 0.5 { !inside } else { inside }
}

/// Edges whose route bounding box crosses `viewport`, in tree order.
///
/// Descends into every child that has children or edges of its own, whether or not
/// the child crosses the viewport.
pub fn select_edges<G: ProxyGraph + ?Sized>(graph: &G, viewport: Rect) -> Vec<G::EdgeKey> {
    let mut out = Vec::new();
    let Some(root) = graph.root() else {
        return out;
    };
    let mut stack = Vec::from([root]);
    while let Some(node) = stack.pop() {
        for &edge in graph.edges(node) {
            if route_bounds(graph.route(edge)).is_some_and(|b| is_crossing_bounds(b, viewport)) {
                out.push(edge);
            }
        }
        for &child in graph.children(node).iter().rev() {
            if !graph.children(child).is_empty() || !graph.edges(child).is_empty() {
                stack.push(child);
            }
        }
    }
    out
}

fn route_bounds(route: &[Point]) -> Option<Rect> {
    let (first, rest) = route.split_first()?;
    Some(
        rest.iter()
            .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)),
    )
}

/// Find every boundary crossing of every selected edge.
///
/// Edges with malformed routes are skipped and reported through `diagnostics`. The
/// result holds one [`Crossing`] per selected edge with a valid route, even when no
/// segment produced a crossing point; crossing points are ordered by segment, then by
/// curve parameter.
pub fn find_crossings<G: ProxyGraph + ?Sized>(
    graph: &G,
    viewport: Rect,
    params: &DetectorParams,
    diagnostics: &mut Vec<Diagnostic<G::EdgeKey>>,
) -> Vec<GraphCrossing<G>> {
    let edges = select_edges(graph, viewport);
    let mut out = Vec::with_capacity(edges.len());
    for edge in edges {
        let route = graph.route(edge);
        let segments = match segment_route(route) {
            Ok(s) => s,
            Err(error) => {
                tracing::warn!(?edge, len = route.len(), "skipping edge with malformed route");
                diagnostics.push(Diagnostic { edge, error });
                continue;
            }
        };
        let endpoints = graph.endpoints(edge);
        let mut crossing = Crossing {
            edge,
            point_bounds: segments.bounds,
            bezier_points: segments.points,
            crossing_points: Vec::new(),
        };
        for section in 0..crossing.bezier_points.len() {
            let bounds = crossing.point_bounds[section];
            if !is_crossing_bounds(bounds, viewport) {
                continue;
            }
            let points = crossing.bezier_points[section];
            let sides = straddled_sides(bounds, viewport);
            let mut found: SmallVec<[(Side, CurveRoot); 4]> = SmallVec::new();
            for side in Side::TEST_ORDER {
                if sides.contains(side.flag()) {
                    found.extend(
                        boundary_roots(&points, viewport, side, params.grace_offset)
                            .into_iter()
                            .map(|r| (side, r)),
                    );
                }
            }
            found.sort_by(|a, b| a.1.t.total_cmp(&b.1.t));
            for (side, root) in found {
                let repeated = crossing.crossing_points.last().is_some_and(|prev| {
                    prev.side == side && (prev.point - root.point).hypot() <= SAME_POINT_EPSILON
                });
                if repeated {
                    continue;
                }
                let incoming =
                    is_incoming(&points, root.t, viewport, params.direction_step);
                let represented = endpoints.map(|(source, target)| {
                    if incoming { source } else { target }
                });
                let node = represented.and_then(|key| ProxyNode::snapshot(graph, key));
                crossing.crossing_points.push(CrossingPoint {
                    point: root.point,
                    proxy_point: root.point,
                    t: root.t,
                    incoming,
                    section,
                    side,
                    node_bounds: node.as_ref().map_or(Rect::ZERO, |n| n.bounds),
                    node,
                    scale: 1.0,
                    anchor: Anchor::TowardsEdge,
                });
            }
        }
        tracing::trace!(
            ?edge,
            points = crossing.crossing_points.len(),
            "edge crosses viewport"
        );
        out.push(crossing);
    }
    out
}
