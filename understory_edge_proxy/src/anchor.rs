// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marker sizing and anchoring.
//!
//! Every crossing point is turned into a marker rectangle in the view frame. With
//! [`AnchorMode::TowardsMiddle`] and [`AnchorMode::Centered`] the anchor first slides
//! along the edge, into the viewport, until the marker no longer straddles the boundary.
//! [`AnchorMode::TowardsEdge`] keeps the boundary point.

use kurbo::{Point, Rect, Size, Vec2};

use crate::canvas::{Canvas, Frame};
use crate::config::ProxyConfig;
use crate::crossing::{boundary_roots, is_crossing_bounds, straddled_sides};
use crate::types::{Anchor, AnchorMode, Crossing, Side};

/// Scale applied to a node of `node_size` to obtain its marker.
///
/// The larger node dimension is mapped to `size_fraction` of the smaller view
/// dimension, or to the diagram zoom when `use_zoom_size` is set. With
/// `cap_scale_to_one` markers never grow beyond the node's own size. Nodes without
/// a positive extent get a scale of one.
pub fn marker_scale(node_size: Size, view: Rect, zoom: f64, config: &ProxyConfig) -> f64 {
    let extent = node_size.width.max(node_size.height);
    if !(extent > 0.0 && extent.is_finite()) {
        return 1.0;
    }
    let scale = if config.use_zoom_size {
        zoom
    } else {
        config.size_fraction * view.width().min(view.height()) / extent
    };
    if config.cap_scale_to_one {
        scale.min(1.0)
    } else {
        scale
    }
}

/// Offset from the anchor point to the marker's top-left corner.
pub fn anchor_offset(anchor: Anchor, side: Side, marker: Size) -> Vec2 {
    let (w, h) = (marker.width, marker.height);
    match (anchor, side) {
        (Anchor::Centered, _) => Vec2::new(w / 2.0, h / 2.0),
        (Anchor::TowardsMiddle, Side::North) => Vec2::new(w / 2.0, h),
        (Anchor::TowardsMiddle, Side::South) => Vec2::new(w / 2.0, 0.0),
        (Anchor::TowardsMiddle, Side::West) => Vec2::new(w, h / 2.0),
        (Anchor::TowardsMiddle, Side::East) => Vec2::new(0.0, h / 2.0),
        (Anchor::TowardsEdge, Side::North) => Vec2::new(w / 2.0, 0.0),
        (Anchor::TowardsEdge, Side::South) => Vec2::new(w / 2.0, h),
        (Anchor::TowardsEdge, Side::West) => Vec2::new(0.0, h / 2.0),
        (Anchor::TowardsEdge, Side::East) => Vec2::new(w, h / 2.0),
        (Anchor::TopLeft, _) => Vec2::ZERO,
    }
}

/// `viewport` moved inward by `inset` on `side` only.
///
/// Returns `None` when the inset would invert the rectangle.
fn shrink_side(viewport: Rect, side: Side, inset: f64) -> Option<Rect> {
    let mut r = viewport;
    match side {
        Side::North => r.y0 += inset,
        Side::South => r.y1 -= inset,
        Side::West => r.x0 += inset,
        Side::East => r.x1 -= inset,
    }
    (r.x0 <= r.x1 && r.y0 <= r.y1).then_some(r)
}

/// Keep `rect` inside `view`, preferring the top-left edges when it does not fit.
fn clamp_into(rect: Rect, view: Rect) -> Rect {
    let size = rect.size();
    let x = rect.x0.min(view.x1 - size.width).max(view.x0);
    let y = rect.y0.min(view.y1 - size.height).max(view.y0);
    Rect::from_origin_size((x, y), size)
}

/// Slide crossing point `idx` along its edge to the boundary of `shrunk`.
///
/// Walks segments from the crossing's own toward the adjacent crossing point (forward
/// for incoming, backward for outgoing) and returns the first root in walk order.
fn search_anchor<E, K, O>(
    crossing: &Crossing<E, K, O>,
    idx: usize,
    shrunk: Rect,
    grace: f64,
) -> Option<Point> {
    let cp = &crossing.crossing_points[idx];
    let last = crossing.bezier_points.len().checked_sub(1)?;
    let forward = cp.incoming;
    let (lo, hi) = if forward {
        let end = crossing
            .crossing_points
            .get(idx + 1)
            .map_or(last, |next| next.section);
        (cp.section, end)
    } else {
        let start = idx
            .checked_sub(1)
            .and_then(|i| crossing.crossing_points.get(i))
            .map_or(0, |prev| prev.section);
        (start, cp.section)
    };
    for step in 0..=hi.saturating_sub(lo) {
        let section = if forward { lo + step } else { hi - step };
        let bounds = crossing.point_bounds[section];
        if !is_crossing_bounds(bounds, shrunk)
            || !straddled_sides(bounds, shrunk).contains(cp.side.flag())
        {
            continue;
        }
        let roots = boundary_roots(&crossing.bezier_points[section], shrunk, cp.side, grace);
        let own = section == cp.section;
        let candidates = roots.iter().filter(|r| match (own, forward) {
            (false, _) => true,
            (true, true) => r.t > cp.t,
            (true, false) => r.t < cp.t,
        });
        let best = if forward {
            candidates.min_by(|a, b| a.t.total_cmp(&b.t))
        } else {
            candidates.max_by(|a, b| a.t.total_cmp(&b.t))
        };
        if let Some(root) = best {
            return Some(root.point);
        }
    }
    None
}

/// Resolve every crossing point to a marker rectangle in the view frame.
///
/// On return each point's `scale` is set, `node_bounds` holds the marker rectangle
/// (view frame, clamped into the view), and `anchor` is [`Anchor::TopLeft`].
/// `proxy_point` holds the content-frame anchor that was used.
pub fn place_anchors<E, K, O>(
    crossings: &mut [Crossing<E, K, O>],
    canvas: &Canvas,
    config: &ProxyConfig,
) {
    let viewport = canvas.rect(Frame::Content);
    let view = canvas.rect(Frame::View);
    let zoom = canvas.zoom();
    let multiplier = config.anchor_mode.offset_multiplier();

    for crossing in crossings.iter_mut() {
        for idx in 0..crossing.crossing_points.len() {
            let (side, natural) = {
                let cp = &crossing.crossing_points[idx];
                (cp.side, cp.node_bounds.size())
            };
            let scale = marker_scale(natural, view, zoom, config);
            let marker = natural * scale;

            let mut anchor = Anchor::from(config.anchor_mode);
            if config.anchor_mode != AnchorMode::TowardsEdge {
                let extent = if side.is_vertical() {
                    marker.width
                } else {
                    marker.height
                };
                let found = shrink_side(viewport, side, multiplier * extent / zoom)
                    .and_then(|shrunk| {
                        search_anchor(crossing, idx, shrunk, config.grace_offset)
                    });
                match found {
                    Some(p) => crossing.crossing_points[idx].proxy_point = p,
                    None => {
                        tracing::trace!(?side, "no anchor along edge, keeping boundary point");
                        anchor = Anchor::TowardsEdge;
                    }
                }
            }

            let cp = &mut crossing.crossing_points[idx];
            let origin = canvas.point_to_view(cp.proxy_point) - anchor_offset(anchor, side, marker);
            cp.node_bounds = clamp_into(Rect::from_origin_size(origin, marker), view);
            cp.scale = scale;
            cp.anchor = Anchor::TopLeft;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CrossingPoint;
    use alloc::vec;
    use alloc::vec::Vec;
    use kurbo::{CubicBez, ParamCurveExtrema};

    fn crossing(
        segments: &[[(f64, f64); 4]],
        points: Vec<CrossingPoint<u32, ()>>,
    ) -> Crossing<u32, u32, ()> {
        let bezier_points: Vec<[Point; 4]> = segments
            .iter()
            .map(|s| s.map(|(x, y)| Point::new(x, y)))
            .collect();
        let point_bounds = bezier_points
            .iter()
            .map(|p| ParamCurveExtrema::bounding_box(&CubicBez::new(p[0], p[1], p[2], p[3])))
            .collect();
        Crossing {
            edge: 0,
            point_bounds,
            bezier_points,
            crossing_points: points,
        }
    }

    fn cp(
        point: Point,
        t: f64,
        incoming: bool,
        section: usize,
        side: Side,
    ) -> CrossingPoint<u32, ()> {
        CrossingPoint {
            point,
            proxy_point: point,
            t,
            incoming,
            section,
            side,
            node: None,
            node_bounds: Rect::new(0.0, 0.0, 100.0, 50.0),
            scale: 1.0,
            anchor: Anchor::TowardsEdge,
        }
    }

    fn canvas() -> Canvas {
        Canvas::new(Rect::new(0.0, 0.0, 100.0, 100.0), Point::ZERO, 1.0).unwrap()
    }

    fn config(mode: AnchorMode) -> ProxyConfig {
        ProxyConfig {
            anchor_mode: mode,
            size_fraction: 0.1,
            ..Default::default()
        }
    }

    /// Horizontal line entering from the west at y = 50.
    fn entering_west() -> Crossing<u32, u32, ()> {
        crossing(
            &[[(-60.0, 50.0), (-20.0, 50.0), (20.0, 50.0), (60.0, 50.0)]],
            vec![cp(Point::new(0.0, 50.0), 0.5, true, 0, Side::West)],
        )
    }

    #[test]
    fn scale_follows_view_and_caps() {
        let view = Rect::new(0.0, 0.0, 800.0, 600.0);
        let cfg = ProxyConfig::default();
        // 0.08 * 600 / 200
        let s = marker_scale(Size::new(200.0, 100.0), view, 1.0, &cfg);
        assert!((s - 0.24).abs() < 1e-12);
        // Small nodes would be enlarged; the cap keeps them at their size.
        assert_eq!(marker_scale(Size::new(10.0, 10.0), view, 1.0, &cfg), 1.0);
        let uncapped = ProxyConfig {
            cap_scale_to_one: false,
            ..cfg
        };
        assert!((marker_scale(Size::new(10.0, 10.0), view, 1.0, &uncapped) - 4.8).abs() < 1e-12);
        let zoomed = ProxyConfig {
            use_zoom_size: true,
            ..cfg
        };
        assert_eq!(marker_scale(Size::new(10.0, 10.0), view, 0.25, &zoomed), 0.25);
        assert_eq!(marker_scale(Size::ZERO, view, 1.0, &cfg), 1.0);
    }

    #[test]
    fn offset_table() {
        let m = Size::new(10.0, 4.0);
        assert_eq!(anchor_offset(Anchor::TowardsMiddle, Side::North, m), Vec2::new(5.0, 4.0));
        assert_eq!(anchor_offset(Anchor::TowardsMiddle, Side::South, m), Vec2::new(5.0, 0.0));
        assert_eq!(anchor_offset(Anchor::TowardsMiddle, Side::West, m), Vec2::new(10.0, 2.0));
        assert_eq!(anchor_offset(Anchor::TowardsMiddle, Side::East, m), Vec2::new(0.0, 2.0));
        assert_eq!(anchor_offset(Anchor::TowardsEdge, Side::North, m), Vec2::new(5.0, 0.0));
        assert_eq!(anchor_offset(Anchor::TowardsEdge, Side::South, m), Vec2::new(5.0, 4.0));
        assert_eq!(anchor_offset(Anchor::TowardsEdge, Side::West, m), Vec2::new(0.0, 2.0));
        assert_eq!(anchor_offset(Anchor::TowardsEdge, Side::East, m), Vec2::new(10.0, 2.0));
        for side in Side::TEST_ORDER {
            assert_eq!(anchor_offset(Anchor::Centered, side, m), Vec2::new(5.0, 2.0));
        }
    }

    #[test]
    fn towards_middle_slides_marker_inside() {
        let mut cs = vec![entering_west()];
        place_anchors(&mut cs, &canvas(), &config(AnchorMode::TowardsMiddle));
        let cp = &cs[0].crossing_points[0];
        // Marker is 10 x 5 (0.1 * 100 / 100); the anchor moves 10 units inward.
        assert_eq!(cp.anchor, Anchor::TopLeft);
        assert!((cp.scale - 0.1).abs() < 1e-12);
        assert!((cp.proxy_point.x - 10.0).abs() < 1e-9);
        let r = cp.node_bounds;
        assert!(r.x0.abs() < 1e-9 && (r.x1 - 10.0).abs() < 1e-9);
        assert!((r.y0 - 47.5).abs() < 1e-9 && (r.y1 - 52.5).abs() < 1e-9);
        // The raw crossing is preserved.
        assert_eq!(cp.point, Point::new(0.0, 50.0));
    }

    #[test]
    fn centered_slides_half_a_marker() {
        let mut cs = vec![entering_west()];
        place_anchors(&mut cs, &canvas(), &config(AnchorMode::Centered));
        let cp = &cs[0].crossing_points[0];
        assert!((cp.proxy_point.x - 5.0).abs() < 1e-9);
        let r = cp.node_bounds;
        assert!(r.x0.abs() < 1e-9 && (r.x1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn towards_edge_keeps_boundary_point() {
        let mut cs = vec![entering_west()];
        place_anchors(&mut cs, &canvas(), &config(AnchorMode::TowardsEdge));
        let cp = &cs[0].crossing_points[0];
        assert_eq!(cp.proxy_point, Point::new(0.0, 50.0));
        let r = cp.node_bounds;
        assert!(r.x0.abs() < 1e-9 && (r.x1 - 10.0).abs() < 1e-9);
        assert_eq!(cp.anchor, Anchor::TopLeft);
    }

    #[test]
    fn outgoing_search_walks_backward_across_segments() {
        // Exits east at the start of the second segment; the shrunk boundary (x = 90)
        // is only reached on the first segment.
        let mut cs = vec![crossing(
            &[
                [(40.0, 50.0), (60.0, 50.0), (80.0, 50.0), (100.0, 50.0)],
                [(100.0, 50.0), (120.0, 50.0), (140.0, 50.0), (160.0, 50.0)],
            ],
            vec![cp(Point::new(100.0, 50.0), 0.0, false, 1, Side::East)],
        )];
        place_anchors(&mut cs, &canvas(), &config(AnchorMode::TowardsMiddle));
        let cp = &cs[0].crossing_points[0];
        assert!((cp.proxy_point.x - 90.0).abs() < 1e-9);
        let r = cp.node_bounds;
        assert!((r.x0 - 90.0).abs() < 1e-9 && (r.x1 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn search_stops_at_adjacent_crossing_and_falls_back() {
        // A short dip across the west boundary: the next crossing is on the same
        // segment and the curve never reaches x = 10 in between.
        let mut cs = vec![crossing(
            &[[(-3.0, 50.0), (3.0, 50.0), (3.0, 60.0), (-3.0, 60.0)]],
            Vec::new(),
        )];
        let c = &mut cs[0];
        c.crossing_points.push(cp(Point::new(0.0, 51.0), 0.2, true, 0, Side::West));
        c.crossing_points.push(cp(Point::new(0.0, 59.0), 0.8, false, 0, Side::West));
        place_anchors(&mut cs, &canvas(), &config(AnchorMode::TowardsMiddle));
        for cp in &cs[0].crossing_points {
            assert_eq!(cp.proxy_point, cp.point);
            // Fallback anchors towards the edge, i.e. the marker starts at the boundary.
            assert!(cp.node_bounds.x0.abs() < 1e-9);
            assert_eq!(cp.anchor, Anchor::TopLeft);
        }
    }

    #[test]
    fn markers_are_clamped_into_view() {
        // A crossing near the north-west corner would put half the marker outside.
        let mut cs = vec![crossing(
            &[[(-60.0, 1.0), (-20.0, 1.0), (20.0, 1.0), (60.0, 1.0)]],
            vec![cp(Point::new(0.0, 1.0), 0.5, true, 0, Side::West)],
        )];
        place_anchors(&mut cs, &canvas(), &config(AnchorMode::TowardsEdge));
        let r = cs[0].crossing_points[0].node_bounds;
        assert_eq!(r.y0, 0.0);
        assert!((r.height() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn clamp_prefers_top_left_when_marker_is_larger_than_view() {
        let view = Rect::new(0.0, 0.0, 10.0, 10.0);
        let r = clamp_into(Rect::new(-30.0, 5.0, 0.0, 25.0), view);
        assert_eq!(r, Rect::new(0.0, 0.0, 30.0, 20.0));
    }

    #[test]
    fn shrink_rejects_inverted_rects() {
        let v = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(shrink_side(v, Side::East, 4.0), Some(Rect::new(0.0, 0.0, 6.0, 10.0)));
        assert_eq!(shrink_side(v, Side::North, 11.0), None);
    }
}
