// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point-in-marker tests.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect};

/// Test `pt` against `marker` inflated by `tolerance` on all sides.
///
/// Edges are inclusive. Returns the distance from `pt` to the uninflated marker (zero
/// inside it), which callers use to rank overlapping markers.
pub fn marker_hit(marker: Rect, pt: Point, tolerance: f64) -> Option<f64> {
    let inflated = if tolerance > 0.0 {
        marker.inflate(tolerance, tolerance)
    } else {
        marker
    };
    let inside_x = inflated.x0 <= pt.x && pt.x <= inflated.x1;
    let inside_y = inflated.y0 <= pt.y && pt.y <= inflated.y1;
    if !(inside_x && inside_y) {
        return None;
    }
    let dx = if pt.x < marker.x0 {
        marker.x0 - pt.x
    } else if pt.x > marker.x1 {
        pt.x - marker.x1
    } else {
        0.0
    };
    let dy = if pt.y < marker.y0 {
        marker.y0 - pt.y
    } else if pt.y > marker.y1 {
        pt.y - marker.y1
    } else {
        0.0
    };
    Some((dx * dx + dy * dy).sqrt())
}
