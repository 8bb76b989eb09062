// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use kurbo::{Affine, Point};

/// Map every route point through `affine`, reusing `out`'s allocation.
pub(crate) fn transform_route(affine: Affine, route: &[Point], out: &mut Vec<Point>) {
    out.clear();
    out.extend(route.iter().map(|p| affine * *p));
}
