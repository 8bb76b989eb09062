// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Crossing data shared by the detection, placement, and filtering stages.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::graph::ProxyNode;

/// Which viewport boundary a crossing occurred on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// Top boundary.
    North,
    /// Right boundary.
    East,
    /// Bottom boundary.
    South,
    /// Left boundary.
    West,
}

impl Side {
    /// All sides in the order boundaries are tested: west, east, north, south.
    pub const TEST_ORDER: [Self; 4] = [Self::West, Self::East, Self::North, Self::South];

    /// The single-bit [`Sides`] set for this side.
    pub const fn flag(self) -> Sides {
        match self {
            Self::North => Sides::NORTH,
            Self::East => Sides::EAST,
            Self::South => Sides::SOUTH,
            Self::West => Sides::WEST,
        }
    }

    /// Whether the boundary for this side is a vertical line (constant x).
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::East | Self::West)
    }
}

bitflags::bitflags! {
    /// A set of viewport sides, e.g. the boundaries a bounding box straddles.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Sides: u8 {
        /// Top boundary.
        const NORTH = 0b0001;
        /// Right boundary.
        const EAST  = 0b0010;
        /// Bottom boundary.
        const SOUTH = 0b0100;
        /// Left boundary.
        const WEST  = 0b1000;
    }
}

/// Engine-wide placement policy for markers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnchorMode {
    /// Slide the marker along the edge until it sits fully inside the viewport.
    #[default]
    TowardsMiddle,
    /// Slide the marker along the edge until it is centered half a marker inside.
    Centered,
    /// Keep the marker at the boundary crossing.
    TowardsEdge,
}

impl AnchorMode {
    /// Fraction of the marker extent the viewport is inset by when searching for an
    /// anchor along the edge. Zero disables the search.
    pub const fn offset_multiplier(self) -> f64 {
        match self {
            Self::TowardsMiddle => 1.0,
            Self::Centered => 0.5,
            Self::TowardsEdge => 0.0,
        }
    }
}

/// Placement state of a single crossing point's marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Marker extends from the anchor point toward the viewport middle.
    TowardsMiddle,
    /// Marker is centered on the anchor point.
    Centered,
    /// Marker extends from the anchor point toward the viewport boundary.
    TowardsEdge,
    /// Position fully resolved: `node_bounds` holds the marker's top-left placement.
    TopLeft,
}

impl From<AnchorMode> for Anchor {
    fn from(mode: AnchorMode) -> Self {
        match mode {
            AnchorMode::TowardsMiddle => Self::TowardsMiddle,
            AnchorMode::Centered => Self::Centered,
            AnchorMode::TowardsEdge => Self::TowardsEdge,
        }
    }
}

/// A single place where an edge crosses the viewport boundary.
#[derive(Clone, Debug)]
pub struct CrossingPoint<K, O> {
    /// Intersection with the viewport boundary, content frame.
    pub point: Point,
    /// Anchor point for the marker, content frame. Starts equal to `point`.
    pub proxy_point: Point,
    /// Curve parameter of `point` within its segment.
    pub t: f64,
    /// `true` if the edge flows into the viewport here (the source is off-screen).
    pub incoming: bool,
    /// Index of the cubic segment the crossing lies on.
    pub section: usize,
    /// Boundary the crossing lies on.
    pub side: Side,
    /// Snapshot of the represented node, if it could be resolved.
    pub node: Option<ProxyNode<K, O>>,
    /// Starts as the represented node's (or override's) bounds; after placement it
    /// holds the marker rectangle in the view frame.
    pub node_bounds: Rect,
    /// Scale applied to the node's bounds to size the marker.
    pub scale: f64,
    /// Placement state; [`Anchor::TopLeft`] once resolved.
    pub anchor: Anchor,
}

/// All crossing data for one edge.
///
/// `point_bounds[i]` and `bezier_points[i]` always describe the same segment.
#[derive(Clone, Debug)]
pub struct Crossing<E, K, O> {
    /// The edge.
    pub edge: E,
    /// Tight bounding box of each cubic segment, content frame.
    pub point_bounds: Vec<Rect>,
    /// Control points of each cubic segment, content frame.
    pub bezier_points: Vec<[Point; 4]>,
    /// Crossing points in segment order.
    pub crossing_points: Vec<CrossingPoint<K, O>>,
}

/// Final marker rectangle in the view frame plus the scale applied to the node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenBounds {
    /// Marker rectangle, view frame.
    pub rect: Rect,
    /// Scale from the node's bounds to the marker.
    pub scale: f64,
}
