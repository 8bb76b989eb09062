// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the diagram: node and edge identifiers, flags, and local geometry.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect};

/// Identifier for a node in the diagram (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for an edge in the diagram (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EdgeId(pub(crate) u32, pub(crate) u32);

impl EdgeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node flags controlling visibility and selection state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is drawn on the diagram.
        const VISIBLE  = 0b0000_0001;
        /// Node is part of the current selection.
        const SELECTED = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// Alternate rendering data a diagram synthesis attaches to a node for its proxy.
///
/// The bounds are pre-computed by whoever produced the rendering; only the size is
/// meaningful to consumers, the origin is conventionally zero.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyRendering {
    /// Pre-computed bounds of the alternate rendering.
    pub bounds: Rect,
    /// Opaque name of the rendering data, interpreted by the renderer.
    pub data: String,
}

/// Local data for a node.
#[derive(Clone, Debug)]
pub struct LocalNode {
    /// Bounds relative to the parent's origin (the parent bounds' top-left corner).
    pub local_bounds: Rect,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f64,
    /// Visibility and selection flags.
    pub flags: NodeFlags,
    /// Optional proxy-specific rendering override.
    pub proxy_rendering: Option<ProxyRendering>,
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            local_bounds: Rect::ZERO,
            opacity: 1.0,
            flags: NodeFlags::default(),
            proxy_rendering: None,
        }
    }
}

/// Local data for an edge.
///
/// The route is expressed relative to the origin of the node that contains the edge,
/// as a chain of cubic Bézier segments: `[p0, c1, c2, p1, c3, c4, p2, ...]`.
#[derive(Clone, Debug)]
pub struct LocalEdge {
    /// Source node.
    pub source: NodeId,
    /// Target node.
    pub target: NodeId,
    /// Control points relative to the containing node.
    pub route: Vec<Point>,
}
