// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Edge Proxy: markers for edges that leave the viewport.
//!
//! When an edge of a zoomable node-and-edge diagram runs off-screen, this crate finds
//! where it crosses the viewport boundary and places a small proxy marker there that
//! stands for the off-screen node at the other end.
//!
//! The pipeline runs once per update:
//!
//! - [`find_crossings`]: select edges whose routes cross the viewport, split them into
//!   cubic segments, and solve each segment against the boundary lines in closed form
//!   (see [`bezier`]). Each crossing is classified as incoming or outgoing and resolved
//!   to a read-only [`ProxyNode`] snapshot of the off-screen endpoint.
//! - [`place_anchors`]: size every marker and, depending on [`AnchorMode`], slide it
//!   along the edge into the viewport. Markers end up as view-frame rectangles.
//! - [`filter_overlapping`]: drop markers that would cover a visible node at or below
//!   the edge's depth in the tree.
//!
//! [`ProxyView`] wraps the pipeline in a controller that owns the caches, realizes
//! markers through a host [`ProxyRenderer`], orders them by distance, and answers
//! point-in-marker queries.
//!
//! Geometry matching happens in the content frame; marker placement is expressed in
//! the view frame. [`Canvas`] converts between the two.
//!
//! ## Graphs
//!
//! The engine reads diagrams through the [`ProxyGraph`] trait. With the
//! `diagram_adapter` feature (on by default) it is implemented for
//! `understory_diagram::Diagram`.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_diagram::{Diagram, LocalEdge, LocalNode, NodeId};
//! use understory_edge_proxy::{
//!     Canvas, ProxyConfig, ProxyNode, ProxyRenderer, ProxyView, ScreenBounds,
//! };
//!
//! /// Keeps the latest marker rectangle as the handle.
//! struct Markers;
//!
//! impl ProxyRenderer<NodeId, String> for Markers {
//!     type Handle = Rect;
//!     fn render(&mut self, _node: &ProxyNode<NodeId, String>, bounds: ScreenBounds) -> Rect {
//!         bounds.rect
//!     }
//!     fn reposition(
//!         &mut self,
//!         handle: &mut Rect,
//!         _node: &ProxyNode<NodeId, String>,
//!         bounds: ScreenBounds,
//!     ) {
//!         *handle = bounds.rect;
//!     }
//!     fn set_opacity(&mut self, _handle: &mut Rect, _opacity: f64) {}
//!     fn set_click_through(&mut self, _handle: &mut Rect, _click_through: bool) {}
//! }
//!
//! let mut diagram = Diagram::new();
//! let node = |x: f64| LocalNode {
//!     local_bounds: Rect::new(x, 10.0, x + 40.0, 50.0),
//!     ..Default::default()
//! };
//! let world = LocalNode {
//!     local_bounds: Rect::new(0.0, 0.0, 1000.0, 1000.0),
//!     ..Default::default()
//! };
//! let root = diagram.insert_node(None, world).unwrap();
//! let a = diagram.insert_node(Some(root), node(10.0)).unwrap();
//! let b = diagram.insert_node(Some(root), node(600.0)).unwrap();
//! let route = vec![
//!     Point::new(50.0, 30.0),
//!     Point::new(200.0, 30.0),
//!     Point::new(400.0, 30.0),
//!     Point::new(600.0, 30.0),
//! ];
//! diagram.insert_edge(root, LocalEdge { source: a, target: b, route }).unwrap();
//! diagram.commit();
//!
//! let canvas = Canvas::new(Rect::new(0.0, 0.0, 300.0, 200.0), Point::ZERO, 1.0).unwrap();
//! let mut view = ProxyView::new(ProxyConfig::default()).unwrap();
//! let placements = view.update(&diagram, &canvas, &mut Markers);
//!
//! // One marker, on the east side, standing for `b`.
//! assert_eq!(placements.len(), 1);
//! assert_eq!(placements[0].node.key, b);
//! assert!(placements[0].bounds.rect.x1 <= 300.0);
//! ```
//!
//! ## Features
//!
//! - `std` *(default)*: use `std` float math and enable `std` in dependencies.
//! - `libm`: `no_std` float math through `kurbo`.
//! - `diagram_adapter` *(default)*: implement [`ProxyGraph`] for
//!   `understory_diagram::Diagram`.
//! - `serde`: derive `Serialize`/`Deserialize` for [`ProxyConfig`] and the policy enums.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod adapters;
mod anchor;
pub mod bezier;
mod canvas;
mod config;
mod crossing;
mod error;
mod graph;
mod hit;
mod overlap;
mod render;
mod types;
mod view;

pub use anchor::{anchor_offset, marker_scale, place_anchors};
pub use canvas::{Canvas, Frame};
pub use config::ProxyConfig;
pub use crossing::{
    DetectorParams, GraphCrossing, Segments, find_crossings, is_crossing_bounds, segment_route,
    select_edges,
};
pub use error::{Diagnostic, ProxyError};
pub use graph::{ProxyGraph, ProxyId, ProxyNode, ProxyOverride};
pub use hit::marker_hit;
pub use overlap::{DepthLevels, filter_overlapping};
pub use render::{ProxyRenderer, RenderCache, ScratchCache};
pub use types::{Anchor, AnchorMode, Crossing, CrossingPoint, ScreenBounds, Side, Sides};
pub use view::{ProxyPlacement, ProxyView};
