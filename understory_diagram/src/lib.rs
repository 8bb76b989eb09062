// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Diagram: a Kurbo-native node/edge diagram tree.
//!
//! Understory Diagram models the geometry of a node-and-edge diagram the way layout
//! engines hand it over: nodes nest inside container nodes, node bounds are relative to
//! their parent, and edges live inside a container with routes relative to that
//! container.
//!
//! - Represents a hierarchy of nodes with local bounds, opacity, flags, and an optional
//!   proxy rendering override.
//! - Stores edges as chains of cubic Bézier segments (`3n + 1` control points).
//! - Resolves absolute (diagram-space) bounds and routes in a batched
//!   [`Diagram::commit`] step.
//!
//! ## Not a layout engine
//!
//! This crate does not compute positions or routes. Upstream code runs whatever layout
//! it likes and writes the results here. Routes are stored as given; validating their
//! shape is left to consumers (for example `understory_edge_proxy`, which reports
//! malformed routes as diagnostics).
//!
//! ## API overview
//!
//! - [`Diagram`]: container managing nodes, edges, and absolute geometry.
//! - [`LocalNode`] / [`LocalEdge`]: per-item local data.
//! - [`NodeFlags`]: visibility and selection.
//! - [`ProxyRendering`]: alternate rendering data with pre-computed bounds.
//! - [`NodeId`] / [`EdgeId`]: generational handles.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod diagram;
mod types;
mod util;

pub use diagram::Diagram;
pub use types::{EdgeId, LocalEdge, LocalNode, NodeFlags, NodeId, ProxyRendering};
