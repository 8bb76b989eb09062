// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The graph seam: what the engine needs to know about a diagram.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Point, Rect};

/// Read access to a node/edge tree with absolute (content-frame) geometry.
///
/// Edges are owned by container nodes; [`ProxyGraph::edges`] lists the edges a node
/// contains, not the edges incident to it. Bounds and routes must already be expressed
/// in the content frame.
pub trait ProxyGraph {
    /// Node handle.
    type NodeKey: Copy + Eq + Hash + Debug;
    /// Edge handle.
    type EdgeKey: Copy + Eq + Hash + Debug;
    /// Alternate rendering data a node may carry for its proxy.
    type Override: Clone + Debug;

    /// Root of the visible tree, if any.
    fn root(&self) -> Option<Self::NodeKey>;

    /// Children of `node`, in draw order.
    fn children(&self, node: Self::NodeKey) -> &[Self::NodeKey];

    /// Edges contained in `node`.
    fn edges(&self, node: Self::NodeKey) -> &[Self::EdgeKey];

    /// Absolute bounds of `node`, or `None` if it does not exist.
    fn bounds(&self, node: Self::NodeKey) -> Option<Rect>;

    /// Source and target of `edge`.
    fn endpoints(&self, edge: Self::EdgeKey) -> Option<(Self::NodeKey, Self::NodeKey)>;

    /// Absolute route of `edge` as chained cubic segments (`3n + 1` points).
    fn route(&self, edge: Self::EdgeKey) -> &[Point];

    /// Proxy-specific override for `node`, if the node carries one.
    fn proxy_override(&self, node: Self::NodeKey) -> Option<ProxyOverride<Self::Override>>;

    /// Opacity of `node`.
    fn opacity(&self, _node: Self::NodeKey) -> f64 {
        1.0
    }

    /// Whether `node` is selected.
    fn is_selected(&self, _node: Self::NodeKey) -> bool {
        false
    }

    /// Whether `node` is drawn. Invisible nodes never suppress markers.
    fn is_visible(&self, _node: Self::NodeKey) -> bool {
        true
    }
}

/// Alternate rendering data with externally pre-computed bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyOverride<O> {
    /// Bounds of the alternate rendering; only the size is used for sizing markers.
    pub bounds: Rect,
    /// Rendering data handed to the renderer in place of the node's own content.
    pub data: O,
}

/// Identifier of the proxy rendered for a node.
///
/// Distinct from the node's own key so a renderer can keep the node and its proxy
/// apart in shared caches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyId<K>(pub K);

impl<K: Copy> ProxyId<K> {
    /// The node this proxy stands for.
    pub const fn node(self) -> K {
        self.0
    }
}

/// Read-only snapshot of a node, taken for marker rendering.
///
/// Copies only what a renderer needs; it never aliases the live node.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyNode<K, O> {
    /// The represented node.
    pub key: K,
    /// Identifier of the proxy.
    pub proxy_id: ProxyId<K>,
    /// Bounds the marker is sized from: the override's if present, else natural.
    pub bounds: Rect,
    /// The node's own absolute bounds.
    pub natural_bounds: Rect,
    /// Children of the node at snapshot time.
    pub children: Vec<K>,
    /// Node opacity.
    pub opacity: f64,
    /// Whether the node was selected.
    pub selected: bool,
    /// Override rendering data, if any.
    pub rendering: Option<O>,
}

impl<K: Copy + Eq + Hash + Debug, O: Clone + Debug> ProxyNode<K, O> {
    /// Snapshot `key` from `graph`, applying its proxy override.
    ///
    /// Returns `None` if the graph has no bounds for `key`.
    pub fn snapshot<G>(graph: &G, key: K) -> Option<Self>
    where
        G: ProxyGraph<NodeKey = K, Override = O> + ?Sized,
    {
        let natural_bounds = graph.bounds(key)?;
        let (bounds, rendering) = match graph.proxy_override(key) {
            Some(ov) => (ov.bounds, Some(ov.data)),
            None => (natural_bounds, None),
        };
        Some(Self {
            key,
            proxy_id: ProxyId(key),
            bounds,
            natural_bounds,
            children: graph.children(key).to_vec(),
            opacity: graph.opacity(key),
            selected: graph.is_selected(key),
            rendering,
        })
    }
}
