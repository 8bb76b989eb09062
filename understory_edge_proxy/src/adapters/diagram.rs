// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `ProxyGraph` for `understory_diagram::Diagram`.
//!
//! Bounds and routes are read from the last [`Diagram::commit`], so callers must commit
//! before updating a [`ProxyView`](crate::ProxyView).

use alloc::string::String;

use kurbo::{Point, Rect};
use understory_diagram::{Diagram, EdgeId, NodeFlags, NodeId};

use crate::graph::{ProxyGraph, ProxyOverride};

impl ProxyGraph for Diagram {
    type NodeKey = NodeId;
    type EdgeKey = EdgeId;
    type Override = String;

    fn root(&self) -> Option<NodeId> {
        Self::root(self)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.children_of(node)
    }

    fn edges(&self, node: NodeId) -> &[EdgeId] {
        self.edges_of(node)
    }

    fn bounds(&self, node: NodeId) -> Option<Rect> {
        self.world_bounds(node)
    }

    fn endpoints(&self, edge: EdgeId) -> Option<(NodeId, NodeId)> {
        Self::endpoints(self, edge)
    }

    fn route(&self, edge: EdgeId) -> &[Point] {
        self.world_route(edge)
    }

    fn proxy_override(&self, node: NodeId) -> Option<ProxyOverride<String>> {
        self.proxy_rendering(node).map(|r| ProxyOverride {
            bounds: r.bounds,
            data: r.data.clone(),
        })
    }

    fn opacity(&self, node: NodeId) -> f64 {
        Self::opacity(self, node).unwrap_or(1.0)
    }

    fn is_selected(&self, node: NodeId) -> bool {
        self.flags(node).is_some_and(|f| f.contains(NodeFlags::SELECTED))
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.flags(node).is_some_and(|f| f.contains(NodeFlags::VISIBLE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ProxyNode;
    use alloc::vec;
    use understory_diagram::{LocalEdge, LocalNode, ProxyRendering};

    #[test]
    fn reads_committed_geometry() {
        let mut d = Diagram::new();
        let root = d
            .insert_node(
                None,
                LocalNode {
                    local_bounds: Rect::new(100.0, 100.0, 500.0, 500.0),
                    ..Default::default()
                },
            )
            .unwrap();
        let a = d
            .insert_node(
                Some(root),
                LocalNode {
                    local_bounds: Rect::new(0.0, 0.0, 20.0, 10.0),
                    flags: NodeFlags::VISIBLE | NodeFlags::SELECTED,
                    opacity: 0.25,
                    ..Default::default()
                },
            )
            .unwrap();
        let b = d
            .insert_node(
                Some(root),
                LocalNode {
                    local_bounds: Rect::new(200.0, 0.0, 220.0, 10.0),
                    flags: NodeFlags::empty(),
                    proxy_rendering: Some(ProxyRendering {
                        bounds: Rect::new(0.0, 0.0, 4.0, 4.0),
                        data: String::from("dot"),
                    }),
                    ..Default::default()
                },
            )
            .unwrap();
        let e = d
            .insert_edge(
                root,
                LocalEdge {
                    source: a,
                    target: b,
                    route: vec![
                        Point::new(20.0, 5.0),
                        Point::new(80.0, 5.0),
                        Point::new(140.0, 5.0),
                        Point::new(200.0, 5.0),
                    ],
                },
            )
            .unwrap();
        d.commit();

        assert_eq!(ProxyGraph::root(&d), Some(root));
        assert_eq!(ProxyGraph::children(&d, root), &[a, b]);
        assert_eq!(ProxyGraph::edges(&d, root), &[e]);
        assert_eq!(ProxyGraph::bounds(&d, a), Some(Rect::new(100.0, 100.0, 120.0, 110.0)));
        assert_eq!(ProxyGraph::route(&d, e)[3], Point::new(300.0, 105.0));
        assert!(ProxyGraph::is_selected(&d, a));
        assert!(!ProxyGraph::is_visible(&d, b));
        assert_eq!(ProxyGraph::opacity(&d, a), 0.25);

        let snap = ProxyNode::snapshot(&d, b).unwrap();
        assert_eq!(snap.bounds, Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(snap.natural_bounds, Rect::new(300.0, 100.0, 320.0, 110.0));
        assert_eq!(snap.rendering.as_deref(), Some("dot"));
        assert!(ProxyGraph::proxy_override(&d, a).is_none());
    }
}
