// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Suppression of markers that would cover visible nodes.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::canvas::Canvas;
use crate::crossing::{GraphCrossing, overlaps_inclusive};
use crate::graph::ProxyGraph;

/// The node tree partitioned by breadth-first depth from the root.
#[derive(Clone, Debug)]
pub struct DepthLevels<K> {
    levels: Vec<Vec<K>>,
    depth: HashMap<K, usize>,
}

impl<K> Default for DepthLevels<K> {
    fn default() -> Self {
        Self {
            levels: Vec::new(),
            depth: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> DepthLevels<K> {
    /// Compute the levels of `graph`.
    pub fn build<G>(graph: &G) -> Self
    where
        G: ProxyGraph<NodeKey = K> + ?Sized,
    {
        let mut levels = Self::default();
        levels.rebuild(graph);
        levels
    }

    /// Recompute the levels of `graph`, reusing allocations.
    ///
    /// A node reachable twice keeps its first (shallowest) depth.
    pub fn rebuild<G>(&mut self, graph: &G)
    where
        G: ProxyGraph<NodeKey = K> + ?Sized,
    {
        self.clear();
        let Some(root) = graph.root() else {
            return;
        };
        self.depth.insert(root, 0);
        let mut current = Vec::from([root]);
        while !current.is_empty() {
            let depth = self.levels.len() + 1;
            let mut next = Vec::new();
            for &node in &current {
                for &child in graph.children(node) {
                    if !self.depth.contains_key(&child) {
                        self.depth.insert(child, depth);
                        next.push(child);
                    }
                }
            }
            self.levels.push(current);
            current = next;
        }
    }

    /// Depth of `node`, or `None` if it is not in the tree.
    pub fn depth_of(&self, node: K) -> Option<usize> {
        self.depth.get(&node).copied()
    }

    /// Nodes at `depth`, in breadth-first order.
    pub fn level(&self, depth: usize) -> &[K] {
        self.levels.get(depth).map_or(&[], Vec::as_slice)
    }

    /// Number of levels; the maximum depth is one less.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether no tree has been recorded.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Forget all levels.
    pub fn clear(&mut self) {
        self.levels.clear();
        self.depth.clear();
    }
}

/// Remove crossing points whose marker overlaps a visible node, then drop crossings
/// left without points.
///
/// Markers are expected in the view frame (after [`place_anchors`]). Only nodes from the
/// crossing's baseline depth downward are tested: the deeper of the edge's endpoints
/// when both are in the tree, otherwise the represented node's own depth. A point
/// whose baseline cannot be determined is kept.
///
/// [`place_anchors`]: crate::place_anchors
pub fn filter_overlapping<G: ProxyGraph + ?Sized>(
    crossings: &mut Vec<GraphCrossing<G>>,
    graph: &G,
    levels: &DepthLevels<G::NodeKey>,
    canvas: &Canvas,
) {
    let depth_end = levels.len();
    crossings.retain_mut(|crossing| {
        let endpoint_depth = graph
            .endpoints(crossing.edge)
            .and_then(|(s, t)| Some(levels.depth_of(s)?.max(levels.depth_of(t)?)));
        crossing.crossing_points.retain(|cp| {
            let baseline = endpoint_depth.or_else(|| {
                cp.node
                    .as_ref()
                    .and_then(|n| levels.depth_of(n.key))
            });
            let Some(baseline) = baseline else {
                return true;
            };
            let marker = cp.node_bounds;
            let hit = (baseline..depth_end).find_map(|depth| {
                levels.level(depth).iter().copied().find(|&node| {
                    graph.is_visible(node)
                        && graph
                            .bounds(node)
                            .is_some_and(|b| overlaps_inclusive(marker, canvas.bounds_to_view(b)))
                })
            });
            if let Some(node) = hit {
                tracing::trace!(edge = ?crossing.edge, ?node, "marker overlaps visible node");
            }
            hit.is_none()
        });
        !crossing.crossing_points.is_empty()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ProxyNode, ProxyOverride};
    use crate::types::{Anchor, Crossing, CrossingPoint, Side};
    use alloc::vec;
    use kurbo::{Point, Rect};

    /// Root 0 with children 1 and 2; node 2 has child 3. Node 4 is outside the tree.
    struct Tree {
        hidden: Option<u32>,
    }

    impl ProxyGraph for Tree {
        type NodeKey = u32;
        type EdgeKey = u32;
        type Override = ();

        fn root(&self) -> Option<u32> {
            Some(0)
        }
        fn children(&self, node: u32) -> &[u32] {
            match node {
                0 => &[1, 2],
                2 => &[3],
                _ => &[],
            }
        }
        fn edges(&self, _node: u32) -> &[u32] {
            &[]
        }
        fn bounds(&self, node: u32) -> Option<Rect> {
            Some(match node {
                0 => Rect::new(-1000.0, -1000.0, 1000.0, 1000.0),
                1 => Rect::new(10.0, 10.0, 30.0, 30.0),
                2 => Rect::new(200.0, 10.0, 240.0, 30.0),
                3 => Rect::new(60.0, 60.0, 70.0, 70.0),
                4 => Rect::new(500.0, 500.0, 510.0, 510.0),
                _ => return None,
            })
        }
        fn endpoints(&self, edge: u32) -> Option<(u32, u32)> {
            match edge {
                // Both endpoints in the tree: baseline is depth 1.
                0 => Some((1, 2)),
                // Source outside the tree: baseline is the represented node's depth.
                1 => Some((4, 3)),
                _ => None,
            }
        }
        fn route(&self, _edge: u32) -> &[Point] {
            &[]
        }
        fn proxy_override(&self, _node: u32) -> Option<ProxyOverride<()>> {
            None
        }
        fn is_visible(&self, node: u32) -> bool {
            self.hidden != Some(node)
        }
    }

    fn crossing(edge: u32, node: Option<u32>, marker: Rect) -> Crossing<u32, u32, ()> {
        let node = node.and_then(|k| ProxyNode::snapshot(&Tree { hidden: None }, k));
        Crossing {
            edge,
            point_bounds: Vec::new(),
            bezier_points: Vec::new(),
            crossing_points: vec![CrossingPoint {
                point: Point::ZERO,
                proxy_point: Point::ZERO,
                t: 0.5,
                incoming: false,
                section: 0,
                side: Side::East,
                node,
                node_bounds: marker,
                scale: 1.0,
                anchor: Anchor::TopLeft,
            }],
        }
    }

    fn canvas() -> Canvas {
        Canvas::new(Rect::new(0.0, 0.0, 100.0, 100.0), Point::ZERO, 1.0).unwrap()
    }

    #[test]
    fn levels_follow_bfs_depth() {
        let levels = DepthLevels::build(&Tree { hidden: None });
        assert_eq!(levels.len(), 3);
        assert_eq!(levels.level(0), &[0]);
        assert_eq!(levels.level(1), &[1, 2]);
        assert_eq!(levels.level(2), &[3]);
        assert_eq!(levels.depth_of(3), Some(2));
        assert_eq!(levels.depth_of(4), None);
        assert!(levels.level(7).is_empty());
    }

    #[test]
    fn marker_equal_to_same_depth_node_is_discarded() {
        let g = Tree { hidden: None };
        let levels = DepthLevels::build(&g);
        let mut cs = vec![crossing(0, Some(2), Rect::new(10.0, 10.0, 30.0, 30.0))];
        filter_overlapping(&mut cs, &g, &levels, &canvas());
        assert!(cs.is_empty());
    }

    #[test]
    fn deeper_nodes_are_tested_shallower_are_not() {
        let g = Tree { hidden: None };
        let levels = DepthLevels::build(&g);
        // Overlaps node 3 (depth 2): below the baseline, discarded.
        let mut cs = vec![crossing(0, Some(2), Rect::new(65.0, 65.0, 75.0, 75.0))];
        filter_overlapping(&mut cs, &g, &levels, &canvas());
        assert!(cs.is_empty());
        // Overlaps only the root (depth 0): above the baseline, kept.
        let mut cs = vec![crossing(0, Some(2), Rect::new(80.0, 80.0, 90.0, 90.0))];
        filter_overlapping(&mut cs, &g, &levels, &canvas());
        assert_eq!(cs.len(), 1);
    }

    #[test]
    fn falls_back_to_represented_node_depth() {
        let g = Tree { hidden: None };
        let levels = DepthLevels::build(&g);
        // Edge 1 has an endpoint outside the tree; node 3 sits at depth 2, so node 1
        // (depth 1) is not considered.
        let mut cs = vec![crossing(1, Some(3), Rect::new(10.0, 10.0, 30.0, 30.0))];
        filter_overlapping(&mut cs, &g, &levels, &canvas());
        assert_eq!(cs.len(), 1);
    }

    #[test]
    fn unknown_depth_keeps_point() {
        let g = Tree { hidden: None };
        let levels = DepthLevels::build(&g);
        let mut cs = vec![crossing(9, None, Rect::new(10.0, 10.0, 30.0, 30.0))];
        filter_overlapping(&mut cs, &g, &levels, &canvas());
        assert_eq!(cs.len(), 1);
    }

    #[test]
    fn hidden_nodes_do_not_suppress() {
        let g = Tree { hidden: Some(1) };
        let levels = DepthLevels::build(&g);
        let mut cs = vec![crossing(0, Some(2), Rect::new(10.0, 10.0, 30.0, 30.0))];
        filter_overlapping(&mut cs, &g, &levels, &canvas());
        assert_eq!(cs.len(), 1);
    }

    #[test]
    fn node_bounds_are_compared_in_view_frame() {
        let g = Tree { hidden: None };
        let levels = DepthLevels::build(&g);
        // At zoom 2, node 1 covers view pixels (20, 20)..(60, 60).
        let zoomed = Canvas::new(Rect::new(0.0, 0.0, 100.0, 100.0), Point::ZERO, 2.0).unwrap();
        let mut cs = vec![crossing(0, Some(2), Rect::new(50.0, 50.0, 55.0, 55.0))];
        filter_overlapping(&mut cs, &g, &levels, &zoomed);
        assert!(cs.is_empty());
    }
}
