// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core diagram implementation: structure, updates, queries.

use alloc::{vec, vec::Vec};
use kurbo::{Affine, Point, Rect, Vec2};

use crate::types::{EdgeId, LocalEdge, LocalNode, NodeFlags, NodeId, ProxyRendering};
use crate::util::transform_route;

/// A tree of nodes plus the edges they contain.
///
/// Node bounds are relative to the parent's origin and edge routes are relative to
/// the origin of the node containing the edge. Changes do **not** take effect
/// immediately: they are batched and applied when [`Diagram::commit`] is called,
/// which recomputes absolute (diagram-space) bounds and routes.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Point, Rect};
/// use understory_diagram::{Diagram, LocalEdge, LocalNode};
///
/// let mut diagram = Diagram::new();
/// let root = diagram
///     .insert_node(None, LocalNode {
///         local_bounds: Rect::new(0.0, 0.0, 400.0, 400.0),
///         ..LocalNode::default()
///     })
///     .unwrap();
/// let group = diagram
///     .insert_node(Some(root), LocalNode {
///         local_bounds: Rect::new(100.0, 100.0, 300.0, 300.0),
///         ..LocalNode::default()
///     })
///     .unwrap();
/// let a = diagram
///     .insert_node(Some(group), LocalNode {
///         local_bounds: Rect::new(10.0, 10.0, 30.0, 30.0),
///         ..LocalNode::default()
///     })
///     .unwrap();
/// let edge = diagram
///     .insert_edge(group, LocalEdge {
///         source: a,
///         target: a,
///         route: vec![Point::new(0.0, 0.0); 4],
///     })
///     .unwrap();
///
/// // Changes only take effect after commit.
/// diagram.commit();
///
/// assert_eq!(diagram.world_bounds(a), Some(Rect::new(110.0, 110.0, 130.0, 130.0)));
/// assert_eq!(diagram.world_route(edge)[0], Point::new(100.0, 100.0));
/// ```
#[derive(Default)]
pub struct Diagram {
    /// node slots
    nodes: Vec<Option<Node>>,
    /// last generation per node slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    /// edge slots
    edges: Vec<Option<Edge>>,
    edge_generations: Vec<u32>,
    edge_free_list: Vec<usize>,
    /// live roots in insertion order
    roots: Vec<NodeId>,
    dirty: bool,
}

impl core::fmt::Debug for Diagram {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let nodes_alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let edges_alive = self.edges.iter().filter(|e| e.is_some()).count();
        f.debug_struct("Diagram")
            .field("nodes_total", &self.nodes.len())
            .field("nodes_alive", &nodes_alive)
            .field("edges_total", &self.edges.len())
            .field("edges_alive", &edges_alive)
            .field("roots", &self.roots)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    edges: Vec<EdgeId>,
    local: LocalNode,
    world_transform: Affine,
    world_bounds: Rect,
}

impl Node {
    fn new(generation: u32, parent: Option<NodeId>, local: LocalNode) -> Self {
        Self {
            generation,
            parent,
            children: Vec::new(),
            edges: Vec::new(),
            local,
            world_transform: Affine::IDENTITY,
            world_bounds: Rect::ZERO,
        }
    }
}

#[derive(Clone, Debug)]
struct Edge {
    generation: u32,
    container: NodeId,
    local: LocalEdge,
    world_route: Vec<Point>,
}

impl Diagram {
    /// Create a new empty diagram.
    ///
    /// After inserting nodes or edges, call [`Diagram::commit`] to update
    /// absolute bounds and routes before issuing queries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    ///
    /// Returns `None` if `parent` is stale. Absolute geometry is only updated on
    /// the next call to [`Diagram::commit`].
    pub fn insert_node(&mut self, parent: Option<NodeId>, local: LocalNode) -> Option<NodeId> {
        if let Some(p) = parent
            && !self.is_alive(p)
        {
            return None;
        }
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, parent, local));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, parent, local)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId::new(idx as u32, generation);
        match parent.and_then(|p| self.node_opt_mut(p)) {
            Some(p) => p.children.push(id),
            None => self.roots.push(id),
        }
        self.dirty = true;
        Some(id)
    }

    /// Insert a new edge owned by `container`.
    ///
    /// The endpoints are not validated; an edge may reference nodes that are
    /// removed later. Returns `None` if `container` is stale.
    pub fn insert_edge(&mut self, container: NodeId, local: LocalEdge) -> Option<EdgeId> {
        if !self.is_alive(container) {
            return None;
        }
        let edge = |generation| Edge {
            generation,
            container,
            local,
            world_route: Vec::new(),
        };
        let (idx, generation) = if let Some(idx) = self.edge_free_list.pop() {
            let generation = self.edge_generations[idx].saturating_add(1);
            self.edge_generations[idx] = generation;
            self.edges[idx] = Some(edge(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.edges.push(Some(edge(generation)));
            self.edge_generations.push(generation);
            (self.edges.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "EdgeId uses 32-bit indices by design."
        )]
        let id = EdgeId::new(idx as u32, generation);
        if let Some(c) = self.node_opt_mut(container) {
            c.edges.push(id);
        }
        self.dirty = true;
        Some(id)
    }

    /// Remove a node, its subtree and every edge contained in the subtree.
    ///
    /// Edges elsewhere that reference the removed nodes are kept; their endpoints
    /// become stale identifiers.
    pub fn remove_node(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        match self.node(id).parent {
            Some(parent) => {
                if let Some(p) = self.node_opt_mut(parent) {
                    p.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes[current.idx()].take() else {
                continue;
            };
            for edge in node.edges {
                self.edges[edge.idx()] = None;
                self.edge_free_list.push(edge.idx());
            }
            stack.extend(node.children);
            self.free_list.push(current.idx());
        }
        self.dirty = true;
    }

    /// Remove a single edge.
    pub fn remove_edge(&mut self, id: EdgeId) {
        let Some(container) = self.edge(id).map(|e| e.container) else {
            return;
        };
        if let Some(c) = self.node_opt_mut(container) {
            c.edges.retain(|e| *e != id);
        }
        self.edges[id.idx()] = None;
        self.edge_free_list.push(id.idx());
        self.dirty = true;
    }

    /// Update local bounds.
    pub fn set_local_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(n) = self.node_opt_mut(id)
            && n.local.local_bounds != bounds
        {
            n.local.local_bounds = bounds;
            self.dirty = true;
        }
    }

    /// Update node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags = flags;
        }
    }

    /// Update node opacity.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f64) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.opacity = opacity;
        }
    }

    /// Attach or clear the proxy rendering override of a node.
    pub fn set_proxy_rendering(&mut self, id: NodeId, rendering: Option<ProxyRendering>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.proxy_rendering = rendering;
        }
    }

    /// Replace the route of an edge (container-relative points).
    pub fn set_route(&mut self, id: EdgeId, route: Vec<Point>) {
        if let Some(e) = self.edge_opt_mut(id) {
            e.local.route = route;
            self.dirty = true;
        }
    }

    /// Recompute absolute bounds and routes for everything reachable from the roots.
    ///
    /// Returns `false` when nothing changed since the last commit.
    pub fn commit(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        // Walk depth-first, propagating the parent's origin toward the leaves.
        let mut stack: Vec<(NodeId, Affine)> = self
            .roots
            .iter()
            .rev()
            .map(|r| (*r, Affine::IDENTITY))
            .collect();
        let mut edge_work: Vec<(EdgeId, Affine)> = Vec::new();

        while let Some((id, parent_tf)) = stack.pop() {
            let Some(node) = self.node_opt_mut(id) else {
                continue;
            };
            let bounds = node.local.local_bounds;
            node.world_bounds = parent_tf.transform_rect_bbox(bounds);
            node.world_transform = parent_tf * Affine::translate(Vec2::new(bounds.x0, bounds.y0));
            let tf = node.world_transform;
            edge_work.extend(node.edges.iter().map(|e| (*e, tf)));
            // `.rev()` keeps the visiting order equal to `children` order.
            for &child in node.children.iter().rev() {
                stack.push((child, tf));
            }
        }

        for (edge, tf) in edge_work {
            if let Some(e) = self.edge_opt_mut(edge) {
                let mut out = core::mem::take(&mut e.world_route);
                transform_route(tf, &e.local.route, &mut out);
                e.world_route = out;
            }
        }
        self.dirty = false;
        true
    }

    // --- queries ---

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Returns true if `id` refers to a live edge.
    pub fn is_edge_alive(&self, id: EdgeId) -> bool {
        self.edge(id).is_some()
    }

    /// The first live root, in insertion order.
    pub fn root(&self) -> Option<NodeId> {
        self.roots.first().copied()
    }

    /// All live roots, in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or an empty slice if the node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map_or(&[], |n| &n.children)
    }

    /// Get the edges contained in a node, or an empty slice if the node is stale.
    pub fn edges_of(&self, id: NodeId) -> &[EdgeId] {
        self.node_opt(id).map_or(&[], |n| &n.edges)
    }

    /// Absolute bounds of a live node as of the last [`Diagram::commit`].
    pub fn world_bounds(&self, id: NodeId) -> Option<Rect> {
        self.node_opt(id).map(|n| n.world_bounds)
    }

    /// Transform from a node's local space (its children's space) to diagram space.
    pub fn world_transform(&self, id: NodeId) -> Option<Affine> {
        self.node_opt(id).map(|n| n.world_transform)
    }

    /// Node flags, if the node is live.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node_opt(id).map(|n| n.local.flags)
    }

    /// Node opacity, if the node is live.
    pub fn opacity(&self, id: NodeId) -> Option<f64> {
        self.node_opt(id).map(|n| n.local.opacity)
    }

    /// Proxy rendering override, if the node is live and has one.
    pub fn proxy_rendering(&self, id: NodeId) -> Option<&ProxyRendering> {
        self.node_opt(id).and_then(|n| n.local.proxy_rendering.as_ref())
    }

    /// Source and target of a live edge.
    pub fn endpoints(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        self.edge(id).map(|e| (e.local.source, e.local.target))
    }

    /// The node containing a live edge.
    pub fn container_of(&self, id: EdgeId) -> Option<NodeId> {
        self.edge(id).map(|e| e.container)
    }

    /// Absolute route of a live edge as of the last [`Diagram::commit`], or an empty
    /// slice for stale ids.
    pub fn world_route(&self, id: EdgeId) -> &[Point] {
        self.edge(id).map_or(&[], |e| &e.world_route)
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        let e = self.edges.get(id.idx())?.as_ref()?;
        (e.generation == id.1).then_some(e)
    }

    fn edge_opt_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        let e = self.edges.get_mut(id.idx())?.as_mut()?;
        if e.generation != id.1 {
            return None;
        }
        Some(e)
    }
}
