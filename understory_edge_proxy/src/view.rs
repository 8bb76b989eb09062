// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small controller that runs the proxy pipeline once per update.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Point;

use crate::anchor::place_anchors;
use crate::canvas::{Canvas, Frame};
use crate::config::ProxyConfig;
use crate::crossing::{DetectorParams, find_crossings};
use crate::error::{Diagnostic, ProxyError};
use crate::graph::{ProxyGraph, ProxyId, ProxyNode};
use crate::hit::marker_hit;
use crate::overlap::filter_overlapping;
use crate::render::{ProxyRenderer, RenderCache, ScratchCache};
use crate::types::{Crossing, ScreenBounds, Side};

/// One marker to show this update.
#[derive(Clone, Debug)]
pub struct ProxyPlacement<K, O, H> {
    /// Identifier of the proxy.
    pub proxy_id: ProxyId<K>,
    /// Snapshot of the represented node.
    pub node: ProxyNode<K, O>,
    /// Which of the node's placements this is, in crossing order.
    pub occurrence: usize,
    /// Handle produced by the renderer; one per occurrence.
    pub handle: H,
    /// Marker rectangle (view frame) and scale.
    pub bounds: ScreenBounds,
    /// Viewport side the marker sits on.
    pub side: Side,
    /// Whether the represented node is the edge's source.
    pub incoming: bool,
    /// Distance from the node to the viewport, content units.
    pub distance: f64,
}

/// Controller for off-screen edge proxies.
///
/// This type:
/// - validates and stores a [`ProxyConfig`],
/// - owns the persistent [`RenderCache`] and the per-update [`ScratchCache`],
/// - keeps the crossings, placements, and diagnostics of the last update,
/// - answers point-in-marker queries against the last placements.
///
/// It does *not* draw anything; host frameworks supply a [`ProxyRenderer`] and show
/// the handles it returns.
#[derive(Debug)]
pub struct ProxyView<K, E, O, H> {
    config: ProxyConfig,
    render_cache: RenderCache<K, H>,
    scratch: ScratchCache<K>,
    crossings: Vec<Crossing<E, K, O>>,
    placements: Vec<ProxyPlacement<K, O, H>>,
    diagnostics: Vec<Diagnostic<E>>,
}

impl<K, E, O, H> ProxyView<K, E, O, H>
where
    K: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
    O: Clone + Debug,
    H: Clone,
{
    /// Creates a controller with `config`, rejecting invalid configurations.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        config.validate()?;
        Ok(Self {
            config,
            render_cache: RenderCache::default(),
            scratch: ScratchCache::default(),
            crossings: Vec::new(),
            placements: Vec::new(),
            diagnostics: Vec::new(),
        })
    }

    /// Returns the current configuration.
    #[must_use]
    pub const fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Replaces the configuration; takes effect on the next update.
    pub fn set_config(&mut self, config: ProxyConfig) -> Result<(), ProxyError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Recompute every marker for `graph` as seen through `canvas`.
    ///
    /// Crossings are rebuilt from scratch. Markers are realized through `renderer`,
    /// reusing cached handles, and returned ordered by distance with the farthest
    /// first so the nearest is drawn on top. Each crossing of a node gets its own
    /// marker. Cached handles not realized by this update are handed to
    /// [`ProxyRenderer::release`] and evicted.
    pub fn update<G, R>(
        &mut self,
        graph: &G,
        canvas: &Canvas,
        renderer: &mut R,
    ) -> &[ProxyPlacement<K, O, H>]
    where
        G: ProxyGraph<NodeKey = K, EdgeKey = E, Override = O> + ?Sized,
        R: ProxyRenderer<K, O, Handle = H> + ?Sized,
    {
        self.placements.clear();
        self.diagnostics.clear();
        self.crossings.clear();

        if graph.root().is_none() {
            tracing::debug!("no root, no proxies");
            self.scratch.clear();
            self.render_cache.sweep(|handle| renderer.release(handle));
            return &self.placements;
        }

        let viewport = canvas.rect(Frame::Content);
        let params = DetectorParams {
            grace_offset: self.config.grace_offset,
            direction_step: self.config.direction_step,
        };
        let mut crossings = find_crossings(graph, viewport, &params, &mut self.diagnostics);
        let selected = crossings.len();
        place_anchors(&mut crossings, canvas, &self.config);
        if self.config.filter_overlapping {
            self.scratch.levels.rebuild(graph);
            filter_overlapping(&mut crossings, graph, &self.scratch.levels, canvas);
        }

        for crossing in &crossings {
            for cp in &crossing.crossing_points {
                let Some(node) = cp.node.as_ref() else {
                    continue;
                };
                let distance = self
                    .scratch
                    .distance(node.key, node.natural_bounds, viewport);
                let bounds = ScreenBounds {
                    rect: cp.node_bounds,
                    scale: cp.scale,
                };
                let occurrence = self.scratch.next_occurrence(node.key);
                let handle = self.render_cache.realize(renderer, node, occurrence, bounds);
                renderer.set_opacity(handle, self.config.opacity);
                renderer.set_click_through(handle, self.config.click_through);
                self.placements.push(ProxyPlacement {
                    proxy_id: node.proxy_id,
                    node: node.clone(),
                    occurrence,
                    handle: handle.clone(),
                    bounds,
                    side: cp.side,
                    incoming: cp.incoming,
                    distance,
                });
            }
        }
        self.placements
            .sort_by(|a, b| b.distance.total_cmp(&a.distance));
        let mut released = 0_usize;
        self.render_cache.sweep(|handle| {
            released += 1;
            renderer.release(handle);
        });

        tracing::debug!(
            selected,
            crossings = crossings.len(),
            placements = self.placements.len(),
            released,
            diagnostics = self.diagnostics.len(),
            "proxy update"
        );
        self.crossings = crossings;
        self.scratch.clear();
        &self.placements
    }

    /// Placements of the last update, farthest first.
    #[must_use]
    pub fn placements(&self) -> &[ProxyPlacement<K, O, H>] {
        &self.placements
    }

    /// Crossings that survived the last update, with resolved markers.
    #[must_use]
    pub fn crossings(&self) -> &[Crossing<E, K, O>] {
        &self.crossings
    }

    /// Problems found during the last update.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic<E>] {
        &self.diagnostics
    }

    /// The topmost placement under `pt` (view frame), honoring the hit tolerance.
    ///
    /// Closer hits win; among equally close hits the one drawn last wins.
    #[must_use]
    pub fn proxy_at(&self, pt: Point) -> Option<&ProxyPlacement<K, O, H>> {
        let tolerance = self.config.hit_tolerance;
        let mut best: Option<(f64, &ProxyPlacement<K, O, H>)> = None;
        for p in self.placements.iter().rev() {
            if let Some(d) = marker_hit(p.bounds.rect, pt, tolerance)
                && best.is_none_or(|(bd, _)| d < bd)
            {
                best = Some((d, p));
            }
        }
        best.map(|(_, p)| p)
    }

    /// Whether `pt` (view frame) lies inside any current marker.
    #[must_use]
    pub fn contains_point(&self, pt: Point) -> bool {
        let tolerance = self.config.hit_tolerance;
        self.placements
            .iter()
            .any(|p| marker_hit(p.bounds.rect, pt, tolerance).is_some())
    }

    /// The persistent render cache.
    #[must_use]
    pub fn render_cache(&self) -> &RenderCache<K, H> {
        &self.render_cache
    }

    /// Mutable access to the render cache, e.g. to drop handles early.
    pub fn render_cache_mut(&mut self) -> &mut RenderCache<K, H> {
        &mut self.render_cache
    }

    /// The per-update scratch state; always empty between updates.
    #[must_use]
    pub fn scratch(&self) -> &ScratchCache<K> {
        &self.scratch
    }
}
