// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The renderer seam and the caches the controller keeps around it.

use core::hash::Hash;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Rect;

use crate::graph::{ProxyId, ProxyNode};
use crate::overlap::DepthLevels;
use crate::types::ScreenBounds;

/// Host collaborator that turns proxy nodes into displayable markers.
///
/// The engine treats [`ProxyRenderer::Handle`] as opaque: it only caches it and hands
/// it back for repositioning, restyling and release.
pub trait ProxyRenderer<K, O> {
    /// Whatever the host uses to refer to a realized marker.
    type Handle: Clone;

    /// Produce a marker for `node` occupying `bounds` (view frame).
    fn render(&mut self, node: &ProxyNode<K, O>, bounds: ScreenBounds) -> Self::Handle;

    /// Move an existing marker to `bounds`; `node` is the current snapshot.
    fn reposition(
        &mut self,
        handle: &mut Self::Handle,
        node: &ProxyNode<K, O>,
        bounds: ScreenBounds,
    );

    /// Set the marker's opacity.
    fn set_opacity(&mut self, handle: &mut Self::Handle, opacity: f64);

    /// Let pointer events pass through the marker, or not.
    fn set_click_through(&mut self, handle: &mut Self::Handle, click_through: bool);

    /// Dispose of a marker that is no longer shown.
    fn release(&mut self, _handle: Self::Handle) {}
}

#[derive(Clone, Debug)]
struct Slot<H> {
    handle: H,
    realized: bool,
}

/// Rendered markers keyed by proxy id and occurrence; persists across updates.
///
/// A node represented by several crossings in one update gets one marker per
/// occurrence, counted in crossing order.
#[derive(Clone, Debug)]
pub struct RenderCache<K, H> {
    entries: HashMap<(ProxyId<K>, usize), Slot<H>>,
}

impl<K, H> Default for RenderCache<K, H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash, H> RenderCache<K, H> {
    /// Return the cached handle for this occurrence of `node`, repositioned to
    /// `bounds`, or render and cache a new one.
    ///
    /// The entry is marked as realized until the next [`sweep`](Self::sweep).
    pub fn realize<O, R>(
        &mut self,
        renderer: &mut R,
        node: &ProxyNode<K, O>,
        occurrence: usize,
        bounds: ScreenBounds,
    ) -> &mut H
    where
        R: ProxyRenderer<K, O, Handle = H> + ?Sized,
    {
        let slot = match self.entries.entry((node.proxy_id, occurrence)) {
            Entry::Occupied(e) => {
                let slot = e.into_mut();
                renderer.reposition(&mut slot.handle, node, bounds);
                slot.realized = true;
                slot
            }
            Entry::Vacant(e) => e.insert(Slot {
                handle: renderer.render(node, bounds),
                realized: true,
            }),
        };
        &mut slot.handle
    }

    /// Drop every handle not realized since the previous sweep, passing each to
    /// `release`, then clear the realized marks.
    pub fn sweep(&mut self, mut release: impl FnMut(H)) {
        for (_, slot) in self.entries.extract_if(|_, slot| !slot.realized) {
            release(slot.handle);
        }
        for slot in self.entries.values_mut() {
            slot.realized = false;
        }
    }

    /// Cached handle for occurrence `occurrence` of proxy `id`.
    pub fn get(&self, id: ProxyId<K>, occurrence: usize) -> Option<&H> {
        self.entries.get(&(id, occurrence)).map(|slot| &slot.handle)
    }

    /// Drop the cached handle for occurrence `occurrence` of proxy `id`, returning it.
    pub fn remove(&mut self, id: ProxyId<K>, occurrence: usize) -> Option<H> {
        self.entries.remove(&(id, occurrence)).map(|slot| slot.handle)
    }

    /// Number of cached handles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached handle.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Per-update working state; emptied at the end of every update.
#[derive(Clone, Debug)]
pub struct ScratchCache<K> {
    pub(crate) levels: DepthLevels<K>,
    distances: HashMap<K, f64>,
    occurrences: HashMap<K, usize>,
}

impl<K> Default for ScratchCache<K> {
    fn default() -> Self {
        Self {
            levels: DepthLevels::default(),
            distances: HashMap::new(),
            occurrences: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> ScratchCache<K> {
    /// Distance from `bounds` to `viewport` (zero when they overlap), memoized by `node`.
    pub fn distance(&mut self, node: K, bounds: Rect, viewport: Rect) -> f64 {
        *self
            .distances
            .entry(node)
            .or_insert_with(|| rect_distance(bounds, viewport))
    }

    /// How many placements `node` already has this update; bumps the count.
    pub fn next_occurrence(&mut self, node: K) -> usize {
        let count = self.occurrences.entry(node).or_insert(0);
        let occurrence = *count;
        *count += 1;
        occurrence
    }

    /// Whether no state is held.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty() && self.distances.is_empty() && self.occurrences.is_empty()
    }

    /// Forget everything, keeping allocations.
    pub fn clear(&mut self) {
        self.levels.clear();
        self.distances.clear();
        self.occurrences.clear();
    }
}

/// Euclidean gap between two rectangles.
fn rect_distance(a: Rect, b: Rect) -> f64 {
    let dx = (b.x0 - a.x1).max(a.x0 - b.x1).max(0.0);
    let dy = (b.y0 - a.y1).max(a.y0 - b.y1).max(0.0);
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct Log {
        rendered: Vec<u32>,
        repositioned: Vec<u32>,
    }

    impl ProxyRenderer<u32, ()> for Log {
        type Handle = u32;

        fn render(&mut self, node: &ProxyNode<u32, ()>, _bounds: ScreenBounds) -> u32 {
            self.rendered.push(node.key);
            node.key * 10
        }
        fn reposition(&mut self, handle: &mut u32, _node: &ProxyNode<u32, ()>, _b: ScreenBounds) {
            self.repositioned.push(*handle);
        }
        fn set_opacity(&mut self, _handle: &mut u32, _opacity: f64) {}
        fn set_click_through(&mut self, _handle: &mut u32, _click_through: bool) {}
    }

    fn node(key: u32) -> ProxyNode<u32, ()> {
        ProxyNode {
            key,
            proxy_id: ProxyId(key),
            bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            natural_bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            children: Vec::new(),
            opacity: 1.0,
            selected: false,
            rendering: None,
        }
    }

    #[test]
    fn renders_once_then_repositions() {
        let mut cache = RenderCache::default();
        let mut log = Log::default();
        let b = ScreenBounds {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            scale: 0.1,
        };
        assert_eq!(*cache.realize(&mut log, &node(3), 0, b), 30);
        assert_eq!(*cache.realize(&mut log, &node(3), 0, b), 30);
        assert_eq!(*cache.realize(&mut log, &node(4), 0, b), 40);
        assert_eq!(log.rendered, [3, 4]);
        assert_eq!(log.repositioned, [30]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.remove(ProxyId(3), 0), Some(30));
        assert_eq!(cache.get(ProxyId(4), 0), Some(&40));
    }

    #[test]
    fn occurrences_are_cached_separately() {
        let mut cache = RenderCache::default();
        let mut log = Log::default();
        let b = ScreenBounds {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            scale: 0.1,
        };
        cache.realize(&mut log, &node(3), 0, b);
        cache.realize(&mut log, &node(3), 1, b);
        assert_eq!(log.rendered, [3, 3]);
        assert!(log.repositioned.is_empty());
        assert_eq!(cache.len(), 2);
        assert!(cache.get(ProxyId(3), 1).is_some());
        assert!(cache.get(ProxyId(3), 2).is_none());
    }

    #[test]
    fn sweep_releases_handles_not_realized_since_last_sweep() {
        let mut cache = RenderCache::default();
        let mut log = Log::default();
        let b = ScreenBounds {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            scale: 0.1,
        };
        cache.realize(&mut log, &node(3), 0, b);
        cache.realize(&mut log, &node(4), 0, b);
        let mut released = Vec::new();
        cache.sweep(|h| released.push(h));
        assert!(released.is_empty());
        assert_eq!(cache.len(), 2);

        // Only node 4 is shown in the next round.
        cache.realize(&mut log, &node(4), 0, b);
        cache.sweep(|h| released.push(h));
        assert_eq!(released, [30]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(ProxyId(4), 0), Some(&40));

        // Nothing shown: everything goes.
        cache.sweep(|h| released.push(h));
        assert_eq!(released, [30, 40]);
        assert!(cache.is_empty());
    }

    #[test]
    fn distances_are_memoized_and_cleared() {
        let mut scratch = ScratchCache::default();
        let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
        let d = scratch.distance(1, Rect::new(103.0, 104.0, 110.0, 110.0), viewport);
        assert!((d - 5.0).abs() < 1e-12);
        // The first measurement wins for the rest of the update.
        assert_eq!(scratch.distance(1, Rect::new(500.0, 0.0, 510.0, 10.0), viewport), d);
        assert_eq!(scratch.distance(2, Rect::new(10.0, 10.0, 20.0, 20.0), viewport), 0.0);
        assert_eq!(scratch.next_occurrence(7), 0);
        assert_eq!(scratch.next_occurrence(7), 1);
        assert_eq!(scratch.next_occurrence(8), 0);
        assert!(!scratch.is_empty());
        scratch.clear();
        assert_eq!(scratch.next_occurrence(7), 0);
        scratch.clear();
        assert!(scratch.is_empty());
    }
}
