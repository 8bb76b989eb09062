// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Off-screen edge proxies: `understory_diagram` + `understory_edge_proxy`.
//!
//! This example shows how to:
//! - build a small nested diagram with container-relative geometry,
//! - realize proxy markers through a host `ProxyRenderer`,
//! - scroll the view and watch markers get repositioned instead of re-rendered,
//! - answer pointer queries against the markers.
//!
//! Run:
//! - `cargo run -p understory_demos --example edge_proxy_basic`

use kurbo::{Point, Rect};
use understory_diagram::{Diagram, LocalEdge, LocalNode, NodeFlags, NodeId, ProxyRendering};
use understory_edge_proxy::{
    Canvas, ProxyConfig, ProxyNode, ProxyRenderer, ProxyView, ScreenBounds,
};

/// A stand-in for a UI toolkit: markers are numbered labels.
#[derive(Debug, Default)]
struct Labels {
    next: u32,
}

#[derive(Clone, Debug)]
struct Label {
    id: u32,
    text: String,
    rect: Rect,
}

impl ProxyRenderer<NodeId, String> for Labels {
    type Handle = Label;

    fn render(&mut self, node: &ProxyNode<NodeId, String>, bounds: ScreenBounds) -> Label {
        self.next += 1;
        let text = node
            .rendering
            .clone()
            .unwrap_or_else(|| format!("{:?}", node.key));
        println!("  render   #{} {text} at {:?}", self.next, bounds.rect);
        Label {
            id: self.next,
            text,
            rect: bounds.rect,
        }
    }

    fn reposition(
        &mut self,
        handle: &mut Label,
        _node: &ProxyNode<NodeId, String>,
        bounds: ScreenBounds,
    ) {
        println!("  move     #{} {} to {:?}", handle.id, handle.text, bounds.rect);
        handle.rect = bounds.rect;
    }

    fn set_opacity(&mut self, _handle: &mut Label, _opacity: f64) {}

    fn set_click_through(&mut self, _handle: &mut Label, _click_through: bool) {}
}

fn node(bounds: Rect) -> LocalNode {
    LocalNode {
        local_bounds: bounds,
        ..Default::default()
    }
}

/// Straight cubic from `a` to `b`.
fn straight(a: Point, b: Point) -> Vec<Point> {
    vec![a, a.lerp(b, 1.0 / 3.0), a.lerp(b, 2.0 / 3.0), b]
}

fn main() {
    let mut diagram = Diagram::new();
    let root = diagram
        .insert_node(None, node(Rect::new(0.0, 0.0, 2000.0, 1000.0)))
        .unwrap();

    // A hub on the left, two leaves far right, and a group below holding a third leaf.
    let hub = diagram
        .insert_node(Some(root), node(Rect::new(40.0, 200.0, 140.0, 260.0)))
        .unwrap();
    let east = diagram
        .insert_node(Some(root), node(Rect::new(900.0, 80.0, 1000.0, 140.0)))
        .unwrap();
    let far_east = diagram
        .insert_node(Some(root), node(Rect::new(1600.0, 300.0, 1700.0, 360.0)))
        .unwrap();
    let group = diagram
        .insert_node(Some(root), node(Rect::new(100.0, 700.0, 500.0, 900.0)))
        .unwrap();
    // Group-relative: world (200, 750)..(300, 810).
    let south = diagram
        .insert_node(Some(group), node(Rect::new(100.0, 50.0, 200.0, 110.0)))
        .unwrap();

    diagram.set_proxy_rendering(
        far_east,
        Some(ProxyRendering {
            bounds: Rect::new(0.0, 0.0, 24.0, 24.0),
            data: String::from("far-east badge"),
        }),
    );
    diagram.set_flags(east, NodeFlags::VISIBLE | NodeFlags::SELECTED);

    let from = Point::new(140.0, 230.0);
    for (target, to) in [
        (east, Point::new(900.0, 110.0)),
        (far_east, Point::new(1600.0, 330.0)),
        (south, Point::new(250.0, 750.0)),
    ] {
        diagram
            .insert_edge(
                root,
                LocalEdge {
                    source: hub,
                    target,
                    route: straight(from, to),
                },
            )
            .unwrap();
    }
    diagram.commit();

    let mut view = ProxyView::new(ProxyConfig::default()).unwrap();
    let mut labels = Labels::default();
    let screen = Rect::new(0.0, 0.0, 600.0, 400.0);

    for (step, scroll) in [Point::new(0.0, 0.0), Point::new(0.0, 40.0)].into_iter().enumerate() {
        let canvas = Canvas::new(screen, scroll, 1.0).unwrap();
        println!("update {step} (scroll {scroll:?})");
        let placements = view.update(&diagram, &canvas, &mut labels);
        for p in placements {
            println!(
                "  marker   {} {:?} incoming={} distance={:.1}",
                p.handle.text, p.side, p.incoming, p.distance
            );
        }
    }

    let pointer = view
        .placements()
        .first()
        .map(|p| p.bounds.rect.center())
        .unwrap_or(Point::ZERO);
    match view.proxy_at(pointer) {
        Some(p) => println!("pointer at {pointer:?} is over {}", p.handle.text),
        None => println!("pointer at {pointer:?} hits nothing"),
    }
    for d in view.diagnostics() {
        println!("diagnostic on {:?}: {}", d.edge, d.error);
    }
}
