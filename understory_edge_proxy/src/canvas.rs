// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport description and conversions between the content and view frames.

use kurbo::{Affine, Point, Rect, Vec2};

use crate::error::ProxyError;

/// Reference frame a canvas rectangle is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Frame {
    /// Same units as node and edge geometry; independent of zoom.
    Content,
    /// On-screen pixels; depends on zoom and scroll.
    View,
}

/// The current viewport of the diagram.
///
/// A canvas is stored as the host reports it: the on-screen view rectangle, the
/// content-frame point shown at the view's top-left corner (`scroll`), and a uniform
/// zoom factor. The viewport rectangle in either frame is derived with
/// [`Canvas::rect`].
///
/// ```rust
/// use kurbo::{Point, Rect};
/// use understory_edge_proxy::{Canvas, Frame};
///
/// let canvas = Canvas::new(Rect::new(0.0, 0.0, 800.0, 600.0), Point::new(100.0, 50.0), 2.0)
///     .unwrap();
/// assert_eq!(canvas.rect(Frame::Content), Rect::new(100.0, 50.0, 500.0, 350.0));
/// assert_eq!(canvas.point_to_view(Point::new(100.0, 50.0)), Point::new(0.0, 0.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    view: Rect,
    scroll: Point,
    zoom: f64,
}

impl Canvas {
    /// Create a canvas from the view rectangle (pixels), scroll, and zoom.
    ///
    /// Returns [`ProxyError::InvalidZoom`] unless `zoom` is finite and positive.
    pub fn new(view: Rect, scroll: Point, zoom: f64) -> Result<Self, ProxyError> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(ProxyError::InvalidZoom(zoom));
        }
        Ok(Self {
            view: view.abs(),
            scroll,
            zoom,
        })
    }

    /// Zoom factor, always finite and positive.
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Content-frame point displayed at the view's top-left corner.
    pub const fn scroll(&self) -> Point {
        self.scroll
    }

    /// The viewport rectangle expressed in `frame`.
    pub fn rect(&self, frame: Frame) -> Rect {
        match frame {
            Frame::View => self.view,
            Frame::Content => Rect::from_origin_size(self.scroll, self.view.size() / self.zoom),
        }
    }

    /// Affine map from the content frame to the view frame.
    pub fn content_to_view(&self) -> Affine {
        Affine::translate(self.view.origin().to_vec2())
            * Affine::scale(self.zoom)
            * Affine::translate(-self.scroll.to_vec2())
    }

    /// Affine map from the view frame to the content frame.
    pub fn view_to_content(&self) -> Affine {
        Affine::translate(self.scroll.to_vec2())
            * Affine::scale(self.zoom.recip())
            * Affine::translate(-self.view.origin().to_vec2())
    }

    /// Convert a content-frame point to the view frame.
    pub fn point_to_view(&self, p: Point) -> Point {
        let v = (p - self.scroll) * self.zoom;
        self.view.origin() + v
    }

    /// Convert a view-frame point to the content frame.
    pub fn point_to_content(&self, p: Point) -> Point {
        let v: Vec2 = (p - self.view.origin()) / self.zoom;
        self.scroll + v
    }

    /// Convert content-frame bounds to the view frame.
    pub fn bounds_to_view(&self, r: Rect) -> Rect {
        Rect::from_points(self.point_to_view(r.origin()), self.point_to_view(Point::new(r.x1, r.y1)))
    }

    /// Convert view-frame bounds to the content frame.
    pub fn bounds_to_content(&self, r: Rect) -> Rect {
        Rect::from_points(
            self.point_to_content(r.origin()),
            self.point_to_content(Point::new(r.x1, r.y1)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        Canvas::new(Rect::new(10.0, 20.0, 410.0, 320.0), Point::new(-50.0, 100.0), 0.5).unwrap()
    }

    #[test]
    fn rejects_non_positive_zoom() {
        let view = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(
            Canvas::new(view, Point::ZERO, 0.0),
            Err(ProxyError::InvalidZoom(0.0))
        );
        assert!(Canvas::new(view, Point::ZERO, -1.0).is_err());
        assert!(Canvas::new(view, Point::ZERO, f64::NAN).is_err());
        assert!(Canvas::new(view, Point::ZERO, f64::INFINITY).is_err());
    }

    #[test]
    fn content_rect_scales_with_zoom() {
        let c = canvas();
        assert_eq!(c.rect(Frame::View), Rect::new(10.0, 20.0, 410.0, 320.0));
        assert_eq!(c.rect(Frame::Content), Rect::new(-50.0, 100.0, 750.0, 700.0));
    }

    #[test]
    fn viewport_corners_map_onto_each_other() {
        let c = canvas();
        let content = c.rect(Frame::Content);
        let view = c.rect(Frame::View);
        assert_eq!(c.bounds_to_view(content), view);
        assert_eq!(c.bounds_to_content(view), content);
    }

    #[test]
    fn point_conversions_round_trip_and_match_affine() {
        let c = canvas();
        let p = Point::new(123.0, 456.0);
        let v = c.point_to_view(p);
        assert_eq!(c.content_to_view() * p, v);
        let back = c.point_to_content(v);
        assert!((back - p).hypot() < 1e-9);
        let back_affine = c.view_to_content() * v;
        assert!((back_affine - p).hypot() < 1e-9);
    }
}
