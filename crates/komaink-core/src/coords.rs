//! Conversion between page (canvas) space and DOM pixel space.
//!
//! The page is centered in the viewport, then panned and scaled. A canvas
//! point maps to DOM space as `page_origin + p * scale`, where the page
//! origin is the top-left of the scaled page rectangle.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coordinate system errors.
#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("Scale must be finite and greater than zero, got {0}")]
    InvalidScale(f64),
}

/// Pan and zoom of the whole editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasTransform {
    /// Horizontal pan in DOM pixels.
    pub x: f64,
    /// Vertical pan in DOM pixels.
    pub y: f64,
    /// Zoom factor (1.0 = 100%).
    pub scale: f64,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl CanvasTransform {
    /// Create a transform, rejecting scales that would divide by zero.
    pub fn new(x: f64, y: f64, scale: f64) -> Result<Self, CoordinateError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(CoordinateError::InvalidScale(scale));
        }
        Ok(Self { x, y, scale })
    }

    pub fn pan(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Viewport geometry needed to place the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportInfo {
    /// Center of the viewport in DOM pixels.
    pub center: Point,
    /// Unscaled page size in canvas units.
    pub page_size: Size,
}

impl ViewportInfo {
    pub fn new(center: Point, page_size: Size) -> Self {
        Self { center, page_size }
    }

    /// Viewport info for a viewport of the given pixel size.
    pub fn from_viewport_size(viewport: Size, page_size: Size) -> Self {
        Self {
            center: Point::new(viewport.width / 2.0, viewport.height / 2.0),
            page_size,
        }
    }
}

/// Converts points between canvas space and DOM space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinateSystem {
    pub transform: CanvasTransform,
    pub viewport: ViewportInfo,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl CoordinateSystem {
    pub fn new(transform: CanvasTransform, viewport: ViewportInfo) -> Self {
        Self {
            transform,
            viewport,
            min_scale: 0.1,
            max_scale: 10.0,
        }
    }

    /// Set the zoom limits used by `zoom_at` and `fit_page`.
    pub fn with_scale_limits(mut self, min_scale: f64, max_scale: f64) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    /// Page rectangle in DOM pixels.
    pub fn canvas_rect(&self) -> Rect {
        let scale = self.transform.scale;
        let scaled = Size::new(
            self.viewport.page_size.width * scale,
            self.viewport.page_size.height * scale,
        );
        let origin = Point::new(
            self.viewport.center.x + self.transform.x - scaled.width / 2.0,
            self.viewport.center.y + self.transform.y - scaled.height / 2.0,
        );
        Rect::from_origin_size(origin, scaled)
    }

    /// Affine mapping canvas points to DOM points.
    pub fn to_dom_affine(&self) -> Affine {
        let origin = self.canvas_rect().origin();
        Affine::translate(origin.to_vec2()) * Affine::scale(self.transform.scale)
    }

    pub fn canvas_to_dom(&self, point: Point) -> Point {
        self.to_dom_affine() * point
    }

    pub fn dom_to_canvas(&self, point: Point) -> Point {
        let origin = self.canvas_rect().origin();
        Point::new(
            (point.x - origin.x) / self.transform.scale,
            (point.y - origin.y) / self.transform.scale,
        )
    }

    /// Convert a DOM-space delta (e.g. pointer movement) to canvas units.
    pub fn dom_delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        delta / self.transform.scale
    }

    /// Whether a DOM point lies on the page.
    pub fn is_point_in_canvas(&self, point: Point) -> bool {
        let rect = self.canvas_rect();
        point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
    }

    /// Pan by a DOM-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.transform.x += delta.x;
        self.transform.y += delta.y;
    }

    /// Zoom by `factor`, keeping the canvas point under `dom_point` fixed.
    pub fn zoom_at(&mut self, dom_point: Point, factor: f64) {
        let new_scale = (self.transform.scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - self.transform.scale).abs() < f64::EPSILON {
            return;
        }

        let anchor = self.dom_to_canvas(dom_point);
        self.transform.scale = new_scale;

        let moved = self.canvas_to_dom(anchor);
        self.transform.x += dom_point.x - moved.x;
        self.transform.y += dom_point.y - moved.y;
    }

    /// Recenter the page at 100%.
    pub fn reset(&mut self) {
        self.transform = CanvasTransform::default();
    }

    /// Scale the page to fit a viewport of `viewport` pixels, centered.
    pub fn fit_page(&mut self, viewport: Size, padding: f64) {
        let page = self.viewport.page_size;
        let avail = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        let scale = (avail.width / page.width)
            .min(avail.height / page.height)
            .clamp(self.min_scale, self.max_scale);

        self.viewport.center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        self.transform = CanvasTransform {
            x: 0.0,
            y: 0.0,
            scale,
        };
    }
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self::new(
            CanvasTransform::default(),
            ViewportInfo::new(Point::new(400.0, 600.0), Size::new(800.0, 1200.0)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(x: f64, y: f64, scale: f64) -> CoordinateSystem {
        CoordinateSystem::new(
            CanvasTransform::new(x, y, scale).unwrap(),
            ViewportInfo::new(Point::new(500.0, 400.0), Size::new(800.0, 600.0)),
        )
    }

    #[test]
    fn test_identity_centers_page() {
        let cs = system(0.0, 0.0, 1.0);
        let dom = cs.canvas_to_dom(Point::ZERO);
        assert!((dom.x - 100.0).abs() < 1e-10);
        assert!((dom.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_canvas_to_dom_with_pan_and_scale() {
        let cs = system(30.0, -20.0, 2.0);
        // origin = center + pan - scaled/2 = (500+30-800, 400-20-600)
        let dom = cs.canvas_to_dom(Point::new(10.0, 10.0));
        assert!((dom.x - (-270.0 + 20.0)).abs() < 1e-10);
        assert!((dom.y - (-220.0 + 20.0)).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let cases = [
            (0.0, 0.0, 1.0),
            (123.5, -42.25, 0.37),
            (-900.0, 311.0, 7.5),
            (0.5, 0.5, 0.1),
        ];
        for (px, py, scale) in cases {
            let cs = system(px, py, scale);
            for p in [Point::new(0.0, 0.0), Point::new(175.0, 140.0), Point::new(-33.3, 1e4)] {
                let back = cs.dom_to_canvas(cs.canvas_to_dom(p));
                assert!((back.x - p.x).abs() < 1e-9, "x mismatch for {px},{py},{scale}");
                assert!((back.y - p.y).abs() < 1e-9, "y mismatch for {px},{py},{scale}");
            }
        }
    }

    #[test]
    fn test_invalid_scale() {
        assert_eq!(
            CanvasTransform::new(0.0, 0.0, 0.0),
            Err(CoordinateError::InvalidScale(0.0))
        );
        assert!(CanvasTransform::new(0.0, 0.0, f64::NAN).is_err());
        assert!(CanvasTransform::new(0.0, 0.0, -1.0).is_err());
    }

    #[test]
    fn test_point_in_canvas() {
        let cs = system(0.0, 0.0, 1.0);
        assert!(cs.is_point_in_canvas(Point::new(100.0, 100.0)));
        assert!(cs.is_point_in_canvas(Point::new(900.0, 700.0)));
        assert!(!cs.is_point_in_canvas(Point::new(99.0, 100.0)));
        assert!(!cs.is_point_in_canvas(Point::new(500.0, 701.0)));
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut cs = system(10.0, 10.0, 1.0);
        let dom = Point::new(320.0, 250.0);
        let before = cs.dom_to_canvas(dom);
        cs.zoom_at(dom, 2.5);
        let after = cs.dom_to_canvas(dom);
        assert!((cs.transform.scale - 2.5).abs() < f64::EPSILON);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut cs = system(0.0, 0.0, 1.0);
        cs.zoom_at(Point::ZERO, 0.0001);
        assert!((cs.transform.scale - cs.min_scale).abs() < f64::EPSILON);
        cs.zoom_at(Point::ZERO, 1e6);
        assert!((cs.transform.scale - cs.max_scale).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_page() {
        let mut cs = system(50.0, 50.0, 3.0);
        cs.fit_page(Size::new(440.0, 1000.0), 20.0);
        // width-bound: 400 / 800
        assert!((cs.transform.scale - 0.5).abs() < 1e-12);
        let rect = cs.canvas_rect();
        assert!((rect.center().x - 220.0).abs() < 1e-9);
        assert!((rect.center().y - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_dom_delta() {
        let cs = system(0.0, 0.0, 4.0);
        let d = cs.dom_delta_to_canvas(Vec2::new(8.0, -4.0));
        assert!((d.x - 2.0).abs() < f64::EPSILON);
        assert!((d.y + 1.0).abs() < f64::EPSILON);
    }
}
