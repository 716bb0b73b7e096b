//! Bubble tail ("queue") configuration and polygon generation.

use super::attachment::side_for_angle;
use super::normalize_angle;
use kurbo::{BezPath, Circle, Point, Shape, Vec2};
use serde::{Deserialize, Serialize};

/// How far the tail root is pushed inside the outline so the union has no seam.
pub const TAIL_ROOT_OVERLAP: f64 = 4.0;

/// Tail drawing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TailStyle {
    /// Straight-sided trapezoid.
    #[default]
    Straight,
    /// Sides bent into quadratic curves.
    Curved,
    /// Trail of shrinking circles (thought bubbles).
    Bubbles,
}

/// Side of the bubble the tail leaves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttachmentSide {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

/// Tail of a bubble.
///
/// `angle` is kept in `[0, 360)`. `length` has no upper bound; the tail
/// handle only enforces a minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailConfig {
    /// Direction in degrees, 0° = +X, clockwise on screen.
    angle: f64,
    /// Distance from the attachment point to the tip.
    pub length: f64,
    /// Width of the tail at its root.
    pub thickness: f64,
    /// 0.0 keeps the full width at the tip, 1.0 ends in a point.
    pub tapering: f64,
    pub style: TailStyle,
    pub side: AttachmentSide,
    /// Attachment point relative to the bubble center, as of the last update.
    #[serde(default)]
    pub attachment_offset: Vec2,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            angle: 90.0,
            length: 40.0,
            thickness: 20.0,
            tapering: 1.0,
            style: TailStyle::Straight,
            side: AttachmentSide::Bottom,
            attachment_offset: Vec2::ZERO,
        }
    }
}

impl TailConfig {
    /// Tail pointing at `angle` degrees with the given length.
    pub fn new(angle: f64, length: f64) -> Self {
        let mut tail = Self::default();
        tail.set_angle(angle);
        tail.length = length.max(0.0);
        tail
    }

    pub fn with_style(mut self, style: TailStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness.max(0.0);
        self
    }

    pub fn with_tapering(mut self, tapering: f64) -> Self {
        self.tapering = tapering.clamp(0.0, 1.0);
        self
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Set the direction; the value is wrapped into `[0, 360)` and the side
    /// follows it.
    pub fn set_angle(&mut self, degrees: f64) {
        self.angle = normalize_angle(degrees);
        self.side = side_for_angle(self.angle);
    }

    pub fn angle_radians(&self) -> f64 {
        self.angle.to_radians()
    }

    /// Unit vector pointing from root to tip.
    pub fn direction(&self) -> Vec2 {
        let (sin, cos) = self.angle_radians().sin_cos();
        Vec2::new(cos, sin)
    }

    /// Tip position for a tail attached at `attachment`.
    pub fn tip(&self, attachment: Point) -> Point {
        attachment + self.direction() * self.length
    }

    /// Key points of the tail polygon.
    pub fn geometry(&self, attachment: Point) -> TailGeometry {
        let dir = self.direction();
        let normal = Vec2::new(-dir.y, dir.x);
        let half_base = self.thickness.max(0.0) / 2.0;
        let half_tip = half_base * (1.0 - self.tapering.clamp(0.0, 1.0));
        let root = attachment - dir * TAIL_ROOT_OVERLAP;
        let tip = self.tip(attachment);
        TailGeometry {
            attachment,
            tip,
            base_left: root + normal * half_base,
            base_right: root - normal * half_base,
            tip_left: tip + normal * half_tip,
            tip_right: tip - normal * half_tip,
        }
    }
}

/// Resolved tail polygon points in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailGeometry {
    pub attachment: Point,
    pub tip: Point,
    pub base_left: Point,
    pub base_right: Point,
    pub tip_left: Point,
    pub tip_right: Point,
}

/// Closed tail path for `config` rooted at `attachment`.
///
/// Winding is not normalized here; the unified bubble path orients it.
pub fn tail_path(config: &TailConfig, attachment: Point) -> BezPath {
    let g = config.geometry(attachment);
    let mut path = BezPath::new();
    match config.style {
        TailStyle::Straight => {
            path.move_to(g.base_left);
            path.line_to(g.tip_left);
            if g.tip_left != g.tip_right {
                path.line_to(g.tip_right);
            }
            path.line_to(g.base_right);
            path.close_path();
        }
        TailStyle::Curved => {
            let bend = config.direction().turn_90() * (config.length * 0.2);
            path.move_to(g.base_left);
            path.quad_to(g.base_left.midpoint(g.tip_left) + bend, g.tip_left);
            if g.tip_left != g.tip_right {
                path.line_to(g.tip_right);
            }
            path.quad_to(g.tip_right.midpoint(g.base_right) + bend, g.base_right);
            path.close_path();
        }
        TailStyle::Bubbles => {
            let dir = config.direction();
            let base_radius = (config.thickness / 2.0).max(1.0);
            for (t, scale) in [(0.3, 0.6), (0.65, 0.4), (1.0, 0.25)] {
                let center = attachment + dir * (config.length * t);
                let circle = Circle::new(center, (base_radius * scale).max(1.0));
                path.extend(circle.path_elements(0.1));
            }
        }
    }
    path
}
