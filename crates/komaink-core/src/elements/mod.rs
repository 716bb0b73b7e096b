//! Elements placed on a page.

mod bubble;
mod image;
mod panel;
mod sprite;
mod text;

pub use bubble::{Bubble, BubbleKind};
pub use image::Image;
pub use panel::Panel;
pub use sprite::Sprite;
pub use text::TextBox;

use crate::config::SizeConstraints;
use crate::geometry::TailConfig;
use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Discriminant of [`Element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Panel,
    Dialogue,
    Text,
    Image,
    Sprite,
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// `#rrggbb` form, alpha dropped.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke and fill of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    #[serde(default)]
    pub dashed: bool,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: Some(SerializableColor::white()),
            dashed: false,
        }
    }
}

impl ElementStyle {
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(Into::into)
    }
}

/// Position, size and stacking of a placed element.
///
/// Width and height are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in radians around the center.
    #[serde(default)]
    pub rotation: f64,
    /// Opacity, 0.0 to 1.0.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Stacking order, assigned by the layer registry.
    #[serde(default)]
    pub z_index: i32,
}

fn default_alpha() -> f64 {
    1.0
}

impl Transform {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
            rotation: 0.0,
            alpha: 1.0,
            z_index: 0,
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }

    /// Unrotated bounding rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..*self
        }
    }

    /// Clamp width and height into `constraints`, keeping the top-left corner.
    pub fn clamp_size(&mut self, constraints: &SizeConstraints) {
        self.width = constraints.clamp_width(self.width);
        self.height = constraints.clamp_height(self.height);
    }

    /// Rotation about the center as an affine map (local -> canvas).
    pub fn rotation_affine(&self) -> Affine {
        if self.rotation.abs() < f64::EPSILON {
            Affine::IDENTITY
        } else {
            Affine::rotate_about(self.rotation, self.center())
        }
    }

    /// Map a canvas point into the element's unrotated frame.
    pub fn to_local(&self, point: Point) -> Point {
        self.rotation_affine().inverse() * point
    }

    /// Axis-aligned bounds of the rotated rectangle.
    pub fn bounds(&self) -> Rect {
        let rect = self.rect();
        if self.rotation.abs() < f64::EPSILON {
            return rect;
        }
        self.rotation_affine().transform_rect_bbox(rect)
    }
}

/// Partial change to an element, produced by tools and manipulators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<TailConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ElementUpdate {
    pub fn transform(transform: Transform) -> Self {
        Self {
            transform: Some(transform),
            ..Self::default()
        }
    }

    pub fn tail(tail: TailConfig) -> Self {
        Self {
            tail: Some(tail),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transform.is_none() && self.tail.is_none() && self.text.is_none()
    }
}

/// Common behavior of all element types.
pub trait ElementTrait {
    fn id(&self) -> ElementId;

    fn kind(&self) -> ElementKind;

    fn transform(&self) -> &Transform;

    fn transform_mut(&mut self) -> &mut Transform;

    fn style(&self) -> &ElementStyle;

    fn style_mut(&mut self) -> &mut ElementStyle;

    /// Outline in canvas coordinates, rotation applied.
    fn to_path(&self) -> BezPath;

    /// Whether `point` (canvas coordinates) hits the element.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let t = self.transform();
        t.rect()
            .inflate(tolerance, tolerance)
            .contains(t.to_local(point))
    }
}

/// Any element on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Panel(Panel),
    Dialogue(Bubble),
    Text(TextBox),
    Image(Image),
    Sprite(Sprite),
}

macro_rules! dispatch {
    ($self:expr, $e:ident => $body:expr) => {
        match $self {
            Element::Panel($e) => $body,
            Element::Dialogue($e) => $body,
            Element::Text($e) => $body,
            Element::Image($e) => $body,
            Element::Sprite($e) => $body,
        }
    };
}

impl Element {
    pub fn id(&self) -> ElementId {
        dispatch!(self, e => e.id())
    }

    pub fn kind(&self) -> ElementKind {
        dispatch!(self, e => e.kind())
    }

    pub fn transform(&self) -> &Transform {
        dispatch!(self, e => e.transform())
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        dispatch!(self, e => e.transform_mut())
    }

    pub fn style(&self) -> &ElementStyle {
        dispatch!(self, e => e.style())
    }

    pub fn style_mut(&mut self) -> &mut ElementStyle {
        dispatch!(self, e => e.style_mut())
    }

    pub fn to_path(&self) -> BezPath {
        dispatch!(self, e => e.to_path())
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        dispatch!(self, e => e.hit_test(point, tolerance))
    }

    pub fn bounds(&self) -> Rect {
        self.transform().bounds()
    }

    pub fn z_index(&self) -> i32 {
        self.transform().z_index
    }

    /// Give the element a fresh id (used when duplicating).
    pub fn regenerate_id(&mut self) {
        let new_id = Uuid::new_v4();
        dispatch!(self, e => e.id = new_id)
    }

    pub fn as_bubble(&self) -> Option<&Bubble> {
        match self {
            Element::Dialogue(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bubble_mut(&mut self) -> Option<&mut Bubble> {
        match self {
            Element::Dialogue(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Element::Image(img) => Some(img),
            _ => None,
        }
    }

    /// Whether the element carries editable text.
    pub fn has_text(&self) -> bool {
        matches!(self, Element::Dialogue(_) | Element::Text(_))
    }

    /// Merge a partial update.
    ///
    /// The z-index is owned by the layer registry and is kept as is. Fields
    /// that do not apply to this kind are ignored.
    pub fn apply_update(&mut self, update: &ElementUpdate) {
        if let Some(new) = update.transform {
            let t = self.transform_mut();
            let z_index = t.z_index;
            *t = Transform {
                width: new.width.max(0.0),
                height: new.height.max(0.0),
                z_index,
                ..new
            };
        }
        if let Some(tail) = update.tail {
            if let Element::Dialogue(b) = self {
                b.tail = Some(tail);
            }
        }
        if let Some(text) = &update.text {
            match self {
                Element::Dialogue(b) => b.text.clone_from(text),
                Element::Text(t) => t.content.clone_from(text),
                _ => {}
            }
        }
        if let Element::Dialogue(b) = self {
            b.refresh_attachment();
        }
    }
}

/// Outline of a transform's rectangle with rotation applied.
pub(crate) fn rect_path(transform: &Transform) -> BezPath {
    use kurbo::Shape;
    transform.rotation_affine() * transform.rect().to_path(0.1)
}
