//! Raster images, usually placed inside a panel.

use super::{rect_path, ElementId, ElementKind, ElementStyle, ElementTrait, Transform};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image format of the referenced source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from a file name or URL.
    pub fn from_source(source: &str) -> Option<Self> {
        let ext = source.rsplit_once('.')?.1;
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }
}

/// An image element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ElementId,
    pub transform: Transform,
    /// Path or URL of the image data.
    pub source: String,
    #[serde(default)]
    pub format: Option<ImageFormat>,
    /// Panel this image is clipped to, if any.
    #[serde(default)]
    pub parent_panel: Option<ElementId>,
    pub style: ElementStyle,
}

impl Image {
    pub fn new(rect: Rect, source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            id: Uuid::new_v4(),
            transform: Transform::from_rect(rect),
            format: ImageFormat::from_source(&source),
            source,
            parent_panel: None,
            style: ElementStyle {
                fill_color: None,
                stroke_width: 0.0,
                ..ElementStyle::default()
            },
        }
    }

    pub fn in_panel(mut self, panel: ElementId) -> Self {
        self.parent_panel = Some(panel);
        self
    }

    /// Whether `point` lies within `tolerance` of the image's edge, on
    /// either side.
    pub fn is_near_border(&self, point: Point, tolerance: f64) -> bool {
        let local = self.transform.to_local(point);
        let rect = self.transform.rect();
        let outer = rect.inflate(tolerance, tolerance);
        if !outer.contains(local) {
            return false;
        }
        let inner = rect.inflate(-tolerance, -tolerance);
        inner.width() <= 0.0 || inner.height() <= 0.0 || !inner.contains(local)
    }
}

impl ElementTrait for Image {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Image
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    fn style(&self) -> &ElementStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ElementStyle {
        &mut self.style
    }

    fn to_path(&self) -> BezPath {
        rect_path(&self.transform)
    }
}
