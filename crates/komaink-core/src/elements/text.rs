//! Free-standing text (sound effects, captions).

use super::{rect_path, ElementId, ElementKind, ElementStyle, ElementTrait, SerializableColor, Transform};
use kurbo::{BezPath, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text box placed directly on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub(crate) id: ElementId,
    pub transform: Transform,
    pub content: String,
    pub font_size: f64,
    pub style: ElementStyle,
}

impl TextBox {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    pub fn new(rect: Rect, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform: Transform::from_rect(rect),
            content: content.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            style: ElementStyle {
                stroke_color: SerializableColor::black(),
                stroke_width: 1.0,
                fill_color: None,
                dashed: true,
            },
        }
    }

    /// Number of lines in the content (at least one).
    pub fn line_count(&self) -> usize {
        self.content.lines().count().max(1)
    }
}

impl ElementTrait for TextBox {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Text
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
