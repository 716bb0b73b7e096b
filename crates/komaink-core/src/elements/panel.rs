//! Comic panel frame.

use super::{rect_path, ElementId, ElementKind, ElementStyle, ElementTrait, Transform};
use kurbo::{BezPath, Rect, RoundedRect, Shape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A panel: the frame images and sprites are laid out in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub(crate) id: ElementId,
    pub transform: Transform,
    /// Corner radius of the frame.
    #[serde(default)]
    pub corner_radius: f64,
    pub style: ElementStyle,
}

impl Panel {
    pub fn new(rect: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform: Transform::from_rect(rect),
            corner_radius: 0.0,
            style: ElementStyle {
                stroke_width: 3.0,
                ..ElementStyle::default()
            },
        }
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius.max(0.0);
        self
    }
}

impl ElementTrait for Panel {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Panel
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
        if self.corner_radius <= 0.0 {
            return rect_path(&self.transform);
        }
        let rect = self.transform.rect();
        let radius = self.corner_radius.min(rect.width().min(rect.height()) / 2.0);
        self.transform.rotation_affine() * RoundedRect::from_rect(rect, radius).to_path(0.1)
    }
}
