//! Character and prop sprites.

use super::{rect_path, ElementId, ElementKind, ElementStyle, ElementTrait, Transform};
use kurbo::{BezPath, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sprite drawn from the asset library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub(crate) id: ElementId,
    pub transform: Transform,
    /// Asset library key.
    pub asset: String,
    #[serde(default)]
    pub flip_x: bool,
    pub style: ElementStyle,
}

impl Sprite {
    pub fn new(rect: Rect, asset: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform: Transform::from_rect(rect),
            asset: asset.into(),
            flip_x: false,
            style: ElementStyle {
                fill_color: None,
                stroke_width: 0.0,
                ..ElementStyle::default()
            },
        }
    }
}

impl ElementTrait for Sprite {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Sprite
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
