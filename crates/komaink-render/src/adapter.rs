//! Renderer trait abstraction.

use komaink_core::elements::{Element, ElementStyle, Transform};
use komaink_core::manipulation::Handle;
use kurbo::{BezPath, Rect};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Output formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Paint for one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStyle {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub dashed: bool,
    /// Overall opacity, 0.0 to 1.0.
    pub opacity: f64,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: Some(Color::BLACK),
            stroke_width: 1.0,
            dashed: false,
            opacity: 1.0,
        }
    }
}

impl DrawStyle {
    pub fn from_style(style: &ElementStyle, alpha: f64) -> Self {
        Self {
            fill: style.fill(),
            stroke: (style.stroke_width > 0.0).then(|| style.stroke()),
            stroke_width: style.stroke_width,
            dashed: style.dashed,
            opacity: alpha.clamp(0.0, 1.0),
        }
    }
}

impl From<&Element> for DrawStyle {
    fn from(element: &Element) -> Self {
        Self::from_style(element.style(), element.transform().alpha)
    }
}

/// A rendering target.
///
/// Paths arrive in canvas coordinates with rotation already applied. The
/// adapter decides how to map them onto its surface.
pub trait RenderAdapter {
    /// Fill and/or stroke a path.
    fn draw_shape(&mut self, path: &BezPath, style: &DrawStyle) -> RenderResult<()>;

    /// Show manipulation handles.
    fn place_handles(&mut self, handles: &[Handle]) -> RenderResult<()>;

    /// Draw text centered in `frame`. Adapters without text support skip it.
    fn draw_label(&mut self, _frame: Rect, _text: &str, _font_size: f64) -> RenderResult<()> {
        Ok(())
    }

    /// Draw a raster image placed by `transform`, optionally clipped.
    fn draw_image(
        &mut self,
        _transform: &Transform,
        _source: &str,
        _clip: Option<&BezPath>,
    ) -> RenderResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use komaink_core::elements::{Panel, SerializableColor};

    #[test]
    fn test_style_from_element() {
        let mut panel = Panel::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        panel.style.fill_color = Some(SerializableColor::new(255, 0, 0, 255));
        panel.transform.alpha = 1.5;
        let style = DrawStyle::from(&Element::Panel(panel));
        assert_eq!(style.fill, Some(Color::from_rgba8(255, 0, 0, 255)));
        assert!(style.stroke.is_some());
        assert!((style.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_width_has_no_stroke() {
        let style = ElementStyle {
            stroke_width: 0.0,
            ..ElementStyle::default()
        };
        assert!(DrawStyle::from_style(&style, 1.0).stroke.is_none());
    }
}
