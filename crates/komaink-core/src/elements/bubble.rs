//! Dialogue bubbles.

use super::{ElementId, ElementKind, ElementStyle, ElementTrait, Transform};
use crate::geometry::{attachment_point, unified_bubble_path, OutlineKind, TailConfig, TailStyle};
use kurbo::{BezPath, Point, Rect, Shape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bubble flavor. Picks the default outline and tail style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BubbleKind {
    #[default]
    Speech,
    Thought,
    Shout,
    Whisper,
    Narration,
}

impl BubbleKind {
    pub fn outline(self) -> OutlineKind {
        match self {
            BubbleKind::Speech | BubbleKind::Whisper => OutlineKind::Ellipse,
            BubbleKind::Thought => OutlineKind::Cloud { bumps: 10 },
            BubbleKind::Shout => OutlineKind::SHOUT,
            BubbleKind::Narration => OutlineKind::RoundedRect { radius: 6.0 },
        }
    }

    /// Tail a fresh bubble of this kind starts with. Narration boxes have none.
    pub fn default_tail(self) -> Option<TailConfig> {
        let style = match self {
            BubbleKind::Speech | BubbleKind::Shout => TailStyle::Straight,
            BubbleKind::Whisper => TailStyle::Curved,
            BubbleKind::Thought => TailStyle::Bubbles,
            BubbleKind::Narration => return None,
        };
        Some(TailConfig::default().with_style(style))
    }
}

/// A dialogue bubble: outline, optional tail and text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub(crate) id: ElementId,
    pub transform: Transform,
    pub kind: BubbleKind,
    pub outline: OutlineKind,
    #[serde(default)]
    pub tail: Option<TailConfig>,
    #[serde(default)]
    pub text: String,
    pub font_size: f64,
    pub style: ElementStyle,
}

impl Bubble {
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;

    pub fn new(rect: Rect, kind: BubbleKind) -> Self {
        let mut bubble = Self {
            id: Uuid::new_v4(),
            transform: Transform::from_rect(rect),
            kind,
            outline: kind.outline(),
            tail: kind.default_tail(),
            text: String::new(),
            font_size: Self::DEFAULT_FONT_SIZE,
            style: ElementStyle {
                dashed: kind == BubbleKind::Whisper,
                ..ElementStyle::default()
            },
        };
        bubble.refresh_attachment();
        bubble
    }

    pub fn with_tail(mut self, tail: Option<TailConfig>) -> Self {
        self.tail = tail;
        self.refresh_attachment();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn center(&self) -> Point {
        self.transform.center()
    }

    /// Where the tail meets the outline, in canvas coordinates.
    pub fn attachment_point(&self) -> Option<Point> {
        let tail = self.tail.as_ref()?;
        let local = attachment_point(&self.outline, self.transform.rect(), tail.angle_radians());
        Some(self.transform.rotation_affine() * local)
    }

    /// Tail tip in canvas coordinates.
    pub fn tail_tip(&self) -> Option<Point> {
        let tail = self.tail.as_ref()?;
        let local_attach =
            attachment_point(&self.outline, self.transform.rect(), tail.angle_radians());
        Some(self.transform.rotation_affine() * tail.tip(local_attach))
    }

    /// Recompute the cached attachment offset of the tail.
    pub fn refresh_attachment(&mut self) {
        let center = self.transform.center();
        let rect = self.transform.rect();
        if let Some(tail) = self.tail.as_mut() {
            let attach = attachment_point(&self.outline, rect, tail.angle_radians());
            tail.attachment_offset = attach - center;
        }
    }

    fn local_path(&self) -> BezPath {
        unified_bubble_path(&self.outline, self.transform.rect(), self.tail.as_ref())
    }
}

impl ElementTrait for Bubble {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Dialogue
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
        self.transform.rotation_affine() * self.local_path()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = self.transform.to_local(point);
        self.transform
            .rect()
            .inflate(tolerance, tolerance)
            .contains(local)
            || self.local_path().contains(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::elliptical_attachment;

    #[test]
    fn test_speech_bubble_center_and_tail() {
        let mut bubble = Bubble::new(Rect::new(100.0, 100.0, 250.0, 180.0), BubbleKind::Speech);
        assert_eq!(bubble.center(), Point::new(175.0, 140.0));

        bubble.tail = Some(TailConfig::new(225.0, 40.0));
        let attach = bubble.attachment_point().unwrap();
        let expected = elliptical_attachment(
            Point::new(175.0, 140.0),
            150.0,
            80.0,
            225f64.to_radians(),
        );
        assert!(attach.distance(expected) < 1e-9);

        let tip = bubble.tail_tip().unwrap();
        let (sin, cos) = 225f64.to_radians().sin_cos();
        assert!((tip.x - (attach.x + cos * 40.0)).abs() < 1e-9);
        assert!((tip.y - (attach.y + sin * 40.0)).abs() < 1e-9);
        assert!(tip.x < attach.x && tip.y < attach.y);
    }

    #[test]
    fn test_kind_defaults() {
        let narration = Bubble::new(Rect::new(0.0, 0.0, 100.0, 60.0), BubbleKind::Narration);
        assert!(narration.tail.is_none());
        assert!(narration.attachment_point().is_none());

        let thought = Bubble::new(Rect::new(0.0, 0.0, 100.0, 60.0), BubbleKind::Thought);
        assert_eq!(thought.tail.map(|t| t.style), Some(TailStyle::Bubbles));
        assert!(matches!(thought.outline, OutlineKind::Cloud { .. }));

        let whisper = Bubble::new(Rect::new(0.0, 0.0, 100.0, 60.0), BubbleKind::Whisper);
        assert!(whisper.style.dashed);
    }

    #[test]
    fn test_hit_test_includes_tail() {
        let bubble = Bubble::new(Rect::new(0.0, 0.0, 150.0, 80.0), BubbleKind::Speech)
            .with_tail(Some(TailConfig::new(90.0, 60.0)));
        // Inside the tail, below the box.
        assert!(bubble.hit_test(Point::new(75.0, 95.0), 0.0));
        assert!(!bubble.hit_test(Point::new(10.0, 120.0), 0.0));
    }

    #[test]
    fn test_refresh_attachment_offset() {
        let bubble = Bubble::new(Rect::new(0.0, 0.0, 150.0, 80.0), BubbleKind::Speech);
        let tail = bubble.tail.unwrap();
        // Default tail points down.
        assert!(tail.attachment_offset.x.abs() < 1e-9);
        assert!((tail.attachment_offset.y - 40.0).abs() < 1e-9);
    }
}
