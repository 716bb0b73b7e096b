//! Creation tools for panels, bubbles and text.

use super::{ToolKind, ToolState};
use crate::config::{DefaultSizes, EditorConfig, KindConstraints};
use crate::elements::{Bubble, BubbleKind, Element, ElementKind, Panel, TextBox};
use kurbo::{Point, Rect, Size, Vec2};

/// Whether two rectangles overlap with a non-empty intersection.
pub fn aabb_overlap(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// Drag-to-create tool.
///
/// A click (drag shorter than the click threshold) still creates an element
/// with the default size, its top-left corner at the click point.
#[derive(Debug, Clone)]
pub struct CreationTool {
    tool: ToolKind,
    /// Flavor used by the bubble tool.
    pub bubble_kind: BubbleKind,
    state: ToolState,
    click_threshold: f64,
    collision_offset: f64,
    default_sizes: DefaultSizes,
    constraints: KindConstraints,
}

impl CreationTool {
    pub fn new(tool: ToolKind, config: &EditorConfig) -> Self {
        Self {
            tool,
            bubble_kind: BubbleKind::Speech,
            state: ToolState::Idle,
            click_threshold: config.click_threshold,
            collision_offset: config.collision_offset,
            default_sizes: config.default_sizes.clone(),
            constraints: config.constraints.clone(),
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub(super) fn set_tool(&mut self, tool: ToolKind) {
        self.state = ToolState::Idle;
        self.tool = tool;
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    pub fn start_creation(&mut self, point: Point) {
        self.state = ToolState::Active {
            start: point,
            current: point,
        };
    }

    /// Track the pointer. Returns the preview rectangle.
    pub fn update_creation(&mut self, point: Point) -> Option<Rect> {
        let ToolState::Active { start, current } = &mut self.state else {
            return None;
        };
        *current = point;
        let start = *start;
        Some(self.creation_rect(start, point))
    }

    /// Complete the drag at `point` and build the new element.
    ///
    /// `existing` is checked for same-kind overlaps; a colliding element is
    /// nudged once by the collision offset.
    pub fn finish_creation(&mut self, point: Point, existing: &[&Element]) -> Option<Element> {
        let ToolState::Active { start, .. } = std::mem::take(&mut self.state) else {
            return None;
        };
        let kind = self.tool.creates()?;
        let rect = self.creation_rect(start, point);
        let rect = self.avoid_collision(rect, kind, existing);
        Some(self.build(kind, rect))
    }

    pub fn cancel(&mut self) {
        if self.is_active() {
            log::debug!("Creation cancelled");
        }
        self.state = ToolState::Idle;
    }

    fn default_size(&self, kind: ElementKind) -> Size {
        match kind {
            ElementKind::Panel => self.default_sizes.panel,
            ElementKind::Text => self.default_sizes.text,
            _ => self.default_sizes.bubble,
        }
    }

    /// Rectangle for a drag from `start` to `end`, clamped to the kind's
    /// size constraints.
    pub fn creation_rect(&self, start: Point, end: Point) -> Rect {
        let Some(kind) = self.tool.creates() else {
            return Rect::from_points(start, end);
        };
        if start.distance(end) < self.click_threshold {
            return Rect::from_origin_size(start, self.default_size(kind));
        }
        let rect = Rect::from_points(start, end);
        let c = self.constraints.for_kind(kind);
        Rect::from_origin_size(
            rect.origin(),
            Size::new(c.clamp_width(rect.width()), c.clamp_height(rect.height())),
        )
    }

    fn avoid_collision(&self, rect: Rect, kind: ElementKind, existing: &[&Element]) -> Rect {
        let collides = existing
            .iter()
            .any(|el| el.kind() == kind && aabb_overlap(rect, el.bounds()));
        if !collides {
            return rect;
        }
        let offset = Vec2::new(self.collision_offset, self.collision_offset);
        log::warn!(
            "New {:?} overlaps an existing one at {:?}, moving it by {:?}",
            kind,
            rect.origin(),
            offset
        );
        rect + offset
    }

    fn build(&self, kind: ElementKind, rect: Rect) -> Element {
        match kind {
            ElementKind::Panel => Element::Panel(Panel::new(rect)),
            ElementKind::Text => Element::Text(TextBox::new(rect, "")),
            _ => Element::Dialogue(Bubble::new(rect, self.bubble_kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(kind: ToolKind) -> CreationTool {
        CreationTool::new(kind, &EditorConfig::default())
    }

    fn click(tool: &mut CreationTool, p: Point, existing: &[&Element]) -> Element {
        tool.start_creation(p);
        tool.finish_creation(p, existing).unwrap()
    }

    #[test]
    fn test_click_creates_default_bubble() {
        let mut t = tool(ToolKind::Bubble);
        let el = click(&mut t, Point::new(100.0, 100.0), &[]);
        let tr = el.transform();
        assert_eq!((tr.width, tr.height), (150.0, 80.0));
        assert_eq!(tr.center(), Point::new(175.0, 140.0));
        assert!(!t.is_active());
    }

    #[test]
    fn test_default_sizes_per_tool() {
        let mut panel = tool(ToolKind::Panel);
        let p = click(&mut panel, Point::ZERO, &[]);
        assert_eq!((p.transform().width, p.transform().height), (300.0, 200.0));
        let mut text = tool(ToolKind::Text);
        let t = click(&mut text, Point::ZERO, &[]);
        assert_eq!((t.transform().width, t.transform().height), (200.0, 50.0));
        assert_eq!(t.kind(), ElementKind::Text);
    }

    #[test]
    fn test_small_drag_is_click() {
        let mut t = tool(ToolKind::Panel);
        t.start_creation(Point::new(10.0, 10.0));
        let el = t.finish_creation(Point::new(13.0, 13.0), &[]).unwrap();
        assert_eq!(el.transform().rect(), Rect::new(10.0, 10.0, 310.0, 210.0));
    }

    #[test]
    fn test_drag_rect_clamped_to_minimum() {
        let mut t = tool(ToolKind::Bubble);
        t.start_creation(Point::new(50.0, 50.0));
        let preview = t.update_creation(Point::new(30.0, 45.0)).unwrap();
        // Drag toward the top-left normalizes, then grows to 60x40.
        assert_eq!(preview, Rect::new(30.0, 45.0, 90.0, 85.0));
        let el = t.finish_creation(Point::new(30.0, 45.0), &[]).unwrap();
        assert_eq!(el.transform().rect(), preview);
    }

    #[test]
    fn test_collision_nudges_once() {
        let mut t = tool(ToolKind::Panel);
        let existing = Element::Panel(Panel::new(Rect::new(0.0, 0.0, 300.0, 200.0)));
        let second = Element::Panel(Panel::new(Rect::new(10.0, 10.0, 310.0, 210.0)));
        let el = click(&mut t, Point::ZERO, &[&existing, &second]);
        assert_eq!(el.transform().x, 10.0);
        assert_eq!(el.transform().y, 10.0);
    }

    #[test]
    fn test_other_kinds_do_not_collide() {
        let mut t = tool(ToolKind::Bubble);
        let panel = Element::Panel(Panel::new(Rect::new(0.0, 0.0, 300.0, 200.0)));
        let el = click(&mut t, Point::new(20.0, 20.0), &[&panel]);
        assert_eq!(el.transform().x, 20.0);
    }

    #[test]
    fn test_finish_without_start() {
        let mut t = tool(ToolKind::Panel);
        assert!(t.finish_creation(Point::ZERO, &[]).is_none());
        assert!(t.update_creation(Point::ZERO).is_none());
    }

    #[test]
    fn test_cancel() {
        let mut t = tool(ToolKind::Panel);
        t.start_creation(Point::ZERO);
        t.cancel();
        assert!(t.finish_creation(Point::new(100.0, 100.0), &[]).is_none());
    }

    #[test]
    fn test_aabb_touching_is_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!aabb_overlap(a, Rect::new(10.0, 0.0, 20.0, 10.0)));
        assert!(aabb_overlap(a, Rect::new(9.0, 9.0, 20.0, 20.0)));
    }
}
