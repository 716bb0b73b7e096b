//! Selection tool: picking, handle grabbing and cursor feedback.

use super::CursorStyle;
use crate::config::EditorConfig;
use crate::elements::{Element, ElementId, ElementKind};
use crate::manipulation::{hit_test_handles, HandleType};
use kurbo::Point;

/// What a pointer-down with the select tool landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerDownResult {
    /// Element to select, `None` for empty canvas.
    pub target: Option<ElementId>,
    /// Handle to start dragging.
    pub handle: Option<HandleType>,
}

// Lower tiers win: images, then everything else, then panels.
fn tier(kind: ElementKind) -> u8 {
    match kind {
        ElementKind::Image => 0,
        ElementKind::Panel => 2,
        _ => 1,
    }
}

/// The select tool.
#[derive(Debug, Clone)]
pub struct SelectTool {
    hit_tolerance: f64,
    handle_tolerance: f64,
    border_tolerance: f64,
    cursor: CursorStyle,
    dragging: Option<HandleType>,
}

impl SelectTool {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            hit_tolerance: config.hit_tolerance,
            handle_tolerance: config.handle_hit_tolerance,
            border_tolerance: config.border_tolerance,
            cursor: CursorStyle::Default,
            dragging: None,
        }
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// Element under `point`.
    ///
    /// Images beat other elements, which beat panels; within a tier the
    /// topmost wins. A hit near the border of an image that sits in a panel
    /// picks the panel instead.
    pub fn pick(&self, point: Point, elements: &[&Element]) -> Option<ElementId> {
        let hit = elements
            .iter()
            .filter(|el| el.hit_test(point, self.hit_tolerance))
            .min_by_key(|el| (tier(el.kind()), std::cmp::Reverse(el.z_index())))?;

        if let Some(image) = hit.as_image() {
            if image.is_near_border(point, self.border_tolerance) {
                if let Some(panel) = self.parent_panel(hit, elements) {
                    log::debug!("Border click on image {} selects panel {}", hit.id(), panel);
                    return Some(panel);
                }
            }
        }
        Some(hit.id())
    }

    // Declared parent if it still exists, else the topmost panel holding the
    // image center.
    fn parent_panel(&self, image: &Element, elements: &[&Element]) -> Option<ElementId> {
        let declared = image.as_image().and_then(|img| img.parent_panel);
        if let Some(id) = declared {
            if elements.iter().any(|el| el.id() == id) {
                return Some(id);
            }
        }
        let center = image.transform().center();
        elements
            .iter()
            .filter(|el| el.kind() == ElementKind::Panel && el.bounds().contains(center))
            .max_by_key(|el| el.z_index())
            .map(|el| el.id())
    }

    pub fn handle_pointer_down(
        &mut self,
        point: Point,
        elements: &[&Element],
        selected: Option<&Element>,
    ) -> PointerDownResult {
        if let Some(sel) = selected {
            if let Some(handle) = hit_test_handles(sel, point, self.handle_tolerance) {
                self.dragging = Some(handle);
                self.cursor = handle.cursor();
                return PointerDownResult {
                    target: Some(sel.id()),
                    handle: Some(handle),
                };
            }
        }
        let target = self.pick(point, elements);
        let handle = target.map(|_| HandleType::Move);
        self.dragging = handle;
        self.cursor = if target.is_some() {
            CursorStyle::Move
        } else {
            CursorStyle::Default
        };
        PointerDownResult { target, handle }
    }

    /// Recompute the cursor for a hover (or drag) position.
    pub fn handle_pointer_move(
        &mut self,
        point: Point,
        elements: &[&Element],
        selected: Option<&Element>,
    ) -> CursorStyle {
        self.cursor = if let Some(handle) = self.dragging {
            handle.cursor()
        } else if let Some(handle) =
            selected.and_then(|sel| hit_test_handles(sel, point, self.handle_tolerance))
        {
            handle.cursor()
        } else if self.pick(point, elements).is_some() {
            CursorStyle::Move
        } else {
            CursorStyle::Default
        };
        self.cursor
    }

    pub fn handle_pointer_up(&mut self) {
        self.dragging = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Bubble, BubbleKind, Image, Panel};
    use kurbo::Rect;

    fn with_z(mut el: Element, z: i32) -> Element {
        el.transform_mut().z_index = z;
        el
    }

    fn scene() -> (Element, Element, Element) {
        let panel = with_z(Element::Panel(Panel::new(Rect::new(0.0, 0.0, 400.0, 400.0))), 110);
        let image = with_z(
            Element::Image(Image::new(Rect::new(50.0, 50.0, 350.0, 350.0), "a.png").in_panel(panel.id())),
            410,
        );
        let bubble = with_z(
            Element::Dialogue(Bubble::new(Rect::new(100.0, 100.0, 250.0, 180.0), BubbleKind::Narration)),
            1010,
        );
        (panel, image, bubble)
    }

    #[test]
    fn test_image_beats_bubble_and_panel() {
        let (panel, image, bubble) = scene();
        let tool = SelectTool::new(&EditorConfig::default());
        let elements = [&panel, &image, &bubble];
        // Inside all three.
        assert_eq!(tool.pick(Point::new(175.0, 140.0), &elements), Some(image.id()));
        // Outside the image, inside the panel only.
        assert_eq!(tool.pick(Point::new(20.0, 20.0), &elements), Some(panel.id()));
        assert_eq!(tool.pick(Point::new(900.0, 900.0), &elements), None);
    }

    #[test]
    fn test_bubble_beats_panel() {
        let (panel, _, bubble) = scene();
        let tool = SelectTool::new(&EditorConfig::default());
        assert_eq!(
            tool.pick(Point::new(175.0, 140.0), &[&bubble, &panel]),
            Some(bubble.id())
        );
    }

    #[test]
    fn test_topmost_within_tier() {
        let low = with_z(Element::Panel(Panel::new(Rect::new(0.0, 0.0, 100.0, 100.0))), 110);
        let high = with_z(Element::Panel(Panel::new(Rect::new(50.0, 50.0, 150.0, 150.0))), 111);
        let tool = SelectTool::new(&EditorConfig::default());
        assert_eq!(tool.pick(Point::new(75.0, 75.0), &[&low, &high]), Some(high.id()));
    }

    #[test]
    fn test_image_border_selects_panel() {
        let (panel, image, _) = scene();
        let tool = SelectTool::new(&EditorConfig::default());
        let elements = [&panel, &image];
        assert_eq!(tool.pick(Point::new(52.0, 200.0), &elements), Some(panel.id()));
        assert_eq!(tool.pick(Point::new(200.0, 200.0), &elements), Some(image.id()));
    }

    #[test]
    fn test_image_border_falls_back_to_enclosing_panel() {
        let panel = with_z(Element::Panel(Panel::new(Rect::new(0.0, 0.0, 400.0, 400.0))), 110);
        let image = with_z(
            Element::Image(Image::new(Rect::new(50.0, 50.0, 350.0, 350.0), "a.png")),
            410,
        );
        let tool = SelectTool::new(&EditorConfig::default());
        assert_eq!(tool.pick(Point::new(52.0, 200.0), &[&panel, &image]), Some(panel.id()));
        // Without a panel the image itself is picked.
        assert_eq!(tool.pick(Point::new(52.0, 200.0), &[&image]), Some(image.id()));
    }

    #[test]
    fn test_pointer_down_on_handle() {
        let (panel, _, _) = scene();
        let mut tool = SelectTool::new(&EditorConfig::default());
        let result = tool.handle_pointer_down(Point::new(399.0, 399.0), &[&panel], Some(&panel));
        assert_eq!(result.handle, Some(HandleType::CornerSe));
        assert_eq!(tool.cursor(), CursorStyle::NwseResize);
        assert!(tool.is_dragging());
        tool.handle_pointer_up();
        assert!(!tool.is_dragging());
    }

    #[test]
    fn test_cursor_feedback() {
        let (panel, _, _) = scene();
        let mut tool = SelectTool::new(&EditorConfig::default());
        let els = [&panel];
        assert_eq!(
            tool.handle_pointer_move(Point::new(200.0, 0.0), &els, Some(&panel)),
            CursorStyle::NsResize
        );
        assert_eq!(
            tool.handle_pointer_move(Point::new(200.0, 200.0), &els, Some(&panel)),
            CursorStyle::Move
        );
        assert_eq!(
            tool.handle_pointer_move(Point::new(600.0, 600.0), &els, Some(&panel)),
            CursorStyle::Default
        );
        // While dragging the cursor sticks to the handle.
        tool.handle_pointer_down(Point::new(0.0, 200.0), &els, Some(&panel));
        assert_eq!(
            tool.handle_pointer_move(Point::new(600.0, 600.0), &els, Some(&panel)),
            CursorStyle::EwResize
        );
    }

    #[test]
    fn test_pointer_down_on_empty() {
        let mut tool = SelectTool::new(&EditorConfig::default());
        let result = tool.handle_pointer_down(Point::new(5.0, 5.0), &[], None);
        assert_eq!(result, PointerDownResult::default());
        assert!(!tool.is_dragging());
    }
}
