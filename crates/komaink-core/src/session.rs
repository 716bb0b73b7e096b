//! Editor session: routes input to tools and manipulators and owns the page.

use crate::config::EditorConfig;
use crate::coords::{CanvasTransform, CoordinateSystem, ViewportInfo};
use crate::document::PageDocument;
use crate::elements::{BubbleKind, Element, ElementId, ElementKind, ElementUpdate};
use crate::input::{Key, Modifiers, MouseButton, PointerEvent};
use crate::layers::{LayerManager, LayerType, Priority};
use crate::manipulation::{handles_for, Handle, Manipulator};
use crate::tools::{CursorStyle, ToolKind, ToolManager};
use kurbo::{Point, Rect, Size};
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Zoom factor per wheel notch.
const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Notifications for the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ElementCreated { id: ElementId, kind: ElementKind },
    ElementUpdated { id: ElementId, update: ElementUpdate },
    ElementRemoved { id: ElementId },
    SelectionChanged { selected: Option<ElementId> },
    ModeChanged { tool: ToolKind },
    CursorChanged { cursor: CursorStyle },
}

/// One editing session over a page.
///
/// Events are collected and must be polled via [`EditorSession::poll_events`].
pub struct EditorSession {
    config: EditorConfig,
    document: PageDocument,
    layers: LayerManager,
    coords: CoordinateSystem,
    tools: ToolManager,
    manipulator: Manipulator,
    selection: Option<ElementId>,
    cursor: CursorStyle,
    /// Set while a drag has not yet recorded its undo state.
    undo_pending: bool,
    /// Set once the current drag has changed the page.
    drag_changed: bool,
    event_tx: Sender<EditorEvent>,
    event_rx: Receiver<EditorEvent>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        let document = PageDocument::new(config.page_size);
        Self::from_document(config, document)
    }

    /// Open an existing page. Z-indices are re-registered in stacking order.
    pub fn from_document(config: EditorConfig, document: PageDocument) -> Self {
        let page_size = document.page_size;
        let coords = CoordinateSystem::new(
            CanvasTransform::default(),
            ViewportInfo::new(
                Point::new(page_size.width / 2.0, page_size.height / 2.0),
                page_size,
            ),
        )
        .with_scale_limits(config.min_scale, config.max_scale);
        let (event_tx, event_rx) = channel();
        let mut session = Self {
            tools: ToolManager::new(&config),
            manipulator: Manipulator::new(&config),
            config,
            document,
            layers: LayerManager::new(),
            coords,
            selection: None,
            cursor: CursorStyle::Default,
            undo_pending: false,
            drag_changed: false,
            event_tx,
            event_rx,
        };
        session.sync_layers();
        session
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &PageDocument {
        &self.document
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    pub fn coords(&self) -> &CoordinateSystem {
        &self.coords
    }

    pub fn coords_mut(&mut self) -> &mut CoordinateSystem {
        &mut self.coords
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn manipulator(&self) -> &Manipulator {
        &self.manipulator
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selection.and_then(|id| self.document.get(id))
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    /// Handles of the selected element, in canvas coordinates.
    pub fn handles(&self) -> Vec<Handle> {
        self.selected_element().map(handles_for).unwrap_or_default()
    }

    /// Drain pending events.
    pub fn poll_events(&mut self) -> Vec<EditorEvent> {
        self.event_rx.try_iter().collect()
    }

    fn emit(&self, event: EditorEvent) {
        // The receiver lives in `self`, so sending cannot fail.
        let _ = self.event_tx.send(event);
    }

    /// Resize the host viewport; the page stays centered.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.coords.viewport = ViewportInfo::from_viewport_size(size, self.document.page_size);
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.manipulator.is_active() {
            self.cancel_manipulation();
        }
        if self.tools.set_tool(tool) {
            self.emit(EditorEvent::ModeChanged { tool });
            let cursor = if tool == ToolKind::Select {
                CursorStyle::Default
            } else {
                CursorStyle::Crosshair
            };
            self.set_cursor(cursor);
        }
    }

    /// Flavor of the next bubble the Bubble tool creates.
    pub fn set_bubble_kind(&mut self, kind: BubbleKind) {
        self.tools.creation.bubble_kind = kind;
    }

    pub fn select(&mut self, selected: Option<ElementId>) {
        let selected = selected.filter(|id| self.document.contains(*id));
        if selected != self.selection {
            self.selection = selected;
            self.emit(EditorEvent::SelectionChanged { selected });
        }
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        if cursor != self.cursor {
            self.cursor = cursor;
            self.emit(EditorEvent::CursorChanged { cursor });
        }
    }

    // ---- input (DOM space) ----

    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => {
                if button == MouseButton::Left {
                    self.pointer_down(position, modifiers);
                }
            }
            PointerEvent::Move {
                position,
                modifiers,
            } => self.pointer_move(position, modifiers),
            PointerEvent::Up { position, button } => {
                if button == MouseButton::Left {
                    self.pointer_up(position);
                }
            }
            PointerEvent::Scroll { position, delta } => {
                let factor = if delta.y < 0.0 {
                    WHEEL_ZOOM_STEP
                } else {
                    1.0 / WHEEL_ZOOM_STEP
                };
                self.coords.zoom_at(position, factor);
            }
        }
    }

    pub fn pointer_down(&mut self, dom: Point, modifiers: Modifiers) {
        let point = self.coords.dom_to_canvas(dom);
        self.canvas_pointer_down(point, modifiers);
    }

    pub fn pointer_move(&mut self, dom: Point, modifiers: Modifiers) {
        let point = self.coords.dom_to_canvas(dom);
        self.canvas_pointer_move(point, modifiers);
    }

    pub fn pointer_up(&mut self, dom: Point) {
        let point = self.coords.dom_to_canvas(dom);
        self.canvas_pointer_up(point);
    }

    pub fn key_down(&mut self, key: &Key) {
        match key {
            Key::Escape => self.cancel(),
            k if k.is_delete() => {
                if self.manipulator.is_active() || self.tools.is_creating() {
                    return;
                }
                if let Some(id) = self.selection {
                    self.remove_element(id);
                }
            }
            _ => {}
        }
    }

    // ---- input (canvas space) ----

    pub fn canvas_pointer_down(&mut self, point: Point, _modifiers: Modifiers) {
        if self.tools.current_tool() != ToolKind::Select {
            self.tools.creation.start_creation(point);
            return;
        }
        if self.manipulator.is_active() {
            // A second press while dragging is ignored.
            return;
        }

        let elements = self.document.elements_by_z();
        let selected = self.selection.and_then(|id| self.document.get(id));
        let result = self.tools.select.handle_pointer_down(point, &elements, selected);
        let started = match (result.target, result.handle) {
            (Some(id), Some(handle)) => self
                .document
                .get(id)
                .map(|el| self.manipulator.start(el, handle, point)),
            _ => None,
        };
        if let Some(Err(err)) = started {
            log::warn!("Could not start manipulation: {err}");
        }
        self.undo_pending = self.manipulator.is_active();
        self.drag_changed = false;
        let cursor = self.tools.select.cursor();
        self.select(result.target);
        self.set_cursor(cursor);
    }

    pub fn canvas_pointer_move(&mut self, point: Point, modifiers: Modifiers) {
        if self.tools.current_tool() != ToolKind::Select {
            self.tools.creation.update_creation(point);
            return;
        }

        if let Some(id) = self.manipulator.active_element() {
            let update = self
                .manipulator
                .update(point, self.document.get(id), modifiers);
            if let Some(update) = update {
                if self.undo_pending {
                    self.document.push_undo();
                    self.undo_pending = false;
                }
                self.drag_changed = true;
                self.document.apply_update(id, &update);
                self.emit(EditorEvent::ElementUpdated { id, update });
            }
        }

        let elements = self.document.elements_by_z();
        let selected = self.selection.and_then(|id| self.document.get(id));
        let cursor = self
            .tools
            .select
            .handle_pointer_move(point, &elements, selected);
        self.set_cursor(cursor);
    }

    pub fn canvas_pointer_up(&mut self, point: Point) {
        if self.tools.current_tool() != ToolKind::Select {
            let existing = self.document.elements_by_z();
            let created = self.tools.creation.finish_creation(point, &existing);
            if let Some(element) = created {
                let id = self.add_element(element);
                self.select(Some(id));
            }
            return;
        }
        self.manipulator.end();
        self.tools.select.handle_pointer_up();
        self.undo_pending = false;
        self.drag_changed = false;
    }

    /// Abort any creation or manipulation in progress.
    pub fn cancel(&mut self) {
        self.tools.cancel();
        self.cancel_manipulation();
    }

    fn cancel_manipulation(&mut self) {
        let Some((id, update)) = self.manipulator.cancel() else {
            return;
        };
        self.tools.select.handle_pointer_up();
        if self.drag_changed {
            self.document.apply_update(id, &update);
            self.document.discard_last_undo();
            self.emit(EditorEvent::ElementUpdated { id, update });
        }
        self.undo_pending = false;
        self.drag_changed = false;
        log::debug!("Manipulation of {id} cancelled");
    }

    // ---- element operations ----

    /// Add an element, assigning its z-index from its layer.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        self.document.push_undo();
        let id = element.id();
        let kind = element.kind();
        let z_index = self
            .layers
            .assign_z_index(id, LayerType::for_kind(kind), Priority::Normal);
        element.transform_mut().z_index = z_index;
        self.document.add(element);
        log::debug!("Created {kind:?} {id} at z-index {z_index}");
        self.emit(EditorEvent::ElementCreated { id, kind });
        // Allocation may have renumbered the layer.
        self.publish_z_indices();
        id
    }

    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        if !self.document.contains(id) {
            return None;
        }
        if self.manipulator.active_element() == Some(id) {
            self.manipulator.end();
            self.tools.select.handle_pointer_up();
        }
        self.document.push_undo();
        let removed = self.document.remove(id);
        self.layers.release_z_index(id);
        if self.selection == Some(id) {
            self.select(None);
        }
        self.emit(EditorEvent::ElementRemoved { id });
        removed
    }

    /// Apply a programmatic update. Returns false for unknown ids.
    pub fn update_element(&mut self, id: ElementId, update: ElementUpdate) -> bool {
        if !self.document.contains(id) || update.is_empty() {
            return false;
        }
        self.document.push_undo();
        self.document.apply_update(id, &update);
        self.emit(EditorEvent::ElementUpdated { id, update });
        true
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> bool {
        self.update_element(id, ElementUpdate::text(text))
    }

    /// Raise an element above the others in its layer.
    pub fn bring_to_front(&mut self, id: ElementId) -> Option<i32> {
        self.restack(id, LayerManager::bring_to_front)
    }

    /// Lower an element below the others in its layer.
    pub fn send_to_back(&mut self, id: ElementId) -> Option<i32> {
        self.restack(id, LayerManager::send_to_back)
    }

    fn restack(
        &mut self,
        id: ElementId,
        op: fn(&mut LayerManager, ElementId) -> Option<i32>,
    ) -> Option<i32> {
        self.document.get(id)?;
        self.layers.registration(id)?;
        self.document.push_undo();
        let z_index = op(&mut self.layers, id)?;
        if self.publish_z_indices() == 0 {
            self.document.discard_last_undo();
        }
        Some(z_index)
    }

    /// Settle registry conflicts and copy every z-index onto the page,
    /// emitting an update per changed element. Returns the number changed.
    fn publish_z_indices(&mut self) -> usize {
        let report = self.layers.resolve_conflicts();
        if report.found > 0 {
            log::warn!("Resolved {} z-index conflicts", report.found);
        }
        let mut changed = 0;
        for id in self.document.ids().to_vec() {
            let Some(z_index) = self.layers.z_index_of(id) else {
                continue;
            };
            let Some(el) = self.document.get_mut(id) else {
                continue;
            };
            if el.z_index() == z_index {
                continue;
            }
            el.transform_mut().z_index = z_index;
            let update = ElementUpdate::transform(*el.transform());
            self.emit(EditorEvent::ElementUpdated { id, update });
            changed += 1;
        }
        changed
    }

    pub fn undo(&mut self) -> bool {
        self.restore_with(PageDocument::undo)
    }

    pub fn redo(&mut self) -> bool {
        self.restore_with(PageDocument::redo)
    }

    fn restore_with(&mut self, op: fn(&mut PageDocument) -> bool) -> bool {
        self.cancel();
        if !op(&mut self.document) {
            return false;
        }
        self.sync_layers();
        if let Some(id) = self.selection {
            if !self.document.contains(id) {
                self.select(None);
            }
        }
        true
    }

    /// Rebuild the layer registry from the page, keeping stacking order and
    /// known priorities.
    fn sync_layers(&mut self) {
        let priorities: HashMap<ElementId, Priority> = self
            .document
            .ids()
            .iter()
            .filter_map(|&id| self.layers.registration(id).map(|r| (id, r.priority)))
            .collect();
        self.layers.clear();

        let ordered: Vec<(ElementId, ElementKind)> = self
            .document
            .elements_by_z()
            .iter()
            .map(|el| (el.id(), el.kind()))
            .collect();
        for (id, kind) in ordered {
            let priority = priorities.get(&id).copied().unwrap_or_default();
            let z_index = self
                .layers
                .assign_z_index(id, LayerType::for_kind(kind), priority);
            if let Some(el) = self.document.get_mut(id) {
                el.transform_mut().z_index = z_index;
            }
        }
        self.publish_z_indices();
    }

    /// Drop layer registrations of elements that no longer exist.
    pub fn cleanup_layers(&mut self) -> usize {
        let document = &self.document;
        self.layers.cleanup(|id| document.contains(*id))
    }

    /// Visible page area in canvas units.
    pub fn page_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.document.page_size)
    }

    /// Consume the session, returning the page.
    pub fn into_document(mut self) -> PageDocument {
        self.layers.clear();
        self.document
    }
}
