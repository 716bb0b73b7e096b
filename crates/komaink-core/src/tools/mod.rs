//! Tool system for the page editor.

mod creation;
mod select;

pub use creation::{aabb_overlap, CreationTool};
pub use select::{PointerDownResult, SelectTool};

use crate::config::EditorConfig;
use crate::elements::ElementKind;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Panel,
    Bubble,
    Text,
}

impl ToolKind {
    /// Element kind a creation tool produces. `None` for Select.
    pub fn creates(self) -> Option<ElementKind> {
        match self {
            ToolKind::Select => None,
            ToolKind::Panel => Some(ElementKind::Panel),
            ToolKind::Bubble => Some(ElementKind::Dialogue),
            ToolKind::Text => Some(ElementKind::Text),
        }
    }
}

/// Pointer cursor requested by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Move,
    NwseResize,
    NeswResize,
    NsResize,
    EwResize,
    Crosshair,
    Grab,
}

impl CursorStyle {
    /// CSS cursor name.
    pub fn css_name(self) -> &'static str {
        match self {
            CursorStyle::Default => "default",
            CursorStyle::Move => "move",
            CursorStyle::NwseResize => "nwse-resize",
            CursorStyle::NeswResize => "nesw-resize",
            CursorStyle::NsResize => "ns-resize",
            CursorStyle::EwResize => "ew-resize",
            CursorStyle::Crosshair => "crosshair",
            CursorStyle::Grab => "grab",
        }
    }
}

/// State of a drag interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ToolState {
    #[default]
    Idle,
    Active {
        start: Point,
        current: Point,
    },
}

impl ToolState {
    /// Rectangle spanned by the drag so far.
    pub fn drag_rect(&self) -> Option<Rect> {
        match *self {
            ToolState::Idle => None,
            ToolState::Active { start, current } => Some(Rect::from_points(start, current)),
        }
    }
}

/// Manages the current tool and its state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    current_tool: ToolKind,
    pub creation: CreationTool,
    pub select: SelectTool,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl ToolManager {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            current_tool: ToolKind::Select,
            creation: CreationTool::new(ToolKind::Panel, config),
            select: SelectTool::new(config),
        }
    }

    pub fn current_tool(&self) -> ToolKind {
        self.current_tool
    }

    /// Switch tools, dropping any creation in progress. Returns whether the
    /// tool changed.
    pub fn set_tool(&mut self, tool: ToolKind) -> bool {
        if tool == self.current_tool {
            return false;
        }
        self.cancel();
        self.current_tool = tool;
        if tool.creates().is_some() {
            self.creation.set_tool(tool);
        }
        log::debug!("Tool changed to {:?}", tool);
        true
    }

    pub fn is_creating(&self) -> bool {
        self.current_tool != ToolKind::Select && self.creation.is_active()
    }

    pub fn cancel(&mut self) {
        self.creation.cancel();
        self.select.handle_pointer_up();
    }
}
