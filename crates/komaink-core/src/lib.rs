//! KomaInk Core Library
//!
//! Platform-agnostic geometry, layering and manipulation logic for the
//! KomaInk manga page editor.

pub mod config;
pub mod coords;
pub mod document;
pub mod elements;
pub mod geometry;
pub mod input;
pub mod layers;
pub mod manipulation;
pub mod session;
pub mod tools;

pub use config::{ConfigError, EditorConfig};
pub use coords::{CanvasTransform, CoordinateError, CoordinateSystem, ViewportInfo};
pub use document::PageDocument;
pub use elements::{Element, ElementId, ElementKind, ElementUpdate, Transform};
pub use geometry::{AttachmentSide, TailConfig, TailStyle};
pub use input::{Key, Modifiers, PointerEvent};
pub use layers::{ConflictReport, LayerManager, LayerType, Priority};
pub use manipulation::{Handle, HandleType, ManipulationError, ManipulationState, Manipulator};
pub use session::{EditorEvent, EditorSession};
pub use tools::{CursorStyle, ToolKind, ToolManager};
