//! Manipulation handles and the drag state machine.

use crate::config::{EditorConfig, KindConstraints, SizeConstraints};
use crate::elements::{Element, ElementId, ElementKind, ElementUpdate, Transform};
use crate::geometry::{attachment_point, normalize_angle, TailConfig};
use crate::input::Modifiers;
use crate::tools::CursorStyle;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distance from the top edge to the rotation handle.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;
/// Rotation step used while Shift is held, in degrees.
pub const ROTATION_SNAP_DEGREES: f64 = 15.0;

/// Manipulation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManipulationError {
    #[error("A manipulation of element {0} is already in progress")]
    AlreadyActive(ElementId),
    #[error("Handle {handle:?} does not apply to {kind:?} elements")]
    UnsupportedHandle { handle: HandleType, kind: ElementKind },
}

/// Manipulation anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleType {
    CornerNw,
    CornerNe,
    CornerSw,
    CornerSe,
    EdgeN,
    EdgeE,
    EdgeS,
    EdgeW,
    /// Drag of the element body.
    Move,
    /// Bubble tail tip.
    Tail,
    Rotate,
}

/// Which edges of the box follow the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResizeRule {
    left: bool,
    right: bool,
    top: bool,
    bottom: bool,
}

impl HandleType {
    pub const RESIZE: [HandleType; 8] = [
        HandleType::CornerNw,
        HandleType::CornerNe,
        HandleType::CornerSw,
        HandleType::CornerSe,
        HandleType::EdgeN,
        HandleType::EdgeE,
        HandleType::EdgeS,
        HandleType::EdgeW,
    ];

    pub fn is_resize(self) -> bool {
        self.resize_rule().is_some()
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            HandleType::CornerNw | HandleType::CornerNe | HandleType::CornerSw | HandleType::CornerSe
        )
    }

    fn resize_rule(self) -> Option<ResizeRule> {
        let (left, right, top, bottom) = match self {
            HandleType::CornerNw => (true, false, true, false),
            HandleType::CornerNe => (false, true, true, false),
            HandleType::CornerSw => (true, false, false, true),
            HandleType::CornerSe => (false, true, false, true),
            HandleType::EdgeN => (false, false, true, false),
            HandleType::EdgeE => (false, true, false, false),
            HandleType::EdgeS => (false, false, false, true),
            HandleType::EdgeW => (true, false, false, false),
            HandleType::Move | HandleType::Tail | HandleType::Rotate => return None,
        };
        Some(ResizeRule {
            left,
            right,
            top,
            bottom,
        })
    }

    /// Position of the handle relative to the box, in `[-1, 1]` per axis.
    fn unit_offset(self) -> Option<Vec2> {
        let rule = self.resize_rule()?;
        let axis = |neg: bool, pos: bool| {
            if neg {
                -1.0
            } else if pos {
                1.0
            } else {
                0.0
            }
        };
        Some(Vec2::new(
            axis(rule.left, rule.right),
            axis(rule.top, rule.bottom),
        ))
    }

    pub fn cursor(self) -> CursorStyle {
        match self {
            HandleType::CornerNw | HandleType::CornerSe => CursorStyle::NwseResize,
            HandleType::CornerNe | HandleType::CornerSw => CursorStyle::NeswResize,
            HandleType::EdgeN | HandleType::EdgeS => CursorStyle::NsResize,
            HandleType::EdgeE | HandleType::EdgeW => CursorStyle::EwResize,
            HandleType::Move => CursorStyle::Move,
            HandleType::Tail => CursorStyle::Crosshair,
            HandleType::Rotate => CursorStyle::Grab,
        }
    }
}

/// A handle with its canvas position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleType,
}

impl Handle {
    pub fn new(position: Point, kind: HandleType) -> Self {
        Self { position, kind }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Handles shown for a selected element.
///
/// The tail handle comes first so it wins when it overlaps a resize handle.
pub fn handles_for(element: &Element) -> Vec<Handle> {
    let t = element.transform();
    let rot = t.rotation_affine();
    let center = t.center();
    let half = Vec2::new(t.width / 2.0, t.height / 2.0);

    let mut handles = Vec::with_capacity(10);
    if let Some(tip) = element.as_bubble().and_then(|b| b.tail_tip()) {
        handles.push(Handle::new(tip, HandleType::Tail));
    }
    for kind in HandleType::RESIZE {
        if let Some(unit) = kind.unit_offset() {
            let local = center + Vec2::new(unit.x * half.x, unit.y * half.y);
            handles.push(Handle::new(rot * local, kind));
        }
    }
    let top = center + Vec2::new(0.0, -half.y - ROTATE_HANDLE_OFFSET);
    handles.push(Handle::new(rot * top, HandleType::Rotate));
    handles
}

/// Handle under `point`, if any.
pub fn hit_test_handles(element: &Element, point: Point, tolerance: f64) -> Option<HandleType> {
    handles_for(element)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.kind)
}

/// Snapshot taken when a drag starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveManipulation {
    pub element_id: ElementId,
    pub handle: HandleType,
    pub start_point: Point,
    pub current_point: Point,
    /// Element as it was on pointer-down.
    pub original: Element,
}

impl ActiveManipulation {
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }
}

/// Manipulation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ManipulationState {
    #[default]
    Idle,
    Active(ActiveManipulation),
}

/// Turns pointer drags on handles into element updates.
///
/// The manipulator never touches the element store. Each update returns an
/// [`ElementUpdate`] for the owner to merge.
#[derive(Debug, Clone)]
pub struct Manipulator {
    state: ManipulationState,
    constraints: KindConstraints,
    min_tail_length: f64,
}

impl Default for Manipulator {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Manipulator {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: ManipulationState::Idle,
            constraints: config.constraints.clone(),
            min_tail_length: config.min_tail_length,
        }
    }

    pub fn state(&self) -> &ManipulationState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ManipulationState::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveManipulation> {
        match &self.state {
            ManipulationState::Active(active) => Some(active),
            ManipulationState::Idle => None,
        }
    }

    pub fn active_element(&self) -> Option<ElementId> {
        self.active().map(|a| a.element_id)
    }

    /// Begin dragging `handle` of `element` from `point` (canvas space).
    pub fn start(
        &mut self,
        element: &Element,
        handle: HandleType,
        point: Point,
    ) -> Result<(), ManipulationError> {
        if let Some(active) = self.active() {
            return Err(ManipulationError::AlreadyActive(active.element_id));
        }
        if handle == HandleType::Tail && element.as_bubble().is_none() {
            return Err(ManipulationError::UnsupportedHandle {
                handle,
                kind: element.kind(),
            });
        }
        log::debug!("Manipulation start: {:?} on {}", handle, element.id());
        self.state = ManipulationState::Active(ActiveManipulation {
            element_id: element.id(),
            handle,
            start_point: point,
            current_point: point,
            original: element.clone(),
        });
        Ok(())
    }

    /// Feed a pointer position.
    ///
    /// `live` is the current state of the element in the store. When it is
    /// missing or is not the manipulated element, nothing happens.
    pub fn update(
        &mut self,
        point: Point,
        live: Option<&Element>,
        modifiers: Modifiers,
    ) -> Option<ElementUpdate> {
        let ManipulationState::Active(active) = &mut self.state else {
            return None;
        };
        let Some(live) = live.filter(|el| el.id() == active.element_id) else {
            log::warn!("Manipulation target {} is gone, ignoring update", active.element_id);
            return None;
        };
        active.current_point = point;
        let active = &*active;

        match active.handle {
            HandleType::Move => {
                let t = active.original.transform().translated(active.delta());
                Some(ElementUpdate::transform(t))
            }
            HandleType::Rotate => {
                let mut t = *live.transform();
                t.rotation = rotation_towards(t.center(), point, modifiers.shift);
                Some(ElementUpdate::transform(t))
            }
            HandleType::Tail => tail_update(live, point, self.min_tail_length),
            handle => {
                let constraints = self.constraints.for_kind(live.kind());
                let keep_aspect = modifiers.shift && handle.is_corner();
                let t = resize(
                    active.original.transform(),
                    handle,
                    active.delta(),
                    &constraints,
                    keep_aspect,
                );
                Some(ElementUpdate::transform(t))
            }
        }
    }

    /// Finish the drag. Returns the finished session, if one was active.
    pub fn end(&mut self) -> Option<ActiveManipulation> {
        match std::mem::take(&mut self.state) {
            ManipulationState::Active(active) => {
                log::debug!("Manipulation end: {:?} on {}", active.handle, active.element_id);
                Some(active)
            }
            ManipulationState::Idle => None,
        }
    }

    /// Abort the drag. Returns the update restoring the element as it was on
    /// pointer-down.
    pub fn cancel(&mut self) -> Option<(ElementId, ElementUpdate)> {
        let active = self.end()?;
        let update = match &active.original {
            Element::Dialogue(b) => ElementUpdate {
                transform: Some(b.transform),
                tail: b.tail,
                text: None,
            },
            other => ElementUpdate::transform(*other.transform()),
        };
        Some((active.element_id, update))
    }
}

/// Tail update for a drag to `point`, measured from the live bubble center.
fn tail_update(live: &Element, point: Point, min_tail_length: f64) -> Option<ElementUpdate> {
    let bubble = live.as_bubble()?;
    let t = &bubble.transform;
    let center = t.center();
    let local = t.to_local(point);
    let to_pointer = local - center;

    let mut tail = bubble.tail.unwrap_or_else(TailConfig::default);
    tail.set_angle(to_pointer.y.atan2(to_pointer.x).to_degrees());
    let attach = attachment_point(&bubble.outline, t.rect(), tail.angle_radians());
    // Only a minimum applies; the tail may be arbitrarily long.
    tail.length = (to_pointer.hypot() - (attach - center).hypot()).max(min_tail_length);
    tail.attachment_offset = attach - center;
    Some(ElementUpdate::tail(tail))
}

/// Rotation in radians for a handle dragged to `pointer`, 0 = straight up.
fn rotation_towards(center: Point, pointer: Point, snap: bool) -> f64 {
    let v = pointer - center;
    let mut degrees = normalize_angle(v.x.atan2(-v.y).to_degrees());
    if snap {
        degrees = normalize_angle((degrees / ROTATION_SNAP_DEGREES).round() * ROTATION_SNAP_DEGREES);
    }
    degrees.to_radians()
}

/// Apply a resize handle drag to `start`.
///
/// `delta` is in canvas space and is mapped into the element's rotated
/// frame. The edge (or corner) opposite the handle stays where it was, even
/// when the size is clamped.
pub fn resize(
    start: &Transform,
    handle: HandleType,
    delta: Vec2,
    constraints: &SizeConstraints,
    keep_aspect: bool,
) -> Transform {
    let Some(rule) = handle.resize_rule() else {
        return *start;
    };
    let d = Affine::rotate(-start.rotation) * delta.to_point();

    let mut width = start.width;
    if rule.left {
        width -= d.x;
    } else if rule.right {
        width += d.x;
    }
    let mut height = start.height;
    if rule.top {
        height -= d.y;
    } else if rule.bottom {
        height += d.y;
    }

    if keep_aspect && start.width > 0.0 && start.height > 0.0 {
        let fx = width / start.width;
        let fy = height / start.height;
        let mut f = if (fx - 1.0).abs() >= (fy - 1.0).abs() { fx } else { fy };
        // Clamp the shared factor so both axes stay in range together.
        let f_min = (constraints.min_width / start.width).max(constraints.min_height / start.height);
        let f_max = (constraints.max_width / start.width).min(constraints.max_height / start.height);
        if f_min <= f_max {
            f = if f.is_nan() { f_min } else { f.clamp(f_min, f_max) };
        }
        width = start.width * f;
        height = start.height * f;
    }

    let width = constraints.clamp_width(width);
    let height = constraints.clamp_height(height);

    // Fixed point, as a sign per axis relative to the center.
    let sign = |neg: bool, pos: bool| {
        if neg {
            1.0
        } else if pos {
            -1.0
        } else {
            0.0
        }
    };
    let sx = sign(rule.left, rule.right);
    let sy = sign(rule.top, rule.bottom);
    let rotate = Affine::rotate(start.rotation);
    let anchor_local = Point::new(sx * start.width / 2.0, sy * start.height / 2.0);
    let anchor = start.center() + (rotate * anchor_local).to_vec2();

    // Same anchor relative to the new center.
    let new_offset = Point::new(sx * width / 2.0, sy * height / 2.0);
    let center = anchor - (rotate * new_offset).to_vec2();

    Transform {
        x: center.x - width / 2.0,
        y: center.y - height / 2.0,
        width,
        height,
        ..*start
    }
}
