//! Bubble outline and tail geometry.
//!
//! Angles are degrees at the public surface and radians inside the solvers.
//! 0° points along +X and angles grow clockwise on screen (y points down),
//! matching `atan2(dy, dx)`.

mod attachment;
mod outline;
mod tail;
mod unified;

pub use attachment::{
    attachment_point, elliptical_attachment, rounded_rect_attachment, side_for_angle,
    star_attachment, STAR_ATTACHMENT_MARGIN,
};
pub use outline::{outline_path, star_vertices, OutlineKind};
pub use tail::{tail_path, AttachmentSide, TailConfig, TailGeometry, TailStyle, TAIL_ROOT_OVERLAP};
pub use unified::{unified_bubble_path, unified_bubble_svg};

/// Normalize an angle in degrees into `[0, 360)`.
///
/// Non-finite input maps to 0.
pub fn normalize_angle(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Angle in degrees of the vector from `from` to `to`, normalized.
pub fn angle_between(from: kurbo::Point, to: kurbo::Point) -> f64 {
    normalize_angle((to.y - from.y).atan2(to.x - from.x).to_degrees())
}
