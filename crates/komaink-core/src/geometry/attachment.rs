//! Where a tail meets a bubble outline.

use super::outline::OutlineKind;
use super::tail::AttachmentSide;
use super::normalize_angle;
use kurbo::{Point, Rect, Vec2};

/// Inset from the star's outer radius so the tail root stays inside the spikes.
pub const STAR_ATTACHMENT_MARGIN: f64 = 5.0;

const EPS: f64 = 1e-9;

/// Distance from the center of an ellipse to its boundary along `angle`.
fn elliptical_radius(half_width: f64, half_height: f64, angle: f64) -> f64 {
    let (sin, cos) = angle.sin_cos();
    let (a, b) = (half_width, half_height);
    a * b / ((b * cos).powi(2) + (a * sin).powi(2)).sqrt()
}

/// Point on the ellipse inscribed in a `width` x `height` box, along the ray
/// from `center` at `angle` (radians).
///
/// A degenerate ellipse collapses to its center.
pub fn elliptical_attachment(center: Point, width: f64, height: f64, angle: f64) -> Point {
    let a = width.abs() / 2.0;
    let b = height.abs() / 2.0;
    if a < EPS || b < EPS {
        return center;
    }
    let r = elliptical_radius(a, b, angle);
    let (sin, cos) = angle.sin_cos();
    Point::new(center.x + r * cos, center.y + r * sin)
}

/// Approximate attachment on a star outline: the outer (elliptical) radius
/// along the angle, pulled in by [`STAR_ATTACHMENT_MARGIN`].
///
/// This ignores the concave notches between spikes, so at some angles the
/// point sits slightly outside the drawn outline.
pub fn star_attachment(center: Point, width: f64, height: f64, angle: f64) -> Point {
    let a = width.abs() / 2.0;
    let b = height.abs() / 2.0;
    if a < EPS || b < EPS {
        return center;
    }
    let r = (elliptical_radius(a, b, angle) - STAR_ATTACHMENT_MARGIN).max(0.0);
    let (sin, cos) = angle.sin_cos();
    Point::new(center.x + r * cos, center.y + r * sin)
}

/// Attachment on a rounded rectangle.
///
/// The ray is first intersected with the plain rectangle. If that exit point
/// lies beyond the corner-radius inset rectangle on both axes, the ray leaves
/// through a rounded corner and is intersected with that corner's circle
/// instead.
pub fn rounded_rect_attachment(
    center: Point,
    width: f64,
    height: f64,
    radius: f64,
    angle: f64,
) -> Point {
    let hw = width.abs() / 2.0;
    let hh = height.abs() / 2.0;
    if hw < EPS || hh < EPS {
        return center;
    }
    let r = radius.clamp(0.0, hw.min(hh));
    let (sin, cos) = angle.sin_cos();
    let dir = Vec2::new(cos, sin);

    let tx = if cos.abs() > EPS { hw / cos.abs() } else { f64::INFINITY };
    let ty = if sin.abs() > EPS { hh / sin.abs() } else { f64::INFINITY };
    let edge = dir * tx.min(ty);

    let inner_hw = hw - r;
    let inner_hh = hh - r;
    if r > EPS && edge.x.abs() > inner_hw && edge.y.abs() > inner_hh {
        let corner = Vec2::new(inner_hw.copysign(edge.x), inner_hh.copysign(edge.y));
        // |t * dir - corner|^2 = r^2, take the far root.
        let b = dir.dot(corner);
        let c = corner.hypot2() - r * r;
        let disc = b * b - c;
        if disc >= 0.0 {
            return center + dir * (b + disc.sqrt());
        }
    }
    center + edge
}

/// Attachment point for any outline kind inside `rect`.
pub fn attachment_point(outline: &OutlineKind, rect: Rect, angle: f64) -> Point {
    let center = rect.center();
    match outline {
        OutlineKind::Ellipse | OutlineKind::Cloud { .. } => {
            elliptical_attachment(center, rect.width(), rect.height(), angle)
        }
        OutlineKind::Star { .. } => star_attachment(center, rect.width(), rect.height(), angle),
        OutlineKind::RoundedRect { radius } => {
            rounded_rect_attachment(center, rect.width(), rect.height(), *radius, angle)
        }
    }
}

/// Side of the bubble a tail at `degrees` leaves from.
pub fn side_for_angle(degrees: f64) -> AttachmentSide {
    let a = normalize_angle(degrees);
    if !(45.0..315.0).contains(&a) {
        AttachmentSide::Right
    } else if a < 135.0 {
        AttachmentSide::Bottom
    } else if a < 225.0 {
        AttachmentSide::Left
    } else {
        AttachmentSide::Top
    }
}
