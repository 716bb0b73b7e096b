//! Single-path bubble: outline plus tail.

use super::attachment::attachment_point;
use super::outline::{outline_path, OutlineKind};
use super::tail::{tail_path, TailConfig};
use kurbo::{BezPath, ParamCurve, PathEl, Rect, Shape};

/// Outline and tail as one path.
///
/// Each tail subpath is wound the same way as the outline, so filling with
/// the nonzero rule yields one seamless shape.
pub fn unified_bubble_path(outline: &OutlineKind, rect: Rect, tail: Option<&TailConfig>) -> BezPath {
    let mut path = outline_path(outline, rect);
    let Some(tail) = tail else {
        return path;
    };

    let attachment = attachment_point(outline, rect, tail.angle_radians());
    let outline_sign = path.area().signum();
    for sub in subpaths(&tail_path(tail, attachment)) {
        let sub_area = sub.area();
        if sub_area != 0.0 && sub_area.signum() != outline_sign {
            path.extend(reversed(&sub).elements().iter().copied());
        } else {
            path.extend(sub.elements().iter().copied());
        }
    }
    path
}

/// SVG path data for [`unified_bubble_path`].
pub fn unified_bubble_svg(outline: &OutlineKind, rect: Rect, tail: Option<&TailConfig>) -> String {
    unified_bubble_path(outline, rect, tail).to_svg()
}

fn subpaths(path: &BezPath) -> Vec<BezPath> {
    let mut out: Vec<BezPath> = Vec::new();
    for el in path.elements() {
        match el {
            PathEl::MoveTo(_) => {
                let mut sub = BezPath::new();
                sub.push(*el);
                out.push(sub);
            }
            _ => {
                if let Some(sub) = out.last_mut() {
                    sub.push(*el);
                }
            }
        }
    }
    out
}

// Reverse a single closed subpath.
fn reversed(sub: &BezPath) -> BezPath {
    let segs: Vec<_> = sub.segments().collect();
    let Some(last) = segs.last() else {
        return sub.clone();
    };
    let mut out = BezPath::new();
    out.move_to(last.end());
    for seg in segs.iter().rev() {
        out.push(seg.reverse().as_path_el());
    }
    out.close_path();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{elliptical_attachment, TailStyle};
    use kurbo::Point;

    fn rect() -> Rect {
        Rect::new(100.0, 100.0, 250.0, 180.0)
    }

    #[test]
    fn test_no_tail_is_outline() {
        let a = unified_bubble_path(&OutlineKind::Ellipse, rect(), None);
        let b = outline_path(&OutlineKind::Ellipse, rect());
        assert_eq!(a.elements(), b.elements());
    }

    #[test]
    fn test_tail_extends_outline() {
        let tail = TailConfig::new(225.0, 40.0);
        let path = unified_bubble_path(&OutlineKind::Ellipse, rect(), Some(&tail));
        let attach = elliptical_attachment(
            rect().center(),
            rect().width(),
            rect().height(),
            225f64.to_radians(),
        );
        let tip = tail.tip(attach);
        let bbox = path.bounding_box();
        assert!(bbox.x0 <= tip.x + 1e-6 && bbox.y0 <= tip.y + 1e-6);
        // A point just inside the tip along the tail is filled.
        let inside = attach + tail.direction() * 10.0;
        assert!(path.contains(inside));
    }

    #[test]
    fn test_tail_wound_like_outline() {
        for style in [TailStyle::Straight, TailStyle::Curved, TailStyle::Bubbles] {
            for angle in [0.0, 90.0, 200.0, 300.0] {
                let tail = TailConfig::new(angle, 50.0).with_style(style);
                let path = unified_bubble_path(&OutlineKind::SHOUT, rect(), Some(&tail));
                let subs = subpaths(&path);
                let sign = subs[0].area().signum();
                for sub in &subs[1..] {
                    assert_eq!(sub.area().signum(), sign, "{style:?} at {angle}");
                }
            }
        }
    }

    #[test]
    fn test_root_overlap_is_filled() {
        let tail = TailConfig::new(90.0, 30.0);
        let path = unified_bubble_path(&OutlineKind::RoundedRect { radius: 8.0 }, rect(), Some(&tail));
        // Just below the bottom edge, on the tail axis.
        assert!(path.contains(Point::new(175.0, 182.0)));
    }

    #[test]
    fn test_svg_output() {
        let tail = TailConfig::new(90.0, 30.0);
        let svg = unified_bubble_svg(&OutlineKind::Ellipse, rect(), Some(&tail));
        assert!(svg.starts_with('M'));
        assert_eq!(svg.matches('M').count(), 2);
        assert!(svg.contains('Z'));
    }
}
