//! Bubble outline paths.

use kurbo::{BezPath, Ellipse, Point, Rect, RoundedRect, Shape};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Path flattening tolerance for curved outlines.
const TOLERANCE: f64 = 0.1;

/// Outline family of a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutlineKind {
    /// Plain speech ellipse.
    Ellipse,
    /// Spiky "shout" outline.
    Star { spikes: u32, inner_ratio: f64 },
    /// Narration box.
    RoundedRect { radius: f64 },
    /// Thought cloud made of outward bumps.
    Cloud { bumps: u32 },
}

impl OutlineKind {
    pub const SHOUT: Self = OutlineKind::Star {
        spikes: 12,
        inner_ratio: 0.75,
    };
}

/// Closed outline path of `kind` fitted to `rect`.
pub fn outline_path(kind: &OutlineKind, rect: Rect) -> BezPath {
    match *kind {
        OutlineKind::Ellipse => Ellipse::from_rect(rect).to_path(TOLERANCE),
        OutlineKind::RoundedRect { radius } => {
            let max_radius = rect.width().min(rect.height()).abs() / 2.0;
            RoundedRect::from_rect(rect, radius.clamp(0.0, max_radius)).to_path(TOLERANCE)
        }
        OutlineKind::Star {
            spikes,
            inner_ratio,
        } => polygon(&star_vertices(rect, spikes, inner_ratio)),
        OutlineKind::Cloud { bumps } => cloud_path(rect, bumps),
    }
}

/// Vertices of a star inscribed in `rect`, alternating outer and inner
/// points, starting at the top.
pub fn star_vertices(rect: Rect, spikes: u32, inner_ratio: f64) -> Vec<Point> {
    let spikes = spikes.max(3);
    let inner_ratio = inner_ratio.clamp(0.05, 1.0);
    let center = rect.center();
    let (hw, hh) = (rect.width() / 2.0, rect.height() / 2.0);
    let count = spikes * 2;
    (0..count)
        .map(|i| {
            let angle = i as f64 * PI / spikes as f64 - PI / 2.0;
            let factor = if i % 2 == 0 { 1.0 } else { inner_ratio };
            Point::new(
                center.x + hw * factor * angle.cos(),
                center.y + hh * factor * angle.sin(),
            )
        })
        .collect()
}

fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(*first);
        for p in iter {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

// Bumps are quadratic arcs between points on the inscribed ellipse, with the
// control point pushed outward at the mid angle.
fn cloud_path(rect: Rect, bumps: u32) -> BezPath {
    const BULGE: f64 = 1.25;
    let bumps = bumps.max(5);
    let center = rect.center();
    let (hw, hh) = (rect.width() / 2.0 / BULGE.sqrt(), rect.height() / 2.0 / BULGE.sqrt());
    let on_ellipse = |angle: f64, scale: f64| {
        Point::new(
            center.x + hw * scale * angle.cos(),
            center.y + hh * scale * angle.sin(),
        )
    };
    let step = TAU / bumps as f64;

    let mut path = BezPath::new();
    path.move_to(on_ellipse(-PI / 2.0, 1.0));
    for i in 0..bumps {
        let start = i as f64 * step - PI / 2.0;
        path.quad_to(
            on_ellipse(start + step / 2.0, BULGE),
            on_ellipse(start + step, 1.0),
        );
    }
    path.close_path();
    path
}
