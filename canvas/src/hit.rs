//! Hit-testing a screen-space cursor against annotations of one kind.
//!
//! Boxes are computed in screen space so the minimum hit size tracks what the
//! user sees: every box is grown to at least `min_hit_edge · zoom` on its
//! short axis. Collections are scanned in store order and the first match
//! wins, so on overlap the earliest-inserted annotation is returned even
//! though a later one paints on top.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Camera;
use crate::consts::DEFAULT_MIN_HIT_EDGE;
use crate::doc::{AnnotationKind, AnnotationStore};
use crate::geometry::{Point, Rect, RectF};

/// Index of the first annotation of `kind` whose hit box contains
/// `cursor_screen`, using the default minimum hit edge.
#[must_use]
pub fn topmost_hit(kind: AnnotationKind, cursor_screen: Point, store: &AnnotationStore, camera: &Camera) -> Option<usize> {
    topmost_hit_with(kind, cursor_screen, store, camera, DEFAULT_MIN_HIT_EDGE)
}

/// Same as [`topmost_hit`] with an explicit minimum hit edge (screen pixels
/// at zoom 1.0).
#[must_use]
pub fn topmost_hit_with(
    kind: AnnotationKind,
    cursor_screen: Point,
    store: &AnnotationStore,
    camera: &Camera,
    min_hit_edge: f64,
) -> Option<usize> {
    let min_edge = min_hit_edge * camera.zoom_scale;
    let cx = f64::from(cursor_screen.x);
    let cy = f64::from(cursor_screen.y);
    let hits = |start: Point, end: Point| screen_box(camera, start, end).grow_to_min(min_edge).contains(cx, cy);

    match kind {
        AnnotationKind::Text => store.texts().iter().position(|t| hits(t.shape.start, t.shape.end)),
        AnnotationKind::Freeform => store
            .freeforms()
            .iter()
            .position(|f| f.points.windows(2).any(|pair| hits(pair[0], pair[1]))),
        _ => store
            .shapes(kind)?
            .iter()
            .position(|s| hits(s.start, s.end)),
    }
}

/// Screen-space bounding box of the canvas-space span `start..end`.
fn screen_box(camera: &Camera, start: Point, end: Point) -> RectF {
    let bounds = Rect::from_points(start, end).normalized();
    let origin = camera.canvas_to_screen(bounds.origin);
    let size = camera.size_canvas_to_screen(bounds.size);
    RectF::new(f64::from(origin.x), f64::from(origin.y), f64::from(size.width), f64::from(size.height))
}
