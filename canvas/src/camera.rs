//! View transform between the on-screen viewport and the canvas raster.
//!
//! Screen space is the logical pixel grid of the overlay window. Canvas space
//! is the pixel grid of the captured image. The two are related by a pan
//! offset, a zoom scale that never drops below 1.0, and a fixed density
//! factor (screen pixels per canvas pixel at zoom 1.0).

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{DEFAULT_MAX_ZOOM, MIN_ZOOM};
use crate::geometry::{Point, Size, round_half_away};

/// Pan/zoom state for one canvas shown in one viewport.
///
/// `pan_offset` is where the canvas origin sits in screen pixels; it is zero
/// or negative whenever the canvas is at least as large as the viewport.
/// `canvas_size` is the on-screen extent of the whole canvas at the current
/// zoom; `canvas_original_size` is that extent at zoom 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_offset: Point,
    pub zoom_scale: f64,
    pub canvas_size: Size,
    pub canvas_original_size: Size,
    pub viewport_size: Size,
    pub density_factor: f64,
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan_offset: Point::default(),
            zoom_scale: MIN_ZOOM,
            canvas_size: Size::default(),
            canvas_original_size: Size::default(),
            viewport_size: Size::default(),
            density_factor: 1.0,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Camera showing a canvas of `canvas_original_size` screen pixels in a
    /// viewport of `viewport_size`, unzoomed and unpanned.
    #[must_use]
    pub fn new(canvas_original_size: Size, viewport_size: Size, density_factor: f64) -> Self {
        Self {
            canvas_size: canvas_original_size,
            canvas_original_size,
            viewport_size,
            density_factor,
            ..Self::default()
        }
    }

    /// Convert a screen-space point to canvas coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, p: Point) -> Point {
        let x = f64::from(p.x - self.pan_offset.x) / self.zoom_scale / self.density_factor;
        let y = f64::from(p.y - self.pan_offset.y) / self.zoom_scale / self.density_factor;
        Point::new(round_half_away(x), round_half_away(y))
    }

    /// Convert a canvas point to screen coordinates.
    #[must_use]
    pub fn canvas_to_screen(&self, p: Point) -> Point {
        let x = f64::from(p.x) * self.density_factor * self.zoom_scale + f64::from(self.pan_offset.x);
        let y = f64::from(p.y) * self.density_factor * self.zoom_scale + f64::from(self.pan_offset.y);
        Point::new(round_half_away(x), round_half_away(y))
    }

    /// Convert a canvas-space extent to screen pixels. Pan does not apply.
    #[must_use]
    pub fn size_canvas_to_screen(&self, s: Size) -> Size {
        let factor = self.density_factor * self.zoom_scale;
        s.scale(factor, factor)
    }

    /// Move the view by a screen-space drag delta.
    ///
    /// The delta is scaled by the canvas:viewport ratio so a full-width drag
    /// crosses the same fraction of the canvas at every zoom level.
    pub fn pan(&mut self, delta: Point) {
        let rx = ratio(self.canvas_size.width, self.viewport_size.width);
        let ry = ratio(self.canvas_size.height, self.viewport_size.height);
        self.pan_offset.x -= round_half_away(f64::from(delta.x) * rx);
        self.pan_offset.y -= round_half_away(f64::from(delta.y) * ry);
    }

    /// Change the zoom scale while keeping the canvas point under `anchor`
    /// (screen space) visually fixed.
    ///
    /// `new_scale` is clamped to `[1.0, max_zoom]`.
    pub fn zoom_at(&mut self, anchor: Point, new_scale: f64) {
        let new_scale = new_scale.clamp(MIN_ZOOM, self.max_zoom.max(MIN_ZOOM));
        let old = self.canvas_size;
        self.canvas_size = self.canvas_original_size.scale(new_scale, new_scale);
        let dw = f64::from(self.canvas_size.width - old.width);
        let dh = f64::from(self.canvas_size.height - old.height);

        let cur = anchor + self.pan_offset.abs();
        if old.width > 0 {
            let frac_x = -f64::from(cur.x) / f64::from(old.width);
            self.pan_offset.x += round_half_away(dw * frac_x);
        }
        if old.height > 0 {
            let frac_y = -f64::from(cur.y) / f64::from(old.height);
            self.pan_offset.y += round_half_away(dh * frac_y);
        }
        self.zoom_scale = new_scale;
    }

    /// Snap the pan offset so no empty band shows past a canvas edge.
    ///
    /// When the canvas is narrower than the viewport on an axis the canvas is
    /// pinned to the viewport origin on that axis.
    pub fn clamp_pan(&mut self) {
        let right_gap = self.viewport_size.width - (self.pan_offset.x + self.canvas_size.width);
        if right_gap > 0 {
            self.pan_offset.x += right_gap;
        }
        if self.pan_offset.x > 0 {
            self.pan_offset.x = 0;
        }

        let bottom_gap = self.viewport_size.height - (self.pan_offset.y + self.canvas_size.height);
        if bottom_gap > 0 {
            self.pan_offset.y += bottom_gap;
        }
        if self.pan_offset.y > 0 {
            self.pan_offset.y = 0;
        }
    }

    /// Return to zoom 1.0 with the canvas origin at the viewport origin.
    pub fn reset_zoom(&mut self) {
        self.zoom_scale = MIN_ZOOM;
        self.canvas_size = self.canvas_original_size;
        self.pan_offset = Point::default();
    }

    /// Whether the view is magnified past the original size.
    #[must_use]
    pub fn is_zoomed(&self) -> bool {
        self.zoom_scale > MIN_ZOOM + f64::EPSILON
    }
}

fn ratio(canvas: i32, viewport: i32) -> f64 {
    if viewport <= 0 {
        return 1.0;
    }
    f64::from(canvas) / f64::from(viewport)
}
