//! Shared numeric constants for the canvas crate.

// ── View transform ──────────────────────────────────────────────

/// Lowest zoom scale; the canvas never shrinks below its original size.
pub const MIN_ZOOM: f64 = 1.0;

/// Default upper bound for the zoom scale.
pub const DEFAULT_MAX_ZOOM: f64 = 8.0;

/// Default fractional zoom change per wheel notch.
pub const DEFAULT_ZOOM_STEP: f64 = 0.1;

// ── Hit-testing ─────────────────────────────────────────────────

/// Minimum hit-box edge at zoom 1.0, in screen pixels. Scaled by zoom.
pub const DEFAULT_MIN_HIT_EDGE: f64 = 25.0;

// ── Arrowheads ──────────────────────────────────────────────────

/// Arm length as a fraction of the shaft length.
pub const ARROW_ARM_RATIO: f64 = 0.15;

/// Upper bound on arm length in canvas pixels.
pub const ARROW_ARM_MAX: f64 = 85.0;

// ── Style ───────────────────────────────────────────────────────

/// Stroke width used when none is configured.
pub const DEFAULT_STROKE_WIDTH: u32 = 3;
