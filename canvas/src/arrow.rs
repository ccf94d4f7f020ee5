//! Arrowhead geometry for arrow annotations.
//!
//! Each arm's x and y components are split between `arm · p` and
//! `arm · (1 − p)`, where `p` is an angle-dependent proportion that is 0.5 on
//! axis-aligned shafts and 1.0 on diagonals. A table keyed by the π/4 octant
//! of the shaft angle picks the split and signs, so inside an octant one arm
//! hugs the shaft and the other opens wider. On axes and diagonals the head
//! is symmetric.

#[cfg(test)]
#[path = "arrow_test.rs"]
mod arrow_test;

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use crate::consts::{ARROW_ARM_MAX, ARROW_ARM_RATIO};
use crate::doc::Shape;
use crate::geometry::{Point, round_half_away};

/// One stroke of an arrowhead, drawn from the tip outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// Which share of the arm length feeds an arm component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Share {
    /// `arm · p`
    Major,
    /// `arm · (1 − p)`
    Minor,
}

use Share::{Major, Minor};

/// Arm components per π/4 octant of the shaft angle, y pointing up:
/// `[arm_a, arm_b]`, each `(sign_x, share_x, sign_y, share_y)`.
///
/// Octants 4..8 are 0..4 negated. Adjacent rows agree on their shared
/// boundary, where `p` is 0.5 (axes) or 1.0 (diagonals).
const OCTANT_ARMS: [[(f64, Share, f64, Share); 2]; 8] = [
    [(-1.0, Major, 1.0, Minor), (-1.0, Minor, -1.0, Major)],
    [(-1.0, Major, -1.0, Minor), (1.0, Minor, -1.0, Major)],
    [(-1.0, Minor, -1.0, Major), (1.0, Major, -1.0, Minor)],
    [(1.0, Minor, -1.0, Major), (1.0, Major, 1.0, Minor)],
    [(1.0, Major, -1.0, Minor), (1.0, Minor, 1.0, Major)],
    [(1.0, Major, 1.0, Minor), (-1.0, Minor, 1.0, Major)],
    [(1.0, Minor, 1.0, Major), (-1.0, Major, 1.0, Minor)],
    [(-1.0, Minor, 1.0, Major), (-1.0, Major, -1.0, Minor)],
];

/// Shaft angle in `[0, 2π)`, measured counter-clockwise with y pointing up.
///
/// `dy` is in screen orientation (down is positive), so it is negated.
#[must_use]
pub fn shaft_angle(dx: f64, dy: f64) -> f64 {
    let x = dx;
    let y = -dy;
    if x == 0.0 {
        return if y > 0.0 {
            FRAC_PI_2
        } else if y < 0.0 {
            3.0 * FRAC_PI_2
        } else {
            0.0
        };
    }
    let base = (y / x).abs().atan();
    match (x > 0.0, y >= 0.0) {
        (true, true) => base,
        (false, true) => PI - base,
        (false, false) => PI + base,
        (true, false) => TAU - base,
    }
}

/// Major share of the arm length for a shaft angle: 0.5 at multiples of
/// 90°, 1.0 at odd multiples of 45°.
#[must_use]
pub fn length_proportion(theta: f64) -> f64 {
    0.25 * (4.0 * theta - FRAC_PI_2).sin() + 0.75
}

/// Compute the two arrowhead strokes for a shaft starting at `origin` and
/// running `(dx, dy)` canvas pixels. Both strokes start at the tip.
#[must_use]
pub fn arrowhead_segments(origin: Point, dx: i32, dy: i32) -> (Segment, Segment) {
    let tip = Point::new(origin.x + dx, origin.y + dy);
    let (fdx, fdy) = (f64::from(dx), f64::from(dy));

    let theta = shaft_angle(fdx, fdy);
    let hypot = fdx.hypot(fdy);
    let arm = (ARROW_ARM_RATIO * hypot).min(ARROW_ARM_MAX);
    let proportion = length_proportion(theta);
    let share = |part: Share| match part {
        Major => arm * proportion,
        Minor => arm * (1.0 - proportion),
    };

    let octant = ((theta / FRAC_PI_4) as usize).min(7);
    // Table rows are y-up; screen y grows downward.
    let [arm_a, arm_b] = OCTANT_ARMS[octant].map(|(sx, px, sy, py)| (sx * share(px), -sy * share(py)));

    (
        Segment { from: tip, to: offset(tip, arm_a) },
        Segment { from: tip, to: offset(tip, arm_b) },
    )
}

/// Arrowhead strokes for an arrow annotation.
#[must_use]
pub fn arrowhead_for(shape: &Shape) -> (Segment, Segment) {
    let d = shape.end - shape.start;
    arrowhead_segments(shape.start, d.x, d.y)
}

fn offset(p: Point, v: (f64, f64)) -> Point {
    Point::new(p.x + round_half_away(v.0), p.y + round_half_away(v.1))
}
