//! Integer point/size/rect value types and the pure geometry built on them.
//!
//! Canvas-space annotation coordinates are whole pixels. Screen-space hit
//! boxes are computed in floating point (`RectF`) so that zoom-dependent
//! minimum sizes do not accumulate rounding error.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Round to the nearest integer, halves away from zero.
///
/// This is the only float-to-int rule used by the crate, so negative and
/// positive coordinates round symmetrically.
#[must_use]
pub fn round_half_away(value: f64) -> i32 {
    value.round() as i32
}

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Multiply each axis by its own factor and round.
    #[must_use]
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        Self {
            x: round_half_away(f64::from(self.x) * sx),
            y: round_half_away(f64::from(self.y) * sy),
        }
    }

    /// Componentwise absolute value.
    #[must_use]
    pub fn abs(self) -> Self {
        Self { x: self.x.abs(), y: self.y.abs() }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

/// A width/height pair. Negative values are only legal inside an
/// un-normalized [`Rect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        Self {
            width: round_half_away(f64::from(self.width) * sx),
            height: round_half_away(f64::from(self.height) * sy),
        }
    }

    /// True when either dimension is zero or negative.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// An axis-aligned rectangle with integer origin and size.
///
/// Built from two drag points the size may be negative; call
/// [`Rect::normalized`] before painting or hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    #[must_use]
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Rectangle spanning `start` to `end` exactly as dragged (possibly negative).
    #[must_use]
    pub fn from_points(start: Point, end: Point) -> Self {
        Self {
            origin: start,
            size: Size::new(end.x - start.x, end.y - start.y),
        }
    }

    /// Shift the origin so width and height are non-negative.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut out = self;
        if out.size.width < 0 {
            out.origin.x += out.size.width;
            out.size.width = -out.size.width;
        }
        if out.size.height < 0 {
            out.origin.y += out.size.height;
            out.size.height = -out.size.height;
        }
        out
    }

    /// Inclusive containment test on the normalized rectangle.
    #[must_use]
    pub fn contains(self, p: Point) -> bool {
        let r = self.normalized();
        p.x >= r.origin.x
            && p.x <= r.origin.x + r.size.width
            && p.y >= r.origin.y
            && p.y <= r.origin.y + r.size.height
    }
}

/// Floating-point rectangle used for screen-space hit boxes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Shift the origin so width and height are non-negative.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut out = self;
        if out.width < 0.0 {
            out.x += out.width;
            out.width = -out.width;
        }
        if out.height < 0.0 {
            out.y += out.height;
            out.height = -out.height;
        }
        out
    }

    /// Grow each axis shorter than `min_edge` to exactly `min_edge`, keeping
    /// its center fixed. Axes already long enough are untouched.
    #[must_use]
    pub fn grow_to_min(self, min_edge: f64) -> Self {
        let mut out = self.normalized();
        if out.width < min_edge {
            out.x -= (min_edge - out.width) / 2.0;
            out.width = min_edge;
        }
        if out.height < min_edge {
            out.y -= (min_edge - out.height) / 2.0;
            out.height = min_edge;
        }
        out
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}
