//! Input model: edit modes, modifier keys, mouse buttons, and gesture state.
//!
//! `EditMode` is the top-level state of the edit session. `Gesture` carries
//! the transient context of an in-progress draw between pointer-down and
//! pointer-up; it is never persisted and never part of the store until the
//! gesture commits.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::AnnotationKind;
use crate::geometry::Point;

/// Top-level state of the edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Waiting for the next pointer-down.
    #[default]
    Idle,
    /// A pointer drag is shaping a new annotation.
    Drawing,
    /// Keystrokes go to the active text annotation.
    TypingText,
    /// The next click removes the annotation under the cursor.
    Deleting,
    /// The next click samples the canvas color under the cursor.
    PickingColor,
}

impl EditMode {
    /// Modes entered by an explicit toggle and left by escape or a click.
    #[must_use]
    pub fn is_modal(self) -> bool {
        matches!(self, Self::Deleting | Self::PickingColor)
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl only, for tests and hosts that synthesize events.
    #[must_use]
    pub const fn ctrl() -> Self {
        Self { shift: false, ctrl: true, alt: false, meta: false }
    }

    /// Shift only.
    #[must_use]
    pub const fn shift() -> Self {
        Self { shift: true, ctrl: false, alt: false, meta: false }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button.
    Primary,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the host toolkit
/// (`"Enter"`, `"ArrowLeft"`) or the single character produced by a printable
/// key (`"a"`, `"é"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    pub const BACKSPACE: &'static str = "Backspace";
    pub const ENTER: &'static str = "Enter";
    pub const ESCAPE: &'static str = "Escape";
    pub const LEFT: &'static str = "ArrowLeft";
    pub const RIGHT: &'static str = "ArrowRight";
    pub const UP: &'static str = "ArrowUp";
    pub const DOWN: &'static str = "ArrowDown";

    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Whether this key has the given name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }

    /// The character a printable key inserts. Named keys and control
    /// characters yield `None`.
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        let mut chars = self.0.chars();
        let c = chars.next()?;
        if chars.next().is_some() || c.is_control() {
            return None;
        }
        Some(c)
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down, which zooms out).
    pub dy: f64,
}

/// Context of a draw in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gesture {
    /// Annotation kind selected when the drag started.
    pub kind: AnnotationKind,
    /// Canvas-space pointer position at pointer-down.
    pub start: Point,
    /// Canvas-space pointer position at the latest move.
    pub end: Point,
    /// Modifiers held at pointer-down.
    pub modifiers: Modifiers,
}

impl Gesture {
    #[must_use]
    pub fn new(kind: AnnotationKind, at: Point, modifiers: Modifiers) -> Self {
        Self { kind, start: at, end: at, modifiers }
    }
}
