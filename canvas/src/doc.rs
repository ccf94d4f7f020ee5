//! Document model: annotation records and the store that owns them.
//!
//! Annotations live in seven typed collections, one per [`AnnotationKind`].
//! Each collection is ordered: later elements paint on top and are the first
//! to go on undo. The mapping from kind to collection is spelled out once per
//! operation family below rather than being implied by call sites.
//!
//! The annotation currently being extended by a gesture (a freeform stroke
//! mid-drag, a text record taking keystrokes) is named by an explicit
//! [`ActiveSlot`]. At most one slot exists across the whole store.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_STROKE_WIDTH;
use crate::geometry::{Point, Rect};

/// The seven annotation types. Doubles as the draw mode selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Outlined rectangle.
    #[default]
    Rectangle,
    /// Straight line segment.
    Line,
    /// Line segment with an arrowhead at the end point.
    Arrow,
    /// Ellipse inscribed in the start/end box.
    Ellipse,
    /// Multi-line text anchored in the start/end box.
    Text,
    /// Freehand polyline.
    Freeform,
    /// Translucent filled rectangle.
    Highlight,
}

impl AnnotationKind {
    /// Every kind in storage order.
    pub const ALL: [Self; 7] = [
        Self::Rectangle,
        Self::Line,
        Self::Arrow,
        Self::Ellipse,
        Self::Text,
        Self::Freeform,
        Self::Highlight,
    ];

    /// Whether annotations of this kind are plain `Shape` records.
    #[must_use]
    pub fn is_shape(self) -> bool {
        matches!(self, Self::Rectangle | Self::Line | Self::Arrow | Self::Ellipse | Self::Highlight)
    }
}

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const RED: Self = Self::rgb(229, 62, 62);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack as `0xRRGGBBAA`.
    #[must_use]
    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// Unpack from `0xRRGGBBAA`.
    #[must_use]
    pub fn from_u32(value: u32) -> Self {
        let [r, g, b, a] = value.to_be_bytes();
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::RED
    }
}

/// Pen settings applied to new annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub color: Color,
    pub stroke_width: u32,
}

impl Default for Style {
    fn default() -> Self {
        Self { color: Color::default(), stroke_width: DEFAULT_STROKE_WIDTH }
    }
}

/// Start/end record shared by every box- or segment-shaped annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub start: Point,
    pub end: Point,
    pub style: Style,
}

impl Shape {
    #[must_use]
    pub fn new(start: Point, end: Point, style: Style) -> Self {
        Self { start, end, style }
    }

    /// Bounding box in canvas space, normalized.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end).normalized()
    }
}

/// A text box. `caret` counts characters (not bytes) and stays within
/// `0..=content.chars().count()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub shape: Shape,
    pub caret: usize,
    pub content: String,
}

impl Text {
    /// Empty text box with the caret at 0.
    #[must_use]
    pub fn empty(shape: Shape) -> Self {
        Self { shape, caret: 0, content: String::new() }
    }

    /// Number of characters in the content.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Insert `c` at the caret and advance past it.
    pub fn insert(&mut self, c: char) {
        self.caret = self.caret.min(self.char_len());
        let at = self.byte_offset(self.caret);
        self.content.insert(at, c);
        self.caret += 1;
    }

    /// Delete the character before the caret. No-op at 0.
    pub fn backspace(&mut self) {
        self.caret = self.caret.min(self.char_len());
        if self.caret == 0 {
            return;
        }
        let at = self.byte_offset(self.caret - 1);
        self.content.remove(at);
        self.caret -= 1;
    }

    pub fn caret_left(&mut self) {
        self.caret = self.caret.min(self.char_len()).saturating_sub(1);
    }

    pub fn caret_right(&mut self) {
        self.caret = (self.caret + 1).min(self.char_len());
    }

    /// Move to the start of the line above, or 0 on the first line.
    pub fn caret_up(&mut self) {
        let chars: Vec<char> = self.content.chars().collect();
        let line_start = line_start_before(&chars, self.caret.min(chars.len()));
        self.caret = if line_start == 0 { 0 } else { line_start_before(&chars, line_start - 1) };
    }

    /// Move to the start of the next line, or the end on the last line.
    pub fn caret_down(&mut self) {
        let from = self.caret.min(self.char_len());
        self.caret = match self.content.chars().skip(from).position(|c| c == '\n') {
            Some(offset) => from + offset + 1,
            None => self.char_len(),
        };
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }
}

/// Index just past the last `\n` strictly before `at`, or 0.
fn line_start_before(chars: &[char], at: usize) -> usize {
    chars[..at].iter().rposition(|&c| c == '\n').map_or(0, |i| i + 1)
}

/// A freehand stroke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Freeform {
    pub points: Vec<Point>,
    pub style: Style,
}

impl Freeform {
    /// Whether the stroke has enough points to paint a segment.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }
}

/// Any annotation, tagged by kind. Used where a single value must carry a
/// record of unknown kind (undo results, removed items).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Annotation {
    Rectangle(Shape),
    Line(Shape),
    Arrow(Shape),
    Ellipse(Shape),
    Text(Text),
    Freeform(Freeform),
    Highlight(Shape),
}

impl Annotation {
    /// Wrap a plain shape as the given kind. Returns `None` for text and
    /// freeform, which carry more than a shape.
    #[must_use]
    pub fn from_shape(kind: AnnotationKind, shape: Shape) -> Option<Self> {
        match kind {
            AnnotationKind::Rectangle => Some(Self::Rectangle(shape)),
            AnnotationKind::Line => Some(Self::Line(shape)),
            AnnotationKind::Arrow => Some(Self::Arrow(shape)),
            AnnotationKind::Ellipse => Some(Self::Ellipse(shape)),
            AnnotationKind::Highlight => Some(Self::Highlight(shape)),
            AnnotationKind::Text | AnnotationKind::Freeform => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Self::Rectangle(_) => AnnotationKind::Rectangle,
            Self::Line(_) => AnnotationKind::Line,
            Self::Arrow(_) => AnnotationKind::Arrow,
            Self::Ellipse(_) => AnnotationKind::Ellipse,
            Self::Text(_) => AnnotationKind::Text,
            Self::Freeform(_) => AnnotationKind::Freeform,
            Self::Highlight(_) => AnnotationKind::Highlight,
        }
    }
}

/// Names the annotation a gesture is currently editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSlot {
    pub kind: AnnotationKind,
    pub index: usize,
}

/// Owner of every annotation in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationStore {
    rectangles: Vec<Shape>,
    lines: Vec<Shape>,
    arrows: Vec<Shape>,
    ellipses: Vec<Shape>,
    texts: Vec<Text>,
    freeforms: Vec<Freeform>,
    highlights: Vec<Shape>,
    #[serde(skip)]
    active: Option<ActiveSlot>,
}

impl AnnotationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Typed reads ---

    #[must_use]
    pub fn rectangles(&self) -> &[Shape] {
        &self.rectangles
    }

    #[must_use]
    pub fn lines(&self) -> &[Shape] {
        &self.lines
    }

    #[must_use]
    pub fn arrows(&self) -> &[Shape] {
        &self.arrows
    }

    #[must_use]
    pub fn ellipses(&self) -> &[Shape] {
        &self.ellipses
    }

    #[must_use]
    pub fn texts(&self) -> &[Text] {
        &self.texts
    }

    #[must_use]
    pub fn freeforms(&self) -> &[Freeform] {
        &self.freeforms
    }

    #[must_use]
    pub fn highlights(&self) -> &[Shape] {
        &self.highlights
    }

    /// The shape collection for a plain-shape kind; `None` for text/freeform.
    #[must_use]
    pub fn shapes(&self, kind: AnnotationKind) -> Option<&[Shape]> {
        match kind {
            AnnotationKind::Rectangle => Some(&self.rectangles),
            AnnotationKind::Line => Some(&self.lines),
            AnnotationKind::Arrow => Some(&self.arrows),
            AnnotationKind::Ellipse => Some(&self.ellipses),
            AnnotationKind::Highlight => Some(&self.highlights),
            AnnotationKind::Text | AnnotationKind::Freeform => None,
        }
    }

    fn shapes_mut(&mut self, kind: AnnotationKind) -> Option<&mut Vec<Shape>> {
        match kind {
            AnnotationKind::Rectangle => Some(&mut self.rectangles),
            AnnotationKind::Line => Some(&mut self.lines),
            AnnotationKind::Arrow => Some(&mut self.arrows),
            AnnotationKind::Ellipse => Some(&mut self.ellipses),
            AnnotationKind::Highlight => Some(&mut self.highlights),
            AnnotationKind::Text | AnnotationKind::Freeform => None,
        }
    }

    /// Clone the annotation at `index` of `kind`'s collection.
    #[must_use]
    pub fn get(&self, kind: AnnotationKind, index: usize) -> Option<Annotation> {
        match kind {
            AnnotationKind::Text => self.texts.get(index).cloned().map(Annotation::Text),
            AnnotationKind::Freeform => self.freeforms.get(index).cloned().map(Annotation::Freeform),
            _ => {
                let shape = *self.shapes(kind)?.get(index)?;
                Annotation::from_shape(kind, shape)
            }
        }
    }

    // --- Counts ---

    /// Number of annotations of one kind.
    #[must_use]
    pub fn count(&self, kind: AnnotationKind) -> usize {
        match kind {
            AnnotationKind::Text => self.texts.len(),
            AnnotationKind::Freeform => self.freeforms.len(),
            _ => self.shapes(kind).map_or(0, <[Shape]>::len),
        }
    }

    /// Number of annotations across all kinds.
    #[must_use]
    pub fn total(&self) -> usize {
        AnnotationKind::ALL.iter().map(|k| self.count(*k)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    // --- Mutation ---

    /// Append an annotation to the end of its collection. Returns its index.
    pub fn push(&mut self, annotation: Annotation) -> usize {
        match annotation {
            Annotation::Rectangle(s) => push_index(&mut self.rectangles, s),
            Annotation::Line(s) => push_index(&mut self.lines, s),
            Annotation::Arrow(s) => push_index(&mut self.arrows, s),
            Annotation::Ellipse(s) => push_index(&mut self.ellipses, s),
            Annotation::Text(t) => push_index(&mut self.texts, t),
            Annotation::Freeform(f) => push_index(&mut self.freeforms, f),
            Annotation::Highlight(s) => push_index(&mut self.highlights, s),
        }
    }

    /// Remove the annotation at `index`. Out-of-range indices are a no-op.
    pub fn remove_at(&mut self, kind: AnnotationKind, index: usize) -> Option<Annotation> {
        if index >= self.count(kind) {
            return None;
        }
        let removed = match kind {
            AnnotationKind::Text => Annotation::Text(self.texts.remove(index)),
            AnnotationKind::Freeform => Annotation::Freeform(self.freeforms.remove(index)),
            _ => {
                let shape = self.shapes_mut(kind)?.remove(index);
                Annotation::from_shape(kind, shape)?
            }
        };
        self.fix_active_after_remove(kind, index);
        Some(removed)
    }

    /// Remove the most recent annotation of `kind`, if any.
    pub fn remove_last(&mut self, kind: AnnotationKind) -> Option<Annotation> {
        let len = self.count(kind);
        if len == 0 {
            return None;
        }
        self.remove_at(kind, len - 1)
    }

    /// Empty one collection.
    pub fn clear(&mut self, kind: AnnotationKind) {
        match kind {
            AnnotationKind::Text => self.texts.clear(),
            AnnotationKind::Freeform => self.freeforms.clear(),
            _ => {
                if let Some(shapes) = self.shapes_mut(kind) {
                    shapes.clear();
                }
            }
        }
        if self.active.is_some_and(|slot| slot.kind == kind) {
            self.active = None;
        }
    }

    /// Empty every collection and drop the active slot.
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    /// Move the annotation at `index` to the end of its collection so it
    /// paints on top. Returns its new index.
    pub fn move_to_end(&mut self, kind: AnnotationKind, index: usize) -> Option<usize> {
        let annotation = self.remove_at(kind, index)?;
        Some(self.push(annotation))
    }

    // --- Active slot ---

    #[must_use]
    pub fn active(&self) -> Option<ActiveSlot> {
        self.active
    }

    /// Mark an existing annotation as the one being edited. Ignored when the
    /// index is out of range.
    pub fn set_active(&mut self, kind: AnnotationKind, index: usize) {
        if index < self.count(kind) {
            self.active = Some(ActiveSlot { kind, index });
        }
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// The text record being edited, if the active slot names one.
    pub fn active_text_mut(&mut self) -> Option<&mut Text> {
        let slot = self.active?;
        if slot.kind != AnnotationKind::Text {
            return None;
        }
        self.texts.get_mut(slot.index)
    }

    /// The freeform stroke being extended, if the active slot names one.
    pub fn active_freeform_mut(&mut self) -> Option<&mut Freeform> {
        let slot = self.active?;
        if slot.kind != AnnotationKind::Freeform {
            return None;
        }
        self.freeforms.get_mut(slot.index)
    }

    fn fix_active_after_remove(&mut self, kind: AnnotationKind, removed: usize) {
        let Some(slot) = self.active else {
            return;
        };
        if slot.kind != kind {
            return;
        }
        if slot.index == removed {
            self.active = None;
        } else if slot.index > removed {
            self.active = Some(ActiveSlot { kind, index: slot.index - 1 });
        }
    }

    // --- Bulk ---

    /// Rewrite every stored coordinate through `map`. Used when a session is
    /// restored onto a different canvas size.
    pub fn map_points(&mut self, mut map: impl FnMut(Point) -> Point) {
        for shape in self
            .rectangles
            .iter_mut()
            .chain(self.lines.iter_mut())
            .chain(self.arrows.iter_mut())
            .chain(self.ellipses.iter_mut())
            .chain(self.highlights.iter_mut())
            .chain(self.texts.iter_mut().map(|t| &mut t.shape))
        {
            shape.start = map(shape.start);
            shape.end = map(shape.end);
        }
        for freeform in &mut self.freeforms {
            for p in &mut freeform.points {
                *p = map(*p);
            }
        }
    }
}

fn push_index<T>(items: &mut Vec<T>, item: T) -> usize {
    items.push(item);
    items.len() - 1
}
