//! Protobuf body of a session file and its mapping to the domain types.
//!
//! Field tags follow the on-disk order: screen size, canvas, canvas original
//! size, format metadata, mode flags, pen, the seven collections, density.
//! Tags are never reused; new fields get new tags.

use canvas::doc::{Annotation, AnnotationKind, AnnotationStore, Color, Freeform, Shape, Style, Text};
use canvas::geometry::{Point, Size};
use prost::Message;

use crate::{CodecError, SessionFile, raster};

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;

#[derive(Clone, PartialEq, Message)]
pub(crate) struct WireSession {
    #[prost(message, optional, tag = "1")]
    screen_size: Option<WireSize>,
    #[prost(bytes = "vec", tag = "2")]
    canvas_png: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    canvas_original_size: Option<WireSize>,
    #[prost(string, tag = "4")]
    image_extension: String,
    #[prost(string, tag = "5")]
    video_extension: String,
    #[prost(bool, tag = "6")]
    live_mode: bool,
    #[prost(enumeration = "WireKind", tag = "7")]
    draw_mode: i32,
    #[prost(message, optional, tag = "8")]
    style: Option<WireStyle>,
    #[prost(message, repeated, tag = "9")]
    rectangles: Vec<WireShape>,
    #[prost(message, repeated, tag = "10")]
    lines: Vec<WireShape>,
    #[prost(message, repeated, tag = "11")]
    arrows: Vec<WireShape>,
    #[prost(message, repeated, tag = "12")]
    ellipses: Vec<WireShape>,
    #[prost(message, repeated, tag = "13")]
    texts: Vec<WireText>,
    #[prost(message, repeated, tag = "14")]
    freeforms: Vec<WireFreeform>,
    #[prost(message, repeated, tag = "15")]
    highlights: Vec<WireShape>,
    #[prost(double, tag = "16")]
    density_factor: f64,
}

#[derive(Clone, Copy, PartialEq, Message)]
struct WireSize {
    #[prost(int32, tag = "1")]
    width: i32,
    #[prost(int32, tag = "2")]
    height: i32,
}

#[derive(Clone, Copy, PartialEq, Message)]
struct WirePoint {
    #[prost(sint32, tag = "1")]
    x: i32,
    #[prost(sint32, tag = "2")]
    y: i32,
}

#[derive(Clone, Copy, PartialEq, Message)]
struct WireStyle {
    /// `0xRRGGBBAA`
    #[prost(fixed32, tag = "1")]
    color: u32,
    #[prost(uint32, tag = "2")]
    stroke_width: u32,
}

#[derive(Clone, Copy, PartialEq, Message)]
struct WireShape {
    #[prost(message, optional, tag = "1")]
    start: Option<WirePoint>,
    #[prost(message, optional, tag = "2")]
    end: Option<WirePoint>,
    #[prost(message, optional, tag = "3")]
    style: Option<WireStyle>,
}

#[derive(Clone, PartialEq, Message)]
struct WireText {
    #[prost(message, optional, tag = "1")]
    shape: Option<WireShape>,
    #[prost(uint64, tag = "2")]
    caret: u64,
    #[prost(string, tag = "3")]
    content: String,
}

#[derive(Clone, PartialEq, Message)]
struct WireFreeform {
    #[prost(message, repeated, tag = "1")]
    points: Vec<WirePoint>,
    #[prost(message, optional, tag = "2")]
    style: Option<WireStyle>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
enum WireKind {
    Rectangle = 0,
    Line = 1,
    Arrow = 2,
    Ellipse = 3,
    Text = 4,
    Freeform = 5,
    Highlight = 6,
}

impl From<AnnotationKind> for WireKind {
    fn from(kind: AnnotationKind) -> Self {
        match kind {
            AnnotationKind::Rectangle => Self::Rectangle,
            AnnotationKind::Line => Self::Line,
            AnnotationKind::Arrow => Self::Arrow,
            AnnotationKind::Ellipse => Self::Ellipse,
            AnnotationKind::Text => Self::Text,
            AnnotationKind::Freeform => Self::Freeform,
            AnnotationKind::Highlight => Self::Highlight,
        }
    }
}

impl From<WireKind> for AnnotationKind {
    fn from(kind: WireKind) -> Self {
        match kind {
            WireKind::Rectangle => Self::Rectangle,
            WireKind::Line => Self::Line,
            WireKind::Arrow => Self::Arrow,
            WireKind::Ellipse => Self::Ellipse,
            WireKind::Text => Self::Text,
            WireKind::Freeform => Self::Freeform,
            WireKind::Highlight => Self::Highlight,
        }
    }
}

// --- Domain → wire ---

pub(crate) fn session_to_wire(file: &SessionFile, canvas_png: Vec<u8>) -> WireSession {
    let store = &file.store;
    WireSession {
        screen_size: Some(size_to_wire(file.screen_size)),
        canvas_png,
        canvas_original_size: Some(size_to_wire(file.canvas_original_size)),
        image_extension: file.image_extension.clone(),
        video_extension: file.video_extension.clone(),
        live_mode: file.live_mode,
        draw_mode: WireKind::from(file.draw_mode) as i32,
        style: Some(style_to_wire(file.style)),
        rectangles: shapes_to_wire(store.rectangles()),
        lines: shapes_to_wire(store.lines()),
        arrows: shapes_to_wire(store.arrows()),
        ellipses: shapes_to_wire(store.ellipses()),
        texts: store
            .texts()
            .iter()
            .filter(|t| !t.content.is_empty())
            .map(|t| WireText {
                shape: Some(shape_to_wire(&t.shape)),
                caret: t.caret as u64,
                content: t.content.clone(),
            })
            .collect(),
        freeforms: store
            .freeforms()
            .iter()
            .filter(|f| f.is_drawable())
            .map(|f| WireFreeform {
                points: f.points.iter().copied().map(point_to_wire).collect(),
                style: Some(style_to_wire(f.style)),
            })
            .collect(),
        highlights: shapes_to_wire(store.highlights()),
        density_factor: file.density_factor,
    }
}

fn size_to_wire(s: Size) -> WireSize {
    WireSize { width: s.width, height: s.height }
}

fn point_to_wire(p: Point) -> WirePoint {
    WirePoint { x: p.x, y: p.y }
}

fn style_to_wire(s: Style) -> WireStyle {
    WireStyle { color: s.color.to_u32(), stroke_width: s.stroke_width }
}

fn shape_to_wire(s: &Shape) -> WireShape {
    WireShape {
        start: Some(point_to_wire(s.start)),
        end: Some(point_to_wire(s.end)),
        style: Some(style_to_wire(s.style)),
    }
}

fn shapes_to_wire(shapes: &[Shape]) -> Vec<WireShape> {
    shapes.iter().map(shape_to_wire).collect()
}

// --- Wire → domain ---

pub(crate) fn session_from_wire(wire: WireSession) -> Result<SessionFile, CodecError> {
    let screen_size = size_from_wire(wire.screen_size, "screen size")?;
    let canvas_original_size = size_from_wire(wire.canvas_original_size, "canvas original size")?;
    if wire.canvas_png.is_empty() {
        return Err(CodecError::MissingField("canvas"));
    }
    let canvas = raster::decode_png(&wire.canvas_png)?;
    let draw_mode = WireKind::try_from(wire.draw_mode)
        .map_err(|_| CodecError::InvalidField { field: "draw mode", value: wire.draw_mode.to_string() })?;
    let style = style_from_wire(wire.style)?;
    if !(wire.density_factor > 0.0) {
        return Err(CodecError::InvalidField { field: "density factor", value: wire.density_factor.to_string() });
    }

    let mut store = AnnotationStore::new();
    push_shapes(&mut store, AnnotationKind::Rectangle, wire.rectangles)?;
    push_shapes(&mut store, AnnotationKind::Line, wire.lines)?;
    push_shapes(&mut store, AnnotationKind::Arrow, wire.arrows)?;
    push_shapes(&mut store, AnnotationKind::Ellipse, wire.ellipses)?;
    // Transient records are never persisted; drop any a foreign writer left in.
    for text in wire.texts {
        let text = text_from_wire(text)?;
        if !text.content.is_empty() {
            store.push(Annotation::Text(text));
        }
    }
    for freeform in wire.freeforms {
        let freeform = Freeform {
            points: freeform.points.into_iter().map(point_from_wire).collect(),
            style: style_from_wire(freeform.style)?,
        };
        if freeform.is_drawable() {
            store.push(Annotation::Freeform(freeform));
        }
    }
    push_shapes(&mut store, AnnotationKind::Highlight, wire.highlights)?;

    Ok(SessionFile {
        screen_size,
        canvas,
        canvas_original_size,
        image_extension: wire.image_extension,
        video_extension: wire.video_extension,
        live_mode: wire.live_mode,
        draw_mode: draw_mode.into(),
        style,
        store,
        density_factor: wire.density_factor,
    })
}

fn size_from_wire(size: Option<WireSize>, field: &'static str) -> Result<Size, CodecError> {
    let size = size.ok_or(CodecError::MissingField(field))?;
    if size.width <= 0 || size.height <= 0 {
        return Err(CodecError::InvalidField { field, value: format!("{}x{}", size.width, size.height) });
    }
    Ok(Size::new(size.width, size.height))
}

fn point_from_wire(p: WirePoint) -> Point {
    Point::new(p.x, p.y)
}

fn style_from_wire(style: Option<WireStyle>) -> Result<Style, CodecError> {
    let style = style.ok_or(CodecError::MissingField("style"))?;
    Ok(Style { color: Color::from_u32(style.color), stroke_width: style.stroke_width })
}

fn shape_from_wire(shape: Option<WireShape>) -> Result<Shape, CodecError> {
    let shape = shape.ok_or(CodecError::MissingField("shape"))?;
    let start = shape.start.ok_or(CodecError::MissingField("shape start"))?;
    let end = shape.end.ok_or(CodecError::MissingField("shape end"))?;
    Ok(Shape::new(point_from_wire(start), point_from_wire(end), style_from_wire(shape.style)?))
}

fn push_shapes(store: &mut AnnotationStore, kind: AnnotationKind, shapes: Vec<WireShape>) -> Result<(), CodecError> {
    for shape in shapes {
        let shape = shape_from_wire(Some(shape))?;
        if let Some(annotation) = Annotation::from_shape(kind, shape) {
            store.push(annotation);
        }
    }
    Ok(())
}

fn text_from_wire(text: WireText) -> Result<Text, CodecError> {
    let shape = shape_from_wire(text.shape)?;
    let len = text.content.chars().count();
    let caret = match usize::try_from(text.caret) {
        Ok(caret) if caret <= len => caret,
        _ => return Err(CodecError::InvalidField { field: "text caret", value: text.caret.to_string() }),
    };
    Ok(Text { shape, caret, content: text.content })
}
