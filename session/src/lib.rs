//! Session file format: a versioned binary container for one annotated canvas.
//!
//! A file is an 8-byte header (magic `OVLY`, little-endian `u32` version)
//! followed by a protobuf body. The body carries the screen size the session
//! was recorded on, the canvas raster as PNG, format metadata, the pen state
//! and every annotation collection. Pan and zoom are never stored; a
//! restored session always opens at zoom 1.0.
//!
//! Restoring onto a different screen is handled by [`restore`].

use canvas::collab::RawImage;
use canvas::config::OverlayConfig;
use canvas::doc::{AnnotationKind, AnnotationStore, Style};
use canvas::engine::EngineCore;
use canvas::geometry::Size;
use prost::Message;
use serde::Serialize;
use tracing::debug;

pub mod raster;
pub mod rescale;
pub mod storage;
mod wire;

pub use rescale::{FitPolicy, RestoreTarget, RestoredSession, restore};

pub const SESSION_MAGIC: [u8; 4] = *b"OVLY";
pub const SESSION_VERSION: u32 = 1;
const HEADER_LEN: usize = SESSION_MAGIC.len() + std::mem::size_of::<u32>();

/// Error returned by the session codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The bytes do not start with the session magic.
    #[error("not a session file")]
    BadMagic,
    /// The header names a format version this build cannot read.
    #[error("unsupported session version {0} (expected {SESSION_VERSION})")]
    UnsupportedVersion(u32),
    /// The body is not a valid protobuf session message.
    #[error("failed to decode session body: {0}")]
    Decode(#[from] prost::DecodeError),
    /// The canvas raster could not be encoded or decoded.
    #[error("canvas image error: {0}")]
    Image(#[from] image::ImageError),
    /// A required field is absent from the body.
    #[error("session is missing {0}")]
    MissingField(&'static str),
    /// A field decoded but holds a value the session cannot use.
    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Everything persisted for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionFile {
    /// Logical screen size the session was recorded on.
    pub screen_size: Size,
    /// The canvas raster in raw pixels.
    pub canvas: RawImage,
    /// On-screen extent of the canvas at zoom 1.0 when recorded.
    pub canvas_original_size: Size,
    /// Extension used when exporting the canvas as an image.
    pub image_extension: String,
    /// Extension used when recording video.
    pub video_extension: String,
    pub live_mode: bool,
    pub draw_mode: AnnotationKind,
    pub style: Style,
    pub store: AnnotationStore,
    /// Screen pixels per canvas pixel when recorded.
    pub density_factor: f64,
}

impl SessionFile {
    /// A session with no annotations over `canvas`.
    #[must_use]
    pub fn new(canvas: RawImage, screen_size: Size, density_factor: f64) -> Self {
        let canvas_original_size = canvas.size().scale(density_factor, density_factor);
        Self {
            screen_size,
            canvas,
            canvas_original_size,
            image_extension: storage::DEFAULT_IMAGE_EXTENSION.to_owned(),
            video_extension: storage::DEFAULT_VIDEO_EXTENSION.to_owned(),
            live_mode: false,
            draw_mode: AnnotationKind::default(),
            style: Style::default(),
            store: AnnotationStore::new(),
            density_factor,
        }
    }

    /// Snapshot a running session. The canvas must have been frozen or
    /// loaded; a live desktop has nothing to persist.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingField`] when the engine has no canvas.
    pub fn from_engine(engine: &EngineCore, screen_size: Size) -> Result<Self, CodecError> {
        let canvas = engine.canvas().cloned().ok_or(CodecError::MissingField("canvas"))?;
        Ok(Self {
            screen_size,
            canvas,
            canvas_original_size: engine.camera.canvas_original_size,
            image_extension: storage::DEFAULT_IMAGE_EXTENSION.to_owned(),
            video_extension: storage::DEFAULT_VIDEO_EXTENSION.to_owned(),
            live_mode: engine.live_mode(),
            draw_mode: engine.draw_mode(),
            style: engine.style(),
            store: engine.store.clone(),
            density_factor: engine.config().density_factor,
        })
    }

    /// Build an engine that continues this session.
    #[must_use]
    pub fn into_engine(self, config: OverlayConfig, viewport: Size) -> EngineCore {
        let mut engine = EngineCore::with_config(config);
        engine.set_viewport(viewport);
        engine.set_draw_mode(self.draw_mode);
        engine.set_style(self.style);
        engine.load(self.store, Some(self.canvas), self.live_mode);
        engine
    }

    /// Header and counts, for listing.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            version: SESSION_VERSION,
            screen: self.screen_size,
            canvas: self.canvas.size(),
            canvas_original: self.canvas_original_size,
            density_factor: self.density_factor,
            image_extension: self.image_extension.clone(),
            video_extension: self.video_extension.clone(),
            live_mode: self.live_mode,
            draw_mode: self.draw_mode,
            rectangles: self.store.count(AnnotationKind::Rectangle),
            lines: self.store.count(AnnotationKind::Line),
            arrows: self.store.count(AnnotationKind::Arrow),
            ellipses: self.store.count(AnnotationKind::Ellipse),
            texts: self.store.count(AnnotationKind::Text),
            freeforms: self.store.count(AnnotationKind::Freeform),
            highlights: self.store.count(AnnotationKind::Highlight),
        }
    }
}

/// Printable description of a session file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub version: u32,
    pub screen: Size,
    pub canvas: Size,
    pub canvas_original: Size,
    pub density_factor: f64,
    pub image_extension: String,
    pub video_extension: String,
    pub live_mode: bool,
    pub draw_mode: AnnotationKind,
    pub rectangles: usize,
    pub lines: usize,
    pub arrows: usize,
    pub ellipses: usize,
    pub texts: usize,
    pub freeforms: usize,
    pub highlights: usize,
}

/// Encode a session into header + protobuf bytes.
///
/// Transient annotations (empty text, freeform strokes with fewer than two
/// points) are left out.
///
/// # Errors
///
/// Returns [`CodecError::Image`] when the canvas cannot be encoded as PNG.
pub fn encode_session(file: &SessionFile) -> Result<Vec<u8>, CodecError> {
    let png = raster::encode_png(&file.canvas)?;
    let body = wire::session_to_wire(file, png);

    let mut out = Vec::with_capacity(HEADER_LEN + body.encoded_len());
    out.extend_from_slice(&SESSION_MAGIC);
    out.extend_from_slice(&SESSION_VERSION.to_le_bytes());
    body.encode(&mut out)
        .map_err(|e| CodecError::InvalidField { field: "body", value: e.to_string() })?;
    debug!(bytes = out.len(), annotations = file.store.total(), "session encoded");
    Ok(out)
}

/// Decode header + protobuf bytes into a session.
///
/// Nothing is returned unless every field decodes.
///
/// # Errors
///
/// Returns [`CodecError::BadMagic`] or [`CodecError::UnsupportedVersion`]
/// for a foreign header, [`CodecError::Decode`] for a malformed body, and
/// [`CodecError::MissingField`] / [`CodecError::InvalidField`] for a body
/// that decodes but is incomplete.
pub fn decode_session(bytes: &[u8]) -> Result<SessionFile, CodecError> {
    let version = read_header(bytes)?;
    if version != SESSION_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    let body = wire::WireSession::decode(&bytes[HEADER_LEN..])?;
    wire::session_from_wire(body)
}

/// Validate the magic and return the format version.
///
/// # Errors
///
/// Returns [`CodecError::BadMagic`] when the bytes are too short or the magic
/// does not match.
pub fn read_header(bytes: &[u8]) -> Result<u32, CodecError> {
    if bytes.len() < HEADER_LEN || !bytes.starts_with(&SESSION_MAGIC) {
        return Err(CodecError::BadMagic);
    }
    let mut version = [0_u8; 4];
    version.copy_from_slice(&bytes[SESSION_MAGIC.len()..HEADER_LEN]);
    Ok(u32::from_le_bytes(version))
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
