//! Collaborator interfaces: the pieces of the overlay that live outside the
//! core and are injected by the host.
//!
//! The core never captures the desktop, decodes image files, paints pixels or
//! runs an encoder itself. It talks to those facilities through the traits
//! here and only sees their results ([`RawImage`]s and success/failure).

#[cfg(test)]
#[path = "collab_test.rs"]
mod collab_test;

use std::path::Path;

use tracing::{debug, warn};

use crate::doc::Color;
use crate::engine::EngineCore;
use crate::geometry::{Point, Size};

#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    #[error("screen capture failed: {0}")]
    Capture(String),
    #[error("failed to load image {path}: {reason}")]
    Load { path: String, reason: String },
    #[error("render failed: {0}")]
    Render(String),
    #[error("encoder failed: {0}")]
    Encoder(String),
    #[error("pixel buffer is {len} bytes, expected {width}x{height}x4")]
    InvalidImage { width: u32, height: u32, len: usize },
}

/// An owned RGBA8 raster, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl RawImage {
    /// Wrap a pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CollabError::InvalidImage`] when `rgba` is not exactly
    /// `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CollabError> {
        let expected = (width as usize) * (height as usize) * 4;
        if rgba.len() != expected {
            return Err(CollabError::InvalidImage { width, height, len: rgba.len() });
        }
        Ok(Self { width, height, rgba })
    }

    /// A raster filled with one color.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let pixels = (width as usize) * (height as usize);
        let rgba = [color.r, color.g, color.b, color.a].repeat(pixels);
        Self { width, height, rgba }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a [`Size`].
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width as i32, self.height as i32)
    }

    #[must_use]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    #[must_use]
    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }

    /// Color of the pixel at `p`, or `None` outside the raster.
    #[must_use]
    pub fn pixel_at(&self, p: Point) -> Option<Color> {
        let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y)) else {
            return None;
        };
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.rgba.get(i..i + 4)?;
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }
}

/// Source of the raster that annotations are drawn over.
pub trait CanvasSource {
    /// Grab the current desktop.
    ///
    /// # Errors
    ///
    /// Returns [`CollabError::Capture`] when the display server refuses.
    fn capture(&mut self) -> Result<RawImage, CollabError>;

    /// Decode an image file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CollabError::Load`] when the file cannot be read or decoded.
    fn load_image(&mut self, path: &Path) -> Result<RawImage, CollabError>;
}

/// Paints the session state. Consumes core state, produces pixels.
pub trait Renderer {
    /// # Errors
    ///
    /// Returns [`CollabError::Render`] when the backend fails.
    fn paint(&mut self, session: &EngineCore) -> Result<(), CollabError>;
}

/// Video encoder fed with canvas frames.
pub trait Encoder {
    /// # Errors
    ///
    /// Returns [`CollabError::Encoder`] when the encoder cannot start.
    fn start(&mut self, resolution: Size) -> Result<(), CollabError>;

    /// # Errors
    ///
    /// Returns [`CollabError::Encoder`] when the frame is rejected.
    fn push_frame(&mut self, frame: &RawImage) -> Result<(), CollabError>;

    /// Flush and close the output. Called at most once per `start`.
    ///
    /// # Errors
    ///
    /// Returns [`CollabError::Encoder`] when the output could not be written.
    fn finish(&mut self) -> Result<(), CollabError>;
}

/// What a recording toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingEvent {
    Started,
    Finished,
}

/// Drives an [`Encoder`] from a single start/stop toggle.
#[derive(Debug)]
pub struct Recorder<E: Encoder> {
    encoder: E,
    recording: bool,
    frames: u64,
}

impl<E: Encoder> Recorder<E> {
    #[must_use]
    pub fn new(encoder: E) -> Self {
        Self { encoder, recording: false, frames: 0 }
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Frames pushed since the current recording started.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Start recording at `resolution`, or finish the running recording.
    ///
    /// The recorder counts as stopped as soon as `finish` is called, even if
    /// it fails, so one recording is never finished twice.
    ///
    /// # Errors
    ///
    /// Propagates the encoder's `start` or `finish` failure.
    pub fn toggle(&mut self, resolution: Size) -> Result<RecordingEvent, CollabError> {
        if self.recording {
            self.recording = false;
            let frames = self.frames;
            if let Err(e) = self.encoder.finish() {
                warn!(error = %e, frames, "recording finish failed");
                return Err(e);
            }
            debug!(frames, "recording finished");
            return Ok(RecordingEvent::Finished);
        }
        self.encoder.start(resolution)?;
        self.recording = true;
        self.frames = 0;
        debug!(width = resolution.width, height = resolution.height, "recording started");
        Ok(RecordingEvent::Started)
    }

    /// Feed one frame. Ignored while not recording.
    ///
    /// # Errors
    ///
    /// Propagates the encoder's `push_frame` failure.
    pub fn push(&mut self, frame: &RawImage) -> Result<(), CollabError> {
        if !self.recording {
            return Ok(());
        }
        self.encoder.push_frame(frame)?;
        self.frames += 1;
        Ok(())
    }

    /// The wrapped encoder.
    #[must_use]
    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}
