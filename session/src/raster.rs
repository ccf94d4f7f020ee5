//! Canvas raster helpers: PNG encode/decode, resampling and letterboxing.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use std::io::Cursor;

use canvas::collab::RawImage;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::CodecError;

/// Encode a raster as PNG bytes.
///
/// # Errors
///
/// Returns [`CodecError::Image`] when the encoder fails.
pub fn encode_png(raster: &RawImage) -> Result<Vec<u8>, CodecError> {
    let image = to_rgba_image(raster.clone())?;
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image).write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Decode PNG bytes into a raster.
///
/// # Errors
///
/// Returns [`CodecError::Image`] when the bytes are not a readable PNG.
pub fn decode_png(bytes: &[u8]) -> Result<RawImage, CodecError> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();
    from_rgba_image(image)
}

/// Resample `raster` to `width` x `height` with bilinear filtering.
///
/// # Errors
///
/// Fails only if the raster's buffer is inconsistent with its size.
pub fn resize(raster: &RawImage, width: u32, height: u32) -> Result<RawImage, CodecError> {
    if raster.width() == width && raster.height() == height {
        return Ok(raster.clone());
    }
    let image = to_rgba_image(raster.clone())?;
    from_rgba_image(imageops::resize(&image, width.max(1), height.max(1), FilterType::Triangle))
}

/// Place `raster` on a transparent `width` x `height` canvas with its
/// top-left corner at (`left`, `top`).
///
/// # Errors
///
/// Fails only if the raster's buffer is inconsistent with its size.
pub fn compose(raster: &RawImage, width: u32, height: u32, left: u32, top: u32) -> Result<RawImage, CodecError> {
    if raster.width() == width && raster.height() == height && left == 0 && top == 0 {
        return Ok(raster.clone());
    }
    let image = to_rgba_image(raster.clone())?;
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    imageops::overlay(&mut canvas, &image, i64::from(left), i64::from(top));
    from_rgba_image(canvas)
}

fn to_rgba_image(raster: RawImage) -> Result<RgbaImage, CodecError> {
    let (width, height) = (raster.width(), raster.height());
    RgbaImage::from_raw(width, height, raster.into_rgba())
        .ok_or_else(|| CodecError::InvalidField { field: "canvas", value: format!("{width}x{height}") })
}

fn from_rgba_image(image: RgbaImage) -> Result<RawImage, CodecError> {
    let (width, height) = image.dimensions();
    RawImage::new(width, height, image.into_raw())
        .map_err(|e| CodecError::InvalidField { field: "canvas", value: e.to_string() })
}
