//! Resolution-aware restore.
//!
//! A session recorded on one screen is fitted onto another: the canvas is
//! resampled so one axis fills the new screen, centered on the other, and
//! every stored point is remapped as `margin + old * scale`. Scale factors
//! come from the decoded raster, not the recorded screen size, so a density
//! change between the two machines is absorbed here.

#[cfg(test)]
#[path = "rescale_test.rs"]
mod rescale_test;

use canvas::geometry::{Point, Size, round_half_away};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{CodecError, SessionFile, raster};

/// Axis the restored canvas is stretched to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitPolicy {
    Width,
    Height,
}

impl FitPolicy {
    /// Fit height for landscape rasters, width otherwise.
    #[must_use]
    pub fn auto(image: Size) -> Self {
        if image.width > image.height { Self::Height } else { Self::Width }
    }
}

/// The screen a session is being restored onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestoreTarget {
    pub screen_size: Size,
    pub density_factor: f64,
    /// `None` picks with [`FitPolicy::auto`].
    pub fit: Option<FitPolicy>,
}

impl RestoreTarget {
    #[must_use]
    pub fn new(screen_size: Size, density_factor: f64) -> Self {
        Self { screen_size, density_factor, fit: None }
    }

    #[must_use]
    pub fn with_fit(mut self, fit: FitPolicy) -> Self {
        self.fit = Some(fit);
        self
    }

    /// Target extent in raw canvas pixels.
    fn raw_extent(&self) -> Size {
        let inv = 1.0 / self.density_factor;
        self.screen_size.scale(inv, inv)
    }
}

/// A session fitted to its target, with the transform that was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredSession {
    pub file: SessionFile,
    pub scale_x: f64,
    pub scale_y: f64,
    pub margin_left: i32,
    pub margin_top: i32,
    /// `None` when the screens matched and nothing was rescaled.
    pub fit: Option<FitPolicy>,
}

/// Fit `file` onto `target`.
///
/// # Errors
///
/// Returns [`CodecError::InvalidField`] for an empty target screen, a
/// non-positive density or an empty canvas, and [`CodecError::Image`] if
/// resampling fails.
pub fn restore(mut file: SessionFile, target: RestoreTarget) -> Result<RestoredSession, CodecError> {
    if file.screen_size == target.screen_size {
        return Ok(RestoredSession { file, scale_x: 1.0, scale_y: 1.0, margin_left: 0, margin_top: 0, fit: None });
    }
    if target.screen_size.is_empty() {
        return Err(CodecError::InvalidField {
            field: "target screen",
            value: format!("{}x{}", target.screen_size.width, target.screen_size.height),
        });
    }
    if !(target.density_factor > 0.0) {
        return Err(CodecError::InvalidField { field: "density factor", value: target.density_factor.to_string() });
    }
    let old = file.canvas.size();
    if old.is_empty() {
        return Err(CodecError::InvalidField { field: "canvas", value: format!("{}x{}", old.width, old.height) });
    }

    let fit = target.fit.unwrap_or_else(|| FitPolicy::auto(old));
    let raw = target.raw_extent();
    let new = fitted_size(old, raw, fit);
    let scale_x = f64::from(new.width) / f64::from(old.width);
    let scale_y = f64::from(new.height) / f64::from(old.height);
    let margin_left = ((raw.width - new.width) / 2).max(0);
    let margin_top = ((raw.height - new.height) / 2).max(0);

    let resized = raster::resize(&file.canvas, new.width as u32, new.height as u32)?;
    file.canvas = raster::compose(
        &resized,
        new.width.max(raw.width) as u32,
        new.height.max(raw.height) as u32,
        margin_left as u32,
        margin_top as u32,
    )?;

    let margin = Point::new(margin_left, margin_top);
    file.store.map_points(|p| margin + p.scale(scale_x, scale_y));
    file.store.clear_active();

    info!(
        from = ?file.screen_size,
        to = ?target.screen_size,
        ?fit,
        scale_x,
        scale_y,
        margin_left,
        margin_top,
        "session rescaled"
    );

    file.screen_size = target.screen_size;
    file.density_factor = target.density_factor;
    file.canvas_original_size = file.canvas.size().scale(target.density_factor, target.density_factor);

    Ok(RestoredSession { file, scale_x, scale_y, margin_left, margin_top, fit: Some(fit) })
}

fn fitted_size(old: Size, raw: Size, fit: FitPolicy) -> Size {
    let (w, h) = (f64::from(old.width), f64::from(old.height));
    let size = match fit {
        FitPolicy::Width => Size::new(raw.width, round_half_away(h * f64::from(raw.width) / w)),
        FitPolicy::Height => Size::new(round_half_away(w * f64::from(raw.height) / h), raw.height),
    };
    Size::new(size.width.max(1), size.height.max(1))
}
