//! Runtime tuning for the edit session, loaded from environment variables.
//!
//! Unset or unparsable values fall back to defaults. The density factor is
//! the exception: a wrong density silently misplaces every annotation, so a
//! malformed or non-positive value is an error. Zoom limits that would make
//! the view transform degenerate are rejected too.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_HIT_EDGE, DEFAULT_STROKE_WIDTH, DEFAULT_ZOOM_STEP, MIN_ZOOM};

pub const DENSITY_FACTOR_VAR: &str = "OVERLAY_DENSITY_FACTOR";
pub const MIN_HIT_EDGE_VAR: &str = "OVERLAY_MIN_HIT_EDGE";
pub const MAX_ZOOM_VAR: &str = "OVERLAY_MAX_ZOOM";
pub const ZOOM_STEP_VAR: &str = "OVERLAY_ZOOM_STEP";
pub const STROKE_WIDTH_VAR: &str = "OVERLAY_STROKE_WIDTH";

const DEFAULT_DENSITY_FACTOR: f64 = 1.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} is not a number: {value:?}")]
    Malformed { key: &'static str, value: String },
    #[error("{key} out of range: {value} ({expected})")]
    OutOfRange { key: &'static str, value: f64, expected: &'static str },
}

/// Tuning knobs for one overlay session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    /// Screen pixels per canvas pixel at zoom 1.0.
    pub density_factor: f64,
    /// Minimum hit-box edge in screen pixels at zoom 1.0.
    pub min_hit_edge: f64,
    /// Upper bound for the zoom scale.
    pub max_zoom: f64,
    /// Fractional zoom change per wheel notch.
    pub zoom_step: f64,
    /// Stroke width for new annotations.
    pub stroke_width: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            density_factor: DEFAULT_DENSITY_FACTOR,
            min_hit_edge: DEFAULT_MIN_HIT_EDGE,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl OverlayConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the density factor is malformed or any
    /// value is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var_os(key).map(|v| v.to_string_lossy().into_owned()))
    }

    /// Load from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`OverlayConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let density_factor = match lookup(DENSITY_FACTOR_VAR) {
            None => DEFAULT_DENSITY_FACTOR,
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::Malformed { key: DENSITY_FACTOR_VAR, value: raw.clone() })?,
        };
        let config = Self {
            density_factor,
            min_hit_edge: parse_or(&lookup, MIN_HIT_EDGE_VAR, DEFAULT_MIN_HIT_EDGE),
            max_zoom: parse_or(&lookup, MAX_ZOOM_VAR, DEFAULT_MAX_ZOOM),
            zoom_step: parse_or(&lookup, ZOOM_STEP_VAR, DEFAULT_ZOOM_STEP),
            stroke_width: parse_or(&lookup, STROKE_WIDTH_VAR, DEFAULT_STROKE_WIDTH),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every value keeps the view transform well defined.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] for the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // NaN fails every comparison and is rejected.
        check(DENSITY_FACTOR_VAR, self.density_factor, self.density_factor > 0.0, "must be > 0")?;
        check(MIN_HIT_EDGE_VAR, self.min_hit_edge, self.min_hit_edge >= 0.0, "must be >= 0")?;
        check(MAX_ZOOM_VAR, self.max_zoom, self.max_zoom >= MIN_ZOOM, "must be >= 1")?;
        check(ZOOM_STEP_VAR, self.zoom_step, self.zoom_step > 0.0 && self.zoom_step < 1.0, "must be in (0, 1)")
    }
}

/// Parse `key` from `lookup`, falling back to `default` when unset or malformed.
pub fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key).map_or(default, |v| v.trim().parse::<T>().unwrap_or(default))
}

fn check(key: &'static str, value: f64, ok: bool, expected: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { key, value, expected })
    }
}
