//! Engine configuration.
//!
//! The host may pass a JSON object at mount time; every field is optional and
//! falls back to the defaults in [`crate::consts`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, MARQUEE_DASH_PX, MARQUEE_LINE_PX, MAX_ZOOM, MIN_ZOOM,
    SELECTION_COLOR, SELECTION_LINE_PX, SUBMIT_URL, ZOOM_STEP,
};

/// Error returned by [`Config::from_json`] and [`Config::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The input was not a valid JSON config object.
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    /// Zoom limits are non-positive or inverted.
    #[error("invalid zoom range: min {min} max {max}")]
    ZoomRange { min: f64, max: f64 },
    /// The zoom step is not a positive number.
    #[error("zoom step must be positive, got {0}")]
    ZoomStep(f64),
    /// The default stroke width is not a positive number.
    #[error("stroke width must be positive, got {0}")]
    StrokeWidth(f64),
}

/// Tunable engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lower zoom bound.
    pub min_zoom: f64,
    /// Upper zoom bound.
    pub max_zoom: f64,
    /// Zoom increment per discrete zoom action.
    pub zoom_step: f64,
    /// CSS color of new pencil strokes.
    pub stroke_color: String,
    /// Width of new pencil strokes in logical units.
    pub stroke_width: f64,
    /// Marquee dash pattern in screen pixels.
    pub marquee_dash_px: [f64; 2],
    /// Marquee outline width in screen pixels.
    pub marquee_line_px: f64,
    /// Selection box outline width in screen pixels.
    pub selection_line_px: f64,
    /// CSS color of the marquee and selection boxes.
    pub selection_color: String,
    /// Endpoint used by the HTTP item sink.
    pub submit_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            stroke_color: DEFAULT_STROKE_COLOR.to_owned(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            marquee_dash_px: MARQUEE_DASH_PX,
            marquee_line_px: MARQUEE_LINE_PX,
            selection_line_px: SELECTION_LINE_PX,
            selection_color: SELECTION_COLOR.to_owned(),
            submit_url: SUBMIT_URL.to_owned(),
        }
    }
}

impl Config {
    /// Parse and validate a JSON config object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the other variants
    /// when the parsed values are inconsistent.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the numeric settings are usable.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::ZoomRange { min: self.min_zoom, max: self.max_zoom });
        }
        if self.zoom_step <= 0.0 || !self.zoom_step.is_finite() {
            return Err(ConfigError::ZoomStep(self.zoom_step));
        }
        if self.stroke_width <= 0.0 || !self.stroke_width.is_finite() {
            return Err(ConfigError::StrokeWidth(self.stroke_width));
        }
        Ok(())
    }
}
