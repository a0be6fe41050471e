use std::fmt;
use std::path::Path;
use std::time::Duration;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BAND_HEIGHT, DEFAULT_HUGE_SIDE, DEFAULT_KEY_PAN_STEP, DEFAULT_MIN_VISIBLE_SIDE,
    DEFAULT_PYRAMID_CEILING, DEFAULT_RESIZE_DEBOUNCE_MS, DEFAULT_ZOOM_STEP, PYRAMID_REDUCTION,
};
use crate::error::{Result, ViewerError};

/// Resampling filter used when shrinking or enlarging rasters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
    /// Box filter that averages every source pixel covered by a target pixel.
    Area,
}

impl ResampleFilter {
    /// The `image` crate filter backing this choice, `None` for [`ResampleFilter::Area`].
    pub fn filter_type(self) -> Option<FilterType> {
        match self {
            Self::Nearest => Some(FilterType::Nearest),
            Self::Triangle => Some(FilterType::Triangle),
            Self::CatmullRom => Some(FilterType::CatmullRom),
            Self::Gaussian => Some(FilterType::Gaussian),
            Self::Lanczos3 => Some(FilterType::Lanczos3),
            Self::Area => None,
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => write!(f, "Nearest"),
            Self::Triangle => write!(f, "Triangle"),
            Self::CatmullRom => write!(f, "Catmull-Rom"),
            Self::Gaussian => write!(f, "Gaussian"),
            Self::Lanczos3 => write!(f, "Lanczos3"),
            Self::Area => write!(f, "Area"),
        }
    }
}

/// Tunables of the pyramid viewer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Images with more than `huge_side * huge_side` pixels and a raw layout
    /// are banded down to fit a `huge_side` square.
    pub huge_side: u32,
    /// Rows per band when reading a huge image.
    pub band_height: u32,
    /// Pyramid generation stops once both sides are at most this size.
    pub pyramid_ceiling: u32,
    /// Reduction degree between pyramid levels.
    pub reduction: f64,
    /// Multiplier of one zoom step.
    pub zoom_step: f64,
    /// Smallest on-screen length of the shorter image side.
    pub min_visible_side: f64,
    pub resize_debounce_ms: u64,
    /// Canvas pixels per arrow key press.
    pub key_pan_step: f64,
    /// Rebuild the image at canvas width once a resize burst settles.
    pub fit_width_on_resize: bool,
    /// Filter for pyramid levels and banded downsampling.
    pub pyramid_filter: ResampleFilter,
    /// Filter for the per-frame resize of the visible crop.
    pub display_filter: ResampleFilter,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            huge_side: DEFAULT_HUGE_SIDE,
            band_height: DEFAULT_BAND_HEIGHT,
            pyramid_ceiling: DEFAULT_PYRAMID_CEILING,
            reduction: PYRAMID_REDUCTION,
            zoom_step: DEFAULT_ZOOM_STEP,
            min_visible_side: DEFAULT_MIN_VISIBLE_SIDE,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            key_pan_step: DEFAULT_KEY_PAN_STEP,
            fit_width_on_resize: true,
            pyramid_filter: ResampleFilter::Lanczos3,
            display_filter: ResampleFilter::Lanczos3,
        }
    }
}

impl ViewerConfig {
    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ViewerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ViewerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.huge_side == 0 {
            return Err(ViewerError::Config("huge_side must be > 0".into()));
        }
        if self.band_height == 0 {
            return Err(ViewerError::Config("band_height must be > 0".into()));
        }
        if self.pyramid_ceiling == 0 {
            return Err(ViewerError::Config("pyramid_ceiling must be > 0".into()));
        }
        if self.reduction <= 1.0 {
            return Err(ViewerError::Config("reduction must be > 1".into()));
        }
        if self.zoom_step <= 1.0 {
            return Err(ViewerError::Config("zoom_step must be > 1".into()));
        }
        Ok(())
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Pixel count above which an image counts as huge.
    pub fn huge_pixel_count(&self) -> u64 {
        self.huge_side as u64 * self.huge_side as u64
    }
}
