//! Banded downsampling of images too large to decode in one piece.
//!
//! The source is read in horizontal bands of at most `band_height` rows. Each
//! band is resampled to its share of the output height and pasted into a
//! pre-allocated canvas, so only one band of source pixels is ever resident.

use image::{imageops, RgbImage};
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::config::{ResampleFilter, ViewerConfig};
use crate::error::Result;
use crate::io::lazy::LazyImage;
use crate::progress::{BuildStage, ProgressReporter};

use super::resample::resize;

/// Memory accounting of one banded pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BandStats {
    pub bands: usize,
    /// Rows in the tallest band read.
    pub tallest_band: u32,
    /// Largest number of source bytes resident at once.
    pub peak_band_bytes: usize,
}

/// Size of a `src_w` x `src_h` image fitted into a `side` x `side` square,
/// preserving aspect ratio.
pub fn letterbox_size(src_w: u32, src_h: u32, side: u32) -> (u32, u32) {
    let source_aspect = src_w as f64 / src_h as f64;
    let target_aspect = 1.0;
    let side_f = side as f64;

    if source_aspect == target_aspect {
        (side, side)
    } else if source_aspect > target_aspect {
        (side, ((side_f / source_aspect).round() as u32).max(1))
    } else {
        (((side_f * source_aspect).round() as u32).max(1), side)
    }
}

/// Produces a downsampled base level from a [`LazyImage`] band by band.
#[derive(Clone, Debug)]
pub struct HugeImageBander {
    band_height: u32,
    filter: ResampleFilter,
}

impl HugeImageBander {
    pub fn new(band_height: u32, filter: ResampleFilter) -> Self {
        Self {
            band_height: band_height.max(1),
            filter,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.band_height, config.pyramid_filter)
    }

    pub fn band_height(&self) -> u32 {
        self.band_height
    }

    /// Downsample into the letterboxed fit of a `target_side` square.
    pub fn downsample_to_base(
        &self,
        lazy: &LazyImage,
        target_side: u32,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<(RgbImage, BandStats)> {
        let (out_w, out_h) = letterbox_size(lazy.width(), lazy.height(), target_side);
        self.downsample_to(lazy, out_w, out_h, progress, cancel)
    }

    /// Downsample the whole source into an `out_w` x `out_h` raster.
    pub fn downsample_to(
        &self,
        lazy: &LazyImage,
        out_w: u32,
        out_h: u32,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<(RgbImage, BandStats)> {
        let (src_w, src_h) = lazy.dimensions();
        let out_w = out_w.max(1);
        let out_h = out_h.max(1);
        let k = out_h as f64 / src_h as f64;
        let total_bands = src_h.div_ceil(self.band_height) as usize;

        info!(
            src_w,
            src_h,
            out_w,
            out_h,
            band_height = self.band_height,
            bands = total_bands,
            "Banded downsampling"
        );
        progress.begin_stage(BuildStage::Banding, Some(total_bands));

        let mut canvas = RgbImage::new(out_w, out_h);
        let mut stats = BandStats::default();
        let mut y = 0u32;

        while y < src_h {
            cancel.check()?;

            let rows = self.band_height.min(src_h - y);
            let top = ((y as f64 * k).round() as u32).min(out_h);
            let bottom = (((y + rows) as f64 * k).round() as u32).min(out_h);

            let band = lazy.read_band(y, rows)?;
            stats.bands += 1;
            stats.tallest_band = stats.tallest_band.max(rows);
            stats.peak_band_bytes = stats.peak_band_bytes.max(lazy.band_bytes(rows));

            if bottom > top {
                let resized = resize(&band, out_w, bottom - top, self.filter)?;
                imageops::replace(&mut canvas, &resized, 0, top as i64);
            }
            debug!(band = stats.bands, y, rows, top, bottom, "Band pasted");

            y += rows;
            progress.advance(stats.bands);
        }

        progress.finish_stage();
        Ok((canvas, stats))
    }
}
