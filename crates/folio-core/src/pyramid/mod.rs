pub mod bander;
pub mod resample;

use image::{imageops, RgbImage};
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::io::lazy::LazyImage;
use crate::io::source::SourceImage;
use crate::progress::{BuildStage, NoProgress, ProgressReporter};

use bander::{BandStats, HugeImageBander};
use resample::{reduced_size, resize};

/// One raster of the pyramid.
#[derive(Clone, Debug)]
pub struct PyramidLevel {
    pub image: RgbImage,
    /// Size of this level relative to the original image.
    pub scale: f64,
}

impl PyramidLevel {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// A fully built pyramid for one source image.
#[derive(Clone, Debug)]
pub struct Pyramid {
    levels: Vec<PyramidLevel>,
    source_width: u32,
    source_height: u32,
    /// Scale of level 0 relative to the original (1.0 unless banded down).
    base_scale: f64,
    reduction: f64,
    /// Kept for full-resolution re-reads of huge images.
    lazy: Option<LazyImage>,
    band_stats: Option<BandStats>,
}

impl Pyramid {
    pub fn levels(&self) -> &[PyramidLevel] {
        &self.levels
    }

    pub fn level(&self, index: usize) -> &PyramidLevel {
        &self.levels[index.min(self.levels.len() - 1)]
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn base(&self) -> &PyramidLevel {
        &self.levels[0]
    }

    /// Dimensions of the original image.
    pub fn source_dimensions(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    pub fn base_scale(&self) -> f64 {
        self.base_scale
    }

    pub fn reduction(&self) -> f64 {
        self.reduction
    }

    /// True when level 0 was banded down from a lazily read source.
    pub fn is_huge(&self) -> bool {
        self.lazy.is_some()
    }

    pub fn band_stats(&self) -> Option<BandStats> {
        self.band_stats
    }

    /// Bytes held by all levels.
    pub fn memory_bytes(&self) -> usize {
        self.levels.iter().map(|l| l.image.as_raw().len()).sum()
    }

    /// Crop `[x0, x1) x [y0, y1)` of the original image at full resolution.
    ///
    /// Huge images are re-read from disk, touching only rows `y0 .. y1`.
    pub fn crop_full(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> Result<RgbImage> {
        let x1 = x1.min(self.source_width);
        let y1 = y1.min(self.source_height);
        if x0 >= x1 || y0 >= y1 {
            return Err(ViewerError::InvalidDimensions {
                width: x1.saturating_sub(x0),
                height: y1.saturating_sub(y0),
            });
        }
        match &self.lazy {
            Some(lazy) => lazy.read_region(x0, y0, x1, y1),
            None => Ok(imageops::crop_imm(&self.levels[0].image, x0, y0, x1 - x0, y1 - y0)
                .to_image()),
        }
    }
}

/// Builds a [`Pyramid`] from a [`SourceImage`].
#[derive(Clone, Debug)]
pub struct PyramidBuilder {
    config: ViewerConfig,
}

impl PyramidBuilder {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn build(&self, source: SourceImage) -> Result<Pyramid> {
        self.build_with(source, &NoProgress, &CancellationToken::new())
    }

    /// Build with progress reporting, stopping early with `Cancelled`.
    pub fn build_with(
        &self,
        source: SourceImage,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Pyramid> {
        let (source_width, source_height) = source.dimensions();
        if source_width == 0 || source_height == 0 {
            return Err(ViewerError::InvalidDimensions {
                width: source_width,
                height: source_height,
            });
        }

        let huge = source.pixel_count() > self.config.huge_pixel_count();
        let (base, base_scale, lazy, band_stats) = match source {
            SourceImage::Lazy(lazy) if huge => {
                let bander = HugeImageBander::from_config(&self.config);
                let (base, stats) =
                    bander.downsample_to_base(&lazy, self.config.huge_side, progress, cancel)?;
                let base_scale =
                    self.config.huge_side as f64 / source_width.max(source_height) as f64;
                (base, base_scale, Some(lazy), Some(stats))
            }
            SourceImage::Lazy(lazy) => (lazy.read_band(0, lazy.height())?, 1.0, None, None),
            SourceImage::Decoded(img) => (img, 1.0, None, None),
        };

        let levels = self.build_levels(base, base_scale, progress, cancel)?;
        info!(
            source_width,
            source_height,
            levels = levels.len(),
            base_width = levels[0].width(),
            base_height = levels[0].height(),
            huge = lazy.is_some(),
            "Pyramid built"
        );

        Ok(Pyramid {
            levels,
            source_width,
            source_height,
            base_scale,
            reduction: self.config.reduction,
            lazy,
            band_stats,
        })
    }

    /// Halve `base` repeatedly until both sides are within the ceiling.
    pub fn build_levels(
        &self,
        base: RgbImage,
        base_scale: f64,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Vec<PyramidLevel>> {
        let plan = self.plan_level_sizes(base.width(), base.height());
        progress.begin_stage(BuildStage::Levels, Some(plan.len()));

        let mut levels = Vec::with_capacity(plan.len());
        levels.push(PyramidLevel {
            image: base,
            scale: base_scale,
        });

        let mut scale = base_scale;
        for (i, &(w, h)) in plan.iter().enumerate().skip(1) {
            cancel.check()?;
            scale /= self.config.reduction;
            let previous = &levels[i - 1].image;
            let image = resize(previous, w, h, self.config.pyramid_filter)?;
            debug!(level = i, width = w, height = h, "Pyramid level");
            levels.push(PyramidLevel { image, scale });
            progress.advance(i + 1);
        }

        progress.finish_stage();
        Ok(levels)
    }

    /// Sizes of every level for a base of `width` x `height`, base first.
    pub fn plan_level_sizes(&self, width: u32, height: u32) -> Vec<(u32, u32)> {
        let ceiling = self.config.pyramid_ceiling;
        let mut sizes = vec![(width, height)];
        let (mut w, mut h) = (width, height);
        while w > ceiling || h > ceiling {
            let (nw, nh) = reduced_size(w, h, self.config.reduction);
            if (nw, nh) == (w, h) {
                break;
            }
            w = nw;
            h = nh;
            sizes.push((w, h));
        }
        sizes
    }
}
