use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use folio_core::io::lazy::LazyImage;
use folio_core::io::source::read_dimensions;
use folio_core::pyramid::bander::letterbox_size;
use folio_core::pyramid::PyramidBuilder;

use super::load_config;
use crate::summary::{print_image_summary, ImageSummary};

#[derive(Args)]
pub struct InfoArgs {
    /// Input image (png, jpg, tif, ppm)
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let (width, height) = read_dimensions(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let lazy = LazyImage::probe(&args.file)?;

    let pixels = width as u64 * height as u64;
    let huge = lazy.is_some() && pixels > config.huge_pixel_count();
    let base = if huge {
        letterbox_size(width, height, config.huge_side)
    } else {
        (width, height)
    };
    let levels = PyramidBuilder::new(config.clone()).plan_level_sizes(base.0, base.1);

    print_image_summary(
        &ImageSummary {
            path: &args.file,
            width,
            height,
            raw: lazy.as_ref().map(|l| l.layout()),
            huge,
            base,
            levels: &levels,
        },
        &config,
    );
    Ok(())
}
