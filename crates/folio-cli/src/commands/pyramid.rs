use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use folio_core::cancel::CancellationToken;
use folio_core::io::image_io::save_png;
use folio_core::io::source::open_image;
use folio_core::pyramid::PyramidBuilder;
use tracing::info;

use super::load_config;
use crate::progress::BarReporter;

#[derive(Args)]
pub struct PyramidArgs {
    /// Input image
    pub file: PathBuf,

    /// Directory for the level PNGs
    #[arg(short, long, default_value = "pyramid")]
    pub output: PathBuf,
}

pub fn run(args: &PyramidArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let source = open_image(&args.file, &config)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let (w, h) = source.dimensions();
    println!("Building pyramid for {} ({w}x{h})", args.file.display());

    let reporter = BarReporter::new()?;
    let start = Instant::now();
    let pyramid =
        PyramidBuilder::new(config).build_with(source, &reporter, &CancellationToken::new())?;
    reporter.finish();
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "Pyramid ready");

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    for (i, level) in pyramid.levels().iter().enumerate() {
        let path = args.output.join(format!("level_{i:02}.png"));
        save_png(&level.image, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "  level {i:>2}  {:>6}x{:<6} scale {:.5}  {}",
            level.width(),
            level.height(),
            level.scale,
            path.display()
        );
    }

    if let Some(stats) = pyramid.band_stats() {
        println!(
            "\nBanded read: {} bands, at most {} rows ({:.1} MB) resident",
            stats.bands,
            stats.tallest_band,
            stats.peak_band_bytes as f64 / (1024.0 * 1024.0)
        );
    }
    println!(
        "Pyramid memory: {:.1} MB",
        pyramid.memory_bytes() as f64 / (1024.0 * 1024.0)
    );

    Ok(())
}
