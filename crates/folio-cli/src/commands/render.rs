use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use folio_core::interaction::{InputEvent, InteractionController};
use folio_core::io::image_io::save_image;
use folio_core::render::MemoryCanvas;
use tracing::info;

use super::load_config;
use crate::progress::BarReporter;

#[derive(Args)]
pub struct RenderArgs {
    /// Input image
    pub file: PathBuf,

    /// Canvas size as WIDTHxHEIGHT
    #[arg(long, default_value = "1024x768")]
    pub size: String,

    /// Wheel steps to zoom in
    #[arg(long, default_value = "0")]
    pub zoom_in: u32,

    /// Wheel steps to zoom out
    #[arg(long, default_value = "0")]
    pub zoom_out: u32,

    /// Zoom pivot as X,Y in canvas pixels (default: canvas centre)
    #[arg(long)]
    pub at: Option<String>,

    /// Pan the image by DX,DY screen pixels after zooming
    #[arg(long, allow_hyphen_values = true)]
    pub pan: Option<String>,

    /// Output file path
    #[arg(short, long, default_value = "view.png")]
    pub output: PathBuf,
}

pub fn run(args: &RenderArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let (width, height) = parse_size(&args.size)?;
    let (px, py) = match args.at {
        Some(ref s) => parse_pair(s).context("Invalid --at, expected X,Y")?,
        None => (width as f64 / 2.0, height as f64 / 2.0),
    };

    let reporter = BarReporter::new()?;
    let mut viewer = InteractionController::new(config, MemoryCanvas::new(width, height));
    viewer.set_progress_reporter(Box::new(reporter));
    viewer
        .open_path(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    let now = Instant::now();
    let mut zoomed = 0;
    for _ in 0..args.zoom_in {
        let event = InputEvent::Wheel {
            x: px,
            y: py,
            delta: 1.0,
        };
        zoomed += viewer.handle_event(event, now) as u32;
    }
    for _ in 0..args.zoom_out {
        let event = InputEvent::Wheel {
            x: px,
            y: py,
            delta: -1.0,
        };
        zoomed += viewer.handle_event(event, now) as u32;
    }
    let requested = args.zoom_in + args.zoom_out;
    if zoomed < requested {
        println!("{} of {requested} zoom steps were out of range", requested - zoomed);
    }

    if let Some(ref s) = args.pan {
        let (dx, dy) = parse_pair(s).context("Invalid --pan, expected DX,DY")?;
        viewer.viewport_mut().pan_by(dx, dy);
        viewer.redraw();
    }

    let state = viewer.viewport().state();
    let level = viewer.viewport().current_level();
    info!(
        scale = state.image_scale,
        scroll_x = state.scroll_x,
        scroll_y = state.scroll_y,
        level,
        "View rendered"
    );

    let canvas = viewer.canvas();
    save_image(canvas.frame(), &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Rendered {} at scale {:.3} (level {level}) to {}",
        viewer.label(),
        state.image_scale,
        args.output.display()
    );
    if canvas.last_blit().is_none() {
        println!("Image is outside the view; output is background only");
    }

    Ok(())
}

fn parse_size(s: &str) -> Result<(u32, u32)> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        bail!("Invalid size '{s}', expected WIDTHxHEIGHT");
    };
    let w: u32 = w.trim().parse().context("Invalid width")?;
    let h: u32 = h.trim().parse().context("Invalid height")?;
    if w == 0 || h == 0 {
        bail!("Canvas size must be non-zero");
    }
    Ok((w, h))
}

fn parse_pair(s: &str) -> Result<(f64, f64)> {
    let Some((a, b)) = s.split_once(',') else {
        bail!("expected two comma-separated numbers, got '{s}'");
    };
    Ok((a.trim().parse()?, b.trim().parse()?))
}
