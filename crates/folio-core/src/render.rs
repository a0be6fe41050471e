use image::{imageops, Rgb, RgbImage};
use tracing::{debug, trace};

use crate::config::{ResampleFilter, ViewerConfig};
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::pyramid::resample::resize;
use crate::pyramid::Pyramid;
use crate::viewport::Viewport;

/// Host widget that displays the rendered frames.
pub trait CanvasBackend {
    /// Draw `bitmap` with its top-left at canvas point `(x, y)`, replacing the
    /// previous frame.
    fn blit(&mut self, bitmap: &RgbImage, x: f64, y: f64);

    fn set_scroll_region(&mut self, region: Rect);

    /// Current drawable size in pixels.
    fn client_size(&self) -> (u32, u32);

    /// Canvas point shown at the widget's top-left corner. Hosts that track
    /// their own scroll position can ignore this.
    fn set_view_origin(&mut self, _x: f64, _y: f64) {}

    /// Move overlay widgets so they stay pinned after the view changed.
    fn reanchor_overlays(&mut self, _visible: Rect) {}
}

/// Which raster a tile was cut from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileOrigin {
    Level(usize),
    /// Re-read from the original huge image at full resolution.
    FullResolution,
}

#[derive(Clone, Debug)]
pub struct RenderedTile {
    pub bitmap: RgbImage,
    /// Canvas position of the bitmap's top-left corner.
    pub x: f64,
    pub y: f64,
    pub origin: TileOrigin,
}

/// Output of one redraw.
#[derive(Clone, Debug)]
pub struct RenderedFrame {
    pub scroll_region: Rect,
    pub view_origin: Point,
    /// Visible part of the image; `None` when the image is scrolled out of view.
    pub visible: Option<Rect>,
    pub tile: Option<RenderedTile>,
}

#[derive(Clone, Debug)]
pub struct TileRenderer {
    filter: ResampleFilter,
}

impl TileRenderer {
    pub fn new(filter: ResampleFilter) -> Self {
        Self { filter }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.display_filter)
    }

    /// Render the frame for the current viewport.
    ///
    /// Errors only come from re-reading a huge image at full resolution.
    pub fn render(&self, viewport: &Viewport, pyramid: &Pyramid) -> Result<RenderedFrame> {
        let state = viewport.state();
        let mut frame = RenderedFrame {
            scroll_region: viewport.scroll_region(),
            view_origin: Point::new(state.scroll_x, state.scroll_y),
            visible: viewport.visible_image_rect(),
            tile: None,
        };
        if frame.visible.is_none() {
            trace!("Image outside the visible area");
            return Ok(frame);
        }

        let image = viewport.image_bounds();
        let canvas = viewport.canvas_rect();
        let scale = state.image_scale;

        // Visible span relative to the image's top-left, in display pixels.
        let x1 = (canvas.x0 - image.x0).max(0.0);
        let y1 = (canvas.y0 - image.y0).max(0.0);
        let x2 = canvas.x1.min(image.x1) - image.x0;
        let y2 = canvas.y1.min(image.y1) - image.y0;
        let out_w = (x2 - x1) as u32;
        let out_h = (y2 - y1) as u32;
        if out_w == 0 || out_h == 0 {
            return Ok(frame);
        }

        let (crop, origin) = if pyramid.is_huge() && viewport.raw_level_index() < 0 {
            let (sw, sh) = pyramid.source_dimensions();
            let (cx0, cx1) = source_span(x1, x2, 1.0 / scale, sw);
            let (cy0, cy1) = source_span(y1, y2, 1.0 / scale, sh);
            (
                pyramid.crop_full(cx0, cy0, cx1, cy1)?,
                TileOrigin::FullResolution,
            )
        } else {
            let index = viewport.current_level();
            let level = pyramid.level(index);
            let k = level.scale / scale;
            let (lx0, lx1) = source_span(x1, x2, k, level.width());
            let (ly0, ly1) = source_span(y1, y2, k, level.height());
            let crop = imageops::crop_imm(&level.image, lx0, ly0, lx1 - lx0, ly1 - ly0).to_image();
            (crop, TileOrigin::Level(index))
        };

        debug!(
            ?origin,
            crop_w = crop.width(),
            crop_h = crop.height(),
            out_w,
            out_h,
            "Rendering tile"
        );

        let bitmap = resize(&crop, out_w, out_h, self.filter)?;
        frame.tile = Some(RenderedTile {
            bitmap,
            x: canvas.x0.max(image.x0.floor()),
            y: canvas.y0.max(image.y0.floor()),
            origin,
        });
        Ok(frame)
    }

    /// Push a rendered frame to the host canvas.
    pub fn present<C: CanvasBackend + ?Sized>(&self, canvas: &mut C, frame: &RenderedFrame) {
        canvas.set_scroll_region(frame.scroll_region);
        canvas.set_view_origin(frame.view_origin.x, frame.view_origin.y);
        if let Some(tile) = &frame.tile {
            canvas.blit(&tile.bitmap, tile.x, tile.y);
        }
        if let Some(visible) = frame.visible {
            canvas.reanchor_overlays(visible);
        }
    }
}

/// Map display span `[a, b)` to whole source pixels at `k` source pixels per
/// display pixel, keeping at least one pixel inside `[0, len)`.
fn source_span(a: f64, b: f64, k: f64, len: u32) -> (u32, u32) {
    let start = ((a * k) as u32).min(len.saturating_sub(1));
    let end = ((b * k).ceil() as u32).clamp(start + 1, len.max(start + 1));
    (start, end)
}

/// In-memory canvas that composites each frame into a client-sized bitmap.
///
/// Used by the command line renderer and by tests.
#[derive(Clone, Debug)]
pub struct MemoryCanvas {
    buffer: RgbImage,
    background: Rgb<u8>,
    view_origin: Point,
    scroll_region: Option<Rect>,
    last_blit: Option<(u32, u32, f64, f64)>,
    blit_count: usize,
    overlay_anchor: Option<Rect>,
}

impl MemoryCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_background(width, height, Rgb([0, 0, 0]))
    }

    pub fn with_background(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Self {
            buffer: RgbImage::from_pixel(width, height, background),
            background,
            view_origin: Point::default(),
            scroll_region: None,
            last_blit: None,
            blit_count: 0,
            overlay_anchor: None,
        }
    }

    /// Change the client size, dropping the current frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.buffer = RgbImage::from_pixel(width, height, self.background);
    }

    pub fn clear(&mut self) {
        for p in self.buffer.pixels_mut() {
            *p = self.background;
        }
        self.last_blit = None;
    }

    pub fn frame(&self) -> &RgbImage {
        &self.buffer
    }

    pub fn scroll_region(&self) -> Option<Rect> {
        self.scroll_region
    }

    /// Size and canvas position of the last bitmap drawn.
    pub fn last_blit(&self) -> Option<(u32, u32, f64, f64)> {
        self.last_blit
    }

    pub fn blit_count(&self) -> usize {
        self.blit_count
    }

    pub fn overlay_anchor(&self) -> Option<Rect> {
        self.overlay_anchor
    }
}

impl CanvasBackend for MemoryCanvas {
    fn blit(&mut self, bitmap: &RgbImage, x: f64, y: f64) {
        for p in self.buffer.pixels_mut() {
            *p = self.background;
        }
        let sx = (x - self.view_origin.x).round() as i64;
        let sy = (y - self.view_origin.y).round() as i64;
        imageops::replace(&mut self.buffer, bitmap, sx, sy);
        self.last_blit = Some((bitmap.width(), bitmap.height(), x, y));
        self.blit_count += 1;
    }

    fn set_scroll_region(&mut self, region: Rect) {
        self.scroll_region = Some(region);
    }

    fn client_size(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn set_view_origin(&mut self, x: f64, y: f64) {
        self.view_origin = Point::new(x, y);
    }

    fn reanchor_overlays(&mut self, visible: Rect) {
        self.overlay_anchor = Some(visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_span_keeps_one_pixel() {
        assert_eq!(source_span(10.0, 10.2, 0.1, 50), (1, 2));
        assert_eq!(source_span(0.0, 100.0, 0.5, 50), (0, 50));
        assert_eq!(source_span(990.0, 1000.0, 1.0, 50), (49, 50));
    }

    #[test]
    fn memory_canvas_clips_offscreen_blits() {
        let mut canvas = MemoryCanvas::new(4, 4);
        let tile = RgbImage::from_pixel(3, 3, Rgb([255, 0, 0]));
        canvas.blit(&tile, -1.0, -1.0);
        assert_eq!(canvas.frame().get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(canvas.frame().get_pixel(2, 2), &Rgb([0, 0, 0]));
    }
}
