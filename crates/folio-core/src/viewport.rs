//! Zoom and pan state of the image canvas.
//!
//! The image occupies a rectangle in canvas space, initially `(0, 0, W, H)`.
//! The visible part of the canvas starts at the scroll offset and spans the
//! client size. Zooming rescales the image rectangle (and any overlay
//! markers) about the pivot, which keeps the pivot fixed on screen; panning
//! moves the scroll offset.

use crate::config::ViewerConfig;
use crate::geometry::{Point, Rect};
use crate::pyramid::Pyramid;

/// Plain value snapshot of the zoom/pan state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    /// Zoom relative to the original image.
    pub image_scale: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl ViewportState {
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            image_scale: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            canvas_width,
            canvas_height,
        }
    }

    /// Visible canvas area in canvas coordinates.
    pub fn canvas_rect(&self) -> Rect {
        Rect::new(
            self.scroll_x,
            self.scroll_y,
            self.scroll_x + self.canvas_width as f64,
            self.scroll_y + self.canvas_height as f64,
        )
    }
}

/// Pyramid level index for a display scale relative to the base level.
///
/// Returns `floor(-log_reduction(effective))` unclamped: negative values mean
/// the base level would have to be enlarged.
pub fn raw_level_for_scale(effective: f64, reduction: f64) -> i32 {
    let exponent = if reduction == 2.0 {
        effective.log2()
    } else {
        effective.ln() / reduction.ln()
    };
    (-exponent).floor() as i32
}

/// Clamp [`raw_level_for_scale`] to an existing level.
pub fn level_for_scale(effective: f64, level_count: usize, reduction: f64) -> usize {
    let max = level_count.saturating_sub(1) as i32;
    raw_level_for_scale(effective, reduction).clamp(0, max) as usize
}

#[derive(Clone, Debug)]
pub struct Viewport {
    state: ViewportState,
    image_bounds: Rect,
    image_width: u32,
    image_height: u32,
    base_scale: f64,
    level_count: usize,
    reduction: f64,
    zoom_step: f64,
    min_visible_side: f64,
    markers: Vec<Point>,
}

impl Viewport {
    /// An empty viewport with no image attached.
    pub fn new(config: &ViewerConfig, canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            state: ViewportState::new(canvas_width, canvas_height),
            image_bounds: Rect::default(),
            image_width: 0,
            image_height: 0,
            base_scale: 1.0,
            level_count: 0,
            reduction: config.reduction,
            zoom_step: config.zoom_step,
            min_visible_side: config.min_visible_side,
            markers: Vec::new(),
        }
    }

    /// Show a new pyramid: scale back to 1, scroll back to the origin.
    pub fn attach(&mut self, pyramid: &Pyramid) {
        let (w, h) = pyramid.source_dimensions();
        self.image_width = w;
        self.image_height = h;
        self.base_scale = pyramid.base_scale();
        self.level_count = pyramid.len();
        self.reduction = pyramid.reduction();
        self.state.image_scale = 1.0;
        self.state.scroll_x = 0.0;
        self.state.scroll_y = 0.0;
        self.image_bounds = Rect::from_size(w as f64, h as f64);
        self.markers.clear();
    }

    pub fn detach(&mut self) {
        self.image_width = 0;
        self.image_height = 0;
        self.level_count = 0;
        self.base_scale = 1.0;
        self.state.image_scale = 1.0;
        self.image_bounds = Rect::default();
        self.markers.clear();
    }

    pub fn has_image(&self) -> bool {
        self.level_count > 0
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn image_scale(&self) -> f64 {
        self.state.image_scale
    }

    /// Image rectangle in canvas coordinates.
    pub fn image_bounds(&self) -> Rect {
        self.image_bounds
    }

    pub fn canvas_rect(&self) -> Rect {
        self.state.canvas_rect()
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.state.canvas_width = width;
        self.state.canvas_height = height;
    }

    /// Canvas coordinates of a point given relative to the widget's top-left.
    pub fn canvas_point(&self, widget_x: f64, widget_y: f64) -> (f64, f64) {
        (self.state.scroll_x + widget_x, self.state.scroll_y + widget_y)
    }

    pub fn is_inside_image(&self, x: f64, y: f64) -> bool {
        self.has_image() && self.image_bounds.contains_point(x, y)
    }

    /// Zoom by `factor` about canvas point `(x, y)`.
    ///
    /// Returns `false` and leaves the state untouched when the pivot is off the
    /// image, when zooming out would shrink the shorter side below the floor,
    /// or when zooming in would make one image pixel larger than half the
    /// shorter canvas side.
    pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 || factor == 1.0 {
            return false;
        }
        if !self.is_inside_image(x, y) {
            return false;
        }

        let scale = self.state.image_scale;
        if factor < 1.0 {
            let min_side = self.image_width.min(self.image_height) as f64;
            if (min_side * scale).round() < self.min_visible_side {
                return false;
            }
        } else {
            let half_canvas = (self.state.canvas_width.min(self.state.canvas_height) >> 1) as f64;
            if half_canvas < scale {
                return false;
            }
        }

        self.state.image_scale = scale * factor;
        self.image_bounds = self.image_bounds.scaled_about(x, y, factor);
        for marker in &mut self.markers {
            *marker = marker.scaled_about(x, y, factor);
        }
        true
    }

    pub fn zoom_in_at(&mut self, x: f64, y: f64) -> bool {
        self.zoom_at(x, y, self.zoom_step)
    }

    pub fn zoom_out_at(&mut self, x: f64, y: f64) -> bool {
        self.zoom_at(x, y, 1.0 / self.zoom_step)
    }

    /// Move the image by `(dx, dy)` on screen.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.state.scroll_x -= dx;
        self.state.scroll_y -= dy;
    }

    /// Move the view by `(dx, dy)`; the image moves the opposite way.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.state.scroll_x += dx;
        self.state.scroll_y += dy;
    }

    /// Place the top-left of the visible area at canvas point `(x, y)`.
    pub fn pan_to(&mut self, x: f64, y: f64) {
        self.state.scroll_x = x;
        self.state.scroll_y = y;
    }

    /// Part of the image inside the visible canvas area, if any.
    pub fn visible_image_rect(&self) -> Option<Rect> {
        if !self.has_image() {
            return None;
        }
        self.image_bounds.intersect(&self.canvas_rect())
    }

    /// Region a host scrollbar should span.
    ///
    /// The union of the visible canvas area and the image. On an axis where
    /// the visible area already holds the whole image, the region shrinks to
    /// the image's extent on that axis.
    pub fn scroll_region(&self) -> Rect {
        let canvas = self.canvas_rect();
        if !self.has_image() {
            return canvas.snapped_outward();
        }
        let image = self.image_bounds.snapped_outward();
        let mut region = image.union(&canvas);

        if region.x0 == canvas.x0 && region.x1 == canvas.x1 {
            region.x0 = image.x0;
            region.x1 = image.x1;
        }
        if region.y0 == canvas.y0 && region.y1 == canvas.y1 {
            region.y0 = image.y0;
            region.y1 = image.y1;
        }
        region.snapped_outward()
    }

    /// Display scale relative to the base level's pixels.
    pub fn effective_scale(&self) -> f64 {
        self.state.image_scale / self.base_scale
    }

    /// Unclamped level index; negative when the base level is too coarse.
    pub fn raw_level_index(&self) -> i32 {
        raw_level_for_scale(self.effective_scale(), self.reduction)
    }

    /// Coarsest pyramid level that still has at least display resolution.
    pub fn current_level(&self) -> usize {
        level_for_scale(self.effective_scale(), self.level_count, self.reduction)
    }

    /// Pin an overlay marker at canvas point `(x, y)`; returns its index.
    pub fn add_marker(&mut self, x: f64, y: f64) -> usize {
        self.markers.push(Point::new(x, y));
        self.markers.len() - 1
    }

    pub fn markers(&self) -> &[Point] {
        &self.markers
    }
}
