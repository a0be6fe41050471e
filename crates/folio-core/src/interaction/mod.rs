//! Input handling for the image canvas.
//!
//! [`InteractionController`] owns the loaded pyramid, the viewport and the
//! host canvas. Hosts forward their pointer, wheel, key and resize events and
//! call [`InteractionController::tick`] from their event loop so the resize
//! debounce can fire.

pub mod debounce;

use std::path::Path;
use std::time::Instant;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::geometry::Rect;
use crate::io::source::{ImageOrigin, SourceImage};
use crate::loader::PyramidLoader;
use crate::progress::{BuildStage, NoProgress, ProgressReporter};
use crate::pyramid::bander::HugeImageBander;
use crate::pyramid::resample::resize;
use crate::pyramid::{Pyramid, PyramidBuilder};
use crate::render::{CanvasBackend, TileRenderer};
use crate::viewport::Viewport;

use debounce::Debouncer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Char(char),
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        control: false,
        shift: false,
        alt: false,
    };

    pub fn any(&self) -> bool {
        self.control || self.shift || self.alt
    }
}

/// Host input, with positions relative to the widget's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    /// Positive `delta` zooms in.
    Wheel { x: f64, y: f64, delta: f64 },
    Key {
        key: Key,
        modifiers: Modifiers,
        repeat: bool,
    },
    Resize { width: u32, height: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InteractionState {
    Idle,
    Dragging { last_x: f64, last_y: f64 },
    ResizePending,
}

/// The image currently on screen.
struct Session {
    origin: ImageOrigin,
    pyramid: Pyramid,
}

pub struct InteractionController<C: CanvasBackend> {
    config: ViewerConfig,
    canvas: C,
    builder: PyramidBuilder,
    renderer: TileRenderer,
    viewport: Viewport,
    session: Option<Session>,
    state: InteractionState,
    resize_timer: Debouncer,
    label: String,
    progress: Box<dyn ProgressReporter>,
    /// Background request whose result may still replace the shown image.
    awaited_load: Option<u64>,
}

impl<C: CanvasBackend> InteractionController<C> {
    pub fn new(config: ViewerConfig, canvas: C) -> Self {
        let (w, h) = canvas.client_size();
        Self {
            viewport: Viewport::new(&config, w, h),
            builder: PyramidBuilder::new(config.clone()),
            renderer: TileRenderer::from_config(&config),
            resize_timer: Debouncer::new(config.resize_debounce()),
            config,
            canvas,
            session: None,
            state: InteractionState::Idle,
            label: String::new(),
            progress: Box::new(NoProgress),
            awaited_load: None,
        }
    }

    /// Report progress of builds done on the caller's thread.
    pub fn set_progress_reporter(&mut self, progress: Box<dyn ProgressReporter>) {
        self.progress = progress;
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn pyramid(&self) -> Option<&Pyramid> {
        self.session.as_ref().map(|s| &s.pyramid)
    }

    pub fn has_image(&self) -> bool {
        self.session.is_some()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// File name of the shown image, or the placeholder message.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Open and show an image file.
    ///
    /// Missing or unsupported files switch to the placeholder state and
    /// return the error.
    pub fn open_path(&mut self, path: &Path) -> Result<()> {
        self.show_origin(ImageOrigin::File(path.to_path_buf()))
    }

    /// Show a raster produced by the host, such as a rendered document page.
    pub fn open_raster(&mut self, name: &str, image: RgbImage) -> Result<()> {
        self.show_origin(ImageOrigin::Memory {
            name: name.to_string(),
            image,
        })
    }

    fn show_origin(&mut self, origin: ImageOrigin) -> Result<()> {
        self.awaited_load = None;
        let built = origin.open(&self.config).and_then(|source| {
            self.builder
                .build_with(source, self.progress.as_ref(), &CancellationToken::new())
        });
        match built {
            Ok(pyramid) => {
                self.install(origin, pyramid);
                Ok(())
            }
            Err(e) => {
                self.show_placeholder(&e);
                Err(e)
            }
        }
    }

    /// Hand `origin` to the background loader. Only the result of the most
    /// recent request made here is ever shown.
    pub fn request_load(
        &mut self,
        loader: &mut PyramidLoader,
        origin: ImageOrigin,
    ) -> Result<u64> {
        let id = loader.request(origin)?;
        self.awaited_load = Some(id);
        Ok(id)
    }

    /// Give up on the awaited background load.
    pub fn cancel_load(&mut self, loader: &mut PyramidLoader) {
        if self.awaited_load.take().is_some() {
            loader.cancel();
        }
    }

    /// Show the awaited background build if it is ready. Returns true when
    /// the shown image changed.
    pub fn poll_loader(&mut self, loader: &mut PyramidLoader) -> bool {
        let id = loader.latest_request();
        let Some(result) = loader.poll() else {
            return false;
        };
        if id.is_none() || id != self.awaited_load {
            debug!(?id, awaited = ?self.awaited_load, "Dropping superseded load");
            return false;
        }
        self.awaited_load = None;
        match result {
            Ok(loaded) => {
                self.install(loaded.origin, loaded.pyramid);
                true
            }
            Err(ViewerError::Cancelled) => false,
            Err(e) => {
                self.show_placeholder(&e);
                true
            }
        }
    }

    fn install(&mut self, origin: ImageOrigin, pyramid: Pyramid) {
        let (w, h) = pyramid.source_dimensions();
        self.label = origin.name();
        info!(name = %self.label, width = w, height = h, levels = pyramid.len(), "Showing image");
        self.viewport.attach(&pyramid);
        self.session = Some(Session { origin, pyramid });
        self.state = InteractionState::Idle;
        self.redraw();
    }

    fn show_placeholder(&mut self, error: &ViewerError) {
        warn!(error = %error, "Cannot show image");
        self.clear();
        self.label = error.placeholder_message();
    }

    /// Drop the shown image and reset the scroll region to the client area.
    pub fn clear(&mut self) {
        self.awaited_load = None;
        self.session = None;
        self.viewport.detach();
        self.resize_timer.cancel();
        self.state = InteractionState::Idle;
        self.label.clear();
        let (w, h) = self.canvas.client_size();
        self.canvas.set_scroll_region(Rect::from_size(w as f64, h as f64));
    }

    /// Render the current view. A failed full-resolution re-read keeps the
    /// previous frame on screen.
    pub fn redraw(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        match self.renderer.render(&self.viewport, &session.pyramid) {
            Ok(frame) => self.renderer.present(&mut self.canvas, &frame),
            Err(e) => warn!(error = %e, "Frame skipped"),
        }
    }

    /// Feed one host event. Returns true when the view changed.
    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> bool {
        match event {
            InputEvent::PointerDown { x, y } => {
                let (cx, cy) = self.viewport.canvas_point(x, y);
                if self.viewport.is_inside_image(cx, cy) {
                    self.state = InteractionState::Dragging {
                        last_x: x,
                        last_y: y,
                    };
                }
                false
            }
            InputEvent::PointerMove { x, y } => {
                let InteractionState::Dragging { last_x, last_y } = self.state else {
                    return false;
                };
                self.viewport.pan_by(x - last_x, y - last_y);
                self.state = InteractionState::Dragging {
                    last_x: x,
                    last_y: y,
                };
                self.redraw();
                true
            }
            InputEvent::PointerUp => {
                if matches!(self.state, InteractionState::Dragging { .. }) {
                    self.state = if self.resize_timer.is_pending() {
                        InteractionState::ResizePending
                    } else {
                        InteractionState::Idle
                    };
                }
                false
            }
            InputEvent::Wheel { x, y, delta } => self.on_wheel(x, y, delta),
            InputEvent::Key {
                key,
                modifiers,
                repeat,
            } => self.on_key(key, modifiers, repeat),
            InputEvent::Resize { width, height } => {
                self.viewport.set_canvas_size(width, height);
                if self.has_image() {
                    self.resize_timer.arm(now);
                    // A drag in progress keeps its anchor; PointerUp picks up the pending resize.
                    if !matches!(self.state, InteractionState::Dragging { .. }) {
                        self.state = InteractionState::ResizePending;
                    }
                }
                false
            }
        }
    }

    fn on_wheel(&mut self, x: f64, y: f64, delta: f64) -> bool {
        if !self.has_image() || delta == 0.0 {
            return false;
        }
        let (cx, cy) = self.viewport.canvas_point(x, y);
        let zoomed = if delta > 0.0 {
            self.viewport.zoom_in_at(cx, cy)
        } else {
            self.viewport.zoom_out_at(cx, cy)
        };
        if zoomed {
            debug!(scale = self.viewport.image_scale(), "Zoom");
            self.redraw();
        }
        zoomed
    }

    fn on_key(&mut self, key: Key, modifiers: Modifiers, repeat: bool) -> bool {
        if !self.has_image() || modifiers.control || (repeat && modifiers.any()) {
            return false;
        }
        let step = self.config.key_pan_step;
        let (dx, dy) = match key {
            Key::Right | Key::Char('d') | Key::Char('D') => (-step, 0.0),
            Key::Left | Key::Char('a') | Key::Char('A') => (step, 0.0),
            Key::Down | Key::Char('s') | Key::Char('S') => (0.0, -step),
            Key::Up | Key::Char('w') | Key::Char('W') => (0.0, step),
            _ => return false,
        };
        self.viewport.pan_by(dx, dy);
        self.redraw();
        true
    }

    /// Advance timers. Returns true when a debounced resize was applied.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.resize_timer.fire_if_due(now) {
            return false;
        }
        let dragging = matches!(self.state, InteractionState::Dragging { .. });
        let state = if dragging { self.state } else { InteractionState::Idle };
        if let Err(e) = self.apply_resize() {
            warn!(error = %e, "Resize rebuild failed, keeping current image");
            self.redraw();
        }
        self.state = state;
        true
    }

    fn apply_resize(&mut self) -> Result<()> {
        let width = self.viewport.state().canvas_width;
        if !self.config.fit_width_on_resize || width == 0 {
            self.redraw();
            return Ok(());
        }
        let Some(session) = &self.session else {
            return Ok(());
        };

        let source = session.origin.open(&self.config)?;
        let fitted = self.fit_to_width(source, width)?;
        let pyramid = self.builder.build_with(
            SourceImage::Decoded(fitted),
            self.progress.as_ref(),
            &CancellationToken::new(),
        )?;
        let origin = session.origin.clone();
        debug!(width, "Rebuilt at canvas width");
        self.install(origin, pyramid);
        Ok(())
    }

    fn fit_to_width(&self, source: SourceImage, width: u32) -> Result<RgbImage> {
        let (sw, sh) = source.dimensions();
        let height = ((sh as f64 * width as f64 / sw as f64).round() as u32).max(1);
        match source {
            SourceImage::Decoded(img) => {
                self.progress.begin_stage(BuildStage::Resizing, Some(1));
                let fitted = resize(&img, width, height, self.config.pyramid_filter)?;
                self.progress.advance(1);
                self.progress.finish_stage();
                Ok(fitted)
            }
            SourceImage::Lazy(lazy) => {
                let bander = HugeImageBander::from_config(&self.config);
                let (img, _) = bander.downsample_to(
                    &lazy,
                    width,
                    height,
                    self.progress.as_ref(),
                    &CancellationToken::new(),
                )?;
                Ok(img)
            }
        }
    }
}
