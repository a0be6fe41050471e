/// Side of the square an image must exceed (in pixel count) to be treated as huge.
/// Huge images with a raw layout are banded down to fit inside this square.
pub const DEFAULT_HUGE_SIDE: u32 = 14_000;

/// Height in rows of each band read from a huge image.
pub const DEFAULT_BAND_HEIGHT: u32 = 1024;

/// Pyramid levels are generated until both sides are at most this many pixels.
pub const DEFAULT_PYRAMID_CEILING: u32 = 512;

/// Reduction degree between consecutive pyramid levels.
pub const PYRAMID_REDUCTION: f64 = 2.0;

/// Zoom magnitude of a single wheel step.
pub const DEFAULT_ZOOM_STEP: f64 = 1.2;

/// Zooming out stops once the smaller image side would drop below this many pixels.
pub const DEFAULT_MIN_VISIBLE_SIDE: f64 = 30.0;

/// Quiet period after the last resize event before the base level is rebuilt.
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 300;

/// Canvas pixels moved by one arrow/WASD keystroke.
pub const DEFAULT_KEY_PAN_STEP: f64 = 40.0;

/// Bytes per pixel of the 8-bit RGB rasters the viewer works on.
pub const RGB_BYTES_PER_PIXEL: usize = 3;

/// File extensions the viewer will try to open (lowercase, without dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "ppm", "pnm"];
