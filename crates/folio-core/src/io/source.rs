use std::path::{Path, PathBuf};

use image::{ImageError, ImageReader, RgbImage};
use tracing::info;

use crate::config::ViewerConfig;
use crate::consts::SUPPORTED_EXTENSIONS;
use crate::error::{Result, ViewerError};
use crate::io::lazy::LazyImage;

/// Produces fully decoded RGB rasters, one per page.
///
/// PDF rasterizers live outside this crate and plug in through this trait;
/// [`ImageFileSource`] covers single-page raster files.
pub trait RasterSource: Send {
    fn page_count(&self) -> usize;

    fn render_page(&self, index: usize) -> Result<RgbImage>;

    /// Display name of the document, used for the viewer label.
    fn name(&self) -> String {
        String::new()
    }
}

/// A single raster image on disk exposed as a one-page document.
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn open(path: &Path) -> Result<Self> {
        check_readable(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RasterSource for ImageFileSource {
    fn page_count(&self) -> usize {
        1
    }

    fn render_page(&self, index: usize) -> Result<RgbImage> {
        if index != 0 {
            return Err(ViewerError::PageOutOfRange { index, total: 1 });
        }
        decode_full(&self.path)
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// An image ready for pyramid construction.
#[derive(Clone, Debug)]
pub enum SourceImage {
    /// Pixels fully in memory.
    Decoded(RgbImage),
    /// Pixels left on disk, read in bands.
    Lazy(LazyImage),
}

impl SourceImage {
    pub fn width(&self) -> u32 {
        match self {
            Self::Decoded(img) => img.width(),
            Self::Lazy(lazy) => lazy.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Self::Decoded(img) => img.height(),
            Self::Lazy(lazy) => lazy.height(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Self::Lazy(_))
    }
}

impl From<RgbImage> for SourceImage {
    fn from(img: RgbImage) -> Self {
        Self::Decoded(img)
    }
}

/// Where a displayed image came from, kept so it can be rebuilt at a new size.
#[derive(Clone, Debug)]
pub enum ImageOrigin {
    File(PathBuf),
    /// A raster handed over by the host, such as a rendered document page.
    Memory { name: String, image: RgbImage },
}

impl ImageOrigin {
    pub fn name(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::Memory { name, .. } => name.clone(),
        }
    }

    /// Open the original pixels again.
    pub fn open(&self, config: &ViewerConfig) -> Result<SourceImage> {
        match self {
            Self::File(path) => open_image(path, config),
            Self::Memory { image, .. } => Ok(SourceImage::Decoded(image.clone())),
        }
    }
}

/// Lowercase extension of `path` including the leading dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

pub fn is_supported_extension(extension: &str) -> bool {
    let bare = extension.trim_start_matches('.');
    SUPPORTED_EXTENSIONS.contains(&bare)
}

/// Reject unsupported extensions and missing files before any decoding.
pub fn check_readable(path: &Path) -> Result<()> {
    let extension = extension_of(path);
    if !is_supported_extension(&extension) {
        return Err(ViewerError::UnsupportedFormat { extension });
    }
    if !path.is_file() {
        return Err(ViewerError::ImageLoad {
            path: path.to_path_buf(),
            reason: "file not found".into(),
        });
    }
    Ok(())
}

/// Open an image for viewing.
///
/// Files with a raw RGB8 layout whose pixel count exceeds the huge threshold
/// stay on disk as a [`LazyImage`]; everything else is decoded fully.
pub fn open_image(path: &Path, config: &ViewerConfig) -> Result<SourceImage> {
    check_readable(path)?;

    if let Some(lazy) = LazyImage::probe(path)? {
        if lazy.pixel_count() > config.huge_pixel_count() {
            info!(
                path = %path.display(),
                width = lazy.width(),
                height = lazy.height(),
                "Opened huge raw image lazily"
            );
            return Ok(SourceImage::Lazy(lazy));
        }
        return Ok(SourceImage::Decoded(lazy.read_band(0, lazy.height())?));
    }

    Ok(SourceImage::Decoded(decode_full(path)?))
}

/// Decode a whole image file into 8-bit RGB.
pub fn decode_full(path: &Path) -> Result<RgbImage> {
    let load_error = |e: std::io::Error| ViewerError::ImageLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    let mut reader = ImageReader::open(path)
        .map_err(load_error)?
        .with_guessed_format()
        .map_err(load_error)?;
    // Huge scans are expected; do not cap allocation size.
    reader.no_limits();

    let img = reader.decode().map_err(|e| match e {
        ImageError::Decoding(d) => ViewerError::Decode(d.to_string()),
        other => ViewerError::ImageError(other),
    })?;
    Ok(img.to_rgb8())
}

/// Read image dimensions from the header without decoding pixels.
pub fn read_dimensions(path: &Path) -> Result<(u32, u32)> {
    check_readable(path)?;
    if let Some(lazy) = LazyImage::probe(path)? {
        return Ok(lazy.dimensions());
    }
    let dims = ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(dims)
}
