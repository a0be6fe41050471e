use std::fs::File;
use std::path::{Path, PathBuf};

use image::RgbImage;
use memmap2::{Mmap, MmapOptions};
use tracing::debug;

use crate::consts::RGB_BYTES_PER_PIXEL;
use crate::error::{Result, ViewerError};
use crate::io::source::{extension_of, is_supported_extension};
use crate::io::{ppm, tiff};

/// Where the pixels of an uncompressed image live inside its file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawLayout {
    /// Byte offset of row 0.
    pub data_offset: u64,
    /// Bytes from the start of one row to the start of the next.
    pub row_stride: usize,
    pub bytes_per_pixel: usize,
}

/// Handle on an image whose pixels can be decoded one horizontal band at a time.
///
/// Nothing but the header is kept in memory. Every read reopens the file and
/// maps just the rows it needs.
#[derive(Clone, Debug)]
pub struct LazyImage {
    path: PathBuf,
    width: u32,
    height: u32,
    layout: RawLayout,
}

impl LazyImage {
    /// Open a file that exposes a raw 8-bit RGB layout.
    ///
    /// Fails with `UnsupportedFormat` outside the extension allow-list and with
    /// `Decode` for corrupt headers or layouts that are not raw RGB8.
    pub fn open(path: &Path) -> Result<Self> {
        match Self::probe(path)? {
            Some(lazy) => Ok(lazy),
            None => Err(ViewerError::Decode(format!(
                "{} has no raw RGB8 pixel layout",
                path.display()
            ))),
        }
    }

    /// Like [`LazyImage::open`], but returns `None` for supported files that are
    /// compressed or otherwise not addressable by row.
    pub fn probe(path: &Path) -> Result<Option<Self>> {
        let extension = extension_of(path);
        if !is_supported_extension(&extension) {
            return Err(ViewerError::UnsupportedFormat { extension });
        }

        let file = File::open(path).map_err(|e| ViewerError::ImageLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mmap = unsafe { Mmap::map(&file)? };

        let found = match extension.as_str() {
            ".tif" | ".tiff" => tiff::probe(&mmap)?.raw.map(|raw| {
                (
                    raw.width,
                    raw.height,
                    RawLayout {
                        data_offset: raw.data_offset,
                        row_stride: raw.width as usize * RGB_BYTES_PER_PIXEL,
                        bytes_per_pixel: RGB_BYTES_PER_PIXEL,
                    },
                )
            }),
            // Other PNM flavours (ASCII, greyscale) go through the full decoder.
            ".ppm" | ".pnm" if !mmap.starts_with(b"P6") => None,
            ".ppm" | ".pnm" => {
                let header = ppm::parse_header(&mmap)?;
                header.is_rgb8().then(|| {
                    (
                        header.width,
                        header.height,
                        RawLayout {
                            data_offset: header.data_offset,
                            row_stride: header.width as usize * RGB_BYTES_PER_PIXEL,
                            bytes_per_pixel: RGB_BYTES_PER_PIXEL,
                        },
                    )
                })
            }
            _ => None,
        };

        let Some((width, height, layout)) = found else {
            return Ok(None);
        };

        let needed = layout.data_offset + layout.row_stride as u64 * height as u64;
        if (mmap.len() as u64) < needed {
            return Err(ViewerError::Decode(format!(
                "File truncated: expected at least {} bytes, got {}",
                needed,
                mmap.len()
            )));
        }

        Ok(Some(Self {
            path: path.to_path_buf(),
            width,
            height,
            layout,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> RawLayout {
        self.layout
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Bytes of source data spanned by `rows` full rows.
    pub fn band_bytes(&self, rows: u32) -> usize {
        self.layout.row_stride * rows as usize
    }

    /// Decode rows `y .. y + rows` across the full width.
    pub fn read_band(&self, y: u32, rows: u32) -> Result<RgbImage> {
        self.read_region(0, y, self.width, y + rows)
    }

    /// Decode the rectangle `[x0, x1) x [y0, y1)` of the source, mapping only
    /// rows `y0 .. y1` of the file.
    pub fn read_region(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> Result<RgbImage> {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return Err(ViewerError::InvalidDimensions {
                width: x1.saturating_sub(x0),
                height: y1.saturating_sub(y0),
            });
        }

        let rows = (y1 - y0) as usize;
        let stride = self.layout.row_stride;
        let bpp = self.layout.bytes_per_pixel;
        let offset = self.layout.data_offset + stride as u64 * y0 as u64;

        // Reopen on every read so a file that vanished mid-session surfaces here.
        let file = File::open(&self.path)
            .map_err(|e| ViewerError::Decode(format!("{}: {e}", self.path.display())))?;
        let file_len = file.metadata()?.len();
        if file_len < offset + (stride * rows) as u64 {
            return Err(ViewerError::Decode(format!(
                "{} is shorter than its header claims",
                self.path.display()
            )));
        }
        let band = unsafe {
            MmapOptions::new()
                .offset(offset)
                .len(stride * rows)
                .map(&file)?
        };

        debug!(y0, rows, x0, x1, "Decoding band");

        let out_w = (x1 - x0) as usize;
        let mut pixels = Vec::with_capacity(out_w * rows * RGB_BYTES_PER_PIXEL);
        for row in band.chunks_exact(stride) {
            let start = x0 as usize * bpp;
            pixels.extend_from_slice(&row[start..start + out_w * bpp]);
        }

        RgbImage::from_raw(out_w as u32, rows as u32, pixels).ok_or_else(|| {
            ViewerError::Decode("Band buffer does not match its dimensions".into())
        })
    }
}
