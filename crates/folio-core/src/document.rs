use image::{imageops, RgbImage};
use tracing::debug;

use crate::error::{Result, ViewerError};
use crate::io::source::RasterSource;

/// Steps through the pages of a [`RasterSource`] and tracks the rotation of
/// the current page.
pub struct PageNavigator {
    source: Box<dyn RasterSource>,
    page: usize,
    /// Counter-clockwise degrees, one of 0, 90, 180, 270.
    rotation: u32,
}

impl PageNavigator {
    pub fn new(source: Box<dyn RasterSource>) -> Result<Self> {
        if source.page_count() == 0 {
            return Err(ViewerError::PageOutOfRange { index: 0, total: 0 });
        }
        Ok(Self {
            source,
            page: 0,
            rotation: 0,
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.source.page_count()
    }

    pub fn rotation(&self) -> u32 {
        self.rotation
    }

    pub fn name(&self) -> String {
        self.source.name()
    }

    /// Go to `page`, clamped to the document, and reset the rotation.
    /// Returns the page now shown.
    pub fn jump_to_page(&mut self, page: i64) -> usize {
        let last = self.page_count() as i64 - 1;
        self.page = page.clamp(0, last) as usize;
        self.rotation = 0;
        debug!(page = self.page, "Page changed");
        self.page
    }

    pub fn next_page(&mut self) -> usize {
        self.jump_to_page(self.page as i64 + 1)
    }

    pub fn prev_page(&mut self) -> usize {
        self.jump_to_page(self.page as i64 - 1)
    }

    /// Rotate the current page counter-clockwise by a multiple of 90 degrees.
    pub fn rotate(&mut self, degrees: i32) -> Result<u32> {
        if degrees % 90 != 0 {
            return Err(ViewerError::Config(format!(
                "rotation must be a multiple of 90 degrees, got {degrees}"
            )));
        }
        self.rotation = (self.rotation as i32 + degrees).rem_euclid(360) as u32;
        Ok(self.rotation)
    }

    /// Raster of the current page with the rotation applied.
    pub fn current_raster(&self) -> Result<RgbImage> {
        let raster = self.source.render_page(self.page)?;
        Ok(match self.rotation {
            90 => imageops::rotate270(&raster),
            180 => imageops::rotate180(&raster),
            270 => imageops::rotate90(&raster),
            _ => raster,
        })
    }

    /// Label for the current page, e.g. `report.pdf (2/7)`.
    pub fn label(&self) -> String {
        format!("{} ({}/{})", self.name(), self.page + 1, self.page_count())
    }
}
