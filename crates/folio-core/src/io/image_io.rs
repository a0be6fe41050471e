use std::path::Path;

use image::{ImageFormat, RgbImage};

use crate::error::Result;

/// Save an RGB raster as 8-bit PNG.
pub fn save_png(img: &RgbImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save an RGB raster as uncompressed TIFF.
pub fn save_tiff(img: &RgbImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save a raster, choosing the format from the file extension (PNG by default).
pub fn save_image(img: &RgbImage, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tiff" | "tif") => save_tiff(img, path),
        Some("jpg" | "jpeg") => {
            img.save_with_format(path, ImageFormat::Jpeg)?;
            Ok(())
        }
        _ => save_png(img, path),
    }
}
