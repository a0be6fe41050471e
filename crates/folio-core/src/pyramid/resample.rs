use fast_image_resize::images::Image as FastImage;
use fast_image_resize::{FilterType as FastFilter, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{imageops, RgbImage};

use crate::config::ResampleFilter;
use crate::error::{Result, ViewerError};

/// Resize `src` to exactly `width` x `height` (each clamped to at least 1).
pub fn resize(
    src: &RgbImage,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> Result<RgbImage> {
    let width = width.max(1);
    let height = height.max(1);
    if src.dimensions() == (width, height) {
        return Ok(src.clone());
    }
    match filter.filter_type() {
        Some(ft) => Ok(imageops::resize(src, width, height, ft)),
        None => area_resize(src, width, height),
    }
}

/// Divide both sides by `reduction`, truncating, never below one pixel.
pub fn reduced_size(width: u32, height: u32, reduction: f64) -> (u32, u32) {
    (
        ((width as f64 / reduction) as u32).max(1),
        ((height as f64 / reduction) as u32).max(1),
    )
}

/// Box-filter resize: when shrinking, every output pixel is the mean of the
/// source pixels under it.
pub fn area_resize(src: &RgbImage, width: u32, height: u32) -> Result<RgbImage> {
    let (sw, sh) = src.dimensions();
    let src_image = FastImage::from_vec_u8(sw, sh, src.as_raw().to_vec(), PixelType::U8x3)
        .map_err(|e| ViewerError::Resize(e.to_string()))?;
    let mut dst_image = FastImage::new(width, height, PixelType::U8x3);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FastFilter::Box));
    Resizer::new()
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| ViewerError::Resize(e.to_string()))?;

    RgbImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| ViewerError::Resize("resized buffer does not match its dimensions".into()))
}
