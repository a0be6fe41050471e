#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use folio_core::config::ViewerConfig;
use folio_core::progress::{BuildStage, ProgressReporter};
use image::{Rgb, RgbImage};

/// RGB test pattern whose every pixel encodes its own coordinates.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

pub fn uniform_rgb(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

/// Build an uncompressed, single-strip, little-endian RGB8 TIFF.
pub fn build_raw_tiff(img: &RgbImage) -> Vec<u8> {
    let (w, h) = img.dimensions();
    let entry_count: u16 = 10;
    let ifd_offset: u32 = 8;
    let ifd_len = 2 + entry_count as u32 * 12 + 4;
    let bps_offset = ifd_offset + ifd_len;
    let data_offset = bps_offset + 6;
    let data_len = w * h * 3;

    let mut buf = Vec::with_capacity((data_offset + data_len) as usize);
    buf.extend_from_slice(b"II");
    buf.extend_from_slice(&42u16.to_le_bytes());
    buf.extend_from_slice(&ifd_offset.to_le_bytes());

    buf.extend_from_slice(&entry_count.to_le_bytes());
    // (tag, type, count, value); type 3 = SHORT, 4 = LONG
    let entries: [(u16, u16, u32, u32); 10] = [
        (256, 4, 1, w),
        (257, 4, 1, h),
        (258, 3, 3, bps_offset),
        (259, 3, 1, 1),
        (262, 3, 1, 2),
        (273, 4, 1, data_offset),
        (277, 3, 1, 3),
        (278, 4, 1, h),
        (279, 4, 1, data_len),
        (284, 3, 1, 1),
    ];
    for (tag, ty, count, value) in entries {
        buf.extend_from_slice(&tag.to_le_bytes());
        buf.extend_from_slice(&ty.to_le_bytes());
        buf.extend_from_slice(&count.to_le_bytes());
        buf.extend_from_slice(&value.to_le_bytes());
    }
    buf.extend_from_slice(&0u32.to_le_bytes());

    for _ in 0..3 {
        buf.extend_from_slice(&8u16.to_le_bytes());
    }
    assert_eq!(buf.len(), data_offset as usize);
    buf.extend_from_slice(img.as_raw());
    buf
}

/// Build a binary PPM with a comment line in the header.
pub fn build_ppm(img: &RgbImage) -> Vec<u8> {
    let (w, h) = img.dimensions();
    let mut buf = format!("P6\n# folio test\n{w} {h}\n255\n").into_bytes();
    buf.extend_from_slice(img.as_raw());
    buf
}

/// Write `data` to a temp file with the given suffix (e.g. ".tif").
///
/// The file stays alive as long as the returned `NamedTempFile` is not dropped.
pub fn write_temp(data: &[u8], suffix: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    f.write_all(data).expect("write data");
    f.flush().expect("flush");
    f
}

/// Write `data` as `name` inside `dir`.
pub fn write_in(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, data).expect("write file");
    path
}

/// Config with small thresholds so huge-image paths run on test-sized data.
pub fn small_huge_config(huge_side: u32, band_height: u32) -> ViewerConfig {
    ViewerConfig {
        huge_side,
        band_height,
        pyramid_ceiling: 16,
        ..Default::default()
    }
}

/// Records every progress callback.
#[derive(Default)]
pub struct RecordingProgress {
    pub stages: Mutex<Vec<(BuildStage, Option<usize>)>>,
    pub advances: AtomicUsize,
    pub finished: AtomicUsize,
}

impl RecordingProgress {
    pub fn stages(&self) -> Vec<(BuildStage, Option<usize>)> {
        self.stages.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn begin_stage(&self, stage: BuildStage, total_items: Option<usize>) {
        self.stages.lock().unwrap().push((stage, total_items));
    }

    fn advance(&self, _items_done: usize) {
        self.advances.fetch_add(1, Ordering::SeqCst);
    }

    fn finish_stage(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}
