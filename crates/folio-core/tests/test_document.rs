mod common;

use common::gradient_rgb;
use folio_core::config::ViewerConfig;
use folio_core::document::PageNavigator;
use folio_core::error::{Result, ViewerError};
use folio_core::interaction::InteractionController;
use folio_core::io::source::RasterSource;
use folio_core::render::MemoryCanvas;
use image::RgbImage;

/// Document whose page `i` is a gradient of `(40 + i, 20)` pixels.
struct FakeDocument {
    pages: usize,
}

impl RasterSource for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn render_page(&self, index: usize) -> Result<RgbImage> {
        if index >= self.pages {
            return Err(ViewerError::PageOutOfRange {
                index,
                total: self.pages,
            });
        }
        Ok(gradient_rgb(40 + index as u32, 20))
    }

    fn name(&self) -> String {
        "report.pdf".to_string()
    }
}

fn navigator(pages: usize) -> PageNavigator {
    PageNavigator::new(Box::new(FakeDocument { pages })).unwrap()
}

#[test]
fn test_page_jumps_are_clamped() {
    let mut nav = navigator(7);
    assert_eq!(nav.page(), 0);
    assert_eq!(nav.jump_to_page(3), 3);
    assert_eq!(nav.jump_to_page(99), 6);
    assert_eq!(nav.jump_to_page(-4), 0);
    assert_eq!(nav.page_count(), 7);
}

#[test]
fn test_next_and_prev_stop_at_ends() {
    let mut nav = navigator(2);
    assert_eq!(nav.prev_page(), 0);
    assert_eq!(nav.next_page(), 1);
    assert_eq!(nav.next_page(), 1);
    assert_eq!(nav.prev_page(), 0);
}

#[test]
fn test_rotation_resets_on_page_change() {
    let mut nav = navigator(3);
    assert_eq!(nav.rotate(90).unwrap(), 90);
    nav.next_page();
    assert_eq!(nav.rotation(), 0);

    // Any jump resets, even one back to the same page.
    nav.rotate(180).unwrap();
    assert_eq!(nav.jump_to_page(1), 1);
    assert_eq!(nav.rotation(), 0);

    // Clamped steps past the end reset too.
    nav.jump_to_page(2);
    nav.rotate(270).unwrap();
    assert_eq!(nav.next_page(), 2);
    assert_eq!(nav.rotation(), 0);
}

#[test]
fn test_rotation_wraps_and_validates() {
    let mut nav = navigator(1);
    assert_eq!(nav.rotate(-90).unwrap(), 270);
    assert_eq!(nav.rotate(180).unwrap(), 90);
    assert_eq!(nav.rotate(270).unwrap(), 0);
    assert!(matches!(nav.rotate(45), Err(ViewerError::Config(_))));
    assert_eq!(nav.rotation(), 0);
}

#[test]
fn test_rotation_is_counter_clockwise() {
    let mut nav = navigator(1);
    let page = gradient_rgb(40, 20);

    nav.rotate(90).unwrap();
    let rotated = nav.current_raster().unwrap();
    assert_eq!(rotated.dimensions(), (20, 40));
    // The top-right corner moves to the top-left.
    assert_eq!(rotated.get_pixel(0, 0), page.get_pixel(39, 0));
    assert_eq!(rotated.get_pixel(0, 39), page.get_pixel(0, 0));

    nav.rotate(90).unwrap();
    let flipped = nav.current_raster().unwrap();
    assert_eq!(flipped.get_pixel(0, 0), page.get_pixel(39, 19));
}

#[test]
fn test_current_raster_follows_page() {
    let mut nav = navigator(4);
    nav.jump_to_page(2);
    assert_eq!(nav.current_raster().unwrap().dimensions(), (42, 20));
    assert_eq!(nav.label(), "report.pdf (3/4)");
}

#[test]
fn test_empty_document_rejected() {
    let result = PageNavigator::new(Box::new(FakeDocument { pages: 0 }));
    assert!(matches!(
        result,
        Err(ViewerError::PageOutOfRange { index: 0, total: 0 })
    ));
}

#[test]
fn test_page_shown_through_controller() {
    let mut nav = navigator(3);
    nav.next_page();
    nav.rotate(90).unwrap();

    let mut viewer =
        InteractionController::new(ViewerConfig::default(), MemoryCanvas::new(100, 100));
    viewer
        .open_raster(&nav.label(), nav.current_raster().unwrap())
        .unwrap();
    assert_eq!(viewer.label(), "report.pdf (2/3)");
    assert_eq!(viewer.pyramid().unwrap().source_dimensions(), (20, 41));
}
