mod common;

use std::time::Duration;

use common::write_temp;
use folio_core::config::{ResampleFilter, ViewerConfig};
use folio_core::error::ViewerError;
use image::imageops::FilterType;

#[test]
fn test_defaults() {
    let config = ViewerConfig::default();
    assert_eq!(config.huge_side, 14_000);
    assert_eq!(config.band_height, 1024);
    assert_eq!(config.pyramid_ceiling, 512);
    assert_eq!(config.reduction, 2.0);
    assert_eq!(config.zoom_step, 1.2);
    assert_eq!(config.min_visible_side, 30.0);
    assert_eq!(config.key_pan_step, 40.0);
    assert!(config.fit_width_on_resize);
    assert_eq!(config.resize_debounce(), Duration::from_millis(300));
    assert_eq!(config.huge_pixel_count(), 196_000_000);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = ViewerConfig::from_toml_str(
        r#"
        huge_side = 2000
        zoom_step = 1.5
        display_filter = "Nearest"
        "#,
    )
    .unwrap();
    assert_eq!(config.huge_side, 2000);
    assert_eq!(config.zoom_step, 1.5);
    assert_eq!(config.display_filter, ResampleFilter::Nearest);
    assert_eq!(config.pyramid_ceiling, 512);
    assert_eq!(config.pyramid_filter, ResampleFilter::Lanczos3);
}

#[test]
fn test_invalid_values_rejected() {
    for text in [
        "reduction = 1.0",
        "zoom_step = 0.8",
        "band_height = 0",
        "huge_side = 0",
        "pyramid_ceiling = 0",
    ] {
        let err = ViewerConfig::from_toml_str(text).unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)), "{text} should fail");
    }
}

#[test]
fn test_unknown_filter_rejected() {
    let err = ViewerConfig::from_toml_str(r#"pyramid_filter = "Bicubic""#).unwrap_err();
    assert!(matches!(err, ViewerError::Config(_)));
}

#[test]
fn test_toml_file_round_trip() {
    let config = ViewerConfig {
        band_height: 256,
        fit_width_on_resize: false,
        pyramid_filter: ResampleFilter::Area,
        ..Default::default()
    };
    let text = config.to_toml_string().unwrap();
    let file = write_temp(text.as_bytes(), ".toml");
    assert_eq!(ViewerConfig::from_toml_file(file.path()).unwrap(), config);
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ViewerConfig::from_toml_file(&dir.path().join("viewer.toml")).unwrap_err();
    assert!(matches!(err, ViewerError::Io(_)));
}

#[test]
fn test_filter_serializes_by_name() {
    assert_eq!(
        serde_json::to_string(&ResampleFilter::CatmullRom).unwrap(),
        "\"CatmullRom\""
    );
    let parsed: ResampleFilter = serde_json::from_str("\"Area\"").unwrap();
    assert_eq!(parsed, ResampleFilter::Area);
    assert_eq!(ResampleFilter::CatmullRom.to_string(), "Catmull-Rom");
}

#[test]
fn test_filter_maps_to_image_filter() {
    assert_eq!(ResampleFilter::Lanczos3.filter_type(), Some(FilterType::Lanczos3));
    assert_eq!(ResampleFilter::Nearest.filter_type(), Some(FilterType::Nearest));
    assert_eq!(ResampleFilter::Area.filter_type(), None);
}
