use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load image {path}: {reason}")]
    ImageLoad { path: PathBuf, reason: String },

    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Page index {index} out of range (total: {total})")]
    PageOutOfRange { index: usize, total: usize },

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Resize failed: {0}")]
    Resize(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Pyramid build cancelled")]
    Cancelled,

    #[error("Background loader has stopped")]
    LoaderStopped,
}

impl ViewerError {
    /// Short message for the viewer's placeholder label.
    pub fn placeholder_message(&self) -> String {
        match self {
            Self::ImageLoad { .. } | Self::Io(_) => "File not found".to_string(),
            Self::UnsupportedFormat { extension } => {
                format!("No preview for file format: {extension}")
            }
            other => format!("Unable to display image: {other}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
