pub mod config;
pub mod info;
pub mod pyramid;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use folio_core::config::ViewerConfig;

/// Viewer config from `--config`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ViewerConfig> {
    match path {
        Some(path) => ViewerConfig::from_toml_file(path)
            .with_context(|| format!("Failed to read config {}", path.display())),
        None => Ok(ViewerConfig::default()),
    }
}
