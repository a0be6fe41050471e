pub mod cancel;
pub mod config;
pub mod consts;
pub mod document;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod io;
pub mod loader;
pub mod progress;
pub mod pyramid;
pub mod render;
pub mod viewport;
