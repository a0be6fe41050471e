pub mod image_io;
pub mod lazy;
pub mod ppm;
pub mod source;
pub mod tiff;
