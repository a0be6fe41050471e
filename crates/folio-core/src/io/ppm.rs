use crate::error::{Result, ViewerError};

/// Parsed `P6` header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PpmHeader {
    pub width: u32,
    pub height: u32,
    pub max_value: u32,
    /// Byte offset of the first pixel.
    pub data_offset: u64,
}

impl PpmHeader {
    /// True when samples are single bytes (max value below 256).
    pub fn is_rgb8(&self) -> bool {
        self.max_value <= 255
    }
}

/// Parse the header of a binary PPM from the start of the file.
pub fn parse_header(buf: &[u8]) -> Result<PpmHeader> {
    if buf.len() < 2 || &buf[0..2] != b"P6" {
        return Err(ViewerError::Decode("Missing P6 magic".into()));
    }

    let mut pos = 2;
    let width = next_number(buf, &mut pos)?;
    let height = next_number(buf, &mut pos)?;
    let max_value = next_number(buf, &mut pos)?;

    // Exactly one whitespace byte separates the header from the raster.
    match buf.get(pos) {
        Some(b) if b.is_ascii_whitespace() => pos += 1,
        _ => return Err(ViewerError::Decode("Truncated PPM header".into())),
    }

    if width == 0 || height == 0 {
        return Err(ViewerError::InvalidDimensions { width, height });
    }
    if max_value == 0 || max_value > 65_535 {
        return Err(ViewerError::Decode(format!(
            "Invalid PPM max value {max_value}"
        )));
    }

    Ok(PpmHeader {
        width,
        height,
        max_value,
        data_offset: pos as u64,
    })
}

fn next_number(buf: &[u8], pos: &mut usize) -> Result<u32> {
    skip_whitespace_and_comments(buf, pos);

    let start = *pos;
    while *pos < buf.len() && buf[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if start == *pos {
        return Err(ViewerError::Decode("Malformed PPM header".into()));
    }

    std::str::from_utf8(&buf[start..*pos])
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| ViewerError::Decode("PPM header value out of range".into()))
}

fn skip_whitespace_and_comments(buf: &[u8], pos: &mut usize) {
    while *pos < buf.len() {
        if buf[*pos] == b'#' {
            while *pos < buf.len() && buf[*pos] != b'\n' {
                *pos += 1;
            }
        } else if buf[*pos].is_ascii_whitespace() {
            *pos += 1;
        } else {
            break;
        }
    }
}
