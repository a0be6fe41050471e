use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Result, ViewerError};

const TAG_IMAGE_WIDTH: u16 = 256;
const TAG_IMAGE_LENGTH: u16 = 257;
const TAG_BITS_PER_SAMPLE: u16 = 258;
const TAG_COMPRESSION: u16 = 259;
const TAG_PHOTOMETRIC: u16 = 262;
const TAG_STRIP_OFFSETS: u16 = 273;
const TAG_SAMPLES_PER_PIXEL: u16 = 277;
const TAG_ROWS_PER_STRIP: u16 = 278;
const TAG_STRIP_BYTE_COUNTS: u16 = 279;
const TAG_PLANAR_CONFIG: u16 = 284;
const TAG_TILE_WIDTH: u16 = 322;

const TYPE_BYTE: u16 = 1;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;

const COMPRESSION_NONE: u32 = 1;
const PHOTOMETRIC_RGB: u32 = 2;
const PLANAR_CHUNKY: u32 = 1;

/// Raw layout of an uncompressed RGB8 TIFF.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TiffRawInfo {
    pub width: u32,
    pub height: u32,
    pub data_offset: u64,
}

/// Dimensions read from the first IFD, whether or not the data is raw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TiffProbe {
    pub width: u32,
    pub height: u32,
    pub raw: Option<TiffRawInfo>,
}

/// Inspect a TIFF file held in `buf`. `raw` is set only when the first IFD is
/// uncompressed chunky RGB8 with its strips stored back to back.
pub fn probe(buf: &[u8]) -> Result<TiffProbe> {
    if buf.len() < 8 {
        return Err(ViewerError::Decode("File too small for TIFF header".into()));
    }
    match &buf[0..2] {
        b"II" => probe_with::<LittleEndian>(buf),
        b"MM" => probe_with::<BigEndian>(buf),
        _ => Err(ViewerError::Decode("Missing TIFF byte order mark".into())),
    }
}

#[derive(Default)]
struct Fields {
    width: Option<u32>,
    height: Option<u32>,
    bits_per_sample: Vec<u32>,
    compression: u32,
    photometric: Option<u32>,
    strip_offsets: Vec<u32>,
    samples_per_pixel: u32,
    rows_per_strip: Option<u32>,
    strip_byte_counts: Vec<u32>,
    planar_config: u32,
    tiled: bool,
}

fn probe_with<B: ByteOrder>(buf: &[u8]) -> Result<TiffProbe> {
    if B::read_u16(&buf[2..4]) != 42 {
        return Err(ViewerError::Decode(
            "Not a classic TIFF (BigTIFF is not supported)".into(),
        ));
    }

    let ifd = B::read_u32(&buf[4..8]) as usize;
    let count = B::read_u16(slice(buf, ifd, 2)?) as usize;

    let mut fields = Fields {
        compression: COMPRESSION_NONE,
        samples_per_pixel: 1,
        planar_config: PLANAR_CHUNKY,
        ..Default::default()
    };

    for i in 0..count {
        let entry = slice(buf, ifd + 2 + i * 12, 12)?;
        let tag = B::read_u16(&entry[0..2]);
        let field_type = B::read_u16(&entry[2..4]);
        let n = B::read_u32(&entry[4..8]) as usize;

        match tag {
            TAG_IMAGE_WIDTH => fields.width = first_value::<B>(buf, entry, field_type, n)?,
            TAG_IMAGE_LENGTH => fields.height = first_value::<B>(buf, entry, field_type, n)?,
            TAG_BITS_PER_SAMPLE => {
                fields.bits_per_sample = read_values::<B>(buf, entry, field_type, n)?
            }
            TAG_COMPRESSION => {
                fields.compression = first_value::<B>(buf, entry, field_type, n)?
                    .unwrap_or(COMPRESSION_NONE)
            }
            TAG_PHOTOMETRIC => fields.photometric = first_value::<B>(buf, entry, field_type, n)?,
            TAG_STRIP_OFFSETS => {
                fields.strip_offsets = read_values::<B>(buf, entry, field_type, n)?
            }
            TAG_SAMPLES_PER_PIXEL => {
                fields.samples_per_pixel =
                    first_value::<B>(buf, entry, field_type, n)?.unwrap_or(1)
            }
            TAG_ROWS_PER_STRIP => {
                fields.rows_per_strip = first_value::<B>(buf, entry, field_type, n)?
            }
            TAG_STRIP_BYTE_COUNTS => {
                fields.strip_byte_counts = read_values::<B>(buf, entry, field_type, n)?
            }
            TAG_PLANAR_CONFIG => {
                fields.planar_config =
                    first_value::<B>(buf, entry, field_type, n)?.unwrap_or(PLANAR_CHUNKY)
            }
            TAG_TILE_WIDTH => fields.tiled = true,
            _ => {}
        }
    }

    let (width, height) = match (fields.width, fields.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        (w, h) => {
            return Err(ViewerError::InvalidDimensions {
                width: w.unwrap_or(0),
                height: h.unwrap_or(0),
            })
        }
    };

    let raw = raw_layout(&fields, width, height, buf.len());
    Ok(TiffProbe { width, height, raw })
}

fn raw_layout(fields: &Fields, width: u32, height: u32, file_len: usize) -> Option<TiffRawInfo> {
    let rgb8 = fields.samples_per_pixel == 3
        && fields.bits_per_sample.len() == 3
        && fields.bits_per_sample.iter().all(|&b| b == 8);
    if fields.tiled
        || fields.compression != COMPRESSION_NONE
        || fields.photometric != Some(PHOTOMETRIC_RGB)
        || fields.planar_config != PLANAR_CHUNKY
        || !rgb8
        || fields.strip_offsets.is_empty()
        || fields.strip_offsets.len() != fields.strip_byte_counts.len()
    {
        return None;
    }

    // Strips must follow one another without gaps so the raster is one block.
    let start = fields.strip_offsets[0] as u64;
    let mut expected = start;
    for (&offset, &bytes) in fields.strip_offsets.iter().zip(&fields.strip_byte_counts) {
        if offset as u64 != expected {
            return None;
        }
        expected += bytes as u64;
    }

    let raster_bytes = width as u64 * height as u64 * 3;
    if expected - start < raster_bytes || start + raster_bytes > file_len as u64 {
        return None;
    }

    Some(TiffRawInfo {
        width,
        height,
        data_offset: start,
    })
}

fn slice(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    buf.get(offset..offset + len)
        .ok_or_else(|| ViewerError::Decode("TIFF directory truncated".into()))
}

fn type_size(field_type: u16) -> Option<usize> {
    match field_type {
        TYPE_BYTE => Some(1),
        TYPE_SHORT => Some(2),
        TYPE_LONG => Some(4),
        _ => None,
    }
}

fn read_values<B: ByteOrder>(
    buf: &[u8],
    entry: &[u8],
    field_type: u16,
    count: usize,
) -> Result<Vec<u32>> {
    let Some(size) = type_size(field_type) else {
        return Ok(Vec::new());
    };
    let total = size * count;
    // Values of at most four bytes are stored in the entry itself.
    let data = if total <= 4 {
        &entry[8..8 + total]
    } else {
        let offset = B::read_u32(&entry[8..12]) as usize;
        slice(buf, offset, total)?
    };

    Ok(data
        .chunks_exact(size)
        .map(|c| match size {
            1 => c[0] as u32,
            2 => B::read_u16(c) as u32,
            _ => B::read_u32(c),
        })
        .collect())
}

fn first_value<B: ByteOrder>(
    buf: &[u8],
    entry: &[u8],
    field_type: u16,
    count: usize,
) -> Result<Option<u32>> {
    Ok(read_values::<B>(buf, entry, field_type, count.min(1))?
        .first()
        .copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_entry(tag: u16, ty: u16, count: u32, value: u32) -> Vec<u8> {
        let mut e = Vec::new();
        e.extend_from_slice(&tag.to_le_bytes());
        e.extend_from_slice(&ty.to_le_bytes());
        e.extend_from_slice(&count.to_le_bytes());
        e.extend_from_slice(&value.to_le_bytes());
        e
    }

    #[test]
    fn compressed_tiff_has_no_raw_layout() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"II");
        buf.extend_from_slice(&42u16.to_le_bytes());
        buf.extend_from_slice(&8u32.to_le_bytes());
        let entries = [
            le_entry(TAG_IMAGE_WIDTH, TYPE_LONG, 1, 4),
            le_entry(TAG_IMAGE_LENGTH, TYPE_LONG, 1, 2),
            le_entry(TAG_COMPRESSION, TYPE_SHORT, 1, 5),
        ];
        buf.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for e in &entries {
            buf.extend_from_slice(e);
        }
        buf.extend_from_slice(&0u32.to_le_bytes());

        let probe = probe(&buf).unwrap();
        assert_eq!((probe.width, probe.height), (4, 2));
        assert!(probe.raw.is_none());
    }

    #[test]
    fn bad_magic_is_decode_error() {
        let err = probe(b"XX*\0\0\0\0\0").unwrap_err();
        assert!(matches!(err, ViewerError::Decode(_)));
    }
}
