//! JPEG file to color [`Raster`].
//!
//! The byte source is read to its end and must close with an end-of-image
//! marker, so a stream cut off inside the scan data fails instead of being
//! padded by the lenient decoder. The header is then read for the output
//! dimensions and component count, and the rows are decoded in order into
//! one contiguous, unpadded buffer.

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::types::{alloc_buffer, PixelLayout, Raster};
use image::codecs::jpeg::JpegDecoder;
use image::{ColorType, ImageDecoder};
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

const END_OF_IMAGE: [u8; 2] = [0xFF, 0xD9];

/// Whether the stream ends with an EOI marker, ignoring trailing zero fill.
fn has_end_marker(bytes: &[u8]) -> bool {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    bytes[..end].ends_with(&END_OF_IMAGE)
}

fn validate_dimensions(width: u32, height: u32, max_dimension: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ScanError::Decode(format!("empty image {width}x{height}")));
    }
    if width > max_dimension || height > max_dimension {
        return Err(ScanError::DimensionsTooLarge {
            width,
            height,
            max_dimension,
        });
    }
    if width.checked_mul(height).is_none() {
        return Err(ScanError::DimensionOverflow { width, height });
    }
    Ok(())
}

/// Load a JPEG file with the default dimension guard.
pub fn load(path: impl AsRef<Path>) -> Result<Raster> {
    load_with(path, &ScanConfig::default())
}

pub fn load_with(path: impl AsRef<Path>, config: &ScanConfig) -> Result<Raster> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // The reader moves in and is dropped once the stream is read, on every path.
    let raster = decode_jpeg(BufReader::new(file), config.max_dimension)?;
    info!(
        "Image loaded. Width: {}, Height: {}",
        raster.width(),
        raster.height()
    );
    Ok(raster)
}

/// Decode an in-memory JPEG.
pub fn load_from_memory(bytes: &[u8], config: &ScanConfig) -> Result<Raster> {
    decode_bytes(bytes, config.max_dimension)
}

/// Decode a JPEG stream into a packed RGB raster.
pub fn decode_jpeg<R: Read>(mut reader: R, max_dimension: u32) -> Result<Raster> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| ScanError::Decode(format!("read failed: {e}")))?;
    drop(reader);
    decode_bytes(&bytes, max_dimension)
}

fn decode_bytes(bytes: &[u8], max_dimension: u32) -> Result<Raster> {
    let decoder =
        JpegDecoder::new(Cursor::new(bytes)).map_err(|e| ScanError::Decode(e.to_string()))?;

    let (width, height) = decoder.dimensions();
    let color = decoder.color_type();
    let components = color.channel_count();
    debug!("jpeg header: {width}x{height}, {components} component(s), {color:?}");

    if !has_end_marker(bytes) {
        return Err(ScanError::Decode(
            "stream truncated: missing end-of-image marker".to_string(),
        ));
    }
    if color != ColorType::Rgb8 {
        return Err(ScanError::UnsupportedComponents(components));
    }
    validate_dimensions(width, height, max_dimension)?;

    let layout = PixelLayout::Rgb8;
    let stride = (width as usize)
        .checked_mul(layout.channels())
        .ok_or(ScanError::DimensionOverflow { width, height })?;
    let len = stride
        .checked_mul(height as usize)
        .ok_or(ScanError::DimensionOverflow { width, height })?;

    if decoder.total_bytes() != len as u64 {
        return Err(ScanError::Decode(format!(
            "decoder reports {} output bytes, expected {len}",
            decoder.total_bytes()
        )));
    }

    let mut data = alloc_buffer(len)?;
    decoder
        .read_image(&mut data)
        .map_err(|e| ScanError::Decode(e.to_string()))?;
    debug!("decoded {height} rows of {stride} bytes");

    Raster::from_raw(width, height, layout, stride, data)
}
