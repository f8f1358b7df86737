use crate::error::{Result, ScanError};
use crate::types::{alloc_buffer, PixelLayout, Raster};
use log::info;

/// Unweighted mean of the three color samples, truncated.
#[inline]
pub fn average_rgb(r: u8, g: u8, b: u8) -> u8 {
    ((r as u16 + g as u16 + b as u16) / 3) as u8
}

/// Reduce an RGB raster to a packed single-channel luminance raster.
///
/// The color raster is consumed; its buffer is released once the
/// luminance buffer is filled.
pub fn to_luminance(raster: Raster) -> Result<Raster> {
    if raster.layout() != PixelLayout::Rgb8 {
        return Err(ScanError::InvalidInput(format!(
            "luminance conversion needs 3 channels, raster has {}",
            raster.channel_count()
        )));
    }

    let width = raster.width();
    let height = raster.height();
    let out_stride = width as usize;
    let mut luma = alloc_buffer(out_stride * height as usize)?;

    for (src, dst) in raster.rows().zip(luma.chunks_exact_mut(out_stride)) {
        for (px, out) in src.chunks_exact(3).zip(dst.iter_mut()) {
            *out = average_rgb(px[0], px[1], px[2]);
        }
    }
    drop(raster);
    info!("Image converted to grayscale");

    Raster::from_raw(width, height, PixelLayout::Luma8, out_stride, luma)
}
