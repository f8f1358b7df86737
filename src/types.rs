use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample layout of a raster's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// One 8-bit luminance sample per pixel.
    Luma8,
    /// Red, green, blue 8-bit samples per pixel.
    Rgb8,
}

impl PixelLayout {
    pub const fn channels(self) -> usize {
        match self {
            Self::Luma8 => 1,
            Self::Rgb8 => 3,
        }
    }
}

/// Owned rectangular pixel buffer.
///
/// `data.len() == stride * height` and `stride >= width * channels` always
/// hold; bytes past `width * channels` in a row are padding.
#[derive(Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    layout: PixelLayout,
    stride: usize,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap an owned buffer, checking the stride and length invariants.
    pub fn from_raw(
        width: u32,
        height: u32,
        layout: PixelLayout,
        stride: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ScanError::InvalidInput(format!(
                "raster dimensions must be positive, got {width}x{height}"
            )));
        }
        let row_bytes = (width as usize)
            .checked_mul(layout.channels())
            .ok_or(ScanError::DimensionOverflow { width, height })?;
        if stride < row_bytes {
            return Err(ScanError::InvalidInput(format!(
                "stride {stride} is shorter than a {row_bytes}-byte row"
            )));
        }
        let expected = stride
            .checked_mul(height as usize)
            .ok_or(ScanError::DimensionOverflow { width, height })?;
        if data.len() != expected {
            return Err(ScanError::InvalidInput(format!(
                "buffer holds {} bytes, {width}x{height} with stride {stride} needs {expected}",
                data.len()
            )));
        }
        Ok(Self { width, height, layout, stride, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn channel_count(&self) -> usize {
        self.layout.channels()
    }

    /// Bytes between the start of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel rows without trailing stride padding.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        let row_bytes = self.width as usize * self.layout.channels();
        self.data.chunks_exact(self.stride).map(move |row| &row[..row_bytes])
    }

    /// Samples of the pixel at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = self.layout.channels();
        let start = y as usize * self.stride + x as usize * channels;
        Some(&self.data[start..start + channels])
    }

    /// Give up the raster, yielding its buffer.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

/// Zero-filled buffer of `len` bytes, reporting allocator refusal instead of aborting.
pub(crate) fn alloc_buffer(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| ScanError::Allocation { bytes: len })?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Symbol classes a detector can be configured to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    QrCode,
    MicroQrCode,
    DataMatrix,
    Aztec,
    Pdf417,
    Other,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QrCode => write!(f, "QR-Code"),
            Self::MicroQrCode => write!(f, "Micro QR-Code"),
            Self::DataMatrix => write!(f, "DataMatrix"),
            Self::Aztec => write!(f, "Aztec"),
            Self::Pdf417 => write!(f, "PDF417"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A decoded symbol as reported by the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Found(Symbol),
    NotFound,
}

impl ScanOutcome {
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Found(symbol) => Some(&symbol.text),
            Self::NotFound => None,
        }
    }
}
