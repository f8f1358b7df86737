//! Handoff of the luminance buffer to the symbol detection engines.
//!
//! A [`DetectorImage`] owns the pixel buffer once it is built from a
//! luminance [`Raster`]; [`QrDetector::scan`] takes it by value, so the
//! pipeline cannot read or free the buffer after the handoff.

use crate::config::DetectorConfig;
use crate::error::{Result, ScanError};
use crate::types::{PixelLayout, Raster, Symbol, SymbolKind};
use log::debug;
use rxing::common::{GlobalHistogramBinarizer, HybridBinarizer};
use rxing::multi::{GenericMultipleBarcodeReader, MultipleBarcodeReader};
use rxing::{
    BarcodeFormat, Binarizer, BinaryBitmap, DecodeHints, Luma8LuminanceSource, MultiFormatReader,
};
use std::collections::HashSet;
use std::fmt;

/// Four-character pixel format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc([u8; 4]);

impl FourCc {
    /// Packed 8-bit grayscale, one byte per pixel.
    pub const Y800: FourCc = FourCc(*b"Y800");

    pub const fn new(tag: [u8; 4]) -> Self {
        Self(tag)
    }

    /// Tag bytes read as a little-endian integer, the form C engines compare against.
    pub const fn code(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", b.escape_ascii())?;
        }
        Ok(())
    }
}

/// Image descriptor bound to an owned pixel buffer.
#[derive(Debug)]
pub struct DetectorImage {
    width: u32,
    height: u32,
    format: FourCc,
    data: Vec<u8>,
}

impl DetectorImage {
    pub fn new(width: u32, height: u32, format: FourCc, data: Vec<u8>) -> Result<Self> {
        if format != FourCc::Y800 {
            return Err(ScanError::DetectorInit(format!(
                "unsupported pixel format {format}, only Y800 is accepted"
            )));
        }
        if width == 0 || height == 0 {
            return Err(ScanError::DetectorInit(format!(
                "image size {width}x{height} is empty"
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or(ScanError::DimensionOverflow { width, height })?;
        if data.len() != expected {
            return Err(ScanError::DetectorInit(format!(
                "Y800 {width}x{height} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self { width, height, format, data })
    }

    /// Move a packed luminance raster into a `Y800` descriptor.
    pub fn from_luminance(raster: Raster) -> Result<Self> {
        if raster.layout() != PixelLayout::Luma8 || raster.stride() != raster.width() as usize {
            return Err(ScanError::InvalidInput(format!(
                "detector needs packed single-channel pixels, got {} channel(s) with stride {}",
                raster.channel_count(),
                raster.stride()
            )));
        }
        let (width, height) = (raster.width(), raster.height());
        Self::new(width, height, FourCc::Y800, raster.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> FourCc {
        self.format
    }
}

fn barcode_format(kind: SymbolKind) -> Option<BarcodeFormat> {
    match kind {
        SymbolKind::QrCode => Some(BarcodeFormat::QR_CODE),
        SymbolKind::MicroQrCode => Some(BarcodeFormat::MICRO_QR_CODE),
        SymbolKind::DataMatrix => Some(BarcodeFormat::DATA_MATRIX),
        SymbolKind::Aztec => Some(BarcodeFormat::AZTEC),
        SymbolKind::Pdf417 => Some(BarcodeFormat::PDF_417),
        SymbolKind::Other => None,
    }
}

fn symbol_kind(format: &BarcodeFormat) -> SymbolKind {
    match format {
        BarcodeFormat::QR_CODE => SymbolKind::QrCode,
        BarcodeFormat::MICRO_QR_CODE => SymbolKind::MicroQrCode,
        BarcodeFormat::DATA_MATRIX => SymbolKind::DataMatrix,
        BarcodeFormat::AZTEC => SymbolKind::Aztec,
        BarcodeFormat::PDF_417 => SymbolKind::Pdf417,
        _ => SymbolKind::Other,
    }
}

/// Configured detector over rqrr and rxing.
#[derive(Debug)]
pub struct QrDetector {
    config: DetectorConfig,
    formats: HashSet<BarcodeFormat>,
}

impl QrDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        if config.symbologies.is_empty() {
            return Err(ScanError::DetectorInit("no symbol classes enabled".to_string()));
        }
        let mut formats = HashSet::new();
        for &kind in &config.symbologies {
            let format = barcode_format(kind).ok_or_else(|| {
                ScanError::DetectorInit(format!("symbol class {kind} cannot be enabled"))
            })?;
            formats.insert(format);
        }
        Ok(Self { config, formats })
    }

    pub fn is_enabled(&self, kind: SymbolKind) -> bool {
        self.config.symbologies.contains(&kind)
    }

    fn rxing_hints(&self) -> DecodeHints {
        DecodeHints {
            AlsoInverted: Some(self.config.also_inverted),
            TryHarder: Some(self.config.try_harder),
            PossibleFormats: Some(self.formats.clone()),
            ..DecodeHints::default()
        }
    }

    /// Run detection, taking ownership of the image.
    ///
    /// Passes run in order until one reports at least one symbol: rqrr grid
    /// enumeration, rxing multi-symbol reading with a hybrid binarizer, then
    /// with a global histogram binarizer, then rqrr on inverted luminance. Symbols keep the
    /// order the engine reported them in.
    pub fn scan(&self, image: DetectorImage) -> Vec<Symbol> {
        let DetectorImage { width, height, data, .. } = image;
        let qr = self.is_enabled(SymbolKind::QrCode);

        let mut symbols = Vec::new();
        if qr {
            symbols = decode_rqrr(&data, width, height, false);
            debug!("rqrr pass: {} symbol(s)", symbols.len());
        }
        if symbols.is_empty() {
            symbols = self.decode_rxing_with(&data, width, height, HybridBinarizer::new);
            debug!("rxing hybrid pass: {} symbol(s)", symbols.len());
        }
        if symbols.is_empty() {
            symbols = self.decode_rxing_with(&data, width, height, GlobalHistogramBinarizer::new);
            debug!("rxing global histogram pass: {} symbol(s)", symbols.len());
        }
        if symbols.is_empty() && qr && self.config.also_inverted {
            symbols = decode_rqrr(&data, width, height, true);
            debug!("rqrr inverted pass: {} symbol(s)", symbols.len());
        }

        dedup_symbols(symbols)
    }

    fn decode_rxing_with<B, F>(&self, luma_data: &[u8], width: u32, height: u32, make_binarizer: F) -> Vec<Symbol>
    where
        B: Binarizer + 'static,
        F: FnOnce(Luma8LuminanceSource) -> B + Send + 'static,
    {
        let luma = luma_data.to_vec();
        let hints = self.rxing_hints();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let source = Luma8LuminanceSource::new(luma, width, height);
            let binarizer = make_binarizer(source);
            let mut bitmap = BinaryBitmap::new(binarizer);
            let mut reader = GenericMultipleBarcodeReader::new(MultiFormatReader::default());
            reader.decode_multiple_with_hints(&mut bitmap, &hints)
        }));

        match result {
            Ok(Ok(results)) => results
                .iter()
                .map(|r| Symbol {
                    kind: symbol_kind(r.getBarcodeFormat()),
                    text: r.getText().to_string(),
                })
                .collect(),
            Ok(Err(e)) => {
                debug!("rxing: {e:?}");
                Vec::new()
            }
            Err(_) => {
                debug!("rxing panicked");
                Vec::new()
            }
        }
    }
}

fn decode_rqrr(luma_data: &[u8], width: u32, height: u32, invert: bool) -> Vec<Symbol> {
    let (w, h) = (width as usize, height as usize);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w, h, |x, y| {
            let v = luma_data[y * w + x];
            if invert { 255 - v } else { v }
        });
        prepared
            .detect_grids()
            .iter()
            .filter_map(|grid| match grid.decode() {
                Ok((_meta, content)) => Some(Symbol { kind: SymbolKind::QrCode, text: content }),
                Err(e) => {
                    debug!("rqrr grid rejected: {e:?}");
                    None
                }
            })
            .collect::<Vec<_>>()
    }));

    result.unwrap_or_else(|_| {
        debug!("rqrr panicked");
        Vec::new()
    })
}

fn dedup_symbols(symbols: Vec<Symbol>) -> Vec<Symbol> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .filter(|s| seen.insert((s.kind, s.text.clone())))
        .collect()
}

/// First QR code among `symbols`, in detector order; later matches are ignored.
pub fn select_first_qr(symbols: &[Symbol]) -> Option<&Symbol> {
    symbols.iter().find(|s| s.kind == SymbolKind::QrCode)
}
