pub mod config;
pub mod detector;
pub mod error;
pub mod loader;
pub mod luminance;
pub mod types;

pub use config::{DetectorConfig, ScanConfig};
pub use detector::{select_first_qr, DetectorImage, FourCc, QrDetector};
pub use error::{ErrorClass, Result, ScanError};
pub use loader::load;
pub use luminance::to_luminance;
pub use types::{PixelLayout, Raster, ScanOutcome, Symbol, SymbolKind};

use log::debug;
use std::path::Path;

/// Scan a JPEG file for a QR code with the default configuration.
pub fn scan(path: impl AsRef<Path>) -> Result<ScanOutcome> {
    scan_with(path, &ScanConfig::default())
}

pub fn scan_with(path: impl AsRef<Path>, config: &ScanConfig) -> Result<ScanOutcome> {
    let raster = loader::load_with(path, config)?;
    detect(raster, config)
}

/// Scan an in-memory JPEG.
pub fn scan_bytes(jpeg: &[u8], config: &ScanConfig) -> Result<ScanOutcome> {
    let raster = loader::load_from_memory(jpeg, config)?;
    detect(raster, config)
}

fn detect(raster: Raster, config: &ScanConfig) -> Result<ScanOutcome> {
    let luma = luminance::to_luminance(raster)?;
    let detector = QrDetector::new(config.detector.clone())?;
    let image = DetectorImage::from_luminance(luma)?;
    debug!(
        "handing {}x{} {} (0x{:08x}) buffer to detector",
        image.width(),
        image.height(),
        image.format(),
        image.format().code()
    );
    let symbols = detector.scan(image);
    debug!("detector reported {} symbol(s)", symbols.len());

    Ok(match select_first_qr(&symbols) {
        Some(symbol) => ScanOutcome::Found(symbol.clone()),
        None => ScanOutcome::NotFound,
    })
}
