use crate::types::SymbolKind;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Largest accepted width or height, checked before the pixel buffer is allocated.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    #[serde(default)]
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default = "default_symbologies")]
    pub symbologies: Vec<SymbolKind>,
    #[serde(default = "default_true")]
    pub try_harder: bool,
    #[serde(default = "default_true")]
    pub also_inverted: bool,
}

fn default_max_dimension() -> u32 { 10_000 }
fn default_symbologies() -> Vec<SymbolKind> { vec![SymbolKind::QrCode] }
fn default_true() -> bool { true }

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            detector: DetectorConfig::default(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            symbologies: default_symbologies(),
            try_harder: true,
            also_inverted: true,
        }
    }
}

impl ScanConfig {
    /// Read and parse a TOML config file.
    pub fn from_file(path: &Path) -> std::result::Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&contents)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))
    }
}

/// Resolve the effective config: file (or defaults when it cannot be used),
/// then the command-line override. A zero dimension limit would reject every
/// image, so it falls back to the default.
pub fn load_config(config_path: Option<&str>, max_dimension_override: Option<u32>) -> ScanConfig {
    let mut config = match config_path.map(|p| ScanConfig::from_file(Path::new(p))) {
        None => ScanConfig::default(),
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            warn!("{e}; using defaults");
            ScanConfig::default()
        }
    };

    if let Some(max_dimension) = max_dimension_override {
        config.max_dimension = max_dimension;
    }
    if config.max_dimension == 0 {
        warn!("max_dimension 0 accepts no image, using {}", default_max_dimension());
        config.max_dimension = default_max_dimension();
    }
    config
}
