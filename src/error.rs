use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Could not open image file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode JPEG: {0}")]
    Decode(String),

    #[error("Unsupported component count: {0} (expected 3 color samples per pixel)")]
    UnsupportedComponents(u8),

    #[error("Image too large: {width}x{height} exceeds maximum {max_dimension}x{max_dimension}")]
    DimensionsTooLarge {
        width: u32,
        height: u32,
        max_dimension: u32,
    },

    #[error("Dimension overflow: {width} x {height} overflows")]
    DimensionOverflow { width: u32, height: u32 },

    #[error("Could not allocate {bytes} bytes for image buffer")]
    Allocation { bytes: usize },

    #[error("Could not create symbol detector: {0}")]
    DetectorInit(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Failure classes reported to the user, one diagnostic each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Io,
    Decode,
    Allocation,
    DetectorInit,
    InvalidInput,
}

impl ScanError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Io { .. } => ErrorClass::Io,
            Self::Decode(_)
            | Self::UnsupportedComponents(_)
            | Self::DimensionsTooLarge { .. }
            | Self::DimensionOverflow { .. } => ErrorClass::Decode,
            Self::Allocation { .. } => ErrorClass::Allocation,
            Self::DetectorInit(_) => ErrorClass::DetectorInit,
            Self::InvalidInput(_) => ErrorClass::InvalidInput,
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::Decode => write!(f, "decode error"),
            Self::Allocation => write!(f, "allocation error"),
            Self::DetectorInit => write!(f, "detector error"),
            Self::InvalidInput => write!(f, "invalid input"),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_io_names_path() {
        let err = ScanError::Io {
            path: PathBuf::from("/nope/missing.jpg"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let msg = err.to_string();
        assert!(msg.contains("Could not open"));
        assert!(msg.contains("missing.jpg"));
        assert_eq!(err.class(), ErrorClass::Io);
    }

    #[test]
    fn error_display_decode() {
        let err = ScanError::Decode("bad marker".to_string());
        let msg = err.to_string();
        assert!(msg.contains("decode JPEG"));
        assert!(msg.contains("bad marker"));
    }

    #[test]
    fn error_display_dimensions_too_large() {
        let err = ScanError::DimensionsTooLarge { width: 20000, height: 20000, max_dimension: 10000 };
        let msg = err.to_string();
        assert!(msg.contains("20000"));
        assert!(msg.contains("10000"));
    }

    #[test]
    fn error_display_allocation() {
        let err = ScanError::Allocation { bytes: 42 };
        assert!(err.to_string().contains("42 bytes"));
    }

    #[test]
    fn decode_family_shares_class() {
        assert_eq!(ScanError::Decode(String::new()).class(), ErrorClass::Decode);
        assert_eq!(ScanError::UnsupportedComponents(1).class(), ErrorClass::Decode);
        assert_eq!(
            ScanError::DimensionOverflow { width: u32::MAX, height: u32::MAX }.class(),
            ErrorClass::Decode
        );
        assert_eq!(
            ScanError::DimensionsTooLarge { width: 1, height: 1, max_dimension: 0 }.class(),
            ErrorClass::Decode
        );
    }

    #[test]
    fn remaining_classes() {
        assert_eq!(ScanError::Allocation { bytes: 1 }.class(), ErrorClass::Allocation);
        assert_eq!(ScanError::DetectorInit("x".into()).class(), ErrorClass::DetectorInit);
        assert_eq!(ScanError::InvalidInput("x".into()).class(), ErrorClass::InvalidInput);
        assert_eq!(ErrorClass::DetectorInit.to_string(), "detector error");
    }
}
