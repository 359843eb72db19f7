//! Image integrity validation
//!
//! Confirms that a downloaded buffer is a well-formed image of a format the
//! `image` crate understands. The specific failure is only logged; callers get
//! a yes/no answer from [`ImageValidator::is_valid`].

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use thiserror::Error;
use tracing::debug;

/// Error types for image validation
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Empty image buffer")]
    Empty,

    #[error("Unrecognized image format")]
    UnknownFormat,

    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Format and dimensions of a buffer that decoded cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Validator for downloaded image bytes
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageValidator;

impl ImageValidator {
    /// Returns true if `bytes` decode as a complete image.
    pub fn is_valid(bytes: &[u8]) -> bool {
        match Self::inspect(bytes) {
            Ok(_) => true,
            Err(e) => {
                debug!("Image failed integrity check: {}", e);
                false
            }
        }
    }

    /// Detect the format from the magic bytes and decode the whole buffer.
    ///
    /// A header-only probe accepts truncated files, so the image is decoded in
    /// full before it is reported as valid.
    pub fn inspect(bytes: &[u8]) -> ValidationResult<ImageInfo> {
        if bytes.is_empty() {
            return Err(ValidationError::Empty);
        }

        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let format = reader.format().ok_or(ValidationError::UnknownFormat)?;
        let decoded = reader.decode()?;

        Ok(ImageInfo {
            format,
            width: decoded.width(),
            height: decoded.height(),
        })
    }
}
