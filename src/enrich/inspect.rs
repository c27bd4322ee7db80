//! Header-only image inspection

use image::ImageReader;
use std::io::Cursor;
use thiserror::Error;

/// Dimensions and container format of an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Upper-case codec name, e.g. "PNG" or "JPEG"
    pub format: String,
}

/// Bytes that do not decode as a supported image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unreadable image ({len} bytes): {reason}")]
pub struct UnreadableImageError {
    pub len: usize,
    pub reason: String,
}

/// Reads width, height and format from an image header
///
/// Pixel data is never decoded.
pub fn inspect(bytes: &[u8]) -> Result<ImageInfo, UnreadableImageError> {
    let unreadable = |reason: String| UnreadableImageError {
        len: bytes.len(),
        reason,
    };

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| unreadable(e.to_string()))?;

    let format = reader
        .format()
        .ok_or_else(|| unreadable("unrecognized image format".to_string()))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| unreadable(e.to_string()))?;

    if width == 0 || height == 0 {
        return Err(unreadable(format!("empty image {}x{}", width, height)));
    }

    Ok(ImageInfo {
        width,
        height,
        format: format!("{:?}", format).to_uppercase(),
    })
}
