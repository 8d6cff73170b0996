//! Raster-related types and error definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when opening a raster image
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to load image {path}: {source}")]
    ImageLoadFailure {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

impl ImageError {
    pub fn load_failure(path: impl Into<String>, source: image::ImageError) -> Self {
        Self::ImageLoadFailure {
            path: path.into(),
            source,
        }
    }

    /// Wrap a plain OS error (missing file, permissions, ...)
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::load_failure(path, image::ImageError::IoError(source))
    }
}

/// What the overlay needs to know about a loaded raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Full resolution width in pixels
    pub width: u32,
    /// Full resolution height in pixels
    pub height: u32,
}
