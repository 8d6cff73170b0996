//! ImageSource trait definition

use std::path::Path;

use super::types::{ImageError, ImageInfo};

/// Trait for raster sources (local files, or test fixtures)
pub trait ImageSource: Send + Sync {
    /// Open an image far enough to learn its pixel dimensions
    fn probe(&self, path: &Path) -> Result<ImageInfo, ImageError>;
}
