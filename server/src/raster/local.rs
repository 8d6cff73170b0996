//! Local raster source backed by the `image` crate

use std::path::Path;
use tracing::debug;

use super::service::ImageSource;
use super::types::{ImageError, ImageInfo};

/// Supported raster file extensions
pub const RASTER_EXTENSIONS: &[&str] = &["tif", "tiff", "png", "jpg", "jpeg"];

/// Reads image headers from the local filesystem.
///
/// Only the header is decoded; pixel data stays with the rendering side.
#[derive(Debug, Clone, Default)]
pub struct LocalImageSource;

impl LocalImageSource {
    pub fn new() -> Self {
        Self
    }

    /// Whether the file extension is one we can probe
    pub fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .is_some_and(|e| RASTER_EXTENSIONS.contains(&e.as_str()))
    }
}

impl ImageSource for LocalImageSource {
    fn probe(&self, path: &Path) -> Result<ImageInfo, ImageError> {
        let display = path.display().to_string();

        if !path.is_file() {
            return Err(ImageError::io(
                display.clone(),
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Image not found: {}", display),
                ),
            ));
        }

        if !Self::is_supported(path) {
            return Err(ImageError::io(
                display.clone(),
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("Unsupported image format: {}", display),
                ),
            ));
        }

        let (width, height) =
            image::image_dimensions(path).map_err(|e| ImageError::load_failure(display, e))?;

        debug!("Probed image {:?}: {}x{}", path, width, height);
        Ok(ImageInfo { width, height })
    }
}
