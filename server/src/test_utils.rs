//! Test Utilities Module
//!
//! In-memory collaborators and fixtures for exercising the overlay without
//! touching real rasters or sidecar files.
//! This module is only compiled when running tests.

#![cfg(test)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::geo::{GeoError, GeoReference, GeoReferenceLoader, GridPrecision, UtmPosition};
use crate::overlay::OverlayController;
use crate::persist::SaveDirectory;
use crate::raster::{ImageError, ImageInfo, ImageSource};
use crate::waypoint::PixelPoint;

/// Path of the geo-referenced fixture image
pub const MAP1: &str = "/maps/map1.tif";

/// Path of a fixture image with no geo-metadata
pub const SCAN: &str = "/maps/scan.png";

/// `map1.tif`: origin (100, 100), 10 px per meter, anchored at 18S UJ 23480 06470
pub fn map1_reference() -> GeoReference {
    GeoReference::new(
        PixelPoint::new(100.0, 100.0),
        10.0,
        UtmPosition::new(18, 'S', 323_480.0, 4_306_470.0).unwrap(),
        GridPrecision::METER,
    )
    .unwrap()
}

// ============================================================================
// Collaborators
// ============================================================================

/// Image source answering from a fixed table of dimensions
#[derive(Debug, Default)]
pub struct FixedImageSource {
    images: HashMap<PathBuf, ImageInfo>,
}

impl FixedImageSource {
    pub fn with_image(mut self, path: &str, width: u32, height: u32) -> Self {
        self.images
            .insert(PathBuf::from(path), ImageInfo { width, height });
        self
    }
}

impl ImageSource for FixedImageSource {
    fn probe(&self, path: &Path) -> Result<ImageInfo, ImageError> {
        self.images.get(path).copied().ok_or_else(|| {
            ImageError::io(
                path.display().to_string(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such fixture"),
            )
        })
    }
}

/// Geo-reference loader answering from a fixed table
#[derive(Debug, Default)]
pub struct StaticGeoReferenceLoader {
    references: HashMap<PathBuf, GeoReference>,
}

impl StaticGeoReferenceLoader {
    pub fn with_reference(mut self, path: &str, reference: GeoReference) -> Self {
        self.references.insert(PathBuf::from(path), reference);
        self
    }
}

impl GeoReferenceLoader for StaticGeoReferenceLoader {
    fn load(&self, image_path: &Path) -> Result<GeoReference, GeoError> {
        self.references.get(image_path).copied().ok_or_else(|| {
            GeoError::Metadata(format!("{} has no geo-metadata", image_path.display()))
        })
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Fresh, empty saves directory under the system temp dir
pub fn temp_saves_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gridmark_test_{}", name));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// Controller knowing `MAP1` (800x600, geo-referenced) and `SCAN` (320x200, no reference)
pub fn test_controller(saves_dir: &Path) -> OverlayController {
    let images = FixedImageSource::default()
        .with_image(MAP1, 800, 600)
        .with_image(SCAN, 320, 200);
    let georef = StaticGeoReferenceLoader::default().with_reference(MAP1, map1_reference());

    OverlayController::new(
        Arc::new(images),
        Arc::new(georef),
        SaveDirectory::new(saves_dir),
        64,
    )
}
