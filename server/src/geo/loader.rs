//! Geo-reference loaders
//!
//! The overlay asks a [`GeoReferenceLoader`] for the metadata of each image it
//! opens. The bundled implementation reads a JSON sidecar next to the image:
//!
//! ```json
//! { "tl": "18S UJ 23480 06470", "origin": [0, 0], "pxscale": 2.5, "precision_m": 1 }
//! ```
//!
//! `tl` may also be given as `{"zone": 18, "band": "S", "easting": .., "northing": ..}`.
//! A sidecar of the form `{"error": "..."}` reports that the metadata source
//! failed for this image.

use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::transform::GeoReference;
use super::types::GeoError;
use super::usng::{GridPrecision, UsngLabel, UtmPosition};
use crate::waypoint::PixelPoint;

/// Default sidecar suffix appended to the image path
pub const DEFAULT_SIDECAR_SUFFIX: &str = ".geo.json";

/// Source of geo-metadata for raster images
pub trait GeoReferenceLoader: Send + Sync {
    /// Load the reference for an image, failing with a descriptive error when
    /// the image carries no usable geo-metadata
    fn load(&self, image_path: &Path) -> Result<GeoReference, GeoError>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SidecarDocument {
    Failure { error: String },
    Reference(SidecarReference),
}

#[derive(Debug, Deserialize)]
struct SidecarReference {
    tl: SidecarAnchor,
    #[serde(default)]
    origin: [f64; 2],
    pxscale: f64,
    #[serde(default = "default_precision_m")]
    precision_m: u32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SidecarAnchor {
    Usng(String),
    Utm {
        zone: u8,
        band: char,
        easting: f64,
        northing: f64,
    },
}

fn default_precision_m() -> u32 {
    1
}

impl SidecarReference {
    fn into_reference(self) -> Result<GeoReference, GeoError> {
        let anchor = match self.tl {
            SidecarAnchor::Usng(label) => label.parse::<UsngLabel>()?.to_utm(),
            SidecarAnchor::Utm {
                zone,
                band,
                easting,
                northing,
            } => UtmPosition::new(zone, band, easting, northing)?,
        };
        GeoReference::new(
            PixelPoint::new(self.origin[0], self.origin[1]),
            self.pxscale,
            anchor,
            GridPrecision::from_meters(self.precision_m)?,
        )
    }
}

/// Parse a sidecar document
pub fn parse_sidecar(json: &str) -> Result<GeoReference, GeoError> {
    let document: SidecarDocument = serde_json::from_str(json)
        .map_err(|e| GeoError::Metadata(format!("malformed geo sidecar: {}", e)))?;

    match document {
        SidecarDocument::Failure { error } => Err(GeoError::Metadata(error)),
        SidecarDocument::Reference(reference) => reference.into_reference(),
    }
}

/// Loader reading JSON sidecar files stored next to the image
#[derive(Debug, Clone)]
pub struct SidecarGeoReferenceLoader {
    suffix: String,
}

impl Default for SidecarGeoReferenceLoader {
    fn default() -> Self {
        Self::new(DEFAULT_SIDECAR_SUFFIX)
    }
}

impl SidecarGeoReferenceLoader {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// Sidecar locations, in lookup order:
    /// 1. `<image path><suffix>` (`map1.tif.geo.json`)
    /// 2. `<image stem><suffix>` in the same directory (`map1.geo.json`)
    pub fn candidates(&self, image_path: &Path) -> Vec<PathBuf> {
        let mut full: OsString = image_path.as_os_str().to_owned();
        full.push(&self.suffix);
        let mut candidates = vec![PathBuf::from(full)];

        if let Some(stem) = image_path.file_stem() {
            let mut name = stem.to_owned();
            name.push(&self.suffix);
            let by_stem = image_path.with_file_name(name);
            if !candidates.contains(&by_stem) {
                candidates.push(by_stem);
            }
        }

        candidates
    }
}

impl GeoReferenceLoader for SidecarGeoReferenceLoader {
    fn load(&self, image_path: &Path) -> Result<GeoReference, GeoError> {
        let sidecar = self
            .candidates(image_path)
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| {
                GeoError::Metadata(format!(
                    "no geo-reference sidecar found for {}",
                    image_path.display()
                ))
            })?;

        debug!("Reading geo-reference from {:?}", sidecar);
        let json = std::fs::read_to_string(&sidecar)?;
        parse_sidecar(&json)
    }
}
