//! Geo-referencing errors

use thiserror::Error;

/// Errors that can occur when deriving or parsing grid coordinates
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("No geo-reference available for this image")]
    NoReference,

    #[error("Non-finite pixel coordinate: ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },

    #[error("Position outside UTM zone limits: easting={easting:.1}, northing={northing:.1}")]
    OutsideZone { easting: f64, northing: f64 },

    #[error("Invalid USNG label {label:?}: {reason}")]
    InvalidLabel { label: String, reason: String },

    #[error("Label zone {label_zone} does not match reference zone {reference_zone}")]
    ZoneMismatch { label_zone: u8, reference_zone: u8 },

    #[error("Invalid geo-reference: {0}")]
    InvalidReference(String),

    #[error("Invalid grid request: {0}")]
    InvalidGridRequest(String),

    #[error("Grid too dense: {count} lines (max {max})")]
    GridTooDense { count: usize, max: usize },

    #[error("Geo-metadata unavailable: {0}")]
    Metadata(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeoError {
    pub(crate) fn invalid_label(label: &str, reason: impl Into<String>) -> Self {
        Self::InvalidLabel {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}
