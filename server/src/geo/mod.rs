//! Geo-referencing
//!
//! USNG coordinates, the pixel <-> grid transform, and geo-metadata loading.

pub mod loader;
pub mod transform;
pub mod types;
pub mod usng;

pub use loader::{DEFAULT_SIDECAR_SUFFIX, GeoReferenceLoader, SidecarGeoReferenceLoader};
pub use transform::{
    GeoReference, GridAxis, GridLine, grid_to_pixel, minor_grid_lines, pixel_to_grid,
};
pub use types::GeoError;
pub use usng::{GridPrecision, UsngLabel, UtmPosition};
