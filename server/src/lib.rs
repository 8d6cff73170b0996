//! Gridmark Server Library
//!
//! Waypoint registry, USNG geo-referencing and waypoint persistence for
//! scanned map images. Exported for use in integration tests and external
//! tooling.

pub mod config;
pub mod geo;
pub mod overlay;
pub mod persist;
pub mod raster;
pub mod server;
pub mod waypoint;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use overlay::{LoadOrigin, OverlayController, OverlayError, OverlayEvent, overlay_routes};
pub use server::{AppState, app_router};
pub use waypoint::{WaypointKey, WaypointStore};
