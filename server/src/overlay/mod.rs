//! Waypoint overlay
//!
//! Ties the open image, its geo-reference, the waypoint store and the saves
//! directory together, and publishes every change as an [`OverlayEvent`].

pub mod controller;
pub mod routes;
pub mod types;

pub use controller::OverlayController;
pub use routes::{OverlayAppState, OverlayErrorResponse, overlay_routes};
pub use types::{
    ImageSession, ImageSummary, LoadOrigin, OverlayError, OverlayEvent, WaypointView,
};
