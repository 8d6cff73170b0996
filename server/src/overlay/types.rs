//! Overlay-related types and error definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::{GeoError, GeoReference};
use crate::persist::PersistError;
use crate::raster::{ImageError, ImageInfo};
use crate::waypoint::{WaypointError, WaypointKey};

/// Errors that can occur when driving the overlay
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("No image loaded")]
    NoImage,

    #[error("All {0} waypoint slots are in use")]
    StoreFull(usize),

    #[error(transparent)]
    Waypoint(#[from] WaypointError),

    #[error(transparent)]
    Geo(#[from] GeoError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Where a load request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOrigin {
    /// Open the image with no waypoints
    #[default]
    Fresh,
    /// Open the image and restore its saved waypoints
    PreviousSession,
}

/// Notifications pushed to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayEvent {
    /// A new image replaced the previous one
    ImageLoaded {
        image_path: String,
        width: u32,
        height: u32,
        has_reference: bool,
    },
    /// A marker was placed
    Placed {
        key: WaypointKey,
        x: f64,
        y: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// A marker was removed
    Deleted { key: WaypointKey, x: f64, y: f64 },
    /// A load (or its geo-reference lookup) failed
    LoadError { message: String },
}

/// State tied to the currently open image
#[derive(Debug, Clone)]
pub struct ImageSession {
    /// Path exactly as given at load time
    pub image_path: String,
    pub info: ImageInfo,
    pub reference: Option<GeoReference>,
    /// Why no reference is available, if the lookup failed
    pub reference_error: Option<String>,
}

/// Summary of the open image
#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub image_path: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<GeoReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_error: Option<String>,
    pub waypoint_count: usize,
}

/// Presentation of one waypoint: position plus derived grid label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointView {
    pub key: WaypointKey,
    pub x: f64,
    pub y: f64,
    /// `None` when the image has no geo-reference
    pub label: Option<String>,
}
