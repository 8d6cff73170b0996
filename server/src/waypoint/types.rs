//! Waypoint-related types and error definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::key::WaypointKey;

/// Errors raised by the waypoint registry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaypointError {
    #[error("Invalid waypoint key: {0:?} (expected A-Z or 0-9)")]
    InvalidKey(String),

    #[error("Waypoint {0} is already placed")]
    DuplicateKey(WaypointKey),

    #[error("Waypoint not found: {0}")]
    NotFound(WaypointKey),

    #[error("Non-finite pixel coordinate: ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },
}

/// Position in the source image's pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A placed marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub key: WaypointKey,
    pub pixel: PixelPoint,
    /// Always true for waypoints handed out by the store; absent slots are not waypoints
    pub visible: bool,
}
