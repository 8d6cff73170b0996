//! Fixed-capacity waypoint registry

use tracing::debug;

use super::key::{CAPACITY, ToWaypointKey, WaypointKey};
use super::types::{PixelPoint, Waypoint, WaypointError};

/// Registry of up to [`CAPACITY`] waypoints, one slot per legend symbol.
///
/// A slot is either empty (absent waypoint) or holds the pixel position of a
/// placed one. Uniqueness and capacity follow from the slot layout.
#[derive(Debug, Clone)]
pub struct WaypointStore {
    slots: [Option<PixelPoint>; CAPACITY],
}

impl Default for WaypointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WaypointStore {
    pub fn new() -> Self {
        Self {
            slots: [None; CAPACITY],
        }
    }

    /// Place a waypoint under `key`
    pub fn place(
        &mut self,
        key: impl ToWaypointKey,
        x: f64,
        y: f64,
    ) -> Result<Waypoint, WaypointError> {
        let key = key.to_waypoint_key()?;
        let pixel = PixelPoint::new(x, y);
        if !pixel.is_finite() {
            return Err(WaypointError::NonFiniteCoordinate { x, y });
        }

        let slot = &mut self.slots[key.index()];
        if slot.is_some() {
            return Err(WaypointError::DuplicateKey(key));
        }
        *slot = Some(pixel);

        debug!("Placed waypoint {} at ({}, {})", key, x, y);
        Ok(Waypoint {
            key,
            pixel,
            visible: true,
        })
    }

    /// Remove the waypoint under `key`, returning it as it was
    pub fn remove(&mut self, key: impl ToWaypointKey) -> Result<Waypoint, WaypointError> {
        let key = key.to_waypoint_key()?;
        let pixel = self.slots[key.index()]
            .take()
            .ok_or(WaypointError::NotFound(key))?;

        debug!("Removed waypoint {}", key);
        Ok(Waypoint {
            key,
            pixel,
            visible: true,
        })
    }

    pub fn get(&self, key: WaypointKey) -> Option<Waypoint> {
        self.slots[key.index()].map(|pixel| Waypoint {
            key,
            pixel,
            visible: true,
        })
    }

    /// Present waypoints in legend order
    pub fn list_present(&self) -> Vec<Waypoint> {
        WaypointKey::all().filter_map(|key| self.get(key)).collect()
    }

    /// First free slot in legend order
    pub fn next_free_key(&self) -> Option<WaypointKey> {
        WaypointKey::all().find(|key| self.slots[key.index()].is_none())
    }

    pub fn clear(&mut self) {
        self.slots = [None; CAPACITY];
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}
