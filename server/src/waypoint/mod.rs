//! Waypoint registry
//!
//! Keys, the fixed 36-slot store, and the waypoint value types.

pub mod key;
pub mod store;
pub mod types;

pub use key::{CAPACITY, ToWaypointKey, WaypointKey};
pub use store::WaypointStore;
pub use types::{PixelPoint, Waypoint, WaypointError};
