//! Waypoint persistence
//!
//! The plain-text save format and the saves directory that holds it.

pub mod files;
pub mod serializer;
pub mod types;

pub use files::{SaveDirectory, save_file_name};
pub use serializer::{deserialize, serialize};
pub use types::{PersistError, SaveFile, SavedPoint};
