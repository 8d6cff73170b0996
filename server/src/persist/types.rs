//! Save-file types and error definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing waypoint save files
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Save file is empty")]
    EmptyFile,

    #[error("Malformed save file at line {line}: {reason}")]
    MalformedFile { line: usize, reason: String },

    #[error("Image path {0:?} cannot be recorded on a single line")]
    UnsavablePath(String),

    #[error("No saved waypoints at {0:?}")]
    MissingSaveFile(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Integer pixel position as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPoint {
    pub x: i64,
    pub y: i64,
}

/// Decoded save file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFile {
    /// Image path exactly as recorded when the image was loaded
    pub image_path: String,
    /// Waypoint positions in key order
    pub points: Vec<SavedPoint>,
}
