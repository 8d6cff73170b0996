//! Save directory management
//!
//! Save files live at `<saves dir>/<image stem>_waypoints.txt`. The name is
//! derived from the image file name alone, so reopening the same image from
//! another directory finds the same save file.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::serializer::{deserialize, serialize};
use super::types::{PersistError, SaveFile};
use crate::waypoint::PixelPoint;

/// Suffix appended to the image stem
pub const SAVE_FILE_SUFFIX: &str = "_waypoints.txt";

/// Save-file name for an image: directory and extension stripped, suffix added
pub fn save_file_name(image_path: &str) -> String {
    let stem = Path::new(image_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    format!("{}{}", stem, SAVE_FILE_SUFFIX)
}

/// Directory holding waypoint save files
#[derive(Debug, Clone)]
pub struct SaveDirectory {
    root: PathBuf,
}

impl SaveDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where the save file for an image lives
    pub fn path_for(&self, image_path: &str) -> PathBuf {
        self.root.join(save_file_name(image_path))
    }

    /// Write the waypoints of an image, creating the directory if needed
    pub fn save(
        &self,
        image_path: &str,
        points: &[PixelPoint],
    ) -> Result<PathBuf, PersistError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root)?;
            info!("Created saves directory: {:?}", self.root);
        }

        let path = self.path_for(image_path);
        std::fs::write(&path, serialize(image_path, points)?)?;
        debug!("Wrote {} waypoints to {:?}", points.len(), path);
        Ok(path)
    }

    /// Read the previous session's waypoints for an image
    pub fn load_previous(&self, image_path: &str) -> Result<SaveFile, PersistError> {
        let path = self.path_for(image_path);
        if !path.is_file() {
            return Err(PersistError::MissingSaveFile(path));
        }

        let text = std::fs::read_to_string(&path)?;
        let save = deserialize(&text)?;
        if save.image_path != image_path {
            debug!(
                "Save file {:?} was recorded for {:?}, reloading for {:?}",
                path, save.image_path, image_path
            );
        }
        Ok(save)
    }
}
