//! Server configuration
//!
//! Configuration is loaded from environment variables. See `.env.example` for documentation.

use std::env;
use std::path::PathBuf;

use crate::geo::DEFAULT_SIDECAR_SUFFIX;

/// Main server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,

    /// Overlay configuration
    pub overlay: OverlayConfig,

    /// Grid rendering configuration
    pub grid: GridConfig,

    /// Static file serving configuration
    pub static_files: StaticFilesConfig,
}

/// Overlay-related configuration
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Directory holding `<image stem>_waypoints.txt` save files
    pub saves_dir: PathBuf,
    /// Suffix appended to an image path to find its geo-reference sidecar
    pub sidecar_suffix: String,
    /// Events buffered per subscriber before slow ones start lagging
    pub event_channel_capacity: usize,
}

/// Grid rendering configuration
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Default spacing of minor grid lines in meters
    pub spacing_m: u32,
}

/// Static file serving configuration
#[derive(Debug, Clone, Default)]
pub struct StaticFilesConfig {
    /// Directory containing the UI bundle (optional)
    pub dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            overlay: OverlayConfig::default(),
            grid: GridConfig::default(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            saves_dir: PathBuf::from("saves"),
            sidecar_suffix: DEFAULT_SIDECAR_SUFFIX.to_string(),
            event_channel_capacity: 64,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { spacing_m: 100 }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();

        // Server config
        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Ok(val) = env::var("PORT")
            && let Ok(port) = val.parse()
        {
            config.port = port;
        }

        // Overlay config
        if let Ok(path) = env::var("SAVES_DIR")
            && !path.is_empty()
        {
            config.overlay.saves_dir = PathBuf::from(path);
        }
        if let Ok(suffix) = env::var("GEOREF_SIDECAR_SUFFIX")
            && !suffix.is_empty()
        {
            config.overlay.sidecar_suffix = suffix;
        }
        if let Ok(val) = env::var("EVENT_CHANNEL_CAPACITY")
            && let Ok(capacity) = val.parse::<usize>()
            && capacity > 0
        {
            config.overlay.event_channel_capacity = capacity;
        }

        // Grid config
        if let Ok(val) = env::var("GRID_SPACING_M")
            && let Ok(spacing) = val.parse::<u32>()
            && spacing > 0
        {
            config.grid.spacing_m = spacing;
        }

        // Static files
        if let Ok(dir) = env::var("STATIC_FILES_DIR")
            && !dir.is_empty()
        {
            config.static_files.dir = Some(PathBuf::from(dir));
        }

        config
    }
}
