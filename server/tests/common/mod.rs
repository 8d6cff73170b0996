//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules. Fixtures are real
//! files under the system temp dir so the local image source and the sidecar
//! loader are exercised end to end.

#![allow(dead_code)]

use axum::Router;
use gridmark_server::geo::SidecarGeoReferenceLoader;
use gridmark_server::overlay::{OverlayAppState, OverlayController};
use gridmark_server::persist::SaveDirectory;
use gridmark_server::raster::LocalImageSource;
use gridmark_server::server::{AppState, app_router};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Sidecar for `map1.png`: pixel (100, 100) sits at 18S UJ 23480 06470, 10 px per meter
pub const MAP1_SIDECAR: &str =
    r#"{"tl": "18S UJ 23480 06470", "origin": [100, 100], "pxscale": 10}"#;

/// Image files and a saves directory for one test
pub struct Fixture {
    pub root: PathBuf,
    /// 800x600, geo-referenced through `map1.png.geo.json`
    pub map1: String,
    /// 320x200, no sidecar
    pub scan: String,
    /// 64x64 with a sidecar that reports an explicit error
    pub blank: String,
    pub saves_dir: PathBuf,
}

impl Fixture {
    pub fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("gridmark_it_{}", name));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();

        let map1 = write_png(&root, "map1.png", 800, 600);
        std::fs::write(format!("{}.geo.json", map1), MAP1_SIDECAR).unwrap();

        let scan = write_png(&root, "scan.png", 320, 200);

        let blank = write_png(&root, "blank.png", 64, 64);
        std::fs::write(
            root.join("blank.geo.json"),
            r#"{"error": "image carries no geo-metadata"}"#,
        )
        .unwrap();

        Self {
            saves_dir: root.join("saves"),
            root,
            map1,
            scan,
            blank,
        }
    }

    pub fn missing(&self) -> String {
        self.root.join("missing.png").display().to_string()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> String {
    let path = dir.join(name);
    image::RgbImage::new(width, height).save(&path).unwrap();
    path.display().to_string()
}

/// Create a test application router with state
pub fn create_test_app_with_state(fixture: &Fixture) -> (Router, AppState) {
    let controller = OverlayController::new(
        Arc::new(LocalImageSource::new()),
        Arc::new(SidecarGeoReferenceLoader::default()),
        SaveDirectory::new(fixture.saves_dir.clone()),
        64,
    );
    let app_state = AppState::new(OverlayAppState::new(controller, 10));
    let app = app_router(app_state.clone());

    (app, app_state)
}

/// Create a test application router with all routes configured
pub fn create_test_app(fixture: &Fixture) -> Router {
    create_test_app_with_state(fixture).0
}
