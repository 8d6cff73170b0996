//! Overlay controller
//!
//! Owns the open image, its geo-reference and the waypoint store, and turns
//! UI gestures into store mutations plus [`OverlayEvent`] notifications.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::types::{
    ImageSession, ImageSummary, LoadOrigin, OverlayError, OverlayEvent, WaypointView,
};
use crate::config::OverlayConfig;
use crate::geo::{
    GeoError, GeoReference, GeoReferenceLoader, GridLine, SidecarGeoReferenceLoader,
    grid_to_pixel, minor_grid_lines, pixel_to_grid,
};
use crate::persist::SaveDirectory;
use crate::raster::{ImageSource, LocalImageSource};
use crate::waypoint::{
    CAPACITY, PixelPoint, ToWaypointKey, Waypoint, WaypointError, WaypointKey, WaypointStore,
};

pub struct OverlayController {
    images: Arc<dyn ImageSource>,
    georef: Arc<dyn GeoReferenceLoader>,
    saves: SaveDirectory,
    session: Option<ImageSession>,
    store: WaypointStore,
    events: broadcast::Sender<OverlayEvent>,
}

impl OverlayController {
    pub fn new(
        images: Arc<dyn ImageSource>,
        georef: Arc<dyn GeoReferenceLoader>,
        saves: SaveDirectory,
        event_capacity: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            images,
            georef,
            saves,
            session: None,
            store: WaypointStore::new(),
            events,
        }
    }

    /// Controller reading rasters and sidecars from the local filesystem
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self::new(
            Arc::new(LocalImageSource::new()),
            Arc::new(SidecarGeoReferenceLoader::new(&config.sidecar_suffix)),
            SaveDirectory::new(config.saves_dir.clone()),
            config.event_channel_capacity,
        )
    }

    /// Subscribe to overlay notifications
    pub fn subscribe(&self) -> broadcast::Receiver<OverlayEvent> {
        self.events.subscribe()
    }

    pub fn saves(&self) -> &SaveDirectory {
        &self.saves
    }

    /// Geo-reference of the open image, if it has one
    pub fn reference(&self) -> Option<&GeoReference> {
        self.session.as_ref().and_then(|s| s.reference.as_ref())
    }

    /// Summary of the open image
    pub fn image(&self) -> Option<ImageSummary> {
        self.session.as_ref().map(|s| self.summarize(s))
    }

    /// Events that bring a fresh subscriber up to date: the open image
    /// followed by its waypoints in legend order
    pub fn snapshot_events(&self) -> Vec<OverlayEvent> {
        let Some(session) = &self.session else {
            return Vec::new();
        };

        let mut events = vec![OverlayEvent::ImageLoaded {
            image_path: session.image_path.clone(),
            width: session.info.width,
            height: session.info.height,
            has_reference: session.reference.is_some(),
        }];
        events.extend(self.waypoints().into_iter().map(|view| OverlayEvent::Placed {
            key: view.key,
            x: view.x,
            y: view.y,
            label: view.label,
        }));
        events
    }

    // ========================================================================
    // Image lifecycle
    // ========================================================================

    /// Open an image, replacing the current one.
    ///
    /// The new session is fully prepared before anything is swapped in, so a
    /// failed load leaves the previous image and its waypoints untouched.
    /// A missing or broken geo-reference does not fail the load; the image
    /// opens without grid labels and a `LoadError` event reports why.
    pub fn load_image(
        &mut self,
        image_path: &str,
        origin: LoadOrigin,
    ) -> Result<ImageSummary, OverlayError> {
        let start = Instant::now();
        counter!("gridmark_image_loads_total").increment(1);

        let (session, store) = match self.prepare_load(image_path, origin) {
            Ok(prepared) => prepared,
            Err(e) => {
                counter!("gridmark_load_failures_total").increment(1);
                warn!("Failed to load image '{}': {}", image_path, e);
                self.emit(OverlayEvent::LoadError {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        for waypoint in self.store.list_present() {
            self.emit(OverlayEvent::Deleted {
                key: waypoint.key,
                x: waypoint.pixel.x,
                y: waypoint.pixel.y,
            });
        }

        self.store = store;
        let session = self.session.insert(session);
        let summary = ImageSummary {
            image_path: session.image_path.clone(),
            width: session.info.width,
            height: session.info.height,
            reference: session.reference,
            reference_error: session.reference_error.clone(),
            waypoint_count: self.store.len(),
        };

        self.emit(OverlayEvent::ImageLoaded {
            image_path: summary.image_path.clone(),
            width: summary.width,
            height: summary.height,
            has_reference: summary.reference.is_some(),
        });
        for waypoint in self.store.list_present() {
            let view = self.view(&waypoint);
            self.emit(OverlayEvent::Placed {
                key: view.key,
                x: view.x,
                y: view.y,
                label: view.label,
            });
        }
        if let Some(message) = &summary.reference_error {
            self.emit(OverlayEvent::LoadError {
                message: message.clone(),
            });
        }

        histogram!("gridmark_image_load_duration_seconds").record(start.elapsed());
        info!(
            "Loaded image '{}' ({}x{}, {} waypoints restored, georeferenced: {})",
            summary.image_path,
            summary.width,
            summary.height,
            summary.waypoint_count,
            summary.reference.is_some()
        );

        Ok(summary)
    }

    fn prepare_load(
        &self,
        image_path: &str,
        origin: LoadOrigin,
    ) -> Result<(ImageSession, WaypointStore), OverlayError> {
        let path = Path::new(image_path);
        let info = self.images.probe(path)?;

        let (reference, reference_error) = match self.georef.load(path) {
            Ok(reference) => (Some(reference), None),
            Err(e) => {
                warn!("No geo-reference for '{}': {}", image_path, e);
                (None, Some(e.to_string()))
            }
        };

        // Saved points carry no keys: they are reassigned in legend order
        let mut store = WaypointStore::new();
        if origin == LoadOrigin::PreviousSession {
            let save = self.saves.load_previous(image_path)?;
            for (key, point) in WaypointKey::all().zip(&save.points) {
                store.place(key, point.x as f64, point.y as f64)?;
            }
            debug!("Restored {} waypoints for '{}'", store.len(), image_path);
        }

        Ok((
            ImageSession {
                image_path: image_path.to_string(),
                info,
                reference,
                reference_error,
            },
            store,
        ))
    }

    /// Write the current waypoints to the image's save file
    pub fn save(&self) -> Result<PathBuf, OverlayError> {
        let session = self.require_image()?;
        let points: Vec<PixelPoint> = self
            .store
            .list_present()
            .into_iter()
            .map(|w| w.pixel)
            .collect();

        let path = self.saves.save(&session.image_path, &points)?;
        counter!("gridmark_saves_total").increment(1);
        info!(
            "Saved {} waypoints for '{}' to {:?}",
            points.len(),
            session.image_path,
            path
        );
        Ok(path)
    }

    // ========================================================================
    // Waypoints
    // ========================================================================

    /// Place a waypoint under a specific key
    pub fn place(
        &mut self,
        key: impl ToWaypointKey,
        x: f64,
        y: f64,
    ) -> Result<WaypointView, OverlayError> {
        self.require_image()?;
        let waypoint = self
            .store
            .place(key, x, y)
            .inspect_err(|e| warn!("Rejected waypoint placement: {}", e))?;
        Ok(self.announce_placed(&waypoint))
    }

    /// Place a waypoint under the first free key in legend order
    pub fn place_next(&mut self, x: f64, y: f64) -> Result<WaypointView, OverlayError> {
        self.require_image()?;
        let key = self
            .store
            .next_free_key()
            .ok_or(OverlayError::StoreFull(CAPACITY))?;
        let waypoint = self.store.place(key, x, y)?;
        Ok(self.announce_placed(&waypoint))
    }

    /// Remove a waypoint, returning it as it was
    pub fn remove(&mut self, key: impl ToWaypointKey) -> Result<WaypointView, OverlayError> {
        let waypoint = self.store.remove(key)?;
        let view = self.view(&waypoint);

        counter!("gridmark_waypoints_removed_total").increment(1);
        self.emit(OverlayEvent::Deleted {
            key: view.key,
            x: view.x,
            y: view.y,
        });
        Ok(view)
    }

    pub fn waypoint(&self, key: impl ToWaypointKey) -> Result<WaypointView, OverlayError> {
        let key = key.to_waypoint_key()?;
        self.store
            .get(key)
            .map(|w| self.view(&w))
            .ok_or(OverlayError::Waypoint(WaypointError::NotFound(key)))
    }

    /// Present waypoints in legend order
    pub fn waypoints(&self) -> Vec<WaypointView> {
        self.store
            .list_present()
            .iter()
            .map(|w| self.view(w))
            .collect()
    }

    // ========================================================================
    // Grid
    // ========================================================================

    /// USNG label of an arbitrary pixel of the open image
    pub fn grid_label(&self, x: f64, y: f64) -> Result<String, OverlayError> {
        let session = self.require_image()?;
        let label = pixel_to_grid(x, y, session.reference.as_ref())
            .inspect_err(|e| debug!("No grid label for ({}, {}): {}", x, y, e))?;
        Ok(label)
    }

    /// Pixel position of a USNG label on the open image
    pub fn pixel_for_label(&self, label: &str) -> Result<PixelPoint, OverlayError> {
        let session = self.require_image()?;
        Ok(grid_to_pixel(label, session.reference.as_ref())?)
    }

    /// Minor grid lines crossing the open image
    pub fn grid_lines(&self, spacing_m: u32) -> Result<Vec<GridLine>, OverlayError> {
        let session = self.require_image()?;
        let reference = session.reference.as_ref().ok_or(GeoError::NoReference)?;
        Ok(minor_grid_lines(
            reference,
            session.info.width,
            session.info.height,
            spacing_m,
        )?)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn require_image(&self) -> Result<&ImageSession, OverlayError> {
        self.session.as_ref().ok_or(OverlayError::NoImage)
    }

    fn announce_placed(&self, waypoint: &Waypoint) -> WaypointView {
        let view = self.view(waypoint);
        counter!("gridmark_waypoints_placed_total").increment(1);
        self.emit(OverlayEvent::Placed {
            key: view.key,
            x: view.x,
            y: view.y,
            label: view.label.clone(),
        });
        view
    }

    fn view(&self, waypoint: &Waypoint) -> WaypointView {
        WaypointView {
            key: waypoint.key,
            x: waypoint.pixel.x,
            y: waypoint.pixel.y,
            label: pixel_to_grid(waypoint.pixel.x, waypoint.pixel.y, self.reference()).ok(),
        }
    }

    fn summarize(&self, session: &ImageSession) -> ImageSummary {
        ImageSummary {
            image_path: session.image_path.clone(),
            width: session.info.width,
            height: session.info.height,
            reference: session.reference,
            reference_error: session.reference_error.clone(),
            waypoint_count: self.store.len(),
        }
    }

    fn emit(&self, event: OverlayEvent) {
        // Sending only fails when nobody is subscribed
        let _ = self.events.send(event);
    }
}
