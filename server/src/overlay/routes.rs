//! HTTP route handlers for the waypoint overlay API

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::controller::OverlayController;
use super::types::{ImageSummary, LoadOrigin, OverlayError, WaypointView};
use crate::geo::{GeoError, GridLine};
use crate::persist::PersistError;
use crate::waypoint::{PixelPoint, WaypointError};

/// Application state containing the overlay controller
#[derive(Clone)]
pub struct OverlayAppState {
    pub controller: Arc<Mutex<OverlayController>>,
    /// Minor grid spacing used when a request does not name one
    pub grid_spacing_m: u32,
}

impl OverlayAppState {
    pub fn new(controller: OverlayController, grid_spacing_m: u32) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            grid_spacing_m,
        }
    }
}

/// Error response for overlay API
#[derive(Debug, Serialize)]
pub struct OverlayErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<OverlayError> for OverlayErrorResponse {
    fn from(e: OverlayError) -> Self {
        let code = match &e {
            OverlayError::NoImage => "no_image",
            OverlayError::StoreFull(_) => "store_full",
            OverlayError::Waypoint(w) => match w {
                WaypointError::InvalidKey(_) => "invalid_key",
                WaypointError::DuplicateKey(_) => "duplicate_key",
                WaypointError::NotFound(_) => "not_found",
                WaypointError::NonFiniteCoordinate { .. } => "non_finite_coordinate",
            },
            OverlayError::Geo(g) => match g {
                GeoError::NoReference => "no_reference",
                GeoError::NonFiniteCoordinate { .. } => "non_finite_coordinate",
                GeoError::OutsideZone { .. } => "outside_zone",
                GeoError::InvalidLabel { .. } => "invalid_label",
                GeoError::ZoneMismatch { .. } => "zone_mismatch",
                GeoError::InvalidGridRequest(_) | GeoError::GridTooDense { .. } => {
                    "invalid_grid_request"
                }
                GeoError::InvalidReference(_) | GeoError::Metadata(_) => "georeference_error",
                GeoError::Io(_) => "io_error",
            },
            OverlayError::Persist(p) => match p {
                PersistError::EmptyFile | PersistError::MalformedFile { .. } => {
                    "malformed_save_file"
                }
                PersistError::MissingSaveFile(_) => "missing_save_file",
                PersistError::UnsavablePath(_) => "unsavable_path",
                PersistError::Io(_) => "io_error",
            },
            OverlayError::Image(_) => "image_load_failure",
        };
        Self {
            error: e.to_string(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for OverlayErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "invalid_key" | "invalid_label" | "non_finite_coordinate" | "invalid_grid_request" => {
                StatusCode::BAD_REQUEST
            }
            "not_found" => StatusCode::NOT_FOUND,
            "no_image" | "store_full" | "duplicate_key" => StatusCode::CONFLICT,
            "no_reference" | "outside_zone" | "zone_mismatch" | "georeference_error"
            | "malformed_save_file" | "missing_save_file" | "unsavable_path"
            | "image_load_failure" => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Body of POST /api/image
#[derive(Debug, Deserialize)]
pub struct LoadImageRequest {
    pub path: String,
    /// Restore the waypoints saved for this image
    #[serde(default)]
    pub restore: bool,
}

/// Body of waypoint placement requests
#[derive(Debug, Deserialize)]
pub struct PlaceRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct PixelQueryParams {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct LabelQueryParams {
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct GridLinesQueryParams {
    pub spacing: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct GridLabelResponse {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct GridLinesResponse {
    pub spacing_m: u32,
    pub lines: Vec<GridLine>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub path: String,
    pub waypoint_count: usize,
}

/// POST /api/image - Open an image, optionally restoring its saved waypoints
pub async fn load_image(
    State(state): State<OverlayAppState>,
    Json(request): Json<LoadImageRequest>,
) -> Result<Json<ImageSummary>, OverlayErrorResponse> {
    let origin = if request.restore {
        LoadOrigin::PreviousSession
    } else {
        LoadOrigin::Fresh
    };

    let mut controller = state.controller.lock().await;
    let summary = controller
        .load_image(&request.path, origin)
        .map_err(OverlayErrorResponse::from)?;

    Ok(Json(summary))
}

/// GET /api/image - Summary of the open image
pub async fn get_image(
    State(state): State<OverlayAppState>,
) -> Result<Json<ImageSummary>, OverlayErrorResponse> {
    let controller = state.controller.lock().await;
    let summary = controller
        .image()
        .ok_or_else(|| OverlayErrorResponse::from(OverlayError::NoImage))?;

    Ok(Json(summary))
}

/// GET /api/waypoints - Present waypoints in legend order
pub async fn list_waypoints(State(state): State<OverlayAppState>) -> Json<Vec<WaypointView>> {
    let controller = state.controller.lock().await;
    Json(controller.waypoints())
}

/// POST /api/waypoints - Place a waypoint under the next free key
pub async fn place_next_waypoint(
    State(state): State<OverlayAppState>,
    Json(request): Json<PlaceRequest>,
) -> Result<(StatusCode, Json<WaypointView>), OverlayErrorResponse> {
    let mut controller = state.controller.lock().await;
    let view = controller
        .place_next(request.x, request.y)
        .map_err(|e| {
            tracing::warn!("Failed to place waypoint at ({}, {}): {}", request.x, request.y, e);
            OverlayErrorResponse::from(e)
        })?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// PUT /api/waypoints/:key - Place a waypoint under a specific key
pub async fn place_waypoint(
    State(state): State<OverlayAppState>,
    Path(key): Path<String>,
    Json(request): Json<PlaceRequest>,
) -> Result<(StatusCode, Json<WaypointView>), OverlayErrorResponse> {
    let mut controller = state.controller.lock().await;
    let view = controller
        .place(key.as_str(), request.x, request.y)
        .map_err(OverlayErrorResponse::from)?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/waypoints/:key - One waypoint
pub async fn get_waypoint(
    State(state): State<OverlayAppState>,
    Path(key): Path<String>,
) -> Result<Json<WaypointView>, OverlayErrorResponse> {
    let controller = state.controller.lock().await;
    let view = controller
        .waypoint(key.as_str())
        .map_err(OverlayErrorResponse::from)?;

    Ok(Json(view))
}

/// DELETE /api/waypoints/:key - Remove a waypoint
pub async fn remove_waypoint(
    State(state): State<OverlayAppState>,
    Path(key): Path<String>,
) -> Result<Json<WaypointView>, OverlayErrorResponse> {
    let mut controller = state.controller.lock().await;
    let view = controller.remove(key.as_str()).map_err(|e| {
        tracing::warn!("Failed to remove waypoint {:?}: {}", key, e);
        OverlayErrorResponse::from(e)
    })?;

    Ok(Json(view))
}

/// POST /api/save - Write the current waypoints to the image's save file
pub async fn save_waypoints(
    State(state): State<OverlayAppState>,
) -> Result<Json<SaveResponse>, OverlayErrorResponse> {
    let controller = state.controller.lock().await;
    let path = controller.save().map_err(|e| {
        tracing::error!("Failed to save waypoints: {}", e);
        OverlayErrorResponse::from(e)
    })?;

    Ok(Json(SaveResponse {
        path: path.display().to_string(),
        waypoint_count: controller.waypoints().len(),
    }))
}

/// GET /api/grid/label - USNG label of a pixel
pub async fn get_grid_label(
    State(state): State<OverlayAppState>,
    Query(params): Query<PixelQueryParams>,
) -> Result<Json<GridLabelResponse>, OverlayErrorResponse> {
    let controller = state.controller.lock().await;
    let label = controller
        .grid_label(params.x, params.y)
        .map_err(OverlayErrorResponse::from)?;

    Ok(Json(GridLabelResponse {
        x: params.x,
        y: params.y,
        label,
    }))
}

/// GET /api/grid/pixel - Pixel position of a USNG label
pub async fn get_grid_pixel(
    State(state): State<OverlayAppState>,
    Query(params): Query<LabelQueryParams>,
) -> Result<Json<PixelPoint>, OverlayErrorResponse> {
    let controller = state.controller.lock().await;
    let pixel = controller
        .pixel_for_label(&params.label)
        .map_err(OverlayErrorResponse::from)?;

    Ok(Json(pixel))
}

/// GET /api/grid/lines - Minor grid lines crossing the open image
pub async fn get_grid_lines(
    State(state): State<OverlayAppState>,
    Query(params): Query<GridLinesQueryParams>,
) -> Result<Json<GridLinesResponse>, OverlayErrorResponse> {
    let spacing_m = params.spacing.unwrap_or(state.grid_spacing_m);
    let controller = state.controller.lock().await;
    let lines = controller
        .grid_lines(spacing_m)
        .map_err(OverlayErrorResponse::from)?;

    Ok(Json(GridLinesResponse { spacing_m, lines }))
}

/// Create overlay API routes
pub fn overlay_routes(state: OverlayAppState) -> Router {
    Router::new()
        .route("/image", post(load_image).get(get_image))
        .route(
            "/waypoints",
            get(list_waypoints).post(place_next_waypoint),
        )
        .route(
            "/waypoints/:key",
            put(place_waypoint).get(get_waypoint).delete(remove_waypoint),
        )
        .route("/save", post(save_waypoints))
        .route("/grid/label", get(get_grid_label))
        .route("/grid/pixel", get(get_grid_pixel))
        .route("/grid/lines", get(get_grid_lines))
        .with_state(state)
}
