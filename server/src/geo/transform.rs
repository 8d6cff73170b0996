//! Pixel <-> grid transform
//!
//! A [`GeoReference`] pins one pixel (the grid-cell top-left, `tl`) to a UTM
//! position and gives the image scale in pixels per meter. Image rows grow
//! downward while northing grows upward, so the y offset is subtracted.

use serde::{Deserialize, Serialize};

use super::types::GeoError;
use super::usng::{GridPrecision, SQUARE_SIZE_M, UsngLabel, UtmPosition};
use crate::waypoint::PixelPoint;

/// Upper bound on lines returned by [`minor_grid_lines`]
pub const MAX_GRID_LINES: usize = 4096;

/// Geo-metadata for one loaded image
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoReference {
    /// Pixel position of the reference corner
    pub origin: PixelPoint,
    /// Pixels per grid unit (meter)
    pub pxscale: f64,
    /// Grid position of `origin`
    pub anchor: UtmPosition,
    /// Resolution stated by the source metadata
    pub precision: GridPrecision,
}

impl GeoReference {
    pub fn new(
        origin: PixelPoint,
        pxscale: f64,
        anchor: UtmPosition,
        precision: GridPrecision,
    ) -> Result<Self, GeoError> {
        if !pxscale.is_finite() || pxscale <= 0.0 {
            return Err(GeoError::InvalidReference(format!(
                "pxscale must be a positive number, got {}",
                pxscale
            )));
        }
        if !origin.is_finite() {
            return Err(GeoError::InvalidReference(
                "origin must be a finite pixel position".to_string(),
            ));
        }
        Ok(Self {
            origin,
            pxscale,
            anchor,
            precision,
        })
    }

    /// Grid offset in meters (east, north) of a pixel relative to the origin
    pub fn grid_offset(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin.x) / self.pxscale,
            -(y - self.origin.y) / self.pxscale,
        )
    }

    /// Full UTM position of a pixel
    pub fn pixel_to_utm(&self, x: f64, y: f64) -> Result<UtmPosition, GeoError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GeoError::NonFiniteCoordinate { x, y });
        }
        let (east, north) = self.grid_offset(x, y);
        Ok(self.anchor.offset(east, north))
    }

    /// Pixel position of a UTM position in the anchor's zone
    pub fn utm_to_pixel(&self, position: &UtmPosition) -> Result<PixelPoint, GeoError> {
        if position.zone != self.anchor.zone {
            return Err(GeoError::ZoneMismatch {
                label_zone: position.zone,
                reference_zone: self.anchor.zone,
            });
        }
        Ok(PixelPoint::new(
            self.origin.x + (position.easting - self.anchor.easting) * self.pxscale,
            self.origin.y + (self.anchor.northing - position.northing) * self.pxscale,
        ))
    }
}

/// USNG label for a pixel, at the precision the reference supports
pub fn pixel_to_grid(
    x: f64,
    y: f64,
    reference: Option<&GeoReference>,
) -> Result<String, GeoError> {
    let reference = reference.ok_or(GeoError::NoReference)?;
    reference.pixel_to_utm(x, y)?.to_usng(reference.precision)
}

/// Pixel position of the south-west corner of a USNG cell
pub fn grid_to_pixel(
    label: &str,
    reference: Option<&GeoReference>,
) -> Result<PixelPoint, GeoError> {
    let reference = reference.ok_or(GeoError::NoReference)?;
    let label: UsngLabel = label.parse()?;
    reference.utm_to_pixel(&label.to_utm())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridAxis {
    /// Constant easting, drawn top to bottom
    Easting,
    /// Constant northing, drawn left to right
    Northing,
}

/// One grid line crossing the image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub axis: GridAxis,
    /// Grid value of the line in meters
    pub value_m: f64,
    /// x for easting lines, y for northing lines
    pub pixel: f64,
    /// Short label: the line's value inside its 100 km square, in km
    pub label: String,
}

/// Grid lines every `spacing_m` meters that fall inside a `width` x `height` image
pub fn minor_grid_lines(
    reference: &GeoReference,
    width: u32,
    height: u32,
    spacing_m: u32,
) -> Result<Vec<GridLine>, GeoError> {
    if spacing_m == 0 {
        return Err(GeoError::InvalidGridRequest(
            "grid spacing must be positive".to_string(),
        ));
    }
    let spacing = spacing_m as f64;

    let (west, north) = reference.grid_offset(0.0, 0.0);
    let (east, south) = reference.grid_offset(width as f64, height as f64);
    let (west, east) = (reference.anchor.easting + west, reference.anchor.easting + east);
    let (south, north) = (
        reference.anchor.northing + south,
        reference.anchor.northing + north,
    );

    let first_easting = (west / spacing).ceil();
    let last_easting = (east / spacing).floor();
    let first_northing = (south / spacing).ceil();
    let last_northing = (north / spacing).floor();

    // Counted in f64: tiny scales put the bounds far outside the i64 range
    let span = (last_easting - first_easting + 1.0).max(0.0)
        + (last_northing - first_northing + 1.0).max(0.0);
    let bounded = [first_easting, last_easting, first_northing, last_northing]
        .iter()
        .all(|v| v.is_finite());
    if !bounded || !span.is_finite() || span > MAX_GRID_LINES as f64 {
        return Err(GeoError::GridTooDense {
            count: if bounded { span as usize } else { usize::MAX },
            max: MAX_GRID_LINES,
        });
    }
    let count = span as usize;
    let (first_easting, last_easting) = (first_easting as i64, last_easting as i64);
    let (first_northing, last_northing) = (first_northing as i64, last_northing as i64);

    let mut lines = Vec::with_capacity(count);
    for step in first_easting..=last_easting {
        let value_m = step as f64 * spacing;
        lines.push(GridLine {
            axis: GridAxis::Easting,
            value_m,
            pixel: reference.origin.x + (value_m - reference.anchor.easting) * reference.pxscale,
            label: short_label(value_m),
        });
    }
    for step in first_northing..=last_northing {
        let value_m = step as f64 * spacing;
        lines.push(GridLine {
            axis: GridAxis::Northing,
            value_m,
            pixel: reference.origin.y + (reference.anchor.northing - value_m) * reference.pxscale,
            label: short_label(value_m),
        });
    }

    Ok(lines)
}

/// Kilometers inside the 100 km square, e.g. 4_306_400 m -> "06.4"
fn short_label(value_m: f64) -> String {
    let km = value_m.rem_euclid(SQUARE_SIZE_M) / 1000.0;
    format!("{:04.1}", km)
}
