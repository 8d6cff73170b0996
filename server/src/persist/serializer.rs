//! Waypoint save-file format
//!
//! ```text
//! <image source path>
//! <x0>,<y0>
//! <x1>,<y1>
//! ```
//!
//! Coordinates are integer pixels, one waypoint per line in key order. Keys
//! are not stored: on reload the Nth line goes to the Nth key.

use std::fmt::Write as _;

use super::types::{PersistError, SaveFile, SavedPoint};
use crate::waypoint::{CAPACITY, PixelPoint};

/// Round a pixel coordinate to the nearest integer (halves away from zero)
pub fn round_point(point: PixelPoint) -> SavedPoint {
    SavedPoint {
        x: point.x.round() as i64,
        y: point.y.round() as i64,
    }
}

/// Encode an image path and waypoint positions.
///
/// The path is written verbatim, so it must fit on one line.
pub fn serialize(image_path: &str, points: &[PixelPoint]) -> Result<String, PersistError> {
    if image_path.trim().is_empty() || image_path.contains(['\n', '\r']) {
        return Err(PersistError::UnsavablePath(image_path.to_string()));
    }

    let mut text = String::with_capacity(image_path.len() + 1 + points.len() * 12);
    text.push_str(image_path);
    text.push('\n');
    for point in points.iter().copied().map(round_point) {
        // Writing into a String cannot fail
        let _ = writeln!(text, "{},{}", point.x, point.y);
    }
    Ok(text)
}

/// Decode a save file
pub fn deserialize(text: &str) -> Result<SaveFile, PersistError> {
    let mut lines = text.lines();

    // `lines` already drops the line ending; the rest of the path is kept as written
    let image_path = lines.next().ok_or(PersistError::EmptyFile)?;
    if image_path.trim().is_empty() {
        return Err(PersistError::MalformedFile {
            line: 1,
            reason: "missing image path".to_string(),
        });
    }

    let mut points = Vec::new();
    for (offset, raw) in lines.enumerate() {
        let line = offset + 2;
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        if points.len() == CAPACITY {
            return Err(PersistError::MalformedFile {
                line,
                reason: format!("more than {} waypoints", CAPACITY),
            });
        }
        points.push(parse_point(raw, line)?);
    }

    Ok(SaveFile {
        image_path: image_path.to_string(),
        points,
    })
}

fn parse_point(raw: &str, line: usize) -> Result<SavedPoint, PersistError> {
    let malformed = |reason: String| PersistError::MalformedFile { line, reason };

    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| malformed(format!("expected \"x,y\", got {:?}", raw)))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<i64>()
            .map_err(|_| malformed(format!("{:?} is not an integer", part.trim())))
    };

    Ok(SavedPoint {
        x: parse(x)?,
        y: parse(y)?,
    })
}
