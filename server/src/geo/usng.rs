//! U.S. National Grid coordinates
//!
//! A USNG label names a UTM position as `<zone><band> <square> <easting> <northing>`.
//! The square is the two-letter ID of the 100 km cell. The numeric part is the
//! offset inside that cell, truncated (never rounded) to the stated precision.
//!
//! Lettering follows the standard 6-set scheme:
//! - column letters cycle through three 8-letter sets by zone
//! - row letters cycle through 20 letters, offset by 5 in even-numbered sets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::types::GeoError;

/// Side of a 100 km grid square in meters
pub const SQUARE_SIZE_M: f64 = 100_000.0;

/// Row letters repeat every 20 squares
const NORTHING_CYCLE_M: f64 = 2_000_000.0;
const MAX_NORTHING_M: f64 = 10_000_000.0;
const MAX_DIGITS: usize = 5;

/// Absorbs float noise so 23490 m never truncates to 2348 at 10 m precision
const TRUNCATION_EPSILON_M: f64 = 1e-6;

const BAND_LETTERS: &[u8; 20] = b"CDEFGHJKLMNPQRSTUVWX";
const COLUMN_LETTERS: [&[u8; 8]; 3] = [b"ABCDEFGH", b"JKLMNPQR", b"STUVWXYZ"];
const ROW_LETTERS: &[u8; 20] = b"ABCDEFGHJKLMNPQRSTUV";

/// Lowest northing reached inside each latitude band, indexed like `BAND_LETTERS`
const BAND_MIN_NORTHING_M: [f64; 20] = [
    1_100_000.0, // C
    2_000_000.0, // D
    2_800_000.0, // E
    3_700_000.0, // F
    4_600_000.0, // G
    5_500_000.0, // H
    6_400_000.0, // J
    7_300_000.0, // K
    8_200_000.0, // L
    9_100_000.0, // M
    0.0,         // N
    800_000.0,   // P
    1_700_000.0, // Q
    2_600_000.0, // R
    3_500_000.0, // S
    4_400_000.0, // T
    5_300_000.0, // U
    6_200_000.0, // V
    7_000_000.0, // W
    7_900_000.0, // X
];

/// Zone number mapped onto the 6-set lettering cycle (1..=6)
fn zone_set(zone: u8) -> usize {
    (zone as usize - 1) % 6 + 1
}

fn column_letters(zone: u8) -> &'static [u8; 8] {
    COLUMN_LETTERS[(zone_set(zone) - 1) % 3]
}

fn row_offset(zone: u8) -> usize {
    if zone_set(zone) % 2 == 0 { 5 } else { 0 }
}

fn band_index(band: char) -> Option<usize> {
    BAND_LETTERS.iter().position(|&b| b as char == band)
}

fn check_zone(zone: u8) -> bool {
    (1..=60).contains(&zone)
}

/// Resolution of a grid label, expressed as digits per axis (0..=5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct GridPrecision {
    digits: u8,
}

impl GridPrecision {
    pub const METER: Self = Self { digits: 5 };
    pub const TEN_METERS: Self = Self { digits: 4 };
    pub const HUNDRED_METERS: Self = Self { digits: 3 };
    pub const KILOMETER: Self = Self { digits: 2 };
    pub const TEN_KILOMETERS: Self = Self { digits: 1 };
    pub const HUNDRED_KILOMETERS: Self = Self { digits: 0 };

    /// Precision for a cell size in meters (1, 10, ... 100 000)
    pub fn from_meters(meters: u32) -> Result<Self, GeoError> {
        let digits = match meters {
            1 => 5,
            10 => 4,
            100 => 3,
            1_000 => 2,
            10_000 => 1,
            100_000 => 0,
            _ => {
                return Err(GeoError::InvalidReference(format!(
                    "unsupported grid precision: {} m",
                    meters
                )));
            }
        };
        Ok(Self { digits })
    }

    pub fn from_digits(digits: usize) -> Option<Self> {
        (digits <= MAX_DIGITS).then_some(Self {
            digits: digits as u8,
        })
    }

    /// Digits printed per axis
    pub fn digits(self) -> usize {
        self.digits as usize
    }

    /// Cell size in meters
    pub fn meters(self) -> u32 {
        10u32.pow((MAX_DIGITS - self.digits()) as u32)
    }
}

impl Default for GridPrecision {
    fn default() -> Self {
        Self::METER
    }
}

impl TryFrom<u32> for GridPrecision {
    type Error = GeoError;

    fn try_from(meters: u32) -> Result<Self, Self::Error> {
        Self::from_meters(meters)
    }
}

impl From<GridPrecision> for u32 {
    fn from(precision: GridPrecision) -> Self {
        precision.meters()
    }
}

/// Full UTM position: zone, latitude band, easting and northing in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UtmPosition {
    pub zone: u8,
    pub band: char,
    pub easting: f64,
    pub northing: f64,
}

impl UtmPosition {
    pub fn new(zone: u8, band: char, easting: f64, northing: f64) -> Result<Self, GeoError> {
        if !check_zone(zone) {
            return Err(GeoError::InvalidReference(format!(
                "UTM zone {} out of range 1-60",
                zone
            )));
        }
        let band = band.to_ascii_uppercase();
        if band_index(band).is_none() {
            return Err(GeoError::InvalidReference(format!(
                "invalid latitude band {:?}",
                band
            )));
        }
        if !easting.is_finite() || !northing.is_finite() {
            return Err(GeoError::InvalidReference(format!(
                "non-finite anchor position ({}, {})",
                easting, northing
            )));
        }
        Ok(Self {
            zone,
            band,
            easting,
            northing,
        })
    }

    /// Same zone and band, moved by the given meters
    pub fn offset(&self, east_m: f64, north_m: f64) -> Self {
        Self {
            easting: self.easting + east_m,
            northing: self.northing + north_m,
            ..*self
        }
    }

    /// Two-letter ID of the 100 km square containing this position
    pub fn square_id(&self) -> Result<[char; 2], GeoError> {
        if !check_zone(self.zone) {
            return Err(GeoError::InvalidReference(format!(
                "UTM zone {} out of range 1-60",
                self.zone
            )));
        }
        let in_columns = (SQUARE_SIZE_M..9.0 * SQUARE_SIZE_M).contains(&self.easting);
        let in_rows = (0.0..MAX_NORTHING_M).contains(&self.northing);
        if !in_columns || !in_rows {
            return Err(GeoError::OutsideZone {
                easting: self.easting,
                northing: self.northing,
            });
        }

        let column = (self.easting / SQUARE_SIZE_M).floor() as usize;
        let row = (self.northing / SQUARE_SIZE_M).floor() as usize % ROW_LETTERS.len();

        Ok([
            column_letters(self.zone)[column - 1] as char,
            ROW_LETTERS[(row + row_offset(self.zone)) % ROW_LETTERS.len()] as char,
        ])
    }

    /// Format as a USNG label at the given precision
    pub fn to_usng(&self, precision: GridPrecision) -> Result<String, GeoError> {
        let [column, row] = self.square_id()?;
        let mut label = format!("{}{} {}{}", self.zone, self.band, column, row);

        let digits = precision.digits();
        if digits > 0 {
            let cell = precision.meters() as f64;
            let max = (10u64.pow(digits as u32) - 1) as f64;
            let truncate = |meters: f64| {
                (((meters % SQUARE_SIZE_M) + TRUNCATION_EPSILON_M) / cell)
                    .floor()
                    .min(max) as u64
            };
            label.push_str(&format!(
                " {:0width$} {:0width$}",
                truncate(self.easting),
                truncate(self.northing),
                width = digits
            ));
        }

        Ok(label)
    }
}

/// A parsed USNG label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsngLabel {
    pub zone: u8,
    pub band: char,
    column: u8,
    row: u8,
    /// Easting inside the square, in units of `precision`
    pub easting: u32,
    /// Northing inside the square, in units of `precision`
    pub northing: u32,
    pub precision: GridPrecision,
}

impl UsngLabel {
    pub fn square_id(&self) -> [char; 2] {
        [
            column_letters(self.zone)[self.column as usize] as char,
            ROW_LETTERS[self.row as usize] as char,
        ]
    }

    /// South-west corner of the labelled cell as a full UTM position.
    ///
    /// The 100 km row letters repeat every 2 000 km of northing; the latitude
    /// band picks the cycle.
    pub fn to_utm(&self) -> UtmPosition {
        let cell = self.precision.meters() as f64;
        let easting = (self.column as f64 + 1.0) * SQUARE_SIZE_M + self.easting as f64 * cell;

        let cycle_row = (self.row as usize + ROW_LETTERS.len() - row_offset(self.zone))
            % ROW_LETTERS.len();
        let min_northing = band_index(self.band)
            .map(|i| BAND_MIN_NORTHING_M[i])
            .unwrap_or(0.0);
        let mut square_northing = cycle_row as f64 * SQUARE_SIZE_M;
        while square_northing + SQUARE_SIZE_M <= min_northing {
            square_northing += NORTHING_CYCLE_M;
        }

        UtmPosition {
            zone: self.zone,
            band: self.band,
            easting,
            northing: square_northing + self.northing as f64 * cell,
        }
    }
}

impl FromStr for UsngLabel {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let zone_len = compact.chars().take_while(|c| c.is_ascii_digit()).count();
        if zone_len == 0 || zone_len > 2 {
            return Err(GeoError::invalid_label(s, "expected a 1-2 digit zone number"));
        }
        let zone: u8 = compact[..zone_len]
            .parse()
            .map_err(|_| GeoError::invalid_label(s, "bad zone number"))?;
        if !check_zone(zone) {
            return Err(GeoError::invalid_label(s, "zone out of range 1-60"));
        }

        let mut chars = compact[zone_len..].chars();
        let band = chars
            .next()
            .filter(|c| band_index(*c).is_some())
            .ok_or_else(|| GeoError::invalid_label(s, "missing or invalid latitude band"))?;

        let column = chars
            .next()
            .and_then(|c| column_letters(zone).iter().position(|&l| l as char == c))
            .ok_or_else(|| GeoError::invalid_label(s, "invalid 100 km column letter"))?;
        let row = chars
            .next()
            .and_then(|c| ROW_LETTERS.iter().position(|&l| l as char == c))
            .ok_or_else(|| GeoError::invalid_label(s, "invalid 100 km row letter"))?;

        let numeric = chars.as_str();
        if !numeric.chars().all(|c| c.is_ascii_digit()) {
            return Err(GeoError::invalid_label(s, "coordinates must be digits"));
        }
        if numeric.len() % 2 != 0 || numeric.len() > 2 * MAX_DIGITS {
            return Err(GeoError::invalid_label(
                s,
                "expected an even number of digits (at most 10)",
            ));
        }

        let half = numeric.len() / 2;
        let parse_part = |part: &str| -> u32 { part.parse().unwrap_or(0) };
        let precision = GridPrecision::from_digits(half)
            .ok_or_else(|| GeoError::invalid_label(s, "too many digits"))?;

        Ok(Self {
            zone,
            band,
            column: column as u8,
            row: row as u8,
            easting: parse_part(&numeric[..half]),
            northing: parse_part(&numeric[half..]),
            precision,
        })
    }
}

impl fmt::Display for UsngLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [column, row] = self.square_id();
        write!(f, "{}{} {}{}", self.zone, self.band, column, row)?;
        let digits = self.precision.digits();
        if digits > 0 {
            write!(
                f,
                " {:0width$} {:0width$}",
                self.easting,
                self.northing,
                width = digits
            )?;
        }
        Ok(())
    }
}
