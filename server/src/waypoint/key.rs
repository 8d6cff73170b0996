//! Waypoint keys
//!
//! A key is one symbol of the fixed 36-symbol legend `A..Z` followed by `0..9`.
//! Keys are stored as their slot index, so ordering keys orders them the way
//! the legend is listed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::types::WaypointError;

/// Number of waypoint slots (26 letters + 10 digits)
pub const CAPACITY: usize = 36;

const LETTER_COUNT: u8 = 26;

/// One symbol of the waypoint legend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaypointKey(u8);

impl WaypointKey {
    /// Map a legend symbol to its key
    pub fn from_char(c: char) -> Result<Self, WaypointError> {
        match c {
            'A'..='Z' => Ok(Self(c as u8 - b'A')),
            '0'..='9' => Ok(Self(LETTER_COUNT + (c as u8 - b'0'))),
            _ => Err(WaypointError::InvalidKey(c.to_string())),
        }
    }

    /// Key for a slot index, `None` past the last slot
    pub fn from_index(index: usize) -> Option<Self> {
        if index < CAPACITY {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Slot index in `0..CAPACITY`
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn as_char(self) -> char {
        if self.0 < LETTER_COUNT {
            (b'A' + self.0) as char
        } else {
            (b'0' + (self.0 - LETTER_COUNT)) as char
        }
    }

    /// Every key in legend order
    pub fn all() -> impl Iterator<Item = WaypointKey> {
        (0..CAPACITY as u8).map(Self)
    }
}

impl fmt::Display for WaypointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for WaypointKey {
    type Error = WaypointError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::from_char(c)
    }
}

impl FromStr for WaypointKey {
    type Err = WaypointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => Err(WaypointError::InvalidKey(s.to_string())),
        }
    }
}

impl Serialize for WaypointKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.as_char())
    }
}

impl<'de> Deserialize<'de> for WaypointKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Conversion into a key, so the registry accepts raw symbols as well as keys
pub trait ToWaypointKey {
    fn to_waypoint_key(&self) -> Result<WaypointKey, WaypointError>;
}

impl ToWaypointKey for WaypointKey {
    fn to_waypoint_key(&self) -> Result<WaypointKey, WaypointError> {
        Ok(*self)
    }
}

impl ToWaypointKey for char {
    fn to_waypoint_key(&self) -> Result<WaypointKey, WaypointError> {
        WaypointKey::from_char(*self)
    }
}

impl ToWaypointKey for &str {
    fn to_waypoint_key(&self) -> Result<WaypointKey, WaypointError> {
        self.parse()
    }
}

impl ToWaypointKey for String {
    fn to_waypoint_key(&self) -> Result<WaypointKey, WaypointError> {
        self.parse()
    }
}
