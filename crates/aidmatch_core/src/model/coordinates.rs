//! Geographic coordinates and the per-record coordinate cache.
//!
//! # Invariants
//! - `_coordinates` holds the serialized pair as JSON text.
//! - A cache is valid for an address iff its marker is absent, blank, or
//!   equal to that address. Missing markers are trusted, not refreshed.

use super::record::{fields, StoreRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// JSON text persisted in the `_coordinates` field.
    pub fn to_field_value(&self) -> String {
        serde_json::json!({
            "latitude": self.latitude,
            "longitude": self.longitude,
        })
        .to_string()
    }

    /// Parses a stored `_coordinates` value (JSON text or an inline object).
    pub fn from_field_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => serde_json::from_str(text).ok(),
            Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }
}

/// Cached coordinates plus the address string that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateCache {
    pub coordinates: Coordinates,
    pub source_address: Option<String>,
}

impl CoordinateCache {
    /// Reads the cache from a row; unparseable coordinates count as no cache.
    pub fn from_record(record: &StoreRecord) -> Option<Self> {
        let coordinates = Coordinates::from_field_value(record.get(fields::COORDINATES)?)?;
        Some(Self {
            coordinates,
            source_address: record
                .get_str(fields::COORDINATES_ADDRESS)
                .map(str::to_string),
        })
    }

    pub fn is_valid_for(&self, full_address: &str) -> bool {
        match self.source_address.as_deref() {
            None => true,
            Some(marker) => marker.trim().is_empty() || marker == full_address,
        }
    }
}
