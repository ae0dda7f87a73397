//! Geocoding collaborator contract.

use crate::model::coordinates::Coordinates;
use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type GeoResult<T> = Result<T, GeoError>;

/// Geocoding provider failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    /// Provider could not be reached or refused the call.
    Unavailable(String),
    /// Provider answered but found no match for the address.
    NoResult,
    /// Provider answered with something that is not a coordinate pair.
    Malformed(String),
}

impl Display for GeoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "geocoding provider unavailable: {message}"),
            Self::NoResult => write!(f, "geocoding provider returned no result"),
            Self::Malformed(message) => {
                write!(f, "geocoding provider returned malformed response: {message}")
            }
        }
    }
}

impl Error for GeoError {}

/// Resolves a full postal address to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn coordinates(&self, address: &str) -> GeoResult<Coordinates>;
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for Arc<G> {
    async fn coordinates(&self, address: &str) -> GeoResult<Coordinates> {
        (**self).coordinates(address).await
    }
}

/// In-process geocoder backed by a fixed address table.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    entries: HashMap<String, Coordinates>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, address: impl Into<String>, coordinates: Coordinates) -> Self {
        self.entries.insert(address.into(), coordinates);
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn coordinates(&self, address: &str) -> GeoResult<Coordinates> {
        self.entries
            .get(address.trim())
            .copied()
            .ok_or(GeoError::NoResult)
    }
}
