//! Domain records wrapped around raw store rows.
//!
//! # Responsibility
//! - Give typed access to requester and volunteer rows.
//! - Share the coordinate-cache shape between both record kinds.
//!
//! # Invariants
//! - Domain records never persist themselves; every mutation goes back
//!   through a `RecordStore` and is re-wrapped from the acknowledged row.
//! - A cached coordinate pair is trusted unless its source-address marker is
//!   present, non-blank and different from the current full address.

pub mod coordinates;
pub mod record;
pub mod request;
pub mod volunteer;

use crate::config::DispatchConfig;
use coordinates::CoordinateCache;
use record::{fields, RecordId, StoreRecord};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RecordResult<T> = Result<T, RecordError>;

/// Errors raised while interpreting a raw store row as a domain record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// `Address` is absent or not a text value.
    MissingAddress(RecordId),
    /// A field is present but has an unexpected shape.
    MalformedField {
        record_id: RecordId,
        field: &'static str,
    },
    /// A request row names no task at all.
    NoTasks(RecordId),
    /// A request row names a task label the catalog does not know.
    UnknownTask { record_id: RecordId, label: String },
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAddress(id) => write!(f, "record {id} has no text address"),
            Self::MalformedField { record_id, field } => {
                write!(f, "record {record_id} has malformed field `{field}`")
            }
            Self::NoTasks(id) => write!(f, "request {id} names no tasks"),
            Self::UnknownTask { record_id, label } => {
                write!(f, "request {record_id} names unknown task `{label}`")
            }
        }
    }
}

impl Error for RecordError {}

/// A domain record that carries a postal address and a coordinate cache.
///
/// Implemented by [`request::Request`] and [`volunteer::Volunteer`] so the
/// coordinate resolver can treat both the same way.
pub trait Locatable: Sized {
    /// Short kind label used in log events (`request`, `volunteer`).
    const KIND: &'static str;

    /// Underlying store row.
    fn record(&self) -> &StoreRecord;

    /// Builds a fresh domain record from the row acknowledged by the store.
    fn rewrap(&self, record: StoreRecord) -> RecordResult<Self>;

    fn id(&self) -> &str {
        self.record().id()
    }

    /// Street component as stored in `Address`.
    fn street_address(&self) -> RecordResult<&str> {
        self.record()
            .get_str(fields::ADDRESS)
            .ok_or_else(|| RecordError::MissingAddress(self.id().to_string()))
    }

    /// Street plus the configured dispatch city and state.
    fn full_address(&self, config: &DispatchConfig) -> RecordResult<String> {
        Ok(config.full_address(self.street_address()?))
    }

    /// Cached coordinates and their source-address marker, if parseable.
    fn coordinate_cache(&self) -> Option<CoordinateCache> {
        CoordinateCache::from_record(self.record())
    }
}
