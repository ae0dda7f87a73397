//! Idempotent address-to-coordinates enrichment.
//!
//! # Responsibility
//! - Ensure a request or volunteer row carries coordinates for its current
//!   full address, calling the provider and the store only when needed.
//!
//! # Invariants
//! - A valid cache short-circuits: zero provider calls, zero store writes.
//! - Otherwise exactly one provider call and, on success, one store write.
//! - Every failure is logged, audited, then returned with its original cause.
//! - Nothing is written when the provider fails.

use crate::audit::AuditSink;
use crate::config::DispatchConfig;
use crate::geo::{GeoError, Geocoder};
use crate::model::record::{fields, FieldMap};
use crate::model::{Locatable, RecordError};
use crate::store::{RecordStore, StoreError};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Audit operation label for provider failures.
pub const OPERATION_RESOLVE: &str = "resolve coordinates";
/// Audit operation label for coordinate write-back failures.
pub const OPERATION_PERSIST: &str = "update coordinates";

pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Debug)]
pub enum ResolveError {
    /// Row cannot be geocoded (no text address) or re-wrapped.
    Record(RecordError),
    Geocode(GeoError),
    Persist(StoreError),
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Record(err) => write!(f, "{err}"),
            Self::Geocode(err) => write!(f, "{err}"),
            Self::Persist(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Record(err) => Some(err),
            Self::Geocode(err) => Some(err),
            Self::Persist(err) => Some(err),
        }
    }
}

impl From<RecordError> for ResolveError {
    fn from(value: RecordError) -> Self {
        Self::Record(value)
    }
}

/// Coordinate resolver bound to one table's store.
pub struct CoordinateResolver<G, S, A> {
    geocoder: G,
    store: S,
    audit: A,
    config: Arc<DispatchConfig>,
}

impl<G, S, A> CoordinateResolver<G, S, A>
where
    G: Geocoder,
    S: RecordStore,
    A: AuditSink,
{
    pub fn new(geocoder: G, store: S, audit: A, config: Arc<DispatchConfig>) -> Self {
        Self {
            geocoder,
            store,
            audit,
            config,
        }
    }

    /// Returns `record` with coordinates consistent with its full address.
    ///
    /// # Errors
    /// - `Record` when the row has no text address; nothing is called.
    /// - `Geocode` when the provider fails; nothing is written.
    /// - `Persist` when the store rejects the write; the cache stays stale.
    pub async fn resolve<R: Locatable>(&self, record: R) -> ResolveResult<R> {
        let full_address = record.full_address(&self.config)?;

        if record
            .coordinate_cache()
            .is_some_and(|cache| cache.is_valid_for(&full_address))
        {
            debug!(
                "event=coords_resolve module=resolver status=skip kind={} record_id={}",
                R::KIND,
                record.id()
            );
            return Ok(record);
        }

        let coordinates = match self.geocoder.coordinates(&full_address).await {
            Ok(coordinates) => coordinates,
            Err(err) => {
                self.report_failure(&record, &err, OPERATION_RESOLVE).await;
                return Err(ResolveError::Geocode(err));
            }
        };

        let mut changes = FieldMap::new();
        changes.insert(
            fields::COORDINATES.to_string(),
            Value::String(coordinates.to_field_value()),
        );
        changes.insert(
            fields::COORDINATES_ADDRESS.to_string(),
            Value::String(full_address),
        );

        let updated = match self.store.update(record.id(), changes).await {
            Ok(updated) => updated,
            Err(err) => {
                self.report_failure(&record, &err, OPERATION_PERSIST).await;
                return Err(ResolveError::Persist(err));
            }
        };

        info!(
            "event=coords_resolve module=resolver status=ok kind={} record_id={}",
            R::KIND,
            record.id()
        );
        Ok(record.rewrap(updated)?)
    }

    async fn report_failure<R: Locatable>(
        &self,
        record: &R,
        err: &(dyn Error + Send + Sync),
        operation: &str,
    ) {
        error!(
            "event=coords_resolve module=resolver status=error kind={} record_id={} operation={operation} error={err}",
            R::KIND,
            record.id()
        );
        if let Err(audit_err) = self
            .audit
            .log_error_to_table(self.store.table_name(), record.record(), err, operation)
            .await
        {
            warn!(
                "event=audit_write module=resolver status=error record_id={} operation={operation} error={audit_err}",
                record.id()
            );
        }
    }
}
