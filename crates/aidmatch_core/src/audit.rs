//! Audit rows for failed operations, independent of the operational log.
//!
//! # Invariants
//! - One failure produces at most one audit row.
//! - A failing audit write never replaces the error being audited.

use crate::model::record::{FieldMap, StoreRecord};
use crate::store::{RecordStore, StoreResult};
use async_trait::async_trait;
use serde_json::Value;
use std::error::Error;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod audit_fields {
    pub const TABLE: &str = "Table";
    pub const RECORD_ID: &str = "Record ID";
    pub const ERROR: &str = "Error";
    pub const OPERATION: &str = "Operation";
    pub const LOGGED_AT_MS: &str = "Logged At (ms)";
}

/// Sink for audit rows describing failed operations on a record.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log_error_to_table(
        &self,
        table: &str,
        record: &StoreRecord,
        error: &(dyn Error + Send + Sync),
        operation: &str,
    ) -> StoreResult<()>;
}

#[async_trait]
impl<A: AuditSink + ?Sized> AuditSink for Arc<A> {
    async fn log_error_to_table(
        &self,
        table: &str,
        record: &StoreRecord,
        error: &(dyn Error + Send + Sync),
        operation: &str,
    ) -> StoreResult<()> {
        (**self)
            .log_error_to_table(table, record, error, operation)
            .await
    }
}

/// Writes audit rows into an errors table through a [`RecordStore`].
pub struct StoreAuditSink<S> {
    store: S,
}

impl<S: RecordStore> StoreAuditSink<S> {
    /// `store` must be scoped to the errors table.
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: RecordStore> AuditSink for StoreAuditSink<S> {
    async fn log_error_to_table(
        &self,
        table: &str,
        record: &StoreRecord,
        error: &(dyn Error + Send + Sync),
        operation: &str,
    ) -> StoreResult<()> {
        let mut row = FieldMap::new();
        row.insert(audit_fields::TABLE.to_string(), Value::from(table));
        row.insert(audit_fields::RECORD_ID.to_string(), Value::from(record.id()));
        row.insert(audit_fields::ERROR.to_string(), Value::from(error.to_string()));
        row.insert(audit_fields::OPERATION.to_string(), Value::from(operation));
        row.insert(
            audit_fields::LOGGED_AT_MS.to_string(),
            Value::from(now_epoch_ms()),
        );
        self.store.create(vec![row]).await.map(|_| ())
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as u64)
}
