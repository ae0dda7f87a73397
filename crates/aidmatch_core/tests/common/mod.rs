#![allow(dead_code)]

use aidmatch_core::db::{open_db_in_memory, share, SharedConnection};
use aidmatch_core::store::{PageCursor, RecordPage};
use aidmatch_core::{
    AuditSink, Coordinates, DispatchConfig, FieldMap, GeoError, Geocoder, RecordStore,
    SelectQuery, SqliteRecordStore, StaticGeocoder, StoreError, StoreRecord, StoreResult,
};
use async_trait::async_trait;
use serde_json::Value;
use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const CITY: &str = "Somerville";
pub const STATE: &str = "MA";

pub fn config() -> Arc<DispatchConfig> {
    Arc::new(DispatchConfig::new(CITY, STATE).expect("test config"))
}

pub fn full_address(street: &str) -> String {
    format!("{street} {CITY}, {STATE}")
}

pub fn fields(value: Value) -> FieldMap {
    serde_json::from_value(value).expect("test fields must be a JSON object")
}

pub fn shared_db() -> SharedConnection {
    share(open_db_in_memory().expect("in-memory db"))
}

/// Store wrapper that counts calls and can be told to fail writes.
pub struct CountingStore<S> {
    inner: S,
    pub finds: AtomicUsize,
    pub updates: AtomicUsize,
    pub creates: AtomicUsize,
    pub selects: AtomicUsize,
    fail_updates: AtomicBool,
    fail_creates: AtomicBool,
}

impl<S: RecordStore> CountingStore<S> {
    pub fn new(inner: S) -> Arc<Self> {
        Arc::new(Self {
            inner,
            finds: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            selects: AtomicUsize::new(0),
            fail_updates: AtomicBool::new(false),
            fail_creates: AtomicBool::new(false),
        })
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    pub fn fail_creates(&self) {
        self.fail_creates.store(true, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.updates.load(Ordering::SeqCst) + self.creates.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.writes()
            + self.finds.load(Ordering::SeqCst)
            + self.selects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for CountingStore<S> {
    fn table_name(&self) -> &str {
        self.inner.table_name()
    }

    async fn find(&self, id: &str) -> StoreResult<Option<StoreRecord>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find(id).await
    }

    async fn update(&self, id: &str, changes: FieldMap) -> StoreResult<StoreRecord> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("update rejected".to_string()));
        }
        self.inner.update(id, changes).await
    }

    async fn create(&self, records: Vec<FieldMap>) -> StoreResult<Vec<StoreRecord>> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("create rejected".to_string()));
        }
        self.inner.create(records).await
    }

    async fn select_page(
        &self,
        query: &SelectQuery,
        cursor: Option<PageCursor>,
    ) -> StoreResult<RecordPage> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        self.inner.select_page(query, cursor).await
    }
}

/// Geocoder that counts calls and answers from a static table, or fails.
pub struct CountingGeocoder {
    table: StaticGeocoder,
    failure: Option<GeoError>,
    pub calls: AtomicUsize,
    pub last_address: Mutex<Option<String>>,
}

impl CountingGeocoder {
    pub fn answering(address: &str, coordinates: Coordinates) -> Arc<Self> {
        Arc::new(Self {
            table: StaticGeocoder::new().with_entry(address, coordinates),
            failure: None,
            calls: AtomicUsize::new(0),
            last_address: Mutex::new(None),
        })
    }

    pub fn failing(error: GeoError) -> Arc<Self> {
        Arc::new(Self {
            table: StaticGeocoder::new(),
            failure: Some(error),
            calls: AtomicUsize::new(0),
            last_address: Mutex::new(None),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for CountingGeocoder {
    async fn coordinates(&self, address: &str) -> Result<Coordinates, GeoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_address.lock().expect("address lock") = Some(address.to_string());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => self.table.coordinates(address).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    pub table: String,
    pub record_id: String,
    pub error: String,
    pub operation: String,
}

/// Audit sink that keeps rows in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    pub rows: Mutex<Vec<AuditRow>>,
}

impl RecordingAuditSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rows(&self) -> Vec<AuditRow> {
        self.rows.lock().expect("audit lock").clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn log_error_to_table(
        &self,
        table: &str,
        record: &StoreRecord,
        error: &(dyn Error + Send + Sync),
        operation: &str,
    ) -> StoreResult<()> {
        self.rows.lock().expect("audit lock").push(AuditRow {
            table: table.to_string(),
            record_id: record.id().to_string(),
            error: error.to_string(),
            operation: operation.to_string(),
        });
        Ok(())
    }
}

/// Creates one row in `store` and returns it.
pub async fn seed<S: RecordStore>(store: &S, value: Value) -> StoreRecord {
    store
        .create(vec![fields(value)])
        .await
        .expect("seed row")
        .remove(0)
}

pub fn sqlite_store(conn: &SharedConnection, table: &str) -> SqliteRecordStore {
    SqliteRecordStore::new(Arc::clone(conn), table)
}
