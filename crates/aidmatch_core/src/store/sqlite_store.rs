//! SQLite-backed record store.
//!
//! # Responsibility
//! - Persist rows of any logical table as JSON field maps.
//! - Serve named views as pre-registered filters.
//!
//! # Invariants
//! - One handle is scoped to exactly one logical table.
//! - Record ids are UUID v4 strings assigned on create.
//! - The connection mutex is never held across an `.await`.

use super::{
    PageCursor, RecordFilter, RecordPage, RecordStore, SelectQuery, StoreError, StoreResult,
};
use crate::db::SharedConnection;
use crate::model::record::{FieldMap, StoreRecord};
use async_trait::async_trait;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, MutexGuard};
use uuid::Uuid;

/// Table-scoped store handle over a shared SQLite connection.
///
/// Clones share the connection and the registered views.
///
/// Statements run synchronously inside the `async` methods, on the thread
/// polling the future. Meant for a current-thread runtime; on a
/// multi-threaded runtime a slow statement blocks a worker thread.
#[derive(Clone)]
pub struct SqliteRecordStore {
    conn: SharedConnection,
    table: String,
    views: Arc<BTreeMap<String, RecordFilter>>,
}

impl SqliteRecordStore {
    /// Wraps a migrated connection (see [`crate::db::open_db`]).
    pub fn new(conn: SharedConnection, table: impl Into<String>) -> Self {
        Self {
            conn,
            table: table.into(),
            views: Arc::new(BTreeMap::new()),
        }
    }

    /// Registers a named view; re-registering a name replaces its filter.
    pub fn with_view(mut self, name: impl Into<String>, filter: RecordFilter) -> Self {
        Arc::make_mut(&mut self.views).insert(name.into(), filter);
        self
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }

    fn view_filter(&self, query: &SelectQuery) -> StoreResult<RecordFilter> {
        let base = match query.view.as_deref() {
            Some(name) => self
                .views
                .get(name)
                .cloned()
                .ok_or_else(|| StoreError::UnknownView(name.to_string()))?,
            None => RecordFilter::All,
        };
        Ok(base.and(query.filter.clone()))
    }

    fn find_blocking(&self, id: &str) -> StoreResult<Option<StoreRecord>> {
        let conn = self.lock()?;
        let fields_json = conn
            .query_row(
                "SELECT fields_json FROM records WHERE table_name = ?1 AND id = ?2;",
                params![self.table, id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        match fields_json {
            Some(text) => Ok(Some(StoreRecord::new(id, parse_fields(id, &text)?))),
            None => Ok(None),
        }
    }

    fn update_blocking(&self, id: &str, changes: FieldMap) -> StoreResult<StoreRecord> {
        let conn = self.lock()?;
        let current = conn
            .query_row(
                "SELECT fields_json FROM records WHERE table_name = ?1 AND id = ?2;",
                params![self.table, id],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut fields = parse_fields(id, &current)?;
        fields.extend(changes);
        conn.execute(
            "UPDATE records SET fields_json = ?1 WHERE table_name = ?2 AND id = ?3;",
            params![encode_fields(&fields)?, self.table, id],
        )?;

        Ok(StoreRecord::new(id, fields))
    }

    fn create_blocking(&self, records: Vec<FieldMap>) -> StoreResult<Vec<StoreRecord>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut created = Vec::with_capacity(records.len());
        for fields in records {
            let id = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO records (id, table_name, fields_json) VALUES (?1, ?2, ?3);",
                params![id, self.table, encode_fields(&fields)?],
            )?;
            created.push(StoreRecord::new(id, fields));
        }
        tx.commit()?;
        Ok(created)
    }

    fn select_page_blocking(
        &self,
        query: &SelectQuery,
        cursor: Option<PageCursor>,
    ) -> StoreResult<RecordPage> {
        let filter = self.view_filter(query)?;
        let page_size = query.page_size.max(1) as usize;
        let after_seq = cursor.map_or(0, |cursor| cursor.0);

        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT seq, id, fields_json
             FROM records
             WHERE table_name = ?1 AND seq > ?2
             ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query(params![self.table, after_seq])?;

        let mut records = Vec::new();
        let mut last_seq = after_seq;
        let mut has_more = false;
        while let Some(row) = rows.next()? {
            let seq: i64 = row.get(0)?;
            let id: String = row.get(1)?;
            let text: String = row.get(2)?;
            let record = StoreRecord::new(id.as_str(), parse_fields(&id, &text)?);
            if !filter.matches(&record) {
                continue;
            }
            if records.len() == page_size {
                has_more = true;
                break;
            }
            last_seq = seq;
            records.push(record);
        }

        Ok(RecordPage {
            records,
            next_cursor: has_more.then_some(PageCursor(last_seq)),
        })
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    fn table_name(&self) -> &str {
        &self.table
    }

    async fn find(&self, id: &str) -> StoreResult<Option<StoreRecord>> {
        self.find_blocking(id)
    }

    async fn update(&self, id: &str, changes: FieldMap) -> StoreResult<StoreRecord> {
        let changed_fields = changes.len();
        let result = self.update_blocking(id, changes);
        match &result {
            Ok(_) => debug!(
                "event=record_update module=store status=ok table={} record_id={id} fields={changed_fields}",
                self.table
            ),
            Err(err) => error!(
                "event=record_update module=store status=error table={} record_id={id} error={err}",
                self.table
            ),
        }
        result
    }

    async fn create(&self, records: Vec<FieldMap>) -> StoreResult<Vec<StoreRecord>> {
        let count = records.len();
        let result = self.create_blocking(records);
        match &result {
            Ok(_) => debug!(
                "event=record_create module=store status=ok table={} count={count}",
                self.table
            ),
            Err(err) => error!(
                "event=record_create module=store status=error table={} count={count} error={err}",
                self.table
            ),
        }
        result
    }

    async fn select_page(
        &self,
        query: &SelectQuery,
        cursor: Option<PageCursor>,
    ) -> StoreResult<RecordPage> {
        self.select_page_blocking(query, cursor)
    }
}

fn parse_fields(id: &str, text: &str) -> StoreResult<FieldMap> {
    serde_json::from_str(text).map_err(|err| {
        StoreError::InvalidData(format!("record {id} has unreadable fields_json: {err}"))
    })
}

fn encode_fields(fields: &FieldMap) -> StoreResult<String> {
    serde_json::to_string(fields)
        .map_err(|err| StoreError::InvalidData(format!("fields are not serializable: {err}")))
}
