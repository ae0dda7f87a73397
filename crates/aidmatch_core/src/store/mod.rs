//! Record-store contract and implementations.
//!
//! # Responsibility
//! - Define the table-scoped store operations the services depend on.
//! - Keep paging and filter semantics independent of the backend.
//!
//! # Invariants
//! - `update` merges: listed fields are replaced, all others are untouched.
//! - `create` is all-or-nothing for one batch.
//! - Pages are returned in record insertion order.
//! - No operation takes a lock or transaction spanning several calls.

mod filter;
mod sqlite_store;

pub use filter::RecordFilter;
pub use sqlite_store::SqliteRecordStore;

use crate::db::DbError;
use crate::model::record::{FieldMap, RecordId, StoreRecord};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Page size used when a query does not set one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

pub type StoreResult<T> = Result<T, StoreError>;

/// Record-store failure.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound(RecordId),
    UnknownView(String),
    InvalidData(String),
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::UnknownView(name) => write!(f, "unknown view: {name}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::Unavailable(message) => write!(f, "record store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Opaque position after the last record of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor(pub(crate) i64);

/// One page of a `select`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPage {
    pub records: Vec<StoreRecord>,
    /// `None` on the last page.
    pub next_cursor: Option<PageCursor>,
}

/// Returned by a page callback to continue or stop paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    NextPage,
    Stop,
}

/// `select` parameters: an optional named view plus an extra filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub view: Option<String>,
    pub filter: RecordFilter,
    pub page_size: u32,
}

impl SelectQuery {
    /// Every record of the table.
    pub fn all() -> Self {
        Self {
            view: None,
            filter: RecordFilter::All,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn view(name: impl Into<String>) -> Self {
        Self {
            view: Some(name.into()),
            ..Self::all()
        }
    }

    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Clamped to at least 1.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// Table-scoped record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Name of the table this handle reads and writes.
    fn table_name(&self) -> &str;

    async fn find(&self, id: &str) -> StoreResult<Option<StoreRecord>>;

    /// Applies `changes` to one record and returns the acknowledged row.
    async fn update(&self, id: &str, changes: FieldMap) -> StoreResult<StoreRecord>;

    /// Creates all records or none, returning them in input order.
    async fn create(&self, records: Vec<FieldMap>) -> StoreResult<Vec<StoreRecord>>;

    /// Returns the page following `cursor` (`None` for the first page).
    async fn select_page(
        &self,
        query: &SelectQuery,
        cursor: Option<PageCursor>,
    ) -> StoreResult<RecordPage>;
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn table_name(&self) -> &str {
        (**self).table_name()
    }

    async fn find(&self, id: &str) -> StoreResult<Option<StoreRecord>> {
        (**self).find(id).await
    }

    async fn update(&self, id: &str, changes: FieldMap) -> StoreResult<StoreRecord> {
        (**self).update(id, changes).await
    }

    async fn create(&self, records: Vec<FieldMap>) -> StoreResult<Vec<StoreRecord>> {
        (**self).create(records).await
    }

    async fn select_page(
        &self,
        query: &SelectQuery,
        cursor: Option<PageCursor>,
    ) -> StoreResult<RecordPage> {
        (**self).select_page(query, cursor).await
    }
}

/// Walks `select` pages in order, handing each batch to `on_page`.
///
/// Paging advances only when `on_page` returns [`PageControl::NextPage`].
pub async fn for_each_page<S, F>(store: &S, query: &SelectQuery, mut on_page: F) -> StoreResult<()>
where
    S: RecordStore + ?Sized,
    F: FnMut(Vec<StoreRecord>) -> PageControl + Send,
{
    let mut cursor = None;
    loop {
        let page = store.select_page(query, cursor).await?;
        let control = on_page(page.records);
        match (control, page.next_cursor) {
            (PageControl::NextPage, Some(next)) => cursor = Some(next),
            _ => return Ok(()),
        }
    }
}
