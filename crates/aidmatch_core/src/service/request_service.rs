//! Request use-case service.
//!
//! # Responsibility
//! - Expose coordinate resolution and splitting for requester rows.
//! - Count open assignments per connected volunteer.

use super::coordinate_resolver::{CoordinateResolver, ResolveResult};
use super::request_splitter::{RequestSplitter, SplitReport, SplitResult};
use crate::audit::AuditSink;
use crate::config::DispatchConfig;
use crate::geo::Geocoder;
use crate::model::record::{fields, RecordId, StoreRecord};
use crate::model::request::Request;
use crate::model::RecordResult;
use crate::store::{for_each_page, PageControl, RecordFilter, RecordStore, SelectQuery, StoreResult};
use crate::taxonomy::TaskCatalog;
use log::{info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Status value marking a request as finished.
pub const STATUS_COMPLETED: &str = "Completed";

/// Service over the requests table.
pub struct RequestService<S, G, A> {
    store: S,
    resolver: CoordinateResolver<G, S, A>,
    splitter: RequestSplitter<S>,
    catalog: Arc<TaskCatalog>,
    config: Arc<DispatchConfig>,
}

impl<S, G, A> RequestService<S, G, A>
where
    S: RecordStore + Clone,
    G: Geocoder,
    A: AuditSink,
{
    /// `store` must be scoped to the requests table.
    pub fn new(
        store: S,
        geocoder: G,
        audit: A,
        catalog: Arc<TaskCatalog>,
        config: Arc<DispatchConfig>,
    ) -> Self {
        Self {
            resolver: CoordinateResolver::new(geocoder, store.clone(), audit, Arc::clone(&config)),
            splitter: RequestSplitter::new(store.clone()),
            store,
            catalog,
            config,
        }
    }

    /// Wraps a raw requests-table row against this service's catalog.
    pub fn wrap(&self, record: StoreRecord) -> RecordResult<Request> {
        Request::from_record(record, Arc::clone(&self.catalog))
    }

    /// See [`CoordinateResolver::resolve`].
    pub async fn resolve_coordinates(&self, request: Request) -> ResolveResult<Request> {
        self.resolver.resolve(request).await
    }

    /// See [`RequestSplitter::split`].
    pub async fn split_multi_task_request(&self, request: &Request) -> SplitResult<SplitReport> {
        self.splitter.split(request).await
    }

    /// Counts unfinished requests per connected volunteer id.
    ///
    /// Only the first linked volunteer of each request is counted. Rows with
    /// a malformed link are skipped with a warning.
    pub async fn volunteer_task_counts(&self) -> StoreResult<BTreeMap<RecordId, usize>> {
        let query = SelectQuery::view(self.config.requests_view.as_str()).with_filter(
            RecordFilter::field_not_equals(fields::STATUS, STATUS_COMPLETED)
                .and(RecordFilter::field_not_empty(fields::CONNECTED_VOLUNTEER)),
        );

        let mut counts: BTreeMap<RecordId, usize> = BTreeMap::new();
        for_each_page(&self.store, &query, |records| {
            for record in records {
                match record
                    .get_str_list(fields::CONNECTED_VOLUNTEER)
                    .and_then(|ids| ids.first().map(|id| id.to_string()))
                {
                    Some(volunteer_id) => *counts.entry(volunteer_id).or_insert(0) += 1,
                    None => warn!(
                        "event=volunteer_counts module=request_service status=skip record_id={} reason=malformed_link",
                        record.id()
                    ),
                }
            }
            PageControl::NextPage
        })
        .await?;

        info!(
            "event=volunteer_counts module=request_service status=ok volunteers={}",
            counts.len()
        );
        Ok(counts)
    }
}
