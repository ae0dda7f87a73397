//! Matching core for a mutual-aid coordination workflow.
//!
//! Matches help requests to capable volunteers, enriches both with
//! coordinates derived from postal addresses, and splits multi-task
//! requests into atomic units of work. This crate is the single source of
//! truth for those invariants; storage and geocoding sit behind traits.

pub mod audit;
pub mod config;
pub mod db;
pub mod geo;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod taxonomy;

pub use audit::{AuditSink, StoreAuditSink};
pub use config::{ConfigError, DispatchConfig};
pub use geo::{GeoError, Geocoder, StaticGeocoder};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::coordinates::{CoordinateCache, Coordinates};
pub use model::record::{fields, FieldMap, RecordId, StoreRecord};
pub use model::request::Request;
pub use model::volunteer::Volunteer;
pub use model::{Locatable, RecordError};
pub use service::coordinate_resolver::{CoordinateResolver, ResolveError};
pub use service::request_service::RequestService;
pub use service::request_splitter::{CloneOutcome, RequestSplitter, SplitError, SplitReport};
pub use service::volunteer_sampler::VolunteerSampler;
pub use service::volunteer_service::{OutreachError, VolunteerService};
pub use store::{
    for_each_page, PageControl, RecordFilter, RecordPage, RecordStore, SelectQuery,
    SqliteRecordStore, StoreError, StoreResult,
};
pub use taxonomy::{CatalogError, PredicateRegistry, Task, TaskCatalog, TaskPosition};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
