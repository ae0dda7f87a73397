//! Help request domain record.
//!
//! # Invariants
//! - A `Request` always names at least one task, and every named task is
//!   a member of the catalog it was built against.
//! - Task order is the order of labels in the `Tasks` field.

use super::record::{fields, StoreRecord};
use super::{Locatable, RecordError, RecordResult};
use crate::taxonomy::{Task, TaskCatalog};
use std::sync::Arc;

/// A requester row with its tasks resolved against the task catalog.
#[derive(Debug, Clone)]
pub struct Request {
    record: StoreRecord,
    tasks: Vec<Task>,
    catalog: Arc<TaskCatalog>,
}

impl Request {
    /// Wraps a row, resolving every `Tasks` label through `catalog`.
    ///
    /// # Errors
    /// - `NoTasks` when `Tasks` is absent or empty.
    /// - `MalformedField` when `Tasks` is not a list of text.
    /// - `UnknownTask` for the first label the catalog does not know.
    pub fn from_record(record: StoreRecord, catalog: Arc<TaskCatalog>) -> RecordResult<Self> {
        let labels = match record.get_str_list(fields::TASKS) {
            Some(labels) => labels,
            None if record.get(fields::TASKS).is_some() => {
                return Err(RecordError::MalformedField {
                    record_id: record.id().to_string(),
                    field: fields::TASKS,
                })
            }
            None => Vec::new(),
        };
        if labels.is_empty() {
            return Err(RecordError::NoTasks(record.id().to_string()));
        }

        let tasks = labels
            .into_iter()
            .map(|label| {
                catalog
                    .lookup_by_label(label)
                    .cloned()
                    .ok_or_else(|| RecordError::UnknownTask {
                        record_id: record.id().to_string(),
                        label: label.to_string(),
                    })
            })
            .collect::<RecordResult<Vec<_>>>()?;

        Ok(Self {
            record,
            tasks,
            catalog,
        })
    }

    /// Tasks in request order; never empty.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_multi_task(&self) -> bool {
        self.tasks.len() > 1
    }

    pub fn display_name(&self) -> Option<&str> {
        self.record.get_str(fields::NAME)
    }
}

impl PartialEq for Request {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record && self.tasks == other.tasks
    }
}

impl Locatable for Request {
    const KIND: &'static str = "request";

    fn record(&self) -> &StoreRecord {
        &self.record
    }

    fn rewrap(&self, record: StoreRecord) -> RecordResult<Self> {
        Self::from_record(record, Arc::clone(&self.catalog))
    }
}
