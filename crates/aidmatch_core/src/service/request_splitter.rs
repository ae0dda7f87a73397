//! Multi-task request splitting.
//!
//! # Responsibility
//! - Turn a request naming N tasks into N atomic requests, one per task.
//!
//! # Invariants
//! - The original row is updated first; if that fails nothing else runs.
//! - Clones follow the original task order, labelled `2 of N` .. `N of N`.
//! - Clones are created in one batch. A failed batch is not an error of the
//!   split: it is logged and reported in [`CloneOutcome::Failed`].

use crate::model::record::{fields, FieldMap, RecordId, StoreRecord};
use crate::model::request::Request;
use crate::model::Locatable;
use crate::store::{RecordStore, StoreError};
use crate::taxonomy::{Task, TaskPosition};
use log::{error, info};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SplitResult<T> = Result<T, SplitError>;

#[derive(Debug)]
pub enum SplitError {
    /// Caller error: only requests with more than one task can be split.
    NotMultiTask {
        record_id: RecordId,
        task_count: usize,
    },
    /// Updating the original request failed; no clone was attempted.
    UpdateOriginal(StoreError),
}

impl Display for SplitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotMultiTask {
                record_id,
                task_count,
            } => write!(
                f,
                "request {record_id} has {task_count} task(s); splitting needs more than one"
            ),
            Self::UpdateOriginal(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SplitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotMultiTask { .. } => None,
            Self::UpdateOriginal(err) => Some(err),
        }
    }
}

/// Result of the clone batch of one split.
#[derive(Debug)]
pub enum CloneOutcome {
    /// Every clone was created, paired with its position label.
    Created(Vec<(TaskPosition, StoreRecord)>),
    /// The batch was rejected; none of `positions` exist in the store.
    Failed {
        positions: Vec<TaskPosition>,
        error: StoreError,
    },
}

/// Outcome of a split whose original-request update succeeded.
#[derive(Debug)]
pub struct SplitReport {
    /// Original row as acknowledged after truncation to its first task.
    pub original: StoreRecord,
    pub clones: CloneOutcome,
}

impl SplitReport {
    /// Whether every atomic request now exists.
    pub fn is_complete(&self) -> bool {
        matches!(self.clones, CloneOutcome::Created(_))
    }

    /// Positions whose clone could not be created.
    pub fn missing_positions(&self) -> &[TaskPosition] {
        match &self.clones {
            CloneOutcome::Created(_) => &[],
            CloneOutcome::Failed { positions, .. } => positions,
        }
    }
}

/// Splits compound requests through a requests-table store.
pub struct RequestSplitter<S> {
    store: S,
}

impl<S: RecordStore> RequestSplitter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Splits `request` into one atomic request per task.
    ///
    /// # Errors
    /// - `NotMultiTask` when the request has a single task; the store is
    ///   not touched.
    /// - `UpdateOriginal` when the original row cannot be truncated.
    ///
    /// A failed clone batch is reported in the returned [`SplitReport`].
    pub async fn split(&self, request: &Request) -> SplitResult<SplitReport> {
        let tasks = request.tasks();
        let total = tasks.len();
        if total <= 1 {
            return Err(SplitError::NotMultiTask {
                record_id: request.id().to_string(),
                task_count: total,
            });
        }

        let positioned: Vec<(&Task, TaskPosition)> =
            tasks.iter().zip(TaskPosition::sequence(total)).collect();
        let (_, first_position) = positioned[0];

        let mut changes = FieldMap::new();
        changes.insert(fields::TASKS.to_string(), task_labels(&tasks[..1]));
        changes.insert(fields::ORIGINAL_TASKS.to_string(), task_labels(tasks));
        changes.insert(
            fields::TASK_ORDER.to_string(),
            Value::String(first_position.to_string()),
        );

        let original = self
            .store
            .update(request.id(), changes)
            .await
            .map_err(|err| {
                error!(
                    "event=request_split module=splitter status=error stage=update_original record_id={} error={err}",
                    request.id()
                );
                SplitError::UpdateOriginal(err)
            })?;

        let (positions, clone_rows): (Vec<_>, Vec<_>) = positioned[1..]
            .iter()
            .map(|(task, position)| (*position, clone_fields(request, task, *position)))
            .unzip();

        let clones = match self.store.create(clone_rows).await {
            Ok(created) => {
                info!(
                    "event=request_split module=splitter status=ok record_id={} tasks={total}",
                    request.id()
                );
                CloneOutcome::Created(positions.into_iter().zip(created).collect())
            }
            Err(err) => {
                error!(
                    "event=request_split module=splitter status=error stage=create_clones record_id={} missing={} error={err}",
                    request.id(),
                    positions.len()
                );
                CloneOutcome::Failed {
                    positions,
                    error: err,
                }
            }
        };

        Ok(SplitReport { original, clones })
    }
}

fn clone_fields(request: &Request, task: &Task, position: TaskPosition) -> FieldMap {
    let mut row = request.record().raw_fields().clone();
    row.insert(
        fields::TASKS.to_string(),
        task_labels(std::slice::from_ref(task)),
    );
    row.insert(
        fields::TASK_ORDER.to_string(),
        Value::String(position.to_string()),
    );
    row
}

fn task_labels(tasks: &[Task]) -> Value {
    Value::Array(
        tasks
            .iter()
            .map(|task| Value::String(task.id().to_string()))
            .collect(),
    )
}
