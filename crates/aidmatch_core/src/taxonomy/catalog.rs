//! Immutable task catalog loaded from a declarative document.
//!
//! # Invariants
//! - Identifiers are non-blank and unique.
//! - Every predicate reference resolves at load time.
//! - The catch-all, when named, is a member of the catalog.

use super::predicates::PredicateRegistry;
use super::task::Task;
use log::info;
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Built-in catalog document.
pub const BUILTIN_CATALOG_JSON: &str = include_str!("builtin_tasks.json");

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    EmptyTaskId,
    DuplicateTaskId(String),
    UnknownPredicate { task_id: String, predicate: String },
    UnknownCatchAll(String),
    EmptyPredicateName,
    DuplicatePredicate(String),
    InvalidDocument(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTaskId => write!(f, "task id must not be empty"),
            Self::DuplicateTaskId(id) => write!(f, "task id declared twice: {id}"),
            Self::UnknownPredicate { task_id, predicate } => {
                write!(f, "task `{task_id}` references unknown predicate `{predicate}`")
            }
            Self::UnknownCatchAll(id) => write!(f, "catch-all task is not in the catalog: {id}"),
            Self::EmptyPredicateName => write!(f, "predicate name must not be empty"),
            Self::DuplicatePredicate(name) => write!(f, "predicate registered twice: {name}"),
            Self::InvalidDocument(message) => write!(f, "invalid task catalog document: {message}"),
        }
    }
}

impl Error for CatalogError {}

/// One task entry of a catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDefinition {
    pub id: String,
    #[serde(default)]
    pub capability_prefixes: Vec<String>,
    /// Names resolved through a [`PredicateRegistry`].
    #[serde(default)]
    pub predicates: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    #[serde(default)]
    catch_all: Option<String>,
    tasks: Vec<TaskDefinition>,
}

/// Fixed set of supportable tasks, in declaration order.
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    tasks: Vec<Task>,
    by_label: HashMap<String, usize>,
    catch_all: Option<usize>,
}

impl TaskCatalog {
    /// Loads the built-in catalog with the built-in predicates.
    pub fn builtin() -> CatalogResult<Self> {
        Self::from_json(BUILTIN_CATALOG_JSON, &PredicateRegistry::builtin())
    }

    /// Parses and validates a catalog document.
    pub fn from_json(document: &str, registry: &PredicateRegistry) -> CatalogResult<Self> {
        let parsed: CatalogDocument = serde_json::from_str(document)
            .map_err(|err| CatalogError::InvalidDocument(err.to_string()))?;
        Self::from_definitions(parsed.tasks, parsed.catch_all.as_deref(), registry)
    }

    /// Builds a catalog from already-parsed definitions.
    pub fn from_definitions(
        definitions: Vec<TaskDefinition>,
        catch_all: Option<&str>,
        registry: &PredicateRegistry,
    ) -> CatalogResult<Self> {
        let mut tasks = Vec::with_capacity(definitions.len());
        let mut by_label = HashMap::with_capacity(definitions.len());

        for definition in definitions {
            let id = definition.id.trim().to_string();
            if id.is_empty() {
                return Err(CatalogError::EmptyTaskId);
            }
            if by_label.contains_key(id.as_str()) {
                return Err(CatalogError::DuplicateTaskId(id));
            }

            let predicates = definition
                .predicates
                .iter()
                .map(|name| {
                    registry
                        .resolve(name)
                        .ok_or_else(|| CatalogError::UnknownPredicate {
                            task_id: id.clone(),
                            predicate: name.clone(),
                        })
                })
                .collect::<CatalogResult<Vec<_>>>()?;

            by_label.insert(id.clone(), tasks.len());
            tasks.push(Task::new(id, definition.capability_prefixes, predicates));
        }

        let catch_all = match catch_all {
            Some(label) => Some(
                *by_label
                    .get(label.trim())
                    .ok_or_else(|| CatalogError::UnknownCatchAll(label.to_string()))?,
            ),
            None => None,
        };

        info!(
            "event=catalog_load module=taxonomy status=ok tasks={} catch_all={}",
            tasks.len(),
            catch_all.is_some()
        );

        Ok(Self {
            tasks,
            by_label,
            catch_all,
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Maps a raw `Tasks` label to its task. Unknown labels yield `None`.
    pub fn lookup_by_label(&self, raw_label: &str) -> Option<&Task> {
        self.by_label.get(raw_label).map(|index| &self.tasks[*index])
    }

    /// Broad fallback task, if the catalog designates one.
    pub fn catch_all(&self) -> Option<&Task> {
        self.catch_all.map(|index| &self.tasks[index])
    }

    /// Tasks other than the catch-all, in declaration order.
    pub fn concrete_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .enumerate()
            .filter(move |(index, _)| Some(*index) != self.catch_all)
            .map(|(_, task)| task)
    }
}
