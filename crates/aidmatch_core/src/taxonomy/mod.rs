//! Task taxonomy and capability matching.
//!
//! # Responsibility
//! - Describe the fixed set of tasks a requester can ask help for.
//! - Decide whether a volunteer is eligible for a task.
//!
//! # Invariants
//! - The catalog is built once at startup, immutable afterwards, and passed
//!   explicitly to consumers; there is no global catalog.
//! - Task identifiers are unique within a catalog.
//! - Task equality is identifier equality.

mod catalog;
mod position;
mod predicates;
mod task;

pub use catalog::{CatalogError, CatalogResult, TaskCatalog, TaskDefinition, BUILTIN_CATALOG_JSON};
pub use position::TaskPosition;
pub use predicates::{NamedPredicate, PredicateRegistry, VolunteerPredicate};
pub use task::Task;
