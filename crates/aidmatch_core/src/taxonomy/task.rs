//! Task definition and the eligibility predicate.

use super::predicates::NamedPredicate;
use crate::model::volunteer::Volunteer;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// One kind of help a requester can ask for.
///
/// Cloning is cheap; definitions are shared behind an `Arc`.
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

struct TaskInner {
    id: String,
    capability_prefixes: Vec<String>,
    predicates: Vec<NamedPredicate>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        capability_prefixes: Vec<String>,
        predicates: Vec<NamedPredicate>,
    ) -> Self {
        Self {
            inner: Arc::new(TaskInner {
                id: id.into(),
                capability_prefixes,
                predicates,
            }),
        }
    }

    /// Raw label as written in a request's `Tasks` field.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn capability_prefixes(&self) -> &[String] {
        &self.inner.capability_prefixes
    }

    pub fn predicates(&self) -> &[NamedPredicate] {
        &self.inner.predicates
    }

    /// Returns whether `volunteer` can take on this task.
    ///
    /// # Contract
    /// - Capability clause: no prefixes, or any declared capability starts
    ///   with any prefix.
    /// - Predicate clause: no predicates, or any predicate holds.
    /// - Result is both clauses together; an empty clause always passes.
    pub fn matches(&self, volunteer: &Volunteer) -> bool {
        self.capability_clause(volunteer) && self.predicate_clause(volunteer)
    }

    fn capability_clause(&self, volunteer: &Volunteer) -> bool {
        let prefixes = &self.inner.capability_prefixes;
        if prefixes.is_empty() {
            return true;
        }
        let capabilities = volunteer.capabilities();
        prefixes.iter().any(|prefix| {
            capabilities
                .iter()
                .any(|capability| capability.starts_with(prefix.as_str()))
        })
    }

    fn predicate_clause(&self, volunteer: &Volunteer) -> bool {
        let predicates = &self.inner.predicates;
        predicates.is_empty() || predicates.iter().any(|predicate| predicate.check(volunteer))
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl Debug for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.inner.id)
            .field("capability_prefixes", &self.inner.capability_prefixes)
            .field(
                "predicates",
                &self
                    .inner
                    .predicates
                    .iter()
                    .map(NamedPredicate::name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
