//! Named volunteer predicates referenced by catalog definitions.

use super::catalog::{CatalogError, CatalogResult};
use crate::model::volunteer::Volunteer;
use std::collections::BTreeMap;

/// Arbitrary eligibility check over a volunteer.
pub type VolunteerPredicate = fn(&Volunteer) -> bool;

/// Predicate plus the name a catalog document refers to it by.
#[derive(Clone)]
pub struct NamedPredicate {
    name: String,
    check: VolunteerPredicate,
}

impl NamedPredicate {
    pub fn new(name: impl Into<String>, check: VolunteerPredicate) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, volunteer: &Volunteer) -> bool {
        (self.check)(volunteer)
    }
}

/// Registry resolving predicate names used in catalog documents.
#[derive(Debug, Default, Clone)]
pub struct PredicateRegistry {
    entries: BTreeMap<String, VolunteerPredicate>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the predicates the built-in catalog refers to.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.entries.insert(
            "has_private_transportation".to_string(),
            Volunteer::has_private_transportation,
        );
        registry
    }

    /// Registers one predicate; names are trimmed and must be unique.
    pub fn register(
        &mut self,
        name: &str,
        predicate: VolunteerPredicate,
    ) -> CatalogResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyPredicateName);
        }
        if self.entries.contains_key(name) {
            return Err(CatalogError::DuplicatePredicate(name.to_string()));
        }
        self.entries.insert(name.to_string(), predicate);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<NamedPredicate> {
        self.entries
            .get_key_value(name.trim())
            .map(|(name, check)| NamedPredicate::new(name.clone(), *check))
    }
}
