//! Filter expressions evaluated over record fields.

use crate::model::record::StoreRecord;
use serde_json::Value;

/// Record predicate used by views and `select` queries.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFilter {
    All,
    FieldEquals(String, Value),
    /// Absent fields count as not equal.
    FieldNotEquals(String, Value),
    /// Present, non-null, and not an empty text or list.
    FieldNotEmpty(String),
    /// Anything but a literal `true`.
    FieldNotTrue(String),
    And(Vec<RecordFilter>),
}

impl RecordFilter {
    pub fn field_equals(field: &str, value: impl Into<Value>) -> Self {
        Self::FieldEquals(field.to_string(), value.into())
    }

    pub fn field_not_equals(field: &str, value: impl Into<Value>) -> Self {
        Self::FieldNotEquals(field.to_string(), value.into())
    }

    pub fn field_not_empty(field: &str) -> Self {
        Self::FieldNotEmpty(field.to_string())
    }

    pub fn field_not_true(field: &str) -> Self {
        Self::FieldNotTrue(field.to_string())
    }

    /// Conjunction; `All` operands are dropped.
    pub fn and(self, other: RecordFilter) -> Self {
        match (self, other) {
            (Self::All, filter) | (filter, Self::All) => filter,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), filter) => {
                left.push(filter);
                Self::And(left)
            }
            (filter, Self::And(mut right)) => {
                right.insert(0, filter);
                Self::And(right)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }

    pub fn matches(&self, record: &StoreRecord) -> bool {
        match self {
            Self::All => true,
            Self::FieldEquals(field, expected) => record.get(field) == Some(expected),
            Self::FieldNotEquals(field, expected) => record.get(field) != Some(expected),
            Self::FieldNotEmpty(field) => match record.get(field) {
                None => false,
                Some(Value::String(text)) => !text.is_empty(),
                Some(Value::Array(items)) => !items.is_empty(),
                Some(_) => true,
            },
            Self::FieldNotTrue(field) => record.get(field) != Some(&Value::Bool(true)),
            Self::And(filters) => filters.iter().all(|filter| filter.matches(record)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RecordFilter;
    use crate::model::record::{FieldMap, StoreRecord};
    use serde_json::{json, Value};

    fn record(value: Value) -> StoreRecord {
        let fields: FieldMap = serde_json::from_value(value).expect("object fields");
        StoreRecord::new("rec1", fields)
    }

    #[test]
    fn equals_requires_present_identical_value() {
        let filter = RecordFilter::field_equals("Status", "Open");
        assert!(filter.matches(&record(json!({ "Status": "Open" }))));
        assert!(!filter.matches(&record(json!({ "Status": "open" }))));
        assert!(!filter.matches(&record(json!({ "Status": null }))));
        assert!(!filter.matches(&record(json!({}))));
    }

    #[test]
    fn not_equals_treats_missing_field_as_different() {
        let filter = RecordFilter::field_not_equals("Status", "Completed");
        assert!(filter.matches(&record(json!({}))));
        assert!(filter.matches(&record(json!({ "Status": "Open" }))));
        assert!(!filter.matches(&record(json!({ "Status": "Completed" }))));
    }

    #[test]
    fn not_empty_rejects_empty_text_lists_and_null() {
        let filter = RecordFilter::field_not_empty("Connected Volunteer");
        assert!(!filter.matches(&record(json!({ "Connected Volunteer": "" }))));
        assert!(!filter.matches(&record(json!({ "Connected Volunteer": [] }))));
        assert!(!filter.matches(&record(json!({ "Connected Volunteer": null }))));
        assert!(filter.matches(&record(json!({ "Connected Volunteer": ["recV"] }))));
    }

    #[test]
    fn not_true_only_excludes_literal_true() {
        let filter = RecordFilter::field_not_true("Account Disabled");
        assert!(filter.matches(&record(json!({}))));
        assert!(filter.matches(&record(json!({ "Account Disabled": false }))));
        assert!(!filter.matches(&record(json!({ "Account Disabled": true }))));
    }

    #[test]
    fn and_flattens_and_drops_all() {
        let combined = RecordFilter::All
            .and(RecordFilter::field_not_true("A"))
            .and(RecordFilter::field_not_empty("B"));
        assert_eq!(
            combined,
            RecordFilter::And(vec![
                RecordFilter::field_not_true("A"),
                RecordFilter::field_not_empty("B"),
            ])
        );
    }
}
