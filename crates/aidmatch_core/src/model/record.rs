//! Raw store rows and the stable field-name contract.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Store-assigned record identifier.
pub type RecordId = String;

/// Field name to JSON value mapping, as exchanged with the store.
pub type FieldMap = Map<String, Value>;

/// Field names shared with the record store. Renaming any of these breaks
/// compatibility with existing rows.
pub mod fields {
    pub const TASKS: &str = "Tasks";
    pub const ORIGINAL_TASKS: &str = "Original Tasks";
    pub const TASK_ORDER: &str = "Task Order";
    pub const ADDRESS: &str = "Address";
    pub const NAME: &str = "Name";
    pub const FULL_NAME: &str = "Full Name";
    pub const COORDINATES: &str = "_coordinates";
    pub const COORDINATES_ADDRESS: &str = "_coordinates_address";
    pub const CAPABILITIES: &str = "I can provide the following support (non-binding)";
    pub const PRIVATE_TRANSPORTATION: &str =
        "Do you have a private mode of transportation with valid license/insurance? ";
    pub const STATUS: &str = "Status";
    pub const CONNECTED_VOLUNTEER: &str = "Connected Volunteer";
    pub const ACCOUNT_DISABLED: &str = "Account Disabled";
}

/// One row read from (or acknowledged by) the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    id: RecordId,
    fields: FieldMap,
}

impl StoreRecord {
    pub fn new(id: impl Into<RecordId>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns one field value; absent fields and explicit nulls both yield `None`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    /// Returns one field as text when it holds a JSON string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Returns a list-of-text field; a bare string counts as a one-item list.
    ///
    /// `None` when the field is absent or any element is not text; use
    /// [`StoreRecord::get`] to tell the two apart.
    pub fn get_str_list(&self, field: &str) -> Option<Vec<&str>> {
        match self.get(field)? {
            Value::Array(items) => items.iter().map(Value::as_str).collect(),
            Value::String(single) => Some(vec![single.as_str()]),
            _ => None,
        }
    }

    pub fn raw_fields(&self) -> &FieldMap {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldMap, StoreRecord};
    use serde_json::{json, Value};

    fn record(value: Value) -> StoreRecord {
        let fields: FieldMap = serde_json::from_value(value).expect("object fields");
        StoreRecord::new("rec1", fields)
    }

    #[test]
    fn get_treats_null_as_absent() {
        let row = record(json!({ "Address": null, "Name": "Ada" }));
        assert!(row.get("Address").is_none());
        assert_eq!(row.get_str("Name"), Some("Ada"));
    }

    #[test]
    fn get_str_list_accepts_arrays_and_single_strings() {
        let row = record(json!({ "A": ["x", "y"], "B": "z", "C": [1], "D": 3 }));
        assert_eq!(row.get_str_list("A"), Some(vec!["x", "y"]));
        assert_eq!(row.get_str_list("B"), Some(vec!["z"]));
        assert_eq!(row.get_str_list("C"), None);
        assert_eq!(row.get_str_list("D"), None);
        assert!(row.get("D").is_some());
        assert_eq!(row.get_str_list("missing"), None);
    }
}
