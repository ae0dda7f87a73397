//! Volunteer domain record.

use super::record::{fields, StoreRecord};
use super::{Locatable, RecordResult};
use serde_json::Value;

/// A volunteer row with typed accessors for matching and geocoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Volunteer {
    record: StoreRecord,
}

impl Volunteer {
    pub fn new(record: StoreRecord) -> Self {
        Self { record }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }

    /// Declared support capabilities; absent or malformed lists read as empty.
    pub fn capabilities(&self) -> Vec<&str> {
        self.record
            .get_str_list(fields::CAPABILITIES)
            .unwrap_or_default()
    }

    /// Whether the volunteer declared any private transportation.
    ///
    /// Any truthy value counts: `true`, a non-zero number, a non-empty text
    /// (whitespace included), or any list or object. `false`, `0`, `""`
    /// and absent or null fields do not.
    pub fn has_private_transportation(&self) -> bool {
        match self.record.get(fields::PRIVATE_TRANSPORTATION) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(text)) => !text.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.record
            .get_str(fields::FULL_NAME)
            .or_else(|| self.record.get_str(fields::NAME))
    }

    pub fn into_record(self) -> StoreRecord {
        self.record
    }
}

impl Locatable for Volunteer {
    const KIND: &'static str = "volunteer";

    fn record(&self) -> &StoreRecord {
        &self.record
    }

    fn rewrap(&self, record: StoreRecord) -> RecordResult<Self> {
        Ok(Self::new(record))
    }
}
