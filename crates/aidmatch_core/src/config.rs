//! Read-only dispatch configuration.
//!
//! # Invariants
//! - Every value is trimmed and non-empty once loaded.
//! - City and state have no defaults; table and view names do.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const ENV_DISPATCH_CITY: &str = "VOLUNTEER_DISPATCH_CITY";
pub const ENV_DISPATCH_STATE: &str = "VOLUNTEER_DISPATCH_STATE";
pub const ENV_REQUESTS_TABLE: &str = "REQUESTS_TABLE_NAME";
pub const ENV_VOLUNTEERS_TABLE: &str = "VOLUNTEERS_TABLE_NAME";
pub const ENV_ERRORS_TABLE: &str = "ERRORS_TABLE_NAME";
pub const ENV_REQUESTS_VIEW: &str = "REQUESTS_VIEW_NAME";
pub const ENV_VOLUNTEERS_VIEW: &str = "VOLUNTEERS_VIEW_NAME";

const DEFAULT_REQUESTS_TABLE: &str = "Requests";
const DEFAULT_VOLUNTEERS_TABLE: &str = "Volunteers";
const DEFAULT_ERRORS_TABLE: &str = "Errors";
const DEFAULT_VIEW: &str = "Grid view";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Empty(&'static str),
    InvalidDocument(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing configuration value `{key}`"),
            Self::Empty(key) => write!(f, "configuration value `{key}` must not be blank"),
            Self::InvalidDocument(message) => write!(f, "invalid configuration document: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Dispatch area and store naming used by every service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    pub dispatch_city: String,
    pub dispatch_state: String,
    #[serde(default = "default_requests_table")]
    pub requests_table: String,
    #[serde(default = "default_volunteers_table")]
    pub volunteers_table: String,
    #[serde(default = "default_errors_table")]
    pub errors_table: String,
    #[serde(default = "default_view")]
    pub requests_view: String,
    #[serde(default = "default_view")]
    pub volunteers_view: String,
}

impl DispatchConfig {
    /// Config with the given dispatch area and default table/view names.
    pub fn new(dispatch_city: &str, dispatch_state: &str) -> ConfigResult<Self> {
        Self {
            dispatch_city: dispatch_city.to_string(),
            dispatch_state: dispatch_state.to_string(),
            requests_table: default_requests_table(),
            volunteers_table: default_volunteers_table(),
            errors_table: default_errors_table(),
            requests_view: default_view(),
            volunteers_view: default_view(),
        }
        .normalized()
    }

    /// Parses a JSON configuration document.
    pub fn from_json_str(document: &str) -> ConfigResult<Self> {
        let parsed: Self = serde_json::from_str(document)
            .map_err(|err| ConfigError::InvalidDocument(err.to_string()))?;
        parsed.normalized()
    }

    /// Reads configuration from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            dispatch_city: required(ENV_DISPATCH_CITY)?,
            dispatch_state: required(ENV_DISPATCH_STATE)?,
            requests_table: optional(ENV_REQUESTS_TABLE, DEFAULT_REQUESTS_TABLE),
            volunteers_table: optional(ENV_VOLUNTEERS_TABLE, DEFAULT_VOLUNTEERS_TABLE),
            errors_table: optional(ENV_ERRORS_TABLE, DEFAULT_ERRORS_TABLE),
            requests_view: optional(ENV_REQUESTS_VIEW, DEFAULT_VIEW),
            volunteers_view: optional(ENV_VOLUNTEERS_VIEW, DEFAULT_VIEW),
        }
        .normalized()
    }

    /// Street plus dispatch city and state, e.g. `12 Elm St Boston, MA`.
    pub fn full_address(&self, street: &str) -> String {
        format!("{street} {}, {}", self.dispatch_city, self.dispatch_state)
    }

    fn normalized(self) -> ConfigResult<Self> {
        Ok(Self {
            dispatch_city: non_blank(self.dispatch_city, ENV_DISPATCH_CITY)?,
            dispatch_state: non_blank(self.dispatch_state, ENV_DISPATCH_STATE)?,
            requests_table: non_blank(self.requests_table, ENV_REQUESTS_TABLE)?,
            volunteers_table: non_blank(self.volunteers_table, ENV_VOLUNTEERS_TABLE)?,
            errors_table: non_blank(self.errors_table, ENV_ERRORS_TABLE)?,
            requests_view: non_blank(self.requests_view, ENV_REQUESTS_VIEW)?,
            volunteers_view: non_blank(self.volunteers_view, ENV_VOLUNTEERS_VIEW)?,
        })
    }
}

fn non_blank(value: String, key: &'static str) -> ConfigResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty(key));
    }
    Ok(trimmed.to_string())
}

fn default_requests_table() -> String {
    DEFAULT_REQUESTS_TABLE.to_string()
}

fn default_volunteers_table() -> String {
    DEFAULT_VOLUNTEERS_TABLE.to_string()
}

fn default_errors_table() -> String {
    DEFAULT_ERRORS_TABLE.to_string()
}

fn default_view() -> String {
    DEFAULT_VIEW.to_string()
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DispatchConfig};
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn lookup_applies_defaults_and_trims() {
        let config = DispatchConfig::from_lookup(lookup(&[
            ("VOLUNTEER_DISPATCH_CITY", " Somerville "),
            ("VOLUNTEER_DISPATCH_STATE", "MA"),
        ]))
        .expect("config should load");
        assert_eq!(config.dispatch_city, "Somerville");
        assert_eq!(config.requests_table, "Requests");
        assert_eq!(config.volunteers_view, "Grid view");
        assert_eq!(config.full_address("1 Main St"), "1 Main St Somerville, MA");
    }

    #[test]
    fn lookup_requires_city_and_rejects_blank_state() {
        let missing = DispatchConfig::from_lookup(lookup(&[("VOLUNTEER_DISPATCH_STATE", "MA")]));
        assert_eq!(missing, Err(ConfigError::Missing("VOLUNTEER_DISPATCH_CITY")));

        let blank = DispatchConfig::from_lookup(lookup(&[
            ("VOLUNTEER_DISPATCH_CITY", "Somerville"),
            ("VOLUNTEER_DISPATCH_STATE", "  "),
        ]));
        assert_eq!(blank, Err(ConfigError::Empty("VOLUNTEER_DISPATCH_STATE")));
    }

    #[test]
    fn json_document_rejects_unknown_keys() {
        let config = DispatchConfig::from_json_str(
            r#"{ "dispatch_city": "Somerville", "dispatch_state": "MA", "errors_table": "Audit" }"#,
        )
        .expect("json config should load");
        assert_eq!(config.errors_table, "Audit");

        let err = DispatchConfig::from_json_str(
            r#"{ "dispatch_city": "Somerville", "dispatch_state": "MA", "city": "x" }"#,
        )
        .expect_err("unknown key must fail");
        assert!(matches!(err, ConfigError::InvalidDocument(_)));
    }
}
