//! Raw source rows, exactly as exported.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One raw, heterogeneous source row.
///
/// Field presence and types are not guaranteed: the same column may arrive
/// as a string in one export and as a number or bool in another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set a field.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    /// Raw value of a field, treating JSON `null` as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// First present field among `fields`.
    pub fn first_of(&self, fields: &[&str]) -> Option<&Value> {
        fields.iter().find_map(|f| self.get(f))
    }

    /// Field rendered as trimmed text; absent fields give an empty string.
    pub fn text(&self, field: &str) -> String {
        self.get(field).map(value_to_text).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Render a JSON scalar as trimmed text.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}
