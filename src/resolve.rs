//! Binding resolution against an external project record.
//!
//! A record is a flat-ish string-keyed map with heterogeneous values:
//! strings, numbers, booleans, nulls, nested objects, arrays. Resolution
//! pattern-matches that union explicitly; nothing here relies on a value
//! being any particular shape.

use serde_json::{Map, Value};

use crate::model::{Field, Template};

/// The external project record: read-only, possibly absent, not owned by
/// the engine.
pub type ExternalRecord = Map<String, Value>;

/// Resolve a field's display value from a record.
///
/// - no record selected → `None`: the current value is left unchanged;
/// - the bound key is missing → `Some("")`: switching a binding or a source
///   record always re-evaluates, so a miss clears rather than keeps;
/// - otherwise the looked-up value's display rendering.
pub fn resolve(field: &Field, record: Option<&ExternalRecord>) -> Option<String> {
    let record = record?;
    Some(match record.get(&field.variable_name) {
        None => String::new(),
        Some(value) => display_value(value),
    })
}

/// The textual rendering of one record value.
///
/// Objects carrying a `name` property display as that name; null displays
/// as empty; any other object or array renders as multi-line pretty JSON;
/// primitives stringify.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => match map.get("name") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => display_value(other),
            None => serde_json::to_string_pretty(value).unwrap_or_default(),
        },
        Value::Array(_) => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

impl Template {
    /// Re-resolve every field whose name the record actually carries;
    /// fields bound to keys the record doesn't have keep their value. This
    /// is the "switch source project" operation.
    pub fn apply_record(&mut self, record: &ExternalRecord) {
        for field in &mut self.text_areas {
            if let Some(value) = record.get(&field.variable_name) {
                field.value = display_value(value);
            }
        }
    }
}
