//! Records — rows exchanged between the database port and the admin surface.

use serde_json::Value;

/// A row keyed by column name.
pub type Record = serde_json::Map<String, Value>;

/// Render a value as plain text for list cells, form inputs and CSV export.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Look up the textual primary key of a record.
#[must_use]
pub fn record_id(record: &Record, primary_key: &str) -> Option<String> {
    record
        .get(primary_key)
        .filter(|value| !value.is_null())
        .map(display_value)
}
