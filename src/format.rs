use serde_yaml::Value;

/// Render a value the way it is shown to users and stored in the derived maps.
///
/// Strings are returned raw, numbers and booleans through `Display`, null as
/// the empty string. Sequences and mappings become compact JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => format_value(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

/// Render a mapping key as a flat-map key segment.
pub fn key_to_string(key: &Value) -> String {
    match key {
        Value::Null => "null".to_string(),
        other => format_value(other),
    }
}
