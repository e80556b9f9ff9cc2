//! Flatten a nested YAML document into dotted key-value pairs.
//!
//! `{database: {url: "pg://", pool: [1, 2]}}` becomes
//! `{"database.url": "pg://", "database.pool": [1, 2]}`.
//!
//! Only mappings are descended into. Sequences and scalars are leaves, so
//! `database.pool[0]` is never a flat key; indexed access goes through the
//! path engine on the nested document instead. Non-string keys are rendered
//! with [`key_to_string`]. There is no escaping: a literal key `"a.b"` and a
//! nested `a: {b: ..}` produce the same flat key, and the one later in the
//! document wins.

use std::collections::BTreeMap;

use serde_yaml::Value;
use tracing::warn;

use crate::error::ConfigError;
use crate::format::key_to_string;

/// Flatten `doc` into a sorted map of dotted keys to leaf values.
///
/// A document that is not a mapping flattens to an empty map. Empty nested
/// mappings contribute no entries.
pub fn flatten(doc: &Value) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    if let Value::Mapping(map) = untag(doc) {
        flatten_into("", map, &mut out);
    }
    out
}

fn flatten_into(prefix: &str, map: &serde_yaml::Mapping, out: &mut BTreeMap<String, Value>) {
    for (key, value) in map {
        let key = key_to_string(key);
        let full = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };

        match untag(value) {
            Value::Mapping(nested) => flatten_into(&full, nested, out),
            _ => {
                if out.insert(full.clone(), value.clone()).is_some() {
                    warn!(key = %full, "duplicate flat key, keeping the later value");
                }
            }
        }
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

/// Reject documents that look like `KEY=VALUE` lines pasted into YAML.
///
/// A line such as `env=MY_VAR=foo` parses as a plain top-level string, and
/// `env: MY_VAR=foo` as a top-level key with a string value containing `=`.
/// Either way a top-level (dot-free) key holding a string with `=` is
/// reported. Keys are checked in sorted order, so the reported key is stable.
pub fn check_syntax(values: &BTreeMap<String, Value>) -> Result<(), ConfigError> {
    for (key, value) in values {
        if key.contains('.') {
            continue;
        }
        if let Value::String(s) = untag(value)
            && s.contains('=')
        {
            return Err(ConfigError::SyntaxGuard { key: key.clone() });
        }
    }
    Ok(())
}
