//! The dynamic tree seam.
//!
//! The walker never looks at a concrete value type. It talks to a [`Node`],
//! which exposes just enough of a scalar / mapping / sequence sum to read a
//! field or an index, and to build fresh containers on write.
//!
//! Two trees implement it:
//!
//! - [`serde_yaml::Value`]: what the config ingester produces. Its
//!   `Tagged` variant (`!secret foo`) is unwrapped transparently.
//! - [`serde_json::Value`]: for callers holding JSON documents.

use std::fmt;

use crate::format;

/// The shape of a node, as far as path traversal is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Sequence => "sequence",
            Kind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

/// A value in a dynamic tree of unknown shape.
///
/// Field methods are only meaningful on mappings and item methods only on
/// sequences; on any other kind they report absence (`None`) or do nothing.
/// Callers are expected to check [`kind`](Node::kind) on the
/// [`untagged`](Node::untagged) node first.
pub trait Node: Clone + Sized {
    fn null() -> Self;

    fn empty_mapping() -> Self;

    fn from_items(items: Vec<Self>) -> Self;

    /// Kind of the node after stripping any tag wrapper.
    fn kind(&self) -> Kind;

    /// Borrow the underlying value of a tagged node. Untagged nodes return themselves.
    fn untagged(&self) -> &Self {
        self
    }

    fn into_untagged(self) -> Self {
        self
    }

    fn field(&self, name: &str) -> Option<&Self>;

    fn field_mut(&mut self, name: &str) -> Option<&mut Self>;

    /// Insert or replace `name`. No-op unless the node is a mapping.
    fn insert_field(&mut self, name: &str, value: Self);

    fn items(&self) -> Option<&[Self]>;

    /// Take the sequence out of the node, or `None` if it is not a sequence.
    fn into_items(self) -> Option<Vec<Self>>;
}

impl Node for serde_yaml::Value {
    fn null() -> Self {
        serde_yaml::Value::Null
    }

    fn empty_mapping() -> Self {
        serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
    }

    fn from_items(items: Vec<Self>) -> Self {
        serde_yaml::Value::Sequence(items)
    }

    fn kind(&self) -> Kind {
        use serde_yaml::Value as Y;
        match self {
            Y::Null => Kind::Null,
            Y::Bool(_) => Kind::Bool,
            Y::Number(_) => Kind::Number,
            Y::String(_) => Kind::String,
            Y::Sequence(_) => Kind::Sequence,
            Y::Mapping(_) => Kind::Mapping,
            Y::Tagged(tagged) => tagged.value.kind(),
        }
    }

    fn untagged(&self) -> &Self {
        let mut current = self;
        while let serde_yaml::Value::Tagged(tagged) = current {
            current = &tagged.value;
        }
        current
    }

    fn into_untagged(self) -> Self {
        match self {
            serde_yaml::Value::Tagged(tagged) => tagged.value.into_untagged(),
            other => other,
        }
    }

    fn field(&self, name: &str) -> Option<&Self> {
        let serde_yaml::Value::Mapping(map) = self.untagged() else {
            return None;
        };
        if let Some(value) = map.get(name) {
            return Some(value);
        }
        // Non-string keys are addressed by their rendered form.
        map.iter()
            .find(|(key, _)| !key.is_string() && format::key_to_string(key) == name)
            .map(|(_, value)| value)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Self> {
        let serde_yaml::Value::Mapping(map) = untagged_mut(self) else {
            return None;
        };
        if map.contains_key(name) {
            return map.get_mut(name);
        }
        map.iter_mut()
            .find(|(key, _)| !key.is_string() && format::key_to_string(key) == name)
            .map(|(_, value)| value)
    }

    fn insert_field(&mut self, name: &str, value: Self) {
        if let serde_yaml::Value::Mapping(map) = untagged_mut(self) {
            map.insert(serde_yaml::Value::String(name.to_string()), value);
        }
    }

    fn items(&self) -> Option<&[Self]> {
        match self.untagged() {
            serde_yaml::Value::Sequence(seq) => Some(seq.as_slice()),
            _ => None,
        }
    }

    fn into_items(self) -> Option<Vec<Self>> {
        match self.into_untagged() {
            serde_yaml::Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }
}

fn untagged_mut(value: &mut serde_yaml::Value) -> &mut serde_yaml::Value {
    match value {
        serde_yaml::Value::Tagged(tagged) => untagged_mut(&mut tagged.value),
        other => other,
    }
}

impl Node for serde_json::Value {
    fn null() -> Self {
        serde_json::Value::Null
    }

    fn empty_mapping() -> Self {
        serde_json::Value::Object(serde_json::Map::new())
    }

    fn from_items(items: Vec<Self>) -> Self {
        serde_json::Value::Array(items)
    }

    fn kind(&self) -> Kind {
        use serde_json::Value as J;
        match self {
            J::Null => Kind::Null,
            J::Bool(_) => Kind::Bool,
            J::Number(_) => Kind::Number,
            J::String(_) => Kind::String,
            J::Array(_) => Kind::Sequence,
            J::Object(_) => Kind::Mapping,
        }
    }

    fn field(&self, name: &str) -> Option<&Self> {
        self.as_object()?.get(name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Self> {
        self.as_object_mut()?.get_mut(name)
    }

    fn insert_field(&mut self, name: &str, value: Self) {
        if let Some(map) = self.as_object_mut() {
            map.insert(name.to_string(), value);
        }
    }

    fn items(&self) -> Option<&[Self]> {
        self.as_array().map(Vec::as_slice)
    }

    fn into_items(self) -> Option<Vec<Self>> {
        match self {
            serde_json::Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn yaml_kinds() {
        assert_eq!(yaml("~").kind(), Kind::Null);
        assert_eq!(yaml("true").kind(), Kind::Bool);
        assert_eq!(yaml("1.5").kind(), Kind::Number);
        assert_eq!(yaml("hello").kind(), Kind::String);
        assert_eq!(yaml("[1, 2]").kind(), Kind::Sequence);
        assert_eq!(yaml("{a: 1}").kind(), Kind::Mapping);
    }

    #[test]
    fn tagged_value_reports_inner_kind() {
        let v = yaml("!secret {token: abc}");
        assert!(matches!(v, Value::Tagged(_)));
        assert_eq!(v.kind(), Kind::Mapping);
        assert_eq!(v.field("token"), Some(&Value::String("abc".into())));
    }

    #[test]
    fn into_untagged_strips_tag() {
        let v = yaml("!list [1, 2]");
        let items = v.into_items().unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn non_string_key_is_found_by_rendered_name() {
        let v = yaml("{1: one, true: yes-value}");
        assert_eq!(v.field("1"), Some(&Value::String("one".into())));
        assert_eq!(v.field("true"), Some(&Value::String("yes-value".into())));
    }

    #[test]
    fn string_key_wins_over_rendered_key() {
        let v = yaml("{1: number, '1': string}");
        assert_eq!(v.field("1"), Some(&Value::String("string".into())));
    }

    #[test]
    fn field_on_scalar_is_none() {
        let v = yaml("plain");
        assert!(v.field("a").is_none());
        assert!(v.items().is_none());
    }

    #[test]
    fn insert_field_on_non_mapping_is_noop() {
        let mut v = yaml("plain");
        v.insert_field("a", Value::Null);
        assert_eq!(v, Value::String("plain".into()));
    }

    #[test]
    fn json_kinds_and_fields() {
        let mut v = serde_json::json!({"a": [1, 2], "b": {"c": null}});
        assert_eq!(v.kind(), Kind::Mapping);
        assert_eq!(v.field("a").unwrap().items().unwrap().len(), 2);
        assert_eq!(v.field("b").unwrap().field("c").unwrap().kind(), Kind::Null);
        v.insert_field("d", serde_json::json!("x"));
        assert_eq!(v["d"], "x");
    }

    #[test]
    fn kind_display() {
        assert_eq!(Kind::Mapping.to_string(), "mapping");
        assert_eq!(Kind::Sequence.to_string(), "sequence");
        assert_eq!(Kind::Bool.to_string(), "boolean");
    }
}
