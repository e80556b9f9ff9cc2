//! Tree walker: read and write dynamic trees by path.
//!
//! Reads are pure and strict. Every step must find the container kind the
//! accessor asks for, and a missing field, a short sequence and a wrong kind
//! are reported as distinct errors.
//!
//! Writes are total. Once the path has parsed, no tree shape can make a write
//! fail:
//!
//! - a `Field` step on anything but a mapping **replaces that node** with a
//!   fresh mapping;
//! - an `Index` step on anything but a sequence **replaces that node** with a
//!   fresh sequence of `index + 1` nulls;
//! - an `Index` step past the end of a sequence widens it, padding with null.
//!
//! Replacing a node discards whatever it held. Writing `a[1]` into
//! `{a: {b: initial}}` yields `{a: [null, value]}` and the old `b` is gone.
//! Callers that need the old data must check the shape first.

use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{GrammarError, PathError};
use crate::node::{Kind, Node};
use crate::path::{self, Accessor, PropertyPath};

/// Look up the value at `path`.
///
/// ```
/// use propcfg::get_property_by_path;
/// let data = serde_json::json!({"a": {"b": [{"c": "value"}]}});
/// let v = get_property_by_path(&data, "a.b[0].c").unwrap();
/// assert_eq!(v, "value");
/// ```
pub fn get_property_by_path<'a, N: Node>(data: &'a N, path: &str) -> Result<&'a N, PathError> {
    PropertyPath::parse(path)?.get(data)
}

/// Look up the value at `path` and deserialize it into `T`.
///
/// The conversion is strict: a string is never turned into a number or a
/// boolean, so this doubles as a runtime type assertion.
pub fn get_typed_property_by_path<T, N>(data: &N, path: &str) -> Result<T, PathError>
where
    T: DeserializeOwned,
    N: Node + for<'de> serde::Deserializer<'de>,
{
    PropertyPath::parse(path)?.get_as(data)
}

/// Write `value` at `path` and return the new root.
///
/// The root is returned because it may itself be replaced: setting `"[0]"` on
/// a mapping yields a sequence.
pub fn set_property_by_path<N: Node>(data: N, path: &str, value: N) -> Result<N, GrammarError> {
    Ok(PropertyPath::parse(path)?.set(data, value))
}

/// In-place variant of [`set_property_by_path`]. `data` is untouched when the
/// path does not parse.
pub fn set_property<N: Node>(data: &mut N, path: &str, value: N) -> Result<(), GrammarError> {
    let path = PropertyPath::parse(path)?;
    let root = std::mem::replace(data, N::null());
    *data = path.set(root, value);
    Ok(())
}

pub(crate) fn get<'a, N: Node>(data: &'a N, accessors: &[Accessor]) -> Result<&'a N, PathError> {
    let mut current = data;

    for (depth, accessor) in accessors.iter().enumerate() {
        let node = current.untagged();
        current = match accessor {
            Accessor::Field(name) => {
                if node.kind() != Kind::Mapping {
                    return Err(mismatch(Kind::Mapping, node, &accessors[..depth]));
                }
                node.field(name)
                    .ok_or_else(|| PathError::PropertyNotFound { name: name.clone() })?
            }
            Accessor::Index(index) => {
                let items = node
                    .items()
                    .ok_or_else(|| mismatch(Kind::Sequence, node, &accessors[..depth]))?;
                items.get(*index).ok_or(PathError::IndexOutOfRange {
                    index: *index,
                    len: items.len(),
                })?
            }
        };
    }

    Ok(current)
}

fn mismatch<N: Node>(expected: Kind, found: &N, consumed: &[Accessor]) -> PathError {
    let at = if consumed.is_empty() {
        "<root>".to_string()
    } else {
        path::render(consumed)
    };
    PathError::KindMismatch {
        expected,
        found: found.kind(),
        at,
    }
}

pub(crate) fn set<N: Node>(current: N, accessors: &[Accessor], replacement: N) -> N {
    let Some((accessor, rest)) = accessors.split_first() else {
        return replacement;
    };

    let current = current.into_untagged();

    match accessor {
        Accessor::Field(name) => {
            let mut current = if current.kind() == Kind::Mapping {
                current
            } else {
                trace!(field = %name, found = %current.kind(), "replacing node with a mapping");
                N::empty_mapping()
            };

            match current.field_mut(name) {
                Some(slot) => {
                    let child = std::mem::replace(slot, N::null());
                    *slot = set(child, rest, replacement);
                }
                None => {
                    let child = set(N::empty_mapping(), rest, replacement);
                    current.insert_field(name, child);
                }
            }
            current
        }
        Accessor::Index(index) => {
            let index = *index;
            let found = current.kind();
            let mut items = match current.into_items() {
                Some(items) => items,
                None => {
                    trace!(index, %found, "replacing node with a sequence");
                    Vec::new()
                }
            };

            if items.len() <= index {
                trace!(from = items.len(), to = index + 1, "widening sequence");
                items.resize(index + 1, N::null());
            }

            let child = std::mem::replace(&mut items[index], N::null());
            items[index] = set(child, rest, replacement);
            N::from_items(items)
        }
    }
}

pub(crate) fn deserialize_node<T, N>(value: &N, path: impl FnOnce() -> String) -> Result<T, PathError>
where
    T: DeserializeOwned,
    N: Node + for<'de> serde::Deserializer<'de>,
{
    T::deserialize(value.clone().into_untagged()).map_err(|e| PathError::TypeMismatch {
        path: path(),
        expected: std::any::type_name::<T>(),
        reason: e.to_string(),
    })
}
