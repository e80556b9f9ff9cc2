//! Path grammar: turn `"a.b[0][1].c"` into a chain of accessors.
//!
//! ```text
//! path    := part ( '.' part )*
//! part    := ident? ( '[' integer ']' )*
//! ident   := any character sequence not containing '.' or '['
//! integer := one or more decimal digits
//! ```
//!
//! Each part contributes one [`Accessor::Field`] for its ident (when present),
//! followed by one [`Accessor::Index`] per bracket, left to right. Parsing is
//! stricter than "find all brackets": text after a bracket, an unclosed
//! bracket, and empty parts (`a..b`) are all rejected.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::{GrammarError, PathError};
use crate::node::Node;
use crate::walk;

/// Upper bound for each index in a path, checked per index.
///
/// Every `Index` step of a write may widen one sequence to `MAX_INDEX + 1`
/// cells, so a path with `n` indices can still allocate `n` such sequences.
pub const MAX_INDEX: usize = 1 << 20;

static PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\[]*)((?:\[[^\]]*\])*)$").expect("path part regex"));

static INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]").expect("index regex"));

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Accessor {
    /// Named lookup on a mapping.
    Field(String),
    /// Positional lookup on a sequence.
    Index(usize),
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(name) => f.write_str(name),
            Accessor::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// A parsed path. Parse once, apply to many trees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    accessors: Vec<Accessor>,
}

impl PropertyPath {
    pub fn parse(path: &str) -> Result<Self, GrammarError> {
        if path.is_empty() {
            return Err(GrammarError::EmptyPath);
        }

        let mut accessors = Vec::new();
        for part in path.split('.') {
            if part.is_empty() {
                return Err(GrammarError::EmptySegment { path: path.into() });
            }
            parse_part(part, &mut accessors)?;
        }

        Ok(Self { accessors })
    }

    pub fn accessors(&self) -> &[Accessor] {
        &self.accessors
    }

    /// Read the value this path points at. See [`get_property_by_path`](crate::get_property_by_path).
    pub fn get<'a, N: Node>(&self, data: &'a N) -> Result<&'a N, PathError> {
        walk::get(data, &self.accessors)
    }

    /// Read and deserialize the value this path points at.
    pub fn get_as<T, N>(&self, data: &N) -> Result<T, PathError>
    where
        T: DeserializeOwned,
        N: Node + for<'de> serde::Deserializer<'de>,
    {
        let value = self.get(data)?;
        walk::deserialize_node(value, || self.to_string())
    }

    /// Write `value` at this path, growing or reshaping `data` as needed.
    /// Returns the new root.
    pub fn set<N: Node>(&self, data: N, value: N) -> N {
        walk::set(data, &self.accessors, value)
    }
}

impl FromStr for PropertyPath {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.accessors))
    }
}

/// Render an accessor chain back into path syntax.
pub(crate) fn render(accessors: &[Accessor]) -> String {
    let mut out = String::new();
    for accessor in accessors {
        match accessor {
            Accessor::Field(name) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            Accessor::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
        }
    }
    out
}

fn parse_part(part: &str, out: &mut Vec<Accessor>) -> Result<(), GrammarError> {
    let caps = PART
        .captures(part)
        .ok_or_else(|| GrammarError::MalformedPart { part: part.into() })?;

    let key = caps.get(1).map_or("", |m| m.as_str());
    if !key.is_empty() {
        out.push(Accessor::Field(key.to_string()));
    }

    let brackets = caps.get(2).map_or("", |m| m.as_str());
    for index in INDEX.captures_iter(brackets) {
        let raw = index.get(1).map_or("", |m| m.as_str());
        out.push(Accessor::Index(parse_index(part, raw)?));
    }

    Ok(())
}

fn parse_index(part: &str, raw: &str) -> Result<usize, GrammarError> {
    if raw.is_empty() {
        return Err(GrammarError::EmptyIndex { part: part.into() });
    }
    let invalid = || GrammarError::InvalidIndex {
        part: part.into(),
        index: raw.into(),
    };
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let index: usize = raw.parse().map_err(|_| invalid())?;
    if index > MAX_INDEX {
        return Err(GrammarError::IndexTooLarge {
            part: part.into(),
            index,
            max: MAX_INDEX,
        });
    }
    Ok(index)
}
