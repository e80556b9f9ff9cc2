use std::path::PathBuf;
use thiserror::Error;

use crate::node::Kind;

/// A path string that does not match the path grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("path cannot be empty")]
    EmptyPath,

    #[error("empty segment in path '{path}'")]
    EmptySegment { path: String },

    #[error("empty array index in '{part}'")]
    EmptyIndex { part: String },

    #[error("invalid array index '{index}' in '{part}'")]
    InvalidIndex { part: String, index: String },

    #[error("array index {index} in '{part}' exceeds the maximum of {max}")]
    IndexTooLarge {
        part: String,
        index: usize,
        max: usize,
    },

    #[error("malformed array notation in '{part}'")]
    MalformedPart { part: String },
}

/// Failure while reading a value out of a dynamic tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("key not found: {name}")]
    PropertyNotFound { name: String },

    #[error("index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("expected {expected} at '{at}', found {found}")]
    KindMismatch {
        expected: Kind,
        found: Kind,
        at: String,
    },

    #[error("cannot convert value at '{path}' to {expected}: {reason}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        reason: String,
    },
}

impl PathError {
    /// True when a mapping along the path was missing the requested field.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PathError::PropertyNotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize {path}: {source}")]
    SerializeError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Top level of {path} must be a mapping, found {found}")]
    NotAMapping { path: PathBuf, found: Kind },

    #[error("incorrect syntax, use ':' instead of '=' in key '{key}'")]
    SyntaxGuard { key: String },

    #[error(
        "file {} appears to be a YAML file, but an .env file is required (KEY=VALUE format)",
        path.display()
    )]
    StructuredEnvFile { path: PathBuf },

    #[error("Failed to parse env file {path}: {source}")]
    EnvFileParse {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),
}
