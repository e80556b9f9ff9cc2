//! The config facade: one YAML document, flattened and queryable.
//!
//! Loading goes file bytes → [`serde_yaml::Value`] → [`flatten`] → [`Config`].
//! The nested document is kept alongside the flat map, so both access styles
//! work on the same data:
//!
//! - [`Config::get`] / [`Config::get_all`]: exact dotted keys on the flat map.
//!   Sequences are leaves here, so `nodes[0]` is not a flat key.
//! - [`Config::query`] / [`Config::query_as`]: the path engine on the nested
//!   document, including indices (`nodes[0].id`).
//!
//! Three derived maps are materialized at load time from the top-level
//! `env`, `secrets` and `inputs` subtrees, with values stringified.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::debug;

use crate::error::{ConfigError, PathError};
use crate::file;
use crate::flatten;
use crate::format::format_value;
use crate::node::{Kind, Node};
use crate::path::PropertyPath;

/// A loaded configuration document. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    path: PathBuf,
    document: Value,
    values: BTreeMap<String, Value>,
    env: BTreeMap<String, String>,
    secrets: BTreeMap<String, String>,
    inputs: BTreeMap<String, String>,
}

/// Load the YAML config at `path`. A missing file yields an empty config.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    Config::load(path)
}

impl Config {
    /// An empty config remembering where it would have come from.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: Value::Null,
            values: BTreeMap::new(),
            env: BTreeMap::new(),
            secrets: BTreeMap::new(),
            inputs: BTreeMap::new(),
        }
    }

    /// Read and parse `path`. A missing file yields an empty config; any other
    /// I/O or parse failure is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match file::read_optional(path)? {
            Some(content) => Self::from_yaml_str(&content, path),
            None => {
                debug!(path = %path.display(), "config file missing, using empty config");
                Ok(Self::empty(path))
            }
        }
    }

    /// Build a config from YAML text. No I/O; `path` is informational and is
    /// used in error messages and as the write target for `set`.
    pub fn from_yaml_str(content: &str, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let document: Value =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;

        match document.kind() {
            Kind::Null => return Ok(Self::empty(path)),
            Kind::Mapping => {}
            found => return Err(ConfigError::NotAMapping { path, found }),
        }

        let values = flatten::flatten(&document);
        flatten::check_syntax(&values)?;
        debug!(path = %path.display(), keys = values.len(), "loaded config");

        let mut config = Self {
            path,
            document,
            values,
            env: BTreeMap::new(),
            secrets: BTreeMap::new(),
            inputs: BTreeMap::new(),
        };
        config.env = config.string_map("env");
        config.secrets = config.string_map("secrets");
        config.inputs = config.string_map("inputs");
        Ok(config)
    }

    /// The flat value at `key`, stringified. Empty string if absent.
    pub fn get(&self, key: &str) -> String {
        self.values.get(key).map(format_value).unwrap_or_default()
    }

    /// All flat entries under `prefix`, with the `prefix.` part stripped.
    ///
    /// An entry whose key equals `prefix` exactly is included under its own
    /// key.
    pub fn get_all(&self, prefix: &str) -> BTreeMap<String, Value> {
        let needle = format!("{prefix}.");
        self.values
            .iter()
            .filter_map(|(key, value)| {
                if key == prefix {
                    Some((key.clone(), value.clone()))
                } else {
                    key.strip_prefix(&needle)
                        .map(|rest| (rest.to_string(), value.clone()))
                }
            })
            .collect()
    }

    /// The raw flat value at `key`.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The full flat map, sorted by key.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// The nested document as parsed. Null for an empty config.
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read `path` from the nested document.
    pub fn query(&self, path: &str) -> Result<&Value, PathError> {
        PropertyPath::parse(path)?.get(&self.document)
    }

    /// Read `path` from the nested document and deserialize it into `T`.
    pub fn query_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, PathError> {
        PropertyPath::parse(path)?.get_as(&self.document)
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn secrets(&self) -> &BTreeMap<String, String> {
        &self.secrets
    }

    pub fn inputs(&self) -> &BTreeMap<String, String> {
        &self.inputs
    }

    fn string_map(&self, prefix: &str) -> BTreeMap<String, String> {
        self.get_all(prefix)
            .into_iter()
            .filter(|(_, value)| value.kind() != Kind::Null)
            .map(|(key, value)| (key, format_value(&value)))
            .collect()
    }
}
