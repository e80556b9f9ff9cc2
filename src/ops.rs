//! Config operations: listing, key lookup, path queries, and result types.
//!
//! Provides the logic behind `config list`, `config get`, `config query` and
//! `config set`, and the `ConfigResult` enum that callers use to display
//! results.

use std::fmt;

use serde_yaml::Value;

use crate::config::Config;
use crate::error::ConfigError;
use crate::format::format_value;
use crate::node::{Kind, Node};
use crate::persist;
use crate::types::ConfigAction;

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// A flat key's value, stringified.
    KeyValue { key: String, value: String },
    /// Flat key-value pairs, sorted by key.
    Listing { entries: Vec<(String, String)> },
    /// The subtree found at a path in the nested document.
    Node { path: String, value: Value },
    /// Confirmation that a value was persisted.
    ValueSet { path: String, value: String },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::KeyValue { key, value } => write!(f, "{key} = {value}"),
            ConfigResult::Listing { entries } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                Ok(())
            }
            ConfigResult::Node { path, value } => match value.kind() {
                Kind::Sequence | Kind::Mapping => {
                    let yaml = serde_yaml::to_string(value).map_err(|_| fmt::Error)?;
                    write!(f, "{path}:\n{}", yaml.trim_end())
                }
                _ => write!(f, "{path} = {}", format_value(value)),
            },
            ConfigResult::ValueSet { path, value } => write!(f, "Set {path} = {value}"),
        }
    }
}

/// List flat values, optionally only the keys equal to or under `prefix`.
/// Keys keep their full dotted form.
pub fn list_values(config: &Config, prefix: Option<&str>) -> ConfigResult {
    let entries = config
        .values()
        .iter()
        .filter(|(key, _)| match prefix {
            Some(p) => key.as_str() == p || key.strip_prefix(p).is_some_and(|r| r.starts_with('.')),
            None => true,
        })
        .map(|(key, value)| (key.clone(), display_leaf(value)))
        .collect();

    ConfigResult::Listing { entries }
}

/// Get a flat value by exact dotted key.
pub fn get_value(config: &Config, key: &str) -> Result<ConfigResult, ConfigError> {
    let value = config
        .value(key)
        .ok_or_else(|| ConfigError::KeyNotFound(key.into()))?;

    Ok(ConfigResult::KeyValue {
        key: key.into(),
        value: display_leaf(value),
    })
}

/// Look up a path in the nested document.
pub fn query_value(config: &Config, path: &str) -> Result<ConfigResult, ConfigError> {
    let value = config.query(path)?;
    Ok(ConfigResult::Node {
        path: path.into(),
        value: value.clone(),
    })
}

fn display_leaf(value: &Value) -> String {
    if value.kind() == Kind::Null {
        "<not set>".to_string()
    } else {
        format_value(value)
    }
}

impl Config {
    /// Handle a `ConfigAction` against this config.
    ///
    /// `Set` writes to the file this config was loaded from; the in-memory
    /// config is left as it was, reload to observe the change.
    pub fn handle(&self, action: &ConfigAction) -> Result<ConfigResult, ConfigError> {
        match action {
            ConfigAction::List { prefix } => Ok(list_values(self, prefix.as_deref())),
            ConfigAction::Get { key } => get_value(self, key),
            ConfigAction::Query { path } => query_value(self, path),
            ConfigAction::Set { path, value } => persist::persist_value(self.path(), path, value),
        }
    }

    /// Handle a `ConfigAction` and print the result to stdout.
    pub fn handle_and_print(&self, action: &ConfigAction) -> Result<(), ConfigError> {
        let result = self.handle(action)?;
        println!("{result}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;
    use std::fs;
    use tempfile::TempDir;

    fn test_config() -> Config {
        Config::from_yaml_str(
            "host: localhost\nport: 8080\ndatabase:\n  url: ~\n  pool_size: 5\nnodes:\n  - id: a\n  - id: b\n",
            "test.yaml",
        )
        .unwrap()
    }

    #[test]
    fn get_flat_key() {
        match get_value(&test_config(), "port").unwrap() {
            ConfigResult::KeyValue { value, .. } => assert_eq!(value, "8080"),
            other => panic!("Expected KeyValue, got {other:?}"),
        }
    }

    #[test]
    fn get_nested_key() {
        match get_value(&test_config(), "database.pool_size").unwrap() {
            ConfigResult::KeyValue { value, .. } => assert_eq!(value, "5"),
            other => panic!("Expected KeyValue, got {other:?}"),
        }
    }

    #[test]
    fn get_nonexistent_key() {
        let result = get_value(&test_config(), "nonexistent");
        assert!(matches!(result, Err(ConfigError::KeyNotFound(_))));
    }

    #[test]
    fn get_does_not_index() {
        let result = get_value(&test_config(), "nodes[0].id");
        assert!(matches!(result, Err(ConfigError::KeyNotFound(_))));
    }

    #[test]
    fn query_indexes() {
        match query_value(&test_config(), "nodes[1].id").unwrap() {
            ConfigResult::Node { value, .. } => assert_eq!(value, Value::String("b".into())),
            other => panic!("Expected Node, got {other:?}"),
        }
    }

    #[test]
    fn query_missing_is_path_error() {
        let err = query_value(&test_config(), "nodes[5]").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Path(PathError::IndexOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn list_values_includes_all_keys() {
        match list_values(&test_config(), None) {
            ConfigResult::Listing { entries } => {
                let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(
                    keys,
                    vec!["database.pool_size", "database.url", "host", "nodes", "port"]
                );
            }
            other => panic!("Expected Listing, got {other:?}"),
        }
    }

    #[test]
    fn list_values_with_prefix() {
        match list_values(&test_config(), Some("database")) {
            ConfigResult::Listing { entries } => {
                assert_eq!(
                    entries,
                    vec![
                        ("database.pool_size".to_string(), "5".to_string()),
                        ("database.url".to_string(), "<not set>".to_string()),
                    ]
                );
            }
            other => panic!("Expected Listing, got {other:?}"),
        }
    }

    #[test]
    fn list_prefix_matches_whole_segments() {
        match list_values(&test_config(), Some("data")) {
            ConfigResult::Listing { entries } => assert!(entries.is_empty()),
            other => panic!("Expected Listing, got {other:?}"),
        }
    }

    #[test]
    fn listing_display_format() {
        let result = ConfigResult::Listing {
            entries: vec![
                ("host".into(), "localhost".into()),
                ("port".into(), "8080".into()),
            ],
        };
        assert_eq!(format!("{result}"), "host = localhost\nport = 8080");
    }

    #[test]
    fn node_display_scalar_and_subtree() {
        let scalar = ConfigResult::Node {
            path: "port".into(),
            value: serde_yaml::from_str("8080").unwrap(),
        };
        assert_eq!(scalar.to_string(), "port = 8080");

        let subtree = ConfigResult::Node {
            path: "db".into(),
            value: serde_yaml::from_str("{url: pg}").unwrap(),
        };
        assert_eq!(subtree.to_string(), "db:\nurl: pg");
    }

    #[test]
    fn handle_dispatches() {
        let config = test_config();
        assert!(matches!(
            config.handle(&ConfigAction::Get { key: "host".into() }),
            Ok(ConfigResult::KeyValue { .. })
        ));
        assert!(matches!(
            config.handle(&ConfigAction::Query {
                path: "nodes[0]".into()
            }),
            Ok(ConfigResult::Node { .. })
        ));
        assert!(matches!(
            config.handle(&ConfigAction::List { prefix: None }),
            Ok(ConfigResult::Listing { .. })
        ));
    }

    #[test]
    fn handle_set_writes_source_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.yaml");
        fs::write(&path, "port: 8080\n").unwrap();
        let config = Config::load(&path).unwrap();

        let result = config
            .handle(&ConfigAction::Set {
                path: "nodes[0].id".into(),
                value: "fetch".into(),
            })
            .unwrap();
        assert_eq!(result.to_string(), "Set nodes[0].id = fetch");

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.get("port"), "8080");
        assert_eq!(reloaded.query("nodes[0].id").unwrap(), &Value::String("fetch".into()));
    }
}
