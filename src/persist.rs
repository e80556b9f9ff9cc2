//! Config persistence: write one value into a YAML file by path.
//!
//! The document is parsed, patched through the path engine and serialized
//! again, so the usual write semantics apply: intermediate mappings and
//! sequences are created or replaced as the path demands. Comments and
//! formatting of the original file are not preserved. Creates parent
//! directories as needed.

use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::ConfigError;
use crate::file;
use crate::node::{Kind, Node};
use crate::ops::ConfigResult;
use crate::path::PropertyPath;

/// Pure function: patch a YAML document string, setting `path` to `raw_value`.
///
/// If `content` is `None` (file doesn't exist yet), starts from an empty
/// document. `file_path` is only used in error messages.
///
/// Returns the modified document string.
pub fn set_in_document(
    content: Option<&str>,
    path: &str,
    raw_value: &str,
    file_path: &Path,
) -> Result<String, ConfigError> {
    let property = PropertyPath::parse(path)?;

    let doc: Value = match content {
        Some(c) => serde_yaml::from_str(c).map_err(|e| ConfigError::ParseError {
            path: file_path.to_path_buf(),
            source: e,
        })?,
        None => Value::Null,
    };
    let doc = if doc.kind() == Kind::Null {
        Value::empty_mapping()
    } else {
        doc
    };

    let doc = property.set(doc, parse_value(raw_value));

    let out = serde_yaml::to_string(&doc).map_err(|e| ConfigError::SerializeError {
        path: file_path.to_path_buf(),
        source: e,
    })?;

    // Nothing is written that the next load would reject.
    Config::from_yaml_str(&out, file_path)?;
    Ok(out)
}

/// I/O wrapper: reads the file (if it exists), patches it, writes it back.
pub fn persist_value(
    file_path: &Path,
    path: &str,
    value: &str,
) -> Result<ConfigResult, ConfigError> {
    let content = file::read_optional(file_path)?;
    let new_content = set_in_document(content.as_deref(), path, value, file_path)?;
    file::write(file_path, &new_content)?;
    debug!(file = %file_path.display(), %path, "persisted value");

    Ok(ConfigResult::ValueSet {
        path: path.into(),
        value: value.into(),
    })
}

/// Parse a raw string value into a YAML value with type heuristics.
/// Tries: bool → integer → float → string.
pub(crate) fn parse_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Number(i.into());
    }
    // Only use float if the string actually contains a dot,
    // to avoid "NaN" / "inf" being parsed as float.
    if s.contains('.')
        && let Ok(f) = s.parse::<f64>()
    {
        return Value::Number(f.into());
    }
    Value::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrammarError;
    use std::fs;
    use tempfile::TempDir;

    fn set(content: Option<&str>, path: &str, value: &str) -> Value {
        let out = set_in_document(content, path, value, Path::new("test.yaml")).unwrap();
        serde_yaml::from_str(&out).unwrap()
    }

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn set_existing_key() {
        let out = set(Some("port: 8080\nhost: localhost\n"), "port", "3000");
        assert_eq!(out, yaml("port: 3000\nhost: localhost\n"));
    }

    #[test]
    fn set_nested_key() {
        let out = set(Some("database:\n  pool_size: 5\n"), "database.pool_size", "20");
        assert_eq!(out, yaml("database:\n  pool_size: 20\n"));
    }

    #[test]
    fn set_indexed_path() {
        let out = set(Some("nodes:\n  - id: a\n"), "nodes[1].id", "b");
        assert_eq!(out, yaml("nodes:\n  - id: a\n  - id: b\n"));
    }

    #[test]
    fn set_new_key_in_existing_file() {
        let out = set(Some("port: 8080\n"), "debug", "true");
        assert_eq!(out, yaml("port: 8080\ndebug: true\n"));
    }

    #[test]
    fn set_creates_document_when_none() {
        assert_eq!(set(None, "env.MODE", "prod"), yaml("env:\n  MODE: prod\n"));
    }

    #[test]
    fn set_into_empty_file() {
        assert_eq!(set(Some(""), "a", "1"), yaml("a: 1\n"));
    }

    #[test]
    fn top_level_index_rejected() {
        let err = set_in_document(Some("a: 1\n"), "[0]", "x", Path::new("t.yaml")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotAMapping {
                found: Kind::Sequence,
                ..
            }
        ));
    }

    #[test]
    fn value_tripping_syntax_guard_rejected() {
        let err = set_in_document(Some("port: 8080\n"), "name", "A=1", Path::new("t.yaml"))
            .unwrap_err();
        match err {
            ConfigError::SyntaxGuard { key } => assert_eq!(key, "name"),
            other => panic!("Expected SyntaxGuard, got {other:?}"),
        }
    }

    #[test]
    fn nested_value_with_equals_is_allowed() {
        let out = set(Some("port: 8080\n"), "env.FLAGS", "A=1");
        assert_eq!(out, yaml("port: 8080\nenv:\n  FLAGS: A=1\n"));
    }

    #[test]
    fn bad_path_rejected() {
        let err = set_in_document(Some("a: 1\n"), "a[]", "x", Path::new("t.yaml")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Grammar(GrammarError::EmptyIndex { .. })
        ));
    }

    #[test]
    fn invalid_existing_yaml_rejected() {
        let err = set_in_document(Some("a: [\n"), "a", "x", Path::new("t.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn value_parsing() {
        assert_eq!(parse_value("42"), yaml("42"));
        assert_eq!(parse_value("-5"), yaml("-5"));
        assert_eq!(parse_value("TRUE"), Value::Bool(true));
        assert_eq!(parse_value("1.5"), yaml("1.5"));
        assert_eq!(parse_value("inf"), Value::String("inf".into()));
        assert_eq!(parse_value("hello"), Value::String("hello".into()));
    }

    #[test]
    fn persist_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        let result = persist_value(&path, "port", "3000").unwrap();
        assert!(matches!(result, ConfigResult::ValueSet { .. }));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(yaml(&content), yaml("port: 3000\n"));
    }

    #[test]
    fn persist_modifies_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "port: 8080\nname: app\n").unwrap();

        persist_value(&path, "port", "3000").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("8080"));
        assert_eq!(yaml(&content), yaml("port: 3000\nname: app\n"));
    }

    #[test]
    fn persist_leaves_file_alone_when_result_would_not_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.yaml");
        fs::write(&path, "port: 8080\n").unwrap();

        let err = persist_value(&path, "name", "A=1").unwrap_err();
        assert!(matches!(err, ConfigError::SyntaxGuard { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "port: 8080\n");
        assert_eq!(Config::load(&path).unwrap().get("port"), "8080");
    }

    #[test]
    fn persist_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("dir").join("config.yaml");

        persist_value(&path, "port", "3000").unwrap();
        assert!(path.exists());
    }
}
