//! `.env` file ingestion.
//!
//! Parses `KEY=VALUE` lines with `dotenvy` and injects each key into an
//! [`Environment`] unless it is already defined there: the shell always wins
//! over the file. `$VAR` substitutions resolve through the same
//! [`Environment`], never the real process environment unless that is the
//! one passed in. Files that look like YAML are rejected up front, since a
//! config document passed where an env file was expected is a common mix-up.
//!
//! The real process environment is shared mutable state, so everything here
//! goes through the [`Environment`] trait. Production code uses
//! [`ProcessEnv`]; tests use [`VirtualEnv`].

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::file;
use crate::node::{Kind, Node};

/// A readable and writable set of environment variables.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;

    fn set_var(&mut self, key: &str, value: &str);
}

/// The real process environment.
///
/// Writing to it is only sound while no other thread reads or writes the
/// environment, so env files should be loaded at startup before any threads
/// are spawned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
    }

    fn set_var(&mut self, key: &str, value: &str) {
        // SAFETY: see the type-level docs; env ingestion runs before threads exist.
        unsafe { std::env::set_var(key, value) }
    }
}

/// An in-memory environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualEnv {
    vars: BTreeMap<String, String>,
}

impl VirtualEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VirtualEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Environment for VirtualEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set_var(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }
}

/// Where an environment value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvOrigin {
    /// Already defined before the env file was read.
    Shell,
    /// Injected from the env file.
    Dotenv,
}

impl fmt::Display for EnvOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvOrigin::Shell => f.write_str("env (shell)"),
            EnvOrigin::Dotenv => f.write_str("env (dotenv)"),
        }
    }
}

/// Outcome of ingesting one env file. Both lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DotenvReport {
    /// The env file this report describes.
    pub path: PathBuf,
    /// Keys injected from the file.
    pub applied: Vec<String>,
    /// Keys in the file that were left alone because the shell defined them.
    pub skipped: Vec<String>,
}

impl DotenvReport {
    /// Origin of `key` as far as this file is concerned, or `None` if the
    /// file did not mention it.
    pub fn origin(&self, key: &str) -> Option<EnvOrigin> {
        if self.applied.iter().any(|k| k == key) {
            Some(EnvOrigin::Dotenv)
        } else if self.skipped.iter().any(|k| k == key) {
            Some(EnvOrigin::Shell)
        } else {
            None
        }
    }
}

/// Ingest `path` into the process environment.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<DotenvReport, ConfigError> {
    load_env_file_into(path, &mut ProcessEnv)
}

/// Ingest `path` into `env`. Keys `env` already defines are skipped.
///
/// `$NAME` and `${NAME}` in unquoted or double-quoted values resolve against
/// `env` first, then against keys defined earlier in the file.
///
/// Errors if the file cannot be read, looks like YAML (a `.yaml`/`.yml`
/// extension, or content that parses as a YAML mapping), or is not valid
/// dotenv syntax. Nothing is written to `env` on error.
pub fn load_env_file_into<E: Environment + ?Sized>(
    path: impl AsRef<Path>,
    env: &mut E,
) -> Result<DotenvReport, ConfigError> {
    let path = path.as_ref();
    let content = file::read_bytes(path)?;

    if looks_structured(path, &content) {
        return Err(ConfigError::StructuredEnvFile {
            path: path.to_path_buf(),
        });
    }

    let parse_error = |source: dotenvy::Error| ConfigError::EnvFileParse {
        path: path.to_path_buf(),
        source,
    };
    let text = std::str::from_utf8(&content).map_err(|e| {
        parse_error(dotenvy::Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    })?;

    // dotenvy would resolve `$VAR` against the process environment, so the
    // substitution sites are masked before parsing and resolved against `env`.
    // Later lines win over earlier duplicates.
    let mut parsed = BTreeMap::new();
    for item in dotenvy::from_read_iter(mask_substitutions(text).as_bytes()) {
        let (key, masked) = item.map_err(parse_error)?;
        let value = expand(&masked, env, &parsed).map_err(parse_error)?;
        parsed.insert(key, value);
    }

    let mut report = DotenvReport {
        path: path.to_path_buf(),
        ..DotenvReport::default()
    };
    for (key, value) in parsed {
        if env.var(&key).is_some() {
            trace!(%key, "keeping shell value");
            report.skipped.push(key);
        } else {
            env.set_var(&key, &value);
            report.applied.push(key);
        }
    }

    debug!(
        path = %path.display(),
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        "loaded env file"
    );
    Ok(report)
}

/// Stands in for every `$` that starts a substitution.
const SUBSTITUTION: char = '\u{E000}';

/// Replace each `$` that dotenvy would treat as a substitution with
/// [`SUBSTITUTION`]. Single-quoted text, escaped `\$` and comments are left
/// as they are.
fn mask_substitutions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut strong = false;
    let mut weak = false;
    let mut escaped = false;
    let mut comment = false;
    let mut after_space = true;

    for c in text.chars() {
        if comment {
            comment = c != '\n';
        } else if escaped {
            escaped = false;
        } else if strong {
            strong = c != '\'';
        } else {
            match c {
                '$' => {
                    out.push(SUBSTITUTION);
                    after_space = false;
                    continue;
                }
                '\\' => escaped = true,
                '\'' if !weak => strong = true,
                '"' => weak = !weak,
                '#' if !weak && after_space => comment = true,
                _ => {}
            }
        }
        after_space = c.is_whitespace();
        out.push(c);
    }
    out
}

/// Resolve masked substitutions in a parsed value. Names are looked up in
/// `env` first, then among keys defined earlier in the same file; unknown
/// names expand to nothing. A marker not followed by a name stays a literal `$`.
fn expand<E: Environment + ?Sized>(
    value: &str,
    env: &E,
    earlier: &BTreeMap<String, String>,
) -> Result<String, dotenvy::Error> {
    if !value.contains(SUBSTITUTION) {
        return Ok(value.to_string());
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != SUBSTITUTION {
            out.push(c);
            continue;
        }

        let mut name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => name.push(c),
                    None => {
                        let line = value.replace(SUBSTITUTION, "$");
                        let at = line.len().saturating_sub(1);
                        return Err(dotenvy::Error::LineParse(line, at));
                    }
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
                name.push(c);
            }
            if name.is_empty() {
                out.push('$');
                continue;
            }
        }

        match env.var(&name).or_else(|| earlier.get(&name).cloned()) {
            Some(resolved) => out.push_str(&resolved),
            None => trace!(%name, "substitution of unset variable"),
        }
    }
    Ok(out)
}

fn looks_structured(path: &Path, content: &[u8]) -> bool {
    let yaml_ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if yaml_ext {
        return true;
    }
    matches!(
        serde_yaml::from_slice::<Value>(content),
        Ok(doc) if doc.kind() == Kind::Mapping
    )
}

/// Look up `name` in `env` and report where it came from. Empty values count
/// as unset.
pub fn env_value<E: Environment + ?Sized>(
    env: &E,
    report: &DotenvReport,
    name: &str,
) -> Option<(String, EnvOrigin)> {
    let value = env.var(name).filter(|v| !v.is_empty())?;
    let origin = match report.origin(name) {
        Some(EnvOrigin::Dotenv) => EnvOrigin::Dotenv,
        _ => EnvOrigin::Shell,
    };
    Some((value, origin))
}

/// Copy an environment listing into a sorted map.
///
/// Some platforms spell `PATH` as `Path`; it is normalized to `PATH`.
/// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
pub fn shell_env_map(vars: impl IntoIterator<Item = (String, String)>) -> BTreeMap<String, String> {
    vars.into_iter()
        .map(|(key, value)| {
            let key = if key == "Path" { "PATH".to_string() } else { key };
            (key, value)
        })
        .collect()
}

/// Overlay `overlay` on `base`. Overlay values replace base values, except
/// `PATH`, which is merged: overlay entries first, then base entries, each
/// directory kept once and empty entries dropped.
pub fn merge_env_maps(
    overlay: &BTreeMap<String, String>,
    base: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut out = base.clone();
    for (key, value) in overlay {
        let merged = match out.get(key) {
            Some(existing) if key == "PATH" && !existing.is_empty() => {
                join_path_lists(value, existing)
            }
            _ => None,
        };
        out.insert(key.clone(), merged.unwrap_or_else(|| value.clone()));
    }
    out
}

fn join_path_lists(high: &str, low: &str) -> Option<String> {
    let mut seen = Vec::new();
    for dir in std::env::split_paths(high).chain(std::env::split_paths(low)) {
        if !dir.as_os_str().is_empty() && !seen.contains(&dir) {
            seen.push(dir);
        }
    }
    std::env::join_paths(seen).ok()?.into_string().ok()
}
