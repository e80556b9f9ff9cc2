//! Clap adapter for propcfg.
//!
//! This module is the **optional integration layer** between the
//! framework-agnostic core and the [clap](https://docs.rs/clap) CLI parser.
//! It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! Two pieces embed into your clap `#[derive(Parser)]` struct:
//!
//! - [`LoadArgs`]: `--config`, `--env-file` and `--concurrency` flags,
//!   converted into a [`Loader`](crate::Loader) by [`LoadArgs::into_loader()`].
//! - [`ConfigArgs`]: `config list|get|query|set` subcommands, converted into
//!   a [`ConfigAction`](crate::ConfigAction) by [`ConfigArgs::into_action()`].
//!
//! From there, all logic flows through the clap-free
//! [`Loader::handle()`](crate::Loader::handle) API. If you use a different
//! CLI parser (or no CLI at all), skip this module and build those values
//! directly.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::builder::Loader;
use crate::types::ConfigAction;

/// Clap-derived flags controlling what gets loaded at startup.
#[derive(Debug, Args)]
pub struct LoadArgs {
    /// YAML config file. A missing file is treated as empty.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// `.env` file to ingest before loading the config. Shell values win.
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Enable concurrent execution: "", "true" or "1" enable, anything else disables.
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = "")]
    pub concurrency: Option<String>,
}

impl LoadArgs {
    /// Convert clap-parsed flags into a [`Loader`] over the process environment.
    pub fn into_loader(self) -> Loader {
        let mut loader = Loader::new();
        if let Some(path) = self.env_file {
            loader = loader.env_file(path);
        }
        if let Some(path) = self.config {
            loader = loader.config_file(path);
        }
        if let Some(raw) = self.concurrency {
            loader = loader.concurrency_flag(&raw);
        }
        loader
    }
}

/// Clap-derived args for the `config` subcommand group.
///
/// Embed this into your app's clap derive:
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
///
/// #[derive(Subcommand)]
/// enum Commands {
///     Config(ConfigArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigSubcommand>,
}

/// Available config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Show flattened configuration key-value pairs.
    List {
        /// Only keys equal to or nested under this dotted prefix.
        prefix: Option<String>,
    },
    /// Show the value of a flattened key.
    Get {
        /// Dotted key (e.g. "database.url"). Sequences are not indexed.
        key: String,
    },
    /// Show the value at a path in the config document.
    Query {
        /// Path with optional indices (e.g. "nodes[0].id").
        path: String,
    },
    /// Write a value at a path in the config file.
    Set {
        /// Path with optional indices (e.g. "nodes[0].id").
        path: String,
        /// Value to set. "true"/"false" and numbers are stored typed.
        value: String,
    },
}

impl ConfigArgs {
    /// Convert clap-parsed args into a framework-agnostic `ConfigAction`.
    ///
    /// Bare `config` (no subcommand) maps to `ConfigAction::List` with no prefix.
    pub fn into_action(self) -> ConfigAction {
        match self.action {
            None => ConfigAction::List { prefix: None },
            Some(ConfigSubcommand::List { prefix }) => ConfigAction::List { prefix },
            Some(ConfigSubcommand::Get { key }) => ConfigAction::Get { key },
            Some(ConfigSubcommand::Query { path }) => ConfigAction::Query { path },
            Some(ConfigSubcommand::Set { path, value }) => ConfigAction::Set { path, value },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    /// Wrapper so we can use `try_parse_from` on the subcommand.
    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        load: LoadArgs,
        #[command(flatten)]
        config: ConfigArgs,
    }

    fn parse(args: &[&str]) -> ConfigArgs {
        TestCli::try_parse_from(args).unwrap().config
    }

    fn parse_load(args: &[&str]) -> LoadArgs {
        TestCli::try_parse_from(args).unwrap().load
    }

    #[test]
    fn parse_bare_config_is_list() {
        let action = parse(&["test"]).into_action();
        assert_eq!(action, ConfigAction::List { prefix: None });
    }

    #[test]
    fn parse_explicit_list() {
        let action = parse(&["test", "list"]).into_action();
        assert_eq!(action, ConfigAction::List { prefix: None });
    }

    #[test]
    fn parse_list_with_prefix() {
        let action = parse(&["test", "list", "database"]).into_action();
        assert_eq!(
            action,
            ConfigAction::List {
                prefix: Some("database".into())
            }
        );
    }

    #[test]
    fn parse_get() {
        let action = parse(&["test", "get", "database.url"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Get {
                key: "database.url".into()
            }
        );
    }

    #[test]
    fn parse_query() {
        let action = parse(&["test", "query", "nodes[0].id"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Query {
                path: "nodes[0].id".into()
            }
        );
    }

    #[test]
    fn parse_set() {
        let action = parse(&["test", "set", "port", "3000"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Set {
                path: "port".into(),
                value: "3000".into(),
            }
        );
    }

    #[test]
    fn parse_set_indexed_path() {
        let action = parse(&["test", "set", "nodes[2].id", "parse"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Set {
                path: "nodes[2].id".into(),
                value: "parse".into(),
            }
        );
    }

    #[test]
    fn set_requires_value() {
        assert!(TestCli::try_parse_from(["test", "set", "port"]).is_err());
    }

    #[test]
    fn invalid_subcommand_errors() {
        assert!(TestCli::try_parse_from(["test", "nope"]).is_err());
    }

    #[test]
    fn load_flags_default_to_none() {
        let load = parse_load(&["test"]);
        assert!(load.config.is_none());
        assert!(load.env_file.is_none());
        assert!(load.concurrency.is_none());
    }

    #[test]
    fn load_flags_parse() {
        let load = parse_load(&[
            "test",
            "--config",
            "workflow.yaml",
            "--env-file",
            ".env",
            "--concurrency",
            "0",
        ]);
        assert_eq!(load.config, Some(PathBuf::from("workflow.yaml")));
        assert_eq!(load.env_file, Some(PathBuf::from(".env")));
        assert_eq!(load.concurrency.as_deref(), Some("0"));
    }

    #[test]
    fn bare_concurrency_flag_is_empty_value() {
        let load = parse_load(&["test", "list", "--concurrency"]);
        assert_eq!(load.concurrency.as_deref(), Some(""));
    }

    #[test]
    fn load_flags_after_subcommand() {
        let load = parse_load(&["test", "get", "port", "--config", "app.yaml"]);
        assert_eq!(load.config, Some(PathBuf::from("app.yaml")));
    }
}
