//! Path-addressable access to loosely typed configuration.
//!
//! Propcfg loads a YAML config file and a `.env` file, flattens the config
//! into dotted keys, and reads or writes any nested value by a path such as
//! `nodes[0].inputs.retries`.
//!
//! ```no_run
//! use propcfg::Loader;
//!
//! let loaded = Loader::new()
//!     .env_file(".env")
//!     .config_file("workflow.yaml")
//!     .load()?;
//!
//! let name = loaded.config.get("name");
//! let first: String = loaded.config.query_as("nodes[0].id")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Paths
//!
//! A path is a dot-separated list of parts. Each part is an optional field
//! name followed by any number of `[N]` indices:
//!
//! | Path | Accessors |
//! |------|-----------|
//! | `a.b` | field `a`, field `b` |
//! | `a[0][1].b` | field `a`, index 0, index 1, field `b` |
//! | `[3]` | index 3 |
//!
//! Empty paths, empty parts (`a..b`), empty or non-numeric brackets and text
//! after a bracket (`a[1]b`) are rejected with a [`GrammarError`]. Indices
//! are capped at [`MAX_INDEX`] each. Parse once with [`PropertyPath::parse`] to
//! apply the same path to many trees.
//!
//! # Reading and writing trees
//!
//! The path engine works on any [`Node`]: [`serde_yaml::Value`] and
//! [`serde_json::Value`] out of the box. YAML tags (`!secret value`) are
//! looked through transparently.
//!
//! - [`get_property_by_path`] borrows the value at a path. Missing fields,
//!   short sequences and wrong container kinds are distinct [`PathError`]s.
//! - [`get_typed_property_by_path`] deserializes it into any
//!   `DeserializeOwned` type. There is no coercion between strings, numbers
//!   and booleans.
//! - [`set_property_by_path`] writes a value and returns the new root.
//!
//! Writes never fail on shape. Missing mappings are created, short sequences
//! are padded with null, and a node of the wrong kind is **replaced**:
//! writing `a[1]` into `{a: {b: 1}}` yields `{a: [null, value]}` and `b` is
//! gone. Check the shape first if that data matters.
//!
//! # Config files
//!
//! [`load_config`] reads a YAML document whose top level is a mapping and
//! flattens it. Nested mappings become dotted keys; sequences and scalars
//! are leaves. A missing file is an empty config, not an error.
//!
//! - [`Config::get`] returns the stringified value at an exact dotted key,
//!   or an empty string.
//! - [`Config::get_all`] returns everything under a prefix with the prefix
//!   stripped.
//! - [`Config::query`] runs the path engine on the nested document, for
//!   indexed access the flat map cannot offer.
//! - [`Config::env`], [`Config::secrets`] and [`Config::inputs`] expose the
//!   top-level `env`, `secrets` and `inputs` sections as string maps.
//!
//! A top-level string containing `=` fails the load with
//! [`ConfigError::SyntaxGuard`]; it almost always means `KEY=VALUE` lines
//! were pasted into YAML.
//!
//! Flat keys have no escaping. A literal key `"a.b"` and a nested `a: {b:}`
//! share the flat key `a.b`; use [`Config::query`] when that matters.
//!
//! # Env files
//!
//! [`load_env_file`] parses `KEY=VALUE` lines and injects keys the process
//! environment does not already define. The shell always wins. Files with a
//! `.yaml`/`.yml` extension, or whose content parses as a YAML mapping, are
//! rejected with [`ConfigError::StructuredEnvFile`].
//!
//! Everything goes through the [`Environment`] trait, so tests can use a
//! [`VirtualEnv`] instead of touching the real process environment. The
//! returned [`DotenvReport`] records which keys came from the file.
//!
//! # Operations and CLI
//!
//! [`ConfigAction`] describes `list`, `get`, `query` and `set` independently
//! of any CLI framework, and [`Config::handle`] / [`Loader::handle`] run it.
//! `set` writes back into the config file; comments in that file are not
//! preserved.
//!
//! For [clap](https://docs.rs/clap) users, the `cli` module (behind the
//! `clap` Cargo feature, on by default) provides [`LoadArgs`] and
//! [`ConfigArgs`]. To use propcfg without clap:
//!
//! ```toml
//! propcfg = { version = "...", default-features = false }
//! ```
//!
//! # Logging
//!
//! Propcfg emits [`tracing`](https://docs.rs/tracing) events (missing files,
//! env keys applied or skipped, sequence widening on write) and installs no
//! subscriber. Env values are never logged.

pub mod error;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod concurrency;
mod config;
mod env;
mod file;
mod flatten;
mod format;
mod node;
mod ops;
mod path;
mod persist;
mod walk;

pub use builder::{Loaded, Loader};
#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, ConfigSubcommand, LoadArgs};
pub use concurrency::{concurrency_enabled, parse_concurrency_flag, set_concurrency_enabled};
pub use config::{Config, load_config};
pub use env::{
    DotenvReport, EnvOrigin, Environment, ProcessEnv, VirtualEnv, env_value, load_env_file,
    load_env_file_into, merge_env_maps, shell_env_map,
};
pub use error::{ConfigError, GrammarError, PathError};
pub use flatten::{check_syntax, flatten};
pub use format::format_value;
pub use node::{Kind, Node};
pub use ops::ConfigResult;
pub use path::{Accessor, MAX_INDEX, PropertyPath};
pub use persist::{persist_value, set_in_document};
pub use types::ConfigAction;
pub use walk::{
    get_property_by_path, get_typed_property_by_path, set_property, set_property_by_path,
};
