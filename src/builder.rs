use std::path::PathBuf;

use tracing::debug;

use crate::concurrency;
use crate::config::Config;
use crate::env::{self, DotenvReport, EnvOrigin, Environment, ProcessEnv};
use crate::error::ConfigError;
use crate::ops::ConfigResult;
use crate::types::ConfigAction;

/// Builder for the startup sequence: env file first, then the config file.
///
/// The env file is ingested before the config is read so that anything
/// resolving env values afterwards sees both shell and file values.
///
/// ```no_run
/// use propcfg::Loader;
///
/// let loaded = Loader::new()
///     .env_file(".env")
///     .config_file("workflow.yaml")
///     .load()?;
/// println!("{}", loaded.config.get("name"));
/// # Ok::<(), propcfg::ConfigError>(())
/// ```
pub struct Loader<E: Environment = ProcessEnv> {
    config_file: Option<PathBuf>,
    env_file: Option<PathBuf>,
    concurrency: Option<String>,
    environment: E,
}

impl Loader<ProcessEnv> {
    pub fn new() -> Self {
        Self {
            config_file: None,
            env_file: None,
            concurrency: None,
            environment: ProcessEnv,
        }
    }
}

impl Default for Loader<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Environment> Loader<E> {
    /// The YAML config to load. A missing file yields an empty config.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// The `.env` file to ingest. Unlike the config file, it must exist.
    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Raw value of the concurrency flag, applied to the process-wide switch
    /// on [`load`](Self::load). See [`parse_concurrency_flag`](crate::parse_concurrency_flag).
    pub fn concurrency_flag(mut self, raw: &str) -> Self {
        self.concurrency = Some(raw.to_string());
        self
    }

    /// Ingest into `environment` instead of the process environment.
    pub fn environment<F: Environment>(self, environment: F) -> Loader<F> {
        Loader {
            config_file: self.config_file,
            env_file: self.env_file,
            concurrency: self.concurrency,
            environment,
        }
    }

    /// Run the startup sequence.
    pub fn load(self) -> Result<Loaded<E>, ConfigError> {
        let mut environment = self.environment;

        let dotenv = match &self.env_file {
            Some(path) => Some(env::load_env_file_into(path, &mut environment)?),
            None => None,
        };

        let config = match &self.config_file {
            Some(path) => Config::load(path)?,
            None => Config::empty(PathBuf::new()),
        };

        if let Some(raw) = &self.concurrency {
            let enabled = concurrency::parse_concurrency_flag(raw);
            debug!(enabled, "concurrency flag");
            concurrency::set_concurrency_enabled(enabled);
        }

        Ok(Loaded {
            config,
            dotenv,
            environment,
        })
    }

    /// Load, then handle a `ConfigAction` against the loaded config.
    pub fn handle(self, action: &ConfigAction) -> Result<ConfigResult, ConfigError> {
        let loaded = self.load()?;
        loaded.config.handle(action)
    }

    /// Load, handle a `ConfigAction` and print the result to stdout.
    pub fn handle_and_print(self, action: &ConfigAction) -> Result<(), ConfigError> {
        let result = self.handle(action)?;
        println!("{result}");
        Ok(())
    }
}

/// Everything the startup sequence produced.
#[derive(Debug)]
pub struct Loaded<E: Environment = ProcessEnv> {
    pub config: Config,
    /// Report for the env file, if one was configured.
    pub dotenv: Option<DotenvReport>,
    pub environment: E,
}

impl<E: Environment> Loaded<E> {
    /// Look up an env value and report whether it came from the shell or the
    /// env file.
    pub fn env_value(&self, name: &str) -> Option<(String, EnvOrigin)> {
        let empty = DotenvReport::default();
        let report = self.dotenv.as_ref().unwrap_or(&empty);
        env::env_value(&self.environment, report, name)
    }
}
