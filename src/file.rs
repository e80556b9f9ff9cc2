//! Reading config and env files from disk.
//!
//! Missing files are not an error: the config loader treats an absent file as
//! an empty document, and callers decide what an absent env file means. Only
//! actual I/O errors (permissions, reading a directory, etc.) are propagated.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

/// Read `path` as UTF-8 text. Returns `Ok(None)` if the file does not exist.
pub fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "file not found, skipping");
            Ok(None)
        }
        Err(e) => Err(io_error(path, e)),
    }
}

/// Read `path` as raw bytes. A missing file is an error here.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path).map_err(|e| io_error(path, e))
}

/// Write `content` to `path`, creating parent directories as needed.
pub fn write(path: &Path, content: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| write_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> ConfigError {
    ConfigError::IoError {
        path: PathBuf::from(path),
        source,
    }
}

fn write_error(path: &Path, source: std::io::Error) -> ConfigError {
    ConfigError::WriteError {
        path: PathBuf::from(path),
        source,
    }
}
