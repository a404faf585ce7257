//! Configuration settings and validation.

use crate::mirror::CopyOptions;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Main configuration for treemirror.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the tree to watch.
    pub watch_dir: PathBuf,

    /// Flat directory that completed files are mirrored into.
    pub output_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON.
    pub log_json: bool,

    /// Leave truncated files in the output directory when a copy fails.
    pub keep_partial: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from("."),
            output_dir: PathBuf::from("./mirror"),
            log_level: "info".to_string(),
            log_json: false,
            keep_partial: false,
        }
    }
}

impl Config {
    /// Create a configuration for the given source and output directories.
    #[must_use]
    pub fn new(watch_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if the log level is unknown, either directory is
    /// missing or not a directory, or the output directory lies inside the
    /// watched tree.
    pub fn validate(&self) -> Result<()> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        let watch_dir = existing_dir("watch directory", &self.watch_dir)?;
        let output_dir = existing_dir("output directory", &self.output_dir)?;

        // Mirrored files would be observed again and collide with themselves
        if output_dir.starts_with(&watch_dir) {
            return Err(Error::config(format!(
                "output directory '{}' must not be inside watch directory '{}'",
                output_dir.display(),
                watch_dir.display()
            )));
        }

        Ok(())
    }

    /// Copy options derived from this configuration.
    #[must_use]
    pub const fn copy_options(&self) -> CopyOptions {
        CopyOptions {
            keep_partial: self.keep_partial,
        }
    }
}

/// Canonicalize `path`, requiring it to be an existing directory.
fn existing_dir(what: &str, path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .map_err(|e| Error::config(format!("{what} '{}': {e}", path.display())))?;

    if !canonical.is_dir() {
        return Err(Error::config(format!(
            "{what} '{}' is not a directory",
            path.display()
        )));
    }

    Ok(canonical)
}
