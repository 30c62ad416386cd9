//! Configuration for pdfinator.
//!
//! A [`Config`] is built once (defaults, then an optional JSON file, then CLI
//! overrides) and passed by reference to every component. Nothing reads
//! process-wide state for directories or log sinks.
//!
//! # Examples
//!
//! ```
//! use pdfinator::config::Config;
//! use std::path::PathBuf;
//!
//! let config = Config::default();
//! assert_eq!(config.input_dir, PathBuf::from("./pdfs"));
//! assert_eq!(config.poll_interval_secs, 10);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{PdfinatorError, Result};
use crate::layout::OutputLayout;

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverwriteMode {
    /// Replace existing outputs (default).
    #[default]
    Force,
    /// Never overwrite, error if the file exists.
    NoClobber,
}

impl FromStr for OverwriteMode {
    type Err = PdfinatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "force" => Ok(Self::Force),
            "no-clobber" | "noclobber" => Ok(Self::NoClobber),
            _ => Err(PdfinatorError::invalid_config(format!(
                "Invalid overwrite mode: {s}. Must be one of: force, no-clobber"
            ))),
        }
    }
}

/// Complete configuration shared by every operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for input PDFs.
    pub input_dir: PathBuf,

    /// Directory receiving all outputs.
    pub output_dir: PathBuf,

    /// Directory receiving one log file per invocation.
    pub logs_dir: PathBuf,

    /// Newline-delimited registry of already handled inputs.
    pub registry_path: PathBuf,

    /// Seconds between two scans of the input directory.
    pub poll_interval_secs: u64,

    /// Walk sub-directories of the input directory.
    pub recursive: bool,

    /// What to do when an output file already exists.
    pub overwrite_mode: OverwriteMode,

    /// Passwords tried after the built-in candidates.
    pub extra_passwords: Vec<String>,

    /// Verbose console output.
    #[serde(skip)]
    pub verbose: bool,

    /// Suppress non-error console output.
    #[serde(skip)]
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./pdfs"),
            output_dir: PathBuf::from("./output"),
            logs_dir: PathBuf::from("./logs"),
            registry_path: PathBuf::from("processed.txt"),
            poll_interval_secs: 10,
            recursive: false,
            overwrite_mode: OverwriteMode::Force,
            extra_passwords: Vec::new(),
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file.
    ///
    /// Missing keys fall back to [`Config::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON for
    /// this structure.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                PdfinatorError::file_not_found(path.to_path_buf())
            } else {
                PdfinatorError::from(err)
            }
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The poll interval is zero
    /// - Verbose and quiet modes are both enabled
    /// - The registry path points at a directory
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(PdfinatorError::invalid_config(
                "Poll interval must be at least 1 second",
            ));
        }

        if self.verbose && self.quiet {
            return Err(PdfinatorError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if self.registry_path.is_dir() {
            return Err(PdfinatorError::invalid_config(format!(
                "Registry path is a directory: {}",
                self.registry_path.display()
            )));
        }

        Ok(())
    }

    /// Create the input, output and logs directories if missing.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.input_dir, &self.output_dir, &self.logs_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Interval between two watch ticks.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Output path policy derived from this configuration.
    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(self.output_dir.clone())
    }
}
