//! Persistent set of already handled inputs.
//!
//! The registry is a plain text file with one identifier per line. It is read
//! wholesale and only ever appended to. Identifiers are paths relative to the
//! input directory with `/` separators, so a top-level file is recorded by its
//! bare file name.
//!
//! There is no locking: the watch loop is the only writer.

use std::collections::BTreeSet;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

use crate::error::{PdfinatorError, Result};

/// Identifier of `path` relative to `input_dir`.
///
/// Falls back to the full path when `path` is outside `input_dir`.
pub fn identifier_for(input_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(input_dir).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// The set of identifiers recorded in a registry file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedSet {
    path: PathBuf,
    entries: BTreeSet<String>,
}

impl ProcessedSet {
    /// Read the registry at `path`.
    ///
    /// A missing file is an empty set. Blank lines are ignored. Other lines
    /// are taken as they are, minus the line ending, since file names may
    /// start or end with spaces.
    ///
    /// # Errors
    ///
    /// Returns [`PdfinatorError::Registry`] if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let entries = match std::fs::read_to_string(path) {
            Ok(raw) => raw
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(source) => {
                return Err(PdfinatorError::Registry {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Record `id`, appending it to the registry file first.
    ///
    /// Marking an identifier that is already present does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PdfinatorError::Registry`] if the file cannot be appended to.
    /// The in-memory set is left unchanged in that case.
    pub fn mark_processed(&mut self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(PdfinatorError::invalid_parameter(
                "Processed-file identifier cannot be empty",
            ));
        }
        if id.contains(['\n', '\r']) {
            return Err(PdfinatorError::invalid_parameter(format!(
                "Processed-file identifier cannot span lines: {id:?}"
            )));
        }
        if self.entries.contains(id) {
            return Ok(());
        }

        self.append_line(id).map_err(|source| PdfinatorError::Registry {
            path: self.path.clone(),
            source,
        })?;
        self.entries.insert(id.to_string());
        Ok(())
    }

    fn append_line(&self, id: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        // A hand-edited file may lack its final newline
        if file.metadata()?.len() > 0 {
            let mut last = [0u8];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                file.write_all(b"\n")?;
            }
        }
        writeln!(file, "{id}")
    }

    /// Whether `id` has been handled.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains(id)
    }

    /// Number of recorded identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded identifiers in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Path of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
