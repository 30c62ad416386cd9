//! Input directory scanning.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::error::{PdfinatorError, Result};
use crate::registry::identifier_for;

/// A PDF found in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Full path of the file.
    pub path: PathBuf,

    /// Registry identifier (relative path with `/` separators).
    pub id: String,

    /// Sub-directory of the input directory holding the file, if any.
    pub group: Option<PathBuf>,
}

/// Lists the PDFs of an input directory.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    input_dir: PathBuf,
    recursive: bool,
    excluded: Vec<PathBuf>,
}

impl DirectoryScanner {
    /// Create a scanner for `input_dir`.
    pub fn new(input_dir: PathBuf, recursive: bool) -> Self {
        Self {
            input_dir,
            recursive,
            excluded: Vec::new(),
        }
    }

    /// Never descend into `dir` (typically the output directory).
    pub fn excluding(mut self, dir: &Path) -> Self {
        self.excluded
            .push(dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf()));
        self
    }

    /// Scanned directory.
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// List every `*.pdf` file (case-insensitive), sorted by identifier.
    ///
    /// Hidden files and directories are skipped, and so are entries that
    /// vanish or cannot be read during the walk.
    ///
    /// # Errors
    ///
    /// Returns an error if the input directory does not exist.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        if !self.input_dir.is_dir() {
            return Err(PdfinatorError::file_not_found(self.input_dir.clone()));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(&self.input_dir)
            .min_depth(1)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry) && !self.is_excluded(entry));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {e}", self.input_dir.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_pdf(entry.path()) {
                continue;
            }

            let path = entry.into_path();
            let group = path
                .parent()
                .and_then(|parent| parent.strip_prefix(&self.input_dir).ok())
                .filter(|relative| !relative.as_os_str().is_empty())
                .map(Path::to_path_buf);

            files.push(ScannedFile {
                id: identifier_for(&self.input_dir, &path),
                path,
                group,
            });
        }

        files.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(files)
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if self.excluded.is_empty() || !entry.file_type().is_dir() {
            return false;
        }
        entry
            .path()
            .canonicalize()
            .map(|dir| self.excluded.contains(&dir))
            .unwrap_or(false)
    }
}

/// Whether `path` has a `.pdf` extension, ignoring case.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn is_hidden(entry: &DirEntry) -> bool {
    // The root itself may be `.` or a dot-named temp directory
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}
