//! Output path policy.
//!
//! Operations that produce a single file write it flat into the output
//! directory. Operations that produce several files (splits) write them into a
//! sub-directory named after the source document.

use std::path::{Path, PathBuf};

/// Decides where every operation writes its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Create a layout rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root output directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for a single-file output.
    pub fn single_file(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Directory for the multi-file outputs of `source`.
    pub fn multi_file_dir(&self, source: &Path) -> PathBuf {
        self.root.join(file_stem(source))
    }

    /// Directory for multi-file outputs grouped under an explicit name.
    ///
    /// Used for inputs found in sub-directories, which share one folder.
    pub fn group_dir(&self, group: &Path) -> PathBuf {
        self.root.join(group)
    }

    /// Merge output: `(a)+(b).pdf`.
    pub fn merged(&self, sources: &[PathBuf]) -> PathBuf {
        let name = sources
            .iter()
            .map(|source| format!("({})", file_stem(source)))
            .collect::<Vec<_>>()
            .join("+");
        self.single_file(&format!("{name}.pdf"))
    }

    /// Page deletion output.
    pub fn page_removed(&self, source: &Path, page: u32) -> PathBuf {
        self.single_file(&format!("{} (Page {page} Removed).pdf", file_stem(source)))
    }

    /// Page duplication output.
    pub fn page_duplicated(&self, source: &Path, page: u32) -> PathBuf {
        self.single_file(&format!(
            "{} (Page {page} Duplicated).pdf",
            file_stem(source)
        ))
    }

    /// Text extraction output.
    pub fn text(&self, source: &Path) -> PathBuf {
        self.single_file(&format!("{} - Text.txt", file_stem(source)))
    }

    /// Decryption output.
    pub fn unlocked(&self, source: &Path) -> PathBuf {
        self.single_file(&format!("{} (Unlocked).pdf", file_stem(source)))
    }
}

/// File name of one split part.
///
/// Single-page parts are called pages, larger chunks are called parts.
pub fn split_part_name(source: &Path, index: usize, single_page: bool) -> String {
    let label = if single_page { "Page" } else { "Part" };
    format!("{} - {label} {index}.pdf", file_stem(source))
}

/// Base name of a path without its extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}
