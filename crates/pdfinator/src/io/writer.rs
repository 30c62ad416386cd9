//! PDF and text writing operations.
//!
//! Every output goes to a `<name>.tmp` sibling first and is renamed into
//! place once complete, so a crash never leaves a truncated output behind.
//! A temporary file whose write fails is removed again.
//!
//! # Examples
//!
//! ```no_run
//! use pdfinator::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(&doc, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::OverwriteMode;
use crate::error::{PdfinatorError, Result};
use crate::utils::format_file_size;

const BUFFER_SIZE: usize = 8192;

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Temporary sibling of an output file, removed unless committed.
struct PendingOutput {
    temp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl PendingOutput {
    /// Create the parent directory of `target` and pick the temporary path.
    fn new(target: &Path) -> Result<Self> {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PdfinatorError::FailedToCreateOutput {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut name = target.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");

        Ok(Self {
            temp: target.with_file_name(name),
            target: target.to_path_buf(),
            committed: false,
        })
    }

    fn write_error(&self, source: std::io::Error) -> PdfinatorError {
        PdfinatorError::FailedToWrite {
            path: self.temp.clone(),
            source,
        }
    }

    /// Move the finished temporary file over the target.
    fn commit(mut self) -> Result<()> {
        std::fs::rename(&self.temp, &self.target).map_err(|e| PdfinatorError::FailedToWrite {
            path: self.target.clone(),
            source: e,
        })?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PendingOutput {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.temp);
        }
    }
}

/// Output writer honoring an [`OverwriteMode`].
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    overwrite: OverwriteMode,
}

impl PdfWriter {
    /// Create a writer that replaces existing outputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer honoring the given overwrite mode.
    pub fn with_overwrite(overwrite: OverwriteMode) -> Self {
        Self { overwrite }
    }

    /// Compress and save a PDF document.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output exists and the writer is in no-clobber mode
    /// - The file cannot be created
    /// - Serialization fails
    pub async fn save(&self, doc: &Document, path: &Path) -> Result<WriteStatistics> {
        self.check_overwrite(path)?;

        let path_buf = path.to_path_buf();
        let mut doc = doc.clone();

        task::spawn_blocking(move || {
            let start = Instant::now();
            doc.compress();

            let pending = PendingOutput::new(&path_buf)?;
            let file = std::fs::File::create(&pending.temp).map_err(|e| {
                PdfinatorError::FailedToCreateOutput {
                    path: pending.temp.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::with_capacity(BUFFER_SIZE, file);
            doc.save_to(&mut writer)
                .map_err(|e| pending.write_error(std::io::Error::other(e)))?;
            writer.flush().map_err(|e| pending.write_error(e))?;
            drop(writer);

            pending.commit()?;

            Ok::<_, PdfinatorError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: std::fs::metadata(&path_buf).map(|m| m.len()).unwrap_or(0),
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| PdfinatorError::other(format!("Write task failed: {e}")))?
    }

    /// Write UTF-8 text to a file with the same overwrite rules.
    pub async fn write_text(&self, text: &str, path: &Path) -> Result<WriteStatistics> {
        self.check_overwrite(path)?;

        let start = Instant::now();
        let pending = PendingOutput::new(path)?;
        tokio::fs::write(&pending.temp, text.as_bytes())
            .await
            .map_err(|e| pending.write_error(e))?;
        pending.commit()?;

        Ok(WriteStatistics {
            write_time: start.elapsed(),
            file_size: text.len() as u64,
            output_path: path.to_path_buf(),
        })
    }

    /// Copy a file byte for byte.
    pub async fn copy_file(&self, source: &Path, path: &Path) -> Result<WriteStatistics> {
        self.check_overwrite(path)?;

        let start = Instant::now();
        let pending = PendingOutput::new(path)?;
        let file_size = tokio::fs::copy(source, &pending.temp)
            .await
            .map_err(|e| pending.write_error(e))?;
        pending.commit()?;

        Ok(WriteStatistics {
            write_time: start.elapsed(),
            file_size,
            output_path: path.to_path_buf(),
        })
    }

    fn check_overwrite(&self, path: &Path) -> Result<()> {
        if self.overwrite == OverwriteMode::NoClobber && path.exists() {
            return Err(PdfinatorError::output_exists(path.to_path_buf()));
        }
        Ok(())
    }
}
