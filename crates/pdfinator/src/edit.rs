//! Single-page edits: deleting or duplicating one page.
//!
//! Both edits are planned as an output page sequence first and then handed to
//! the [`PageAssembler`], so the source file is never modified.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::error::{PdfinatorError, Result};
use crate::io::{PdfReader, PdfWriter};
use crate::layout::OutputLayout;
use crate::pages::PageAssembler;

/// An edit applied to one 1-indexed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEdit {
    /// Remove the page.
    Delete(u32),
    /// Insert a copy of the page right after it.
    Duplicate(u32),
}

impl PageEdit {
    /// The page the edit targets.
    pub fn page(&self) -> u32 {
        match self {
            Self::Delete(page) | Self::Duplicate(page) => *page,
        }
    }

    /// Output page sequence for a document of `total_pages` pages.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The page is outside `1..=total_pages`
    /// - The edit would delete the only page
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfinator::edit::PageEdit;
    ///
    /// assert_eq!(PageEdit::Duplicate(2).plan(3).unwrap(), vec![1, 2, 2, 3]);
    /// assert_eq!(PageEdit::Delete(2).plan(3).unwrap(), vec![1, 3]);
    /// ```
    pub fn plan(&self, total_pages: u32) -> Result<Vec<u32>> {
        let page = self.page();
        if page == 0 || page > total_pages {
            return Err(PdfinatorError::PageOutOfRange { page, total_pages });
        }

        match self {
            Self::Delete(_) => {
                if total_pages == 1 {
                    return Err(PdfinatorError::invalid_parameter(
                        "Cannot delete the only page of a document",
                    ));
                }
                Ok((1..=total_pages).filter(|&p| p != page).collect())
            }
            Self::Duplicate(_) => {
                let mut sequence: Vec<u32> = (1..=total_pages).collect();
                sequence.insert(page as usize, page);
                Ok(sequence)
            }
        }
    }
}

impl fmt::Display for PageEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete(page) => write!(f, "delete page {page}"),
            Self::Duplicate(page) => write!(f, "duplicate page {page}"),
        }
    }
}

/// Result of a page edit.
#[derive(Debug, Clone)]
pub struct EditReport {
    /// Applied edit.
    pub edit: PageEdit,

    /// Written document.
    pub output_path: PathBuf,

    /// Pages before the edit.
    pub pages_before: u32,

    /// Pages after the edit.
    pub pages_after: u32,
}

/// Applies [`PageEdit`]s to PDF files.
#[derive(Debug, Clone)]
pub struct PageEditor {
    reader: PdfReader,
    writer: PdfWriter,
    assembler: PageAssembler,
    layout: OutputLayout,
}

impl PageEditor {
    /// Create an editor writing into the configured output directory.
    pub fn new(config: &Config) -> Self {
        Self {
            reader: PdfReader::new(),
            writer: PdfWriter::with_overwrite(config.overwrite_mode),
            assembler: PageAssembler::new(),
            layout: config.layout(),
        }
    }

    /// Apply `edit` to `path`.
    ///
    /// Writes `<stem> (Page n Removed).pdf` or `<stem> (Page n Duplicated).pdf`
    /// into the output directory.
    pub async fn apply(&self, path: &Path, edit: PageEdit) -> Result<EditReport> {
        let output_path = match edit {
            PageEdit::Delete(page) => self.layout.page_removed(path, page),
            PageEdit::Duplicate(page) => self.layout.page_duplicated(path, page),
        };
        self.apply_to(path, edit, &output_path).await
    }

    /// Apply `edit` to `path`, writing to an explicit output file.
    pub async fn apply_to(
        &self,
        path: &Path,
        edit: PageEdit,
        output_path: &Path,
    ) -> Result<EditReport> {
        let loaded = self.reader.load(path).await?;
        let sequence = edit.plan(loaded.page_count)?;

        let document = self.assembler.assemble(&loaded.document, &sequence)?;
        self.writer.save(&document, output_path).await?;

        info!(
            "Applied {} to {}, saved to {}",
            edit,
            path.display(),
            output_path.display()
        );

        Ok(EditReport {
            edit,
            output_path: output_path.to_path_buf(),
            pages_before: loaded.page_count,
            pages_after: sequence.len() as u32,
        })
    }
}
