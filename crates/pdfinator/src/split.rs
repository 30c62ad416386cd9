//! Splitting documents into fixed-size chunks.
//!
//! A [`SplitPlan`] partitions the pages `0..N` into consecutive ranges of `k`
//! pages, the last one possibly shorter. The [`Splitter`] materializes each
//! range as its own document inside `<output>/<stem>/`.

use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{PdfinatorError, Result};
use crate::extract;
use crate::io::{PdfReader, PdfWriter};
use crate::layout::{OutputLayout, split_part_name};
use crate::pages::PageAssembler;

/// Ordered, non-overlapping page ranges covering a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    ranges: Vec<Range<u32>>,
    pages_per_split: u32,
}

impl SplitPlan {
    /// Partition `total_pages` pages into chunks of `pages_per_split`.
    ///
    /// Range `i` covers the 0-based pages `[i*k, min((i+1)*k, N))`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfinatorError::InvalidChunkSize`] if `pages_per_split` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfinator::split::SplitPlan;
    ///
    /// let plan = SplitPlan::chunks(10, 3).unwrap();
    /// assert_eq!(plan.lengths(), vec![3, 3, 3, 1]);
    /// ```
    pub fn chunks(total_pages: u32, pages_per_split: usize) -> Result<Self> {
        if pages_per_split == 0 {
            return Err(PdfinatorError::InvalidChunkSize {
                value: pages_per_split,
            });
        }

        // Chunks larger than the document behave like a single chunk
        let k = u32::try_from(pages_per_split).unwrap_or(u32::MAX);
        let ranges = (0..total_pages.div_ceil(k))
            .map(|i| {
                let start = i * k;
                start..start.saturating_add(k).min(total_pages)
            })
            .collect();

        Ok(Self {
            ranges,
            pages_per_split: k,
        })
    }

    /// One range per page.
    pub fn single_pages(total_pages: u32) -> Self {
        Self {
            ranges: (0..total_pages).map(|i| i..i + 1).collect(),
            pages_per_split: 1,
        }
    }

    /// The 0-based, end-exclusive ranges in order.
    pub fn ranges(&self) -> &[Range<u32>] {
        &self.ranges
    }

    /// Number of output documents.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether the plan produces no output.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Length of every range.
    pub fn lengths(&self) -> Vec<u32> {
        self.ranges.iter().map(|r| r.end - r.start).collect()
    }

    /// Whether every part holds exactly one page.
    pub fn is_single_page(&self) -> bool {
        self.pages_per_split == 1
    }

    /// 1-indexed page numbers of a range.
    pub fn page_numbers(range: &Range<u32>) -> Vec<u32> {
        (range.start + 1..=range.end).collect()
    }
}

/// One written part of a split.
#[derive(Debug, Clone)]
pub struct SplitPart {
    /// 1-based part number.
    pub index: usize,

    /// 0-based page range copied into this part.
    pub range: Range<u32>,

    /// Written PDF.
    pub path: PathBuf,

    /// Written text file, when text extraction was requested.
    pub text_path: Option<PathBuf>,
}

/// Result of splitting one document.
#[derive(Debug, Clone)]
pub struct SplitReport {
    /// Source PDF.
    pub source: PathBuf,

    /// Directory that received the parts.
    pub output_dir: PathBuf,

    /// Parts in page order.
    pub parts: Vec<SplitPart>,
}

impl SplitReport {
    /// Total pages written across all parts.
    pub fn total_pages(&self) -> u32 {
        self.parts.iter().map(|p| p.range.end - p.range.start).sum()
    }
}

/// Splits PDF files into parts.
#[derive(Debug, Clone)]
pub struct Splitter {
    reader: PdfReader,
    writer: PdfWriter,
    assembler: PageAssembler,
    layout: OutputLayout,
    extract_text: bool,
}

impl Splitter {
    /// Create a splitter writing into the configured output directory.
    pub fn new(config: &Config) -> Self {
        Self {
            reader: PdfReader::new(),
            writer: PdfWriter::with_overwrite(config.overwrite_mode),
            assembler: PageAssembler::new(),
            layout: config.layout(),
            extract_text: false,
        }
    }

    /// Also write the text layer of every part into a `text/` sub-directory.
    pub fn with_text_extraction(mut self, extract_text: bool) -> Self {
        self.extract_text = extract_text;
        self
    }

    /// Split `path` into parts of `pages_per_split` pages under `<output>/<stem>/`.
    pub async fn split_file(&self, path: &Path, pages_per_split: usize) -> Result<SplitReport> {
        let output_dir = self.layout.multi_file_dir(path);
        self.split_into(path, pages_per_split, &output_dir).await
    }

    /// Split `path` into parts written inside `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `pages_per_split` is zero (checked before the input is opened)
    /// - The input cannot be loaded or has no pages
    /// - A part cannot be assembled or written
    pub async fn split_into(
        &self,
        path: &Path,
        pages_per_split: usize,
        output_dir: &Path,
    ) -> Result<SplitReport> {
        if pages_per_split == 0 {
            return Err(PdfinatorError::InvalidChunkSize {
                value: pages_per_split,
            });
        }

        let loaded = self.reader.load(path).await?;
        let plan = SplitPlan::chunks(loaded.page_count, pages_per_split)?;
        if plan.is_empty() {
            return Err(PdfinatorError::EmptyDocument {
                path: loaded.path.clone(),
            });
        }

        debug!(
            "Splitting {} ({} pages) into {} part(s)",
            path.display(),
            loaded.page_count,
            plan.len()
        );

        let mut parts = Vec::with_capacity(plan.len());
        for (i, range) in plan.ranges().iter().enumerate() {
            let index = i + 1;
            let document = self
                .assembler
                .assemble(&loaded.document, &SplitPlan::page_numbers(range))?;

            let part_path =
                output_dir.join(split_part_name(path, index, plan.is_single_page()));
            self.writer.save(&document, &part_path).await?;
            debug!("Saved part {} to {}", index, part_path.display());

            let text_path = if self.extract_text {
                let text_path = output_dir
                    .join("text")
                    .join(part_path.with_extension("txt").file_name().unwrap_or_default());
                let text = extract::render(&document, &part_path)?;
                self.writer.write_text(&text, &text_path).await?;
                Some(text_path)
            } else {
                None
            };

            parts.push(SplitPart {
                index,
                range: range.clone(),
                path: part_path,
                text_path,
            });
        }

        info!(
            "Split {} into {} part(s) in {}",
            path.display(),
            parts.len(),
            output_dir.display()
        );

        Ok(SplitReport {
            source: path.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            parts,
        })
    }
}
