//! Text layer extraction.
//!
//! Reads the embedded text of every page in order and writes it to one flat
//! text file. No image OCR is performed. Each page is introduced by a
//! `--- Page i ---` header line.

use lopdf::Document;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{PdfinatorError, Result};
use crate::io::{PdfReader, PdfWriter};
use crate::layout::OutputLayout;

/// Anything that can report its page count and the text of one page.
pub trait TextSource {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Text layer of the 1-indexed `page`.
    fn page_text(&self, page: u32) -> Result<String>;
}

impl TextSource for Document {
    fn page_count(&self) -> u32 {
        self.get_pages().len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        Ok(self.extract_text(&[page])?)
    }
}

/// Format one page of extracted text.
pub fn format_page(page: u32, text: &str) -> String {
    format!("--- Page {page} ---\n{text}\n\n")
}

/// Extract every page of `source` into one string.
///
/// `path` only labels errors.
///
/// # Errors
///
/// The first page that fails aborts the whole extraction with
/// [`PdfinatorError::TextExtractionFailed`].
pub fn render<S: TextSource + ?Sized>(source: &S, path: &Path) -> Result<String> {
    let mut buffer = String::new();

    for page in 1..=source.page_count() {
        let text = source
            .page_text(page)
            .map_err(|e| PdfinatorError::TextExtractionFailed {
                path: path.to_path_buf(),
                page,
                reason: e.to_string(),
            })?;
        buffer.push_str(&format_page(page, &text));
    }

    Ok(buffer)
}

/// Result of extracting the text of one document.
#[derive(Debug, Clone)]
pub struct TextReport {
    /// Source PDF.
    pub source: PathBuf,

    /// Written text file.
    pub output_path: PathBuf,

    /// Number of pages read.
    pub pages: u32,

    /// Number of characters written.
    pub chars: usize,
}

/// Extracts text from PDF files into the output directory.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    reader: PdfReader,
    writer: PdfWriter,
    layout: OutputLayout,
}

impl TextExtractor {
    /// Create an extractor writing into the configured output directory.
    pub fn new(config: &Config) -> Self {
        Self {
            reader: PdfReader::new(),
            writer: PdfWriter::with_overwrite(config.overwrite_mode),
            layout: config.layout(),
        }
    }

    /// Extract the text of `path` into `<output>/<stem> - Text.txt`.
    pub async fn extract_file(&self, path: &Path) -> Result<TextReport> {
        let output_path = self.layout.text(path);
        self.extract_to(path, &output_path).await
    }

    /// Extract the text of `path` into an explicit output file.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be loaded, a page fails to
    /// extract, or the text file cannot be written. Nothing is written when
    /// extraction fails.
    pub async fn extract_to(&self, path: &Path, output_path: &Path) -> Result<TextReport> {
        let loaded = self.reader.load(path).await?;
        let pages = loaded.page_count;

        let source = loaded.path.clone();
        let text = task::spawn_blocking(move || render(&loaded.document, &loaded.path))
            .await
            .map_err(|e| PdfinatorError::other(format!("Extraction task failed: {e}")))??;

        debug!("Extracted {} characters from {}", text.len(), source.display());
        self.writer.write_text(&text, output_path).await?;
        info!(
            "Extracted text of {} page(s) from {} to {}",
            pages,
            source.display(),
            output_path.display()
        );

        Ok(TextReport {
            source,
            output_path: output_path.to_path_buf(),
            pages,
            chars: text.chars().count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_pdf;
    use tempfile::TempDir;

    struct FakeSource {
        pages: Vec<Option<&'static str>>,
    }

    impl TextSource for FakeSource {
        fn page_count(&self) -> u32 {
            self.pages.len() as u32
        }

        fn page_text(&self, page: u32) -> Result<String> {
            self.pages[page as usize - 1]
                .map(str::to_string)
                .ok_or_else(|| PdfinatorError::operation_failed("broken content stream"))
        }
    }

    #[test]
    fn test_render_adds_page_headers() {
        let source = FakeSource {
            pages: vec![Some("first"), Some(""), Some("third")],
        };

        let text = render(&source, Path::new("doc.pdf")).unwrap();
        assert_eq!(
            text,
            "--- Page 1 ---\nfirst\n\n--- Page 2 ---\n\n\n--- Page 3 ---\nthird\n\n"
        );
    }

    #[test]
    fn test_render_aborts_on_first_failure() {
        let source = FakeSource {
            pages: vec![Some("ok"), None, None],
        };

        let err = render(&source, Path::new("doc.pdf")).unwrap_err();
        assert!(matches!(
            err,
            PdfinatorError::TextExtractionFailed { page: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_extract_file_writes_text() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("letter.pdf");
        create_test_pdf(&input, 2);

        let config = Config {
            output_dir: temp_dir.path().join("output"),
            ..Config::default()
        };
        let report = TextExtractor::new(&config)
            .extract_file(&input)
            .await
            .unwrap();

        assert_eq!(report.pages, 2);
        assert_eq!(report.output_path, config.output_dir.join("letter - Text.txt"));

        let text = std::fs::read_to_string(&report.output_path).unwrap();
        assert!(text.starts_with("--- Page 1 ---\n"));
        assert!(text.contains("--- Page 2 ---\n"));
        assert!(text.contains("Page 2"));
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            output_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        let err = TextExtractor::new(&config)
            .extract_file(&temp_dir.path().join("missing.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, PdfinatorError::FileNotFound { .. }));
        assert!(!temp_dir.path().join("missing - Text.txt").exists());
    }
}
