//! Core PDF merging implementation.
//!
//! Appends the pages of every input, in order, to the page tree of the first
//! input. Object ids of later inputs are renumbered above the running maximum
//! so nothing collides.

use lopdf::{Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{PdfinatorError, Result};
use crate::io::{LoadedPdf, PdfReader, PdfWriter, WriteStatistics};
use crate::layout::OutputLayout;
use crate::merge::plan::MergePlan;
use crate::pages::{inherited_page_dictionary, root_pages_id};
use crate::utils::format_file_size;

/// Result of a merge operation.
#[derive(Debug, Clone)]
pub struct MergeReport {
    /// Written document.
    pub output_path: PathBuf,

    /// Inputs merged, in order.
    pub merged: Vec<PathBuf>,

    /// Requested inputs that did not exist.
    pub skipped: Vec<PathBuf>,

    /// Pages in the merged document.
    pub total_pages: u32,

    /// Total size of the merged inputs.
    pub input_size: u64,

    /// Time taken to load, merge and write.
    pub merge_time: Duration,

    /// Write statistics of the output.
    pub write: WriteStatistics,
}

impl MergeReport {
    /// Whether some requested inputs were missing.
    ///
    /// A partial merge still wrote its output.
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// PDF merger that combines multiple documents.
#[derive(Debug, Clone)]
pub struct Merger {
    reader: PdfReader,
    writer: PdfWriter,
    layout: OutputLayout,
}

impl Merger {
    /// Create a merger writing into the configured output directory.
    pub fn new(config: &Config) -> Self {
        Self {
            reader: PdfReader::new(),
            writer: PdfWriter::with_overwrite(config.overwrite_mode),
            layout: config.layout(),
        }
    }

    /// Merge `inputs` in order.
    ///
    /// The output defaults to `(<a>)+(<b>)....pdf` in the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Fewer than two inputs exist
    /// - An existing input cannot be loaded
    /// - The merged document cannot be written
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfinator::merge::Merger;
    /// # use pdfinator::config::Config;
    /// # use std::path::PathBuf;
    /// # async fn example(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    /// let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
    /// let report = Merger::new(&config).merge_files(&inputs, None).await?;
    /// println!("Merged {} pages", report.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn merge_files(
        &self,
        inputs: &[PathBuf],
        output: Option<&Path>,
    ) -> Result<MergeReport> {
        let plan = MergePlan::build(inputs)?;
        self.merge_plan(plan, output).await
    }

    /// Execute a prepared [`MergePlan`].
    pub async fn merge_plan(&self, plan: MergePlan, output: Option<&Path>) -> Result<MergeReport> {
        let merge_start = Instant::now();

        let mut loaded_pdfs = Vec::with_capacity(plan.inputs.len());
        for result in self.reader.load_sequential(&plan.inputs).await {
            loaded_pdfs.push(result?);
        }

        let document = self.merge_documents(&loaded_pdfs)?;
        let total_pages = document.get_pages().len() as u32;

        let output_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.layout.merged(&plan.inputs));
        let write = self.writer.save(&document, &output_path).await?;

        info!(
            "Merged {} file(s) ({} pages) into {}",
            loaded_pdfs.len(),
            total_pages,
            output_path.display()
        );

        Ok(MergeReport {
            output_path,
            input_size: loaded_pdfs.iter().map(|p| p.file_size).sum(),
            merged: plan.inputs,
            skipped: plan.skipped,
            total_pages,
            merge_time: merge_start.elapsed(),
            write,
        })
    }

    /// Concatenate loaded documents into one.
    ///
    /// # Errors
    ///
    /// Returns an error if `loaded_pdfs` is empty or a page tree is malformed.
    pub fn merge_documents(&self, loaded_pdfs: &[LoadedPdf]) -> Result<Document> {
        let Some((first, rest)) = loaded_pdfs.split_first() else {
            return Err(PdfinatorError::NotEnoughInputs { found: 0 });
        };

        // Start with the first document as base
        let mut merged = first.document.clone();
        let mut max_id = merged.max_id;
        let pages_id = root_pages_id(&merged)?;

        for loaded in rest {
            let mut doc = loaded.document.clone();

            // Renumber objects to avoid ID conflicts
            doc.renumber_objects_with(max_id + 1);
            max_id = doc.max_id;

            // Pages leave their own tree, so they take their inherited
            // attributes with them
            let mut page_ids = Vec::new();
            for page_id in doc.get_pages().into_values() {
                let mut page = inherited_page_dictionary(&doc, page_id)?;
                page.set("Parent", Object::Reference(pages_id));
                doc.objects.insert(page_id, Object::Dictionary(page));
                page_ids.push(page_id);
            }
            debug!(
                "Appending {} page(s) from {}",
                page_ids.len(),
                loaded.path.display()
            );

            merged.objects.extend(doc.objects);
            self.add_pages_to_tree(&mut merged, pages_id, &page_ids)?;
        }

        merged.max_id = max_id;
        merged.prune_objects();
        merged.renumber_objects();

        Ok(merged)
    }

    /// Add pages to the merged document's page tree.
    fn add_pages_to_tree(
        &self,
        merged: &mut Document,
        pages_id: ObjectId,
        page_ids: &[ObjectId],
    ) -> Result<()> {
        let pages_dict = merged.get_object_mut(pages_id).map_err(|e| {
            PdfinatorError::operation_failed(format!("Failed to get pages object: {e}"))
        })?;

        if let Object::Dictionary(dict) = pages_dict {
            let kids = dict.get_mut(b"Kids").map_err(|_| {
                PdfinatorError::operation_failed("Pages dictionary missing Kids array")
            })?;

            if let Object::Array(kids_array) = kids {
                for &page_id in page_ids {
                    kids_array.push(Object::Reference(page_id));
                }
            } else {
                return Err(PdfinatorError::operation_failed("Kids is not an array"));
            }

            let current_count = dict.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);
            dict.set("Count", Object::Integer(current_count + page_ids.len() as i64));
        } else {
            return Err(PdfinatorError::operation_failed(
                "Pages object is not a dictionary",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_test_document, create_test_pdf, page_sequence};
    use tempfile::TempDir;

    fn loaded(document: Document, name: &str) -> LoadedPdf {
        LoadedPdf {
            page_count: document.get_pages().len() as u32,
            encrypted: false,
            document,
            path: PathBuf::from(name),
            load_time: Duration::ZERO,
            file_size: 0,
        }
    }

    #[test]
    fn test_merge_documents_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            output_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        let merged = Merger::new(&config)
            .merge_documents(&[
                loaded(build_test_document(2), "a.pdf"),
                loaded(build_test_document(3), "b.pdf"),
            ])
            .unwrap();

        assert_eq!(page_sequence(&merged), vec![1, 2, 1, 2, 3]);
    }

    #[test]
    fn test_appended_pages_point_at_merged_tree() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            output_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        let merged = Merger::new(&config)
            .merge_documents(&[
                loaded(build_test_document(1), "a.pdf"),
                loaded(build_test_document(1), "b.pdf"),
            ])
            .unwrap();

        let pages_id = root_pages_id(&merged).unwrap();
        for page_id in merged.get_pages().into_values() {
            let page = merged.get_dictionary(page_id).unwrap();
            assert_eq!(page.get(b"Parent").unwrap().as_reference().unwrap(), pages_id);
        }
    }

    #[tokio::test]
    async fn test_merge_files_writes_default_name() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.pdf");
        let b = temp_dir.path().join("b.pdf");
        create_test_pdf(&a, 2);
        create_test_pdf(&b, 1);
        let config = Config {
            output_dir: temp_dir.path().join("output"),
            ..Config::default()
        };

        let report = Merger::new(&config)
            .merge_files(&[a, b], None)
            .await
            .unwrap();

        assert_eq!(report.output_path, config.output_dir.join("(a)+(b).pdf"));
        assert_eq!(report.total_pages, 3);
        assert!(!report.is_partial());

        let doc = Document::load(&report.output_path).unwrap();
        assert_eq!(page_sequence(&doc), vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_partial_merge_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.pdf");
        let missing = temp_dir.path().join("missing.pdf");
        let c = temp_dir.path().join("c.pdf");
        create_test_pdf(&a, 1);
        create_test_pdf(&c, 1);
        let output = temp_dir.path().join("joined.pdf");
        let config = Config::default();

        let report = Merger::new(&config)
            .merge_files(&[a, missing.clone(), c], Some(&output))
            .await
            .unwrap();

        assert!(report.is_partial());
        assert_eq!(report.skipped, vec![missing]);
        assert_eq!(report.total_pages, 2);
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_merge_single_input_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.pdf");
        create_test_pdf(&a, 1);
        let config = Config {
            output_dir: temp_dir.path().join("output"),
            ..Config::default()
        };

        let err = Merger::new(&config)
            .merge_files(&[a], None)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfinatorError::NotEnoughInputs { found: 1 }));
        assert!(!config.output_dir.exists());
    }
}
