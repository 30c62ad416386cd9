//! Integration tests for page deletion, duplication and text extraction.

use pdfinator::edit::{PageEdit, PageEditor};
use pdfinator::error::PdfinatorError;
use pdfinator::extract::TextExtractor;

use crate::common::{Workspace, page_sequence};

#[tokio::test]
async fn test_delete_middle_page() {
    let workspace = Workspace::new();
    let source = workspace.add_pdf("doc.pdf", 4);

    let report = PageEditor::new(&workspace.config)
        .apply(&source, PageEdit::Delete(2))
        .await
        .unwrap();

    assert_eq!(report.output_path, workspace.output("doc (Page 2 Removed).pdf"));
    assert_eq!((report.pages_before, report.pages_after), (4, 3));
    assert_eq!(page_sequence(&report.output_path), vec![1, 3, 4]);
    // The source is left untouched
    assert_eq!(page_sequence(&source), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_duplicate_last_page() {
    let workspace = Workspace::new();
    let source = workspace.add_pdf("doc.pdf", 3);

    let report = PageEditor::new(&workspace.config)
        .apply(&source, PageEdit::Duplicate(3))
        .await
        .unwrap();

    assert_eq!(
        report.output_path,
        workspace.output("doc (Page 3 Duplicated).pdf")
    );
    assert_eq!(page_sequence(&report.output_path), vec![1, 2, 3, 3]);
}

#[tokio::test]
async fn test_edit_page_out_of_range() {
    let workspace = Workspace::new();
    let source = workspace.add_pdf("doc.pdf", 3);

    let err = PageEditor::new(&workspace.config)
        .apply(&source, PageEdit::Delete(4))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PdfinatorError::PageOutOfRange {
            page: 4,
            total_pages: 3
        }
    ));
    assert!(!workspace.output("doc (Page 4 Removed).pdf").exists());
}

#[tokio::test]
async fn test_delete_only_page() {
    let workspace = Workspace::new();
    let source = workspace.add_pdf("single.pdf", 1);

    let err = PageEditor::new(&workspace.config)
        .apply(&source, PageEdit::Delete(1))
        .await
        .unwrap_err();

    assert!(matches!(err, PdfinatorError::InvalidParameter { .. }));
}

#[tokio::test]
async fn test_extract_text() {
    let workspace = Workspace::new();
    let source = workspace.add_pdf("report.pdf", 2);

    let report = TextExtractor::new(&workspace.config)
        .extract_file(&source)
        .await
        .unwrap();

    assert_eq!(report.output_path, workspace.output("report - Text.txt"));
    assert_eq!(report.pages, 2);

    let text = std::fs::read_to_string(&report.output_path).unwrap();
    let header = "--- Page 1 ---";
    let first = text.find(header).unwrap();
    let second = text.find("--- Page 2 ---").unwrap();
    assert!(first < second);
    // The page body holds the text drawn on that page
    assert!(text[first + header.len()..second].contains("Page 1"));
    assert_eq!(report.chars, text.chars().count());
}
