//! Integration tests for splitting.

use pdfinator::error::PdfinatorError;
use pdfinator::split::Splitter;

use crate::common::{Workspace, page_sequence, page_text};

#[tokio::test]
async fn test_split_into_chunks() {
    let workspace = Workspace::new();
    let source = workspace.add_pdf("book.pdf", 10);

    let report = Splitter::new(&workspace.config)
        .split_file(&source, 3)
        .await
        .unwrap();

    assert_eq!(report.output_dir, workspace.output("book"));
    assert_eq!(report.parts.len(), 4);
    assert_eq!(report.total_pages(), 10);

    let sequences: Vec<Vec<u32>> = report
        .parts
        .iter()
        .map(|part| page_sequence(&part.path))
        .collect();
    assert_eq!(
        sequences,
        vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9], vec![10]]
    );
    assert!(workspace.output("book/book - Part 4.pdf").exists());
}

#[tokio::test]
async fn test_split_into_single_pages() {
    let workspace = Workspace::new();
    let source = workspace.add_pdf("letter.pdf", 3);

    let report = Splitter::new(&workspace.config)
        .split_file(&source, 1)
        .await
        .unwrap();

    for page in 1..=3 {
        let path = workspace.output(&format!("letter/letter - Page {page}.pdf"));
        assert_eq!(page_sequence(&path), vec![page]);
    }
    assert!(report.parts.iter().all(|part| part.text_path.is_none()));
}

#[tokio::test]
async fn test_split_larger_than_document() {
    let workspace = Workspace::new();
    let source = workspace.add_pdf("short.pdf", 2);

    let report = Splitter::new(&workspace.config)
        .split_file(&source, 50)
        .await
        .unwrap();

    assert_eq!(report.parts.len(), 1);
    assert_eq!(page_sequence(&report.parts[0].path), vec![1, 2]);
}

#[tokio::test]
async fn test_split_with_text() {
    let workspace = Workspace::new();
    let source = workspace.add_pdf("notes.pdf", 4);

    let report = Splitter::new(&workspace.config)
        .with_text_extraction(true)
        .split_file(&source, 2)
        .await
        .unwrap();

    let text_path = report.parts[1].text_path.as_ref().unwrap();
    assert!(text_path.starts_with(workspace.output("notes/text")));

    let text = std::fs::read_to_string(text_path).unwrap();
    assert!(text.contains("--- Page 1 ---"));
    assert!(text.contains("Page 3"));
}

#[tokio::test]
async fn test_split_zero_pages_per_part() {
    let workspace = Workspace::new();
    let source = workspace.add_pdf("book.pdf", 3);

    let err = Splitter::new(&workspace.config)
        .split_file(&source, 0)
        .await
        .unwrap_err();

    assert!(matches!(err, PdfinatorError::InvalidChunkSize { value: 0 }));
    assert!(!workspace.output("book").exists());
}

#[tokio::test]
async fn test_split_missing_file() {
    let workspace = Workspace::new();
    let missing = workspace.config.input_dir.join("missing.pdf");

    let err = Splitter::new(&workspace.config)
        .split_file(&missing, 2)
        .await
        .unwrap_err();

    assert!(matches!(err, PdfinatorError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_split_owner_protected_file_writes_plain_parts() {
    let workspace = Workspace::new();
    let source = workspace.add_encrypted_pdf("restricted.pdf", 2, "", "owner");

    let report = Splitter::new(&workspace.config)
        .split_file(&source, 1)
        .await
        .unwrap();

    assert_eq!(report.parts.len(), 2);
    assert_eq!(page_sequence(&report.parts[0].path), vec![1]);
    assert!(page_text(&report.parts[0].path, 1).contains("Page 1"));
    assert!(page_text(&report.parts[1].path, 1).contains("Page 2"));
}

#[tokio::test]
async fn test_split_locked_file_needs_password() {
    let workspace = Workspace::new();
    let source = workspace.add_encrypted_pdf("locked.pdf", 2, "admin", "owner");

    let err = Splitter::new(&workspace.config)
        .split_file(&source, 1)
        .await
        .unwrap_err();

    assert!(matches!(err, PdfinatorError::PasswordRequired { .. }));
    assert!(!workspace.output("locked").exists());
}
