//! Integration tests for merging.

use pdfinator::config::OverwriteMode;
use pdfinator::error::{ErrorKind, PdfinatorError};
use pdfinator::merge::{Merger, merge_pdfs};

use crate::common::{Workspace, page_sequence, page_text};

#[tokio::test]
async fn test_merge_keeps_input_order() {
    let workspace = Workspace::new();
    let a = workspace.add_pdf("a.pdf", 2);
    let b = workspace.add_pdf("b.pdf", 3);

    let report = Merger::new(&workspace.config)
        .merge_files(&[b.clone(), a.clone()], None)
        .await
        .unwrap();

    assert_eq!(report.output_path, workspace.output("(b)+(a).pdf"));
    assert_eq!(report.total_pages, 5);
    assert!(!report.is_partial());
    assert_eq!(page_sequence(&report.output_path), vec![1, 2, 3, 1, 2]);
}

#[tokio::test]
async fn test_merge_same_file_twice() {
    let workspace = Workspace::new();
    let a = workspace.add_pdf("a.pdf", 2);

    let report = Merger::new(&workspace.config)
        .merge_files(&[a.clone(), a], None)
        .await
        .unwrap();

    assert_eq!(page_sequence(&report.output_path), vec![1, 2, 1, 2]);
}

#[tokio::test]
async fn test_merge_patterns() {
    let workspace = Workspace::new();
    workspace.add_pdf("scans/01.pdf", 1);
    workspace.add_pdf("scans/02.pdf", 2);
    workspace.add_pdf("scans/03.pdf", 1);

    let pattern = workspace
        .config
        .input_dir
        .join("scans/*.pdf")
        .to_string_lossy()
        .into_owned();
    let output = workspace.output("all.pdf");

    let report = merge_pdfs(&workspace.config, [pattern], Some(&output))
        .await
        .unwrap();

    assert_eq!(report.merged.len(), 3);
    assert_eq!(page_sequence(&output), vec![1, 1, 2, 1]);
}

#[tokio::test]
async fn test_partial_merge() {
    let workspace = Workspace::new();
    let a = workspace.add_pdf("a.pdf", 1);
    let b = workspace.add_pdf("b.pdf", 1);
    let missing = workspace.config.input_dir.join("missing.pdf");

    let report = Merger::new(&workspace.config)
        .merge_files(&[a, missing.clone(), b], None)
        .await
        .unwrap();

    assert!(report.is_partial());
    assert_eq!(report.skipped, vec![missing]);
    assert_eq!(report.total_pages, 2);
    assert!(report.output_path.exists());
}

#[tokio::test]
async fn test_merge_needs_two_existing_inputs() {
    let workspace = Workspace::new();
    let a = workspace.add_pdf("a.pdf", 1);
    let missing = workspace.config.input_dir.join("missing.pdf");

    let err = Merger::new(&workspace.config)
        .merge_files(&[a, missing], None)
        .await
        .unwrap_err();

    assert!(matches!(err, PdfinatorError::NotEnoughInputs { found: 1 }));
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[tokio::test]
async fn test_merge_no_clobber() {
    let mut workspace = Workspace::new();
    workspace.config.overwrite_mode = OverwriteMode::NoClobber;
    let a = workspace.add_pdf("a.pdf", 1);
    let b = workspace.add_pdf("b.pdf", 1);
    let output = workspace.output("taken.pdf");
    std::fs::write(&output, b"keep me").unwrap();

    let err = Merger::new(&workspace.config)
        .merge_files(&[a, b], Some(&output))
        .await
        .unwrap_err();

    assert!(matches!(err, PdfinatorError::OutputExists { .. }));
    assert_eq!(std::fs::read(&output).unwrap(), b"keep me");
}

#[tokio::test]
async fn test_merge_owner_protected_input_writes_plain_output() {
    let workspace = Workspace::new();
    let restricted = workspace.add_encrypted_pdf("restricted.pdf", 1, "", "owner");
    let plain = workspace.add_pdf("plain.pdf", 2);

    let report = Merger::new(&workspace.config)
        .merge_files(&[restricted, plain], None)
        .await
        .unwrap();

    assert_eq!(report.total_pages, 3);
    assert!(page_text(&report.output_path, 1).contains("Page 1"));
}
