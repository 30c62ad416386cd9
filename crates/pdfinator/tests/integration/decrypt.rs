//! Integration tests for decryption.

use pdfinator::config::OverwriteMode;
use pdfinator::decrypt::{BUILTIN_PASSWORDS, DecryptAttempter, Decryptor, SaveMethod};
use pdfinator::error::{ErrorKind, PdfinatorError};

use crate::common::{Workspace, page_sequence, page_text};

#[tokio::test]
async fn test_plain_file_is_copied_to_explicit_output() {
    let workspace = Workspace::new();
    let source = workspace.add_pdf("plain.pdf", 3);
    let output = workspace.output("copy.pdf");

    let report = Decryptor::new(&workspace.config)
        .decrypt_to(&source, Some("ignored"), &output)
        .await
        .unwrap();

    assert_eq!(report.method, SaveMethod::PassThrough);
    assert_eq!(report.password_index, None);
    assert_eq!(std::fs::read(&source).unwrap(), std::fs::read(&output).unwrap());
    assert_eq!(page_sequence(&output), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_builtin_password_unlocks_locked_file() {
    let workspace = Workspace::new();
    let source = workspace.add_encrypted_pdf("locked.pdf", 2, "admin", "owner");

    let report = Decryptor::new(&workspace.config)
        .decrypt_file(&source, None)
        .await
        .unwrap();

    assert_eq!(report.method, SaveMethod::Direct);
    assert_eq!(report.password_index, Some(3));
    assert_eq!(report.output_path, workspace.output("locked (Unlocked).pdf"));
    assert_eq!(page_sequence(&report.output_path), vec![1, 2]);
    assert!(page_text(&report.output_path, 1).contains("Page 1"));
    assert!(page_text(&report.output_path, 2).contains("Page 2"));
}

#[tokio::test]
async fn test_user_password_unlocks_locked_file() {
    let workspace = Workspace::new();
    let source = workspace.add_encrypted_pdf("locked.pdf", 1, "correct horse", "owner");

    let report = Decryptor::new(&workspace.config)
        .decrypt_file(&source, Some("correct horse"))
        .await
        .unwrap();

    assert_eq!(report.password_index, Some(0));
    assert!(page_text(&report.output_path, 1).contains("Page 1"));
}

#[tokio::test]
async fn test_owner_only_file_is_unlocked_once() {
    let workspace = Workspace::new();
    let source = workspace.add_encrypted_pdf("restricted.pdf", 2, "", "owner");

    let report = Decryptor::new(&workspace.config)
        .decrypt_file(&source, None)
        .await
        .unwrap();

    assert_eq!(report.method, SaveMethod::Direct);
    assert_eq!(report.password_index, Some(0));
    // Objects were already plain after loading and must not be decrypted twice
    assert!(page_text(&report.output_path, 1).contains("Page 1"));
    assert!(page_text(&report.output_path, 2).contains("Page 2"));
}

#[tokio::test]
async fn test_unknown_password_is_exhausted() {
    let workspace = Workspace::new();
    let source = workspace.add_encrypted_pdf("vault.pdf", 1, "not-on-any-list", "owner");

    let err = Decryptor::new(&workspace.config)
        .decrypt_file(&source, Some("wrong"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PdfinatorError::DecryptExhausted { tried: 8, .. }
    ));
    assert_eq!(err.kind(), ErrorKind::DecryptExhausted);
    assert!(!workspace.output("vault (Unlocked).pdf").exists());
    assert_eq!(std::fs::read_dir(&workspace.config.output_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_input() {
    let workspace = Workspace::new();
    let missing = workspace.config.input_dir.join("locked.pdf");

    let err = Decryptor::new(&workspace.config)
        .decrypt_file(&missing, None)
        .await
        .unwrap_err();

    assert!(matches!(err, PdfinatorError::FileNotFound { .. }));
    assert!(!workspace.output("locked (Unlocked).pdf").exists());
}

#[tokio::test]
async fn test_no_clobber_keeps_existing_output() {
    let mut workspace = Workspace::new();
    workspace.config.overwrite_mode = OverwriteMode::NoClobber;
    let source = workspace.add_pdf("plain.pdf", 1);
    let existing = workspace.output("plain (Unlocked).pdf");
    std::fs::write(&existing, b"previous run").unwrap();

    let err = Decryptor::new(&workspace.config)
        .decrypt_file(&source, None)
        .await
        .unwrap_err();

    assert!(matches!(err, PdfinatorError::OutputExists { .. }));
    assert_eq!(std::fs::read(&existing).unwrap(), b"previous run");
}

#[test]
fn test_candidates_from_config() {
    let mut workspace = Workspace::new();
    workspace.config.extra_passwords = vec!["office-2019".to_string()];

    let attempter = DecryptAttempter::new(Some("hunter2"), &workspace.config.extra_passwords);
    let candidates = attempter.candidates();

    assert_eq!(candidates[0], "hunter2");
    assert!(candidates.iter().any(|c| c == "office-2019"));
    assert_eq!(candidates.len(), BUILTIN_PASSWORDS.len() + 2);
}
