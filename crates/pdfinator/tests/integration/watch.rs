//! Integration tests for the watch loop.

use pdfinator::registry::ProcessedSet;
use pdfinator::watch::{ActionHandler, CountedTicker, Ticker, WatchAction, Watcher};
use std::path::PathBuf;

use crate::common::{Workspace, create_pdf};

/// Removes the input directory before the second pass and brings it back,
/// with a new file, before the third.
struct VanishingInput {
    input_dir: PathBuf,
    ticks: usize,
}

impl Ticker for VanishingInput {
    async fn tick(&mut self) -> bool {
        self.ticks += 1;
        match self.ticks {
            1 => {}
            2 => std::fs::remove_dir_all(&self.input_dir).unwrap(),
            3 => {
                std::fs::create_dir_all(&self.input_dir).unwrap();
                create_pdf(&self.input_dir.join("b.pdf"), 1);
            }
            _ => return false,
        }
        true
    }
}

#[tokio::test]
async fn test_each_file_is_handled_once() {
    let workspace = Workspace::new();
    workspace.add_pdf("a.pdf", 2);
    workspace.add_pdf("b.pdf", 3);

    let mut watcher = Watcher::new(&workspace.config);
    let mut handler = ActionHandler::new(
        WatchAction::Split { pages_per_split: 2 },
        &workspace.config,
    );

    let first = watcher.scan_once(&mut handler).await.unwrap();
    assert_eq!((first.found, first.processed, first.failed), (2, 2, 0));
    assert!(workspace.output("a/a - Part 1.pdf").exists());
    assert!(workspace.output("b/b - Part 2.pdf").exists());
    assert_eq!(workspace.registry_lines(), vec!["a.pdf", "b.pdf"]);

    let second = watcher.scan_once(&mut handler).await.unwrap();
    assert_eq!((second.found, second.attempted), (2, 0));
}

#[tokio::test]
async fn test_registry_survives_sessions() {
    let workspace = Workspace::new();
    workspace.add_pdf("a.pdf", 1);

    let mut handler = ActionHandler::new(WatchAction::ExtractText, &workspace.config);
    Watcher::new(&workspace.config)
        .scan_once(&mut handler)
        .await
        .unwrap();

    // A new session only sees the file added in between
    workspace.add_pdf("b.pdf", 1);
    let report = Watcher::new(&workspace.config)
        .scan_once(&mut handler)
        .await
        .unwrap();
    assert_eq!((report.attempted, report.processed), (1, 1));

    let registry = ProcessedSet::load(&workspace.config.registry_path).unwrap();
    assert!(registry.contains("a.pdf"));
    assert!(registry.contains("b.pdf"));
}

#[tokio::test]
async fn test_failed_file_is_not_recorded() {
    let workspace = Workspace::new();
    workspace.add_pdf("good.pdf", 2);
    std::fs::write(workspace.config.input_dir.join("broken.pdf"), b"not a pdf").unwrap();

    let mut watcher = Watcher::new(&workspace.config);
    let mut handler = ActionHandler::new(WatchAction::ExtractText, &workspace.config);

    let report = watcher.scan_once(&mut handler).await.unwrap();
    assert_eq!((report.processed, report.failed), (1, 1));
    assert_eq!(workspace.registry_lines(), vec!["good.pdf"]);

    // Not retried within the session
    let again = watcher.scan_once(&mut handler).await.unwrap();
    assert_eq!(again.attempted, 0);
}

#[tokio::test]
async fn test_recursive_scan_groups_outputs() {
    let mut workspace = Workspace::new();
    workspace.config.recursive = true;
    workspace.add_pdf("top.pdf", 1);
    workspace.add_pdf("invoices/march.pdf", 2);

    let mut handler = ActionHandler::new(
        WatchAction::Split { pages_per_split: 1 },
        &workspace.config,
    );
    let report = Watcher::new(&workspace.config)
        .scan_once(&mut handler)
        .await
        .unwrap();

    assert_eq!(report.processed, 2);
    assert!(workspace.output("top/top - Page 1.pdf").exists());
    assert!(workspace.output("invoices/march - Page 2.pdf").exists());
    assert_eq!(
        workspace.registry_lines(),
        vec!["invoices/march.pdf", "top.pdf"]
    );
}

#[tokio::test]
async fn test_non_recursive_scan_ignores_sub_directories() {
    let workspace = Workspace::new();
    workspace.add_pdf("top.pdf", 1);
    workspace.add_pdf("nested/deep.pdf", 1);

    let mut handler = ActionHandler::new(WatchAction::ExtractText, &workspace.config);
    let report = Watcher::new(&workspace.config)
        .scan_once(&mut handler)
        .await
        .unwrap();

    assert_eq!(report.found, 1);
    assert_eq!(workspace.registry_lines(), vec!["top.pdf"]);
}

#[tokio::test]
async fn test_run_stops_with_ticker() {
    let workspace = Workspace::new();
    workspace.add_pdf("a.pdf", 1);

    let mut handler = ActionHandler::new(WatchAction::ExtractText, &workspace.config);
    let summary = Watcher::new(&workspace.config)
        .run(
            CountedTicker::new(3),
            &mut handler,
            std::future::pending::<()>(),
        )
        .await
        .unwrap();

    assert_eq!(summary.ticks, 3);
    assert_eq!(summary.processed, 1);
    assert!(!summary.interrupted);
    assert!(workspace.output("a - Text.txt").exists());
}

#[tokio::test]
async fn test_run_honors_shutdown() {
    let workspace = Workspace::new();
    workspace.add_pdf("a.pdf", 1);

    let mut handler = ActionHandler::new(WatchAction::ExtractText, &workspace.config);
    let summary = Watcher::new(&workspace.config)
        .run(CountedTicker::new(3), &mut handler, std::future::ready(()))
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.processed, 0);
    assert!(workspace.registry_lines().is_empty());
}

#[tokio::test]
async fn test_names_with_surrounding_spaces_are_handled_once() {
    let workspace = Workspace::new();
    workspace.add_pdf(" lead.pdf", 1);
    workspace.add_pdf("report .pdf", 1);

    let mut handler = ActionHandler::new(WatchAction::ExtractText, &workspace.config);
    let summary = Watcher::new(&workspace.config)
        .run(
            CountedTicker::new(3),
            &mut handler,
            std::future::pending::<()>(),
        )
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(workspace.registry_lines(), vec![" lead.pdf", "report .pdf"]);
}

#[tokio::test]
async fn test_run_survives_missing_input_directory() {
    let workspace = Workspace::new();
    workspace.add_pdf("a.pdf", 1);

    let ticker = VanishingInput {
        input_dir: workspace.config.input_dir.clone(),
        ticks: 0,
    };
    let mut handler = ActionHandler::new(WatchAction::ExtractText, &workspace.config);
    let summary = Watcher::new(&workspace.config)
        .run(ticker, &mut handler, std::future::pending::<()>())
        .await
        .unwrap();

    assert_eq!(summary.ticks, 2);
    assert_eq!(summary.failed_passes, 1);
    assert_eq!(summary.processed, 2);
    assert_eq!(workspace.registry_lines(), vec!["a.pdf", "b.pdf"]);
    assert!(workspace.output("b - Text.txt").exists());
}
