//! pdfinator - Split, merge, edit, unlock and extract text from PDF files.
//!
//! Runs one operation and exits, or watches the input directory and handles
//! every new PDF once.

mod cli;
mod menu;

use clap::Parser;
use std::future::Future;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info, warn};

use crate::cli::{Cli, Command, WatchArgs};
use crate::menu::MenuHandler;
use pdfinator::config::Config;
use pdfinator::decrypt::Decryptor;
use pdfinator::edit::{PageEdit, PageEditor};
use pdfinator::error::PdfinatorError;
use pdfinator::extract::TextExtractor;
use pdfinator::merge::merge_pdfs;
use pdfinator::output::{
    OutputFormatter, display_decrypt_report, display_edit_report, display_merge_report,
    display_split_report, display_text_report, display_watch_summary,
};
use pdfinator::registry::ProcessedSet;
use pdfinator::split::Splitter;
use pdfinator::watch::{
    ActionHandler, CountedTicker, DirectoryScanner, FileHandler, IntervalTicker, ScannedFile,
    WatchSummary, Watcher,
};

/// Exit code of a merge that skipped missing inputs.
const EXIT_PARTIAL: i32 = 7;

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Complete,
    Partial,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(Outcome::Complete) => {}
        Ok(Outcome::Partial) => process::exit(EXIT_PARTIAL),
        Err(err) => {
            // Once logging is up the console layer already shows errors
            if tracing::dispatcher::has_been_set() {
                error!("{err}");
            } else {
                eprintln!("Error: {err}");
            }
            process::exit(err.exit_code());
        }
    }
}

/// Main application logic.
async fn run(cli: Cli) -> Result<Outcome, PdfinatorError> {
    let config = cli.to_config()?;
    config.ensure_directories()?;

    let log_path = pdfinator::logging::init(&config)?;
    info!("{} v{} started", pdfinator::NAME, pdfinator::VERSION);

    let formatter = OutputFormatter::from_config(&config);
    formatter.debug(&format!("Logging to {}", log_path.display()));

    match cli.command {
        Command::Split {
            file,
            pages_per_split,
            extract_text,
        } => {
            let file = resolve_input(&config, &file);
            let report = Splitter::new(&config)
                .with_text_extraction(extract_text)
                .split_file(&file, pages_per_split)
                .await?;
            display_split_report(&formatter, &report);
        }
        Command::Merge { inputs, output } => {
            let report = merge_pdfs(&config, &inputs, output.as_deref()).await?;
            display_merge_report(&formatter, &report);
            if report.is_partial() {
                warn!(
                    "Partial merge: {} missing input(s) were skipped",
                    report.skipped.len()
                );
                return Ok(Outcome::Partial);
            }
        }
        Command::DeletePage { file, page } => {
            edit(&config, &formatter, &file, PageEdit::Delete(page)).await?;
        }
        Command::DuplicatePage { file, page } => {
            edit(&config, &formatter, &file, PageEdit::Duplicate(page)).await?;
        }
        Command::ExtractText { file, output } => {
            let file = resolve_input(&config, &file);
            let extractor = TextExtractor::new(&config);
            let report = match output {
                Some(output) => extractor.extract_to(&file, &output).await?,
                None => extractor.extract_file(&file).await?,
            };
            display_text_report(&formatter, &report);
        }
        Command::Decrypt {
            file,
            password,
            output,
        } => {
            let file = resolve_input(&config, &file);
            let decryptor = Decryptor::new(&config);
            let report = match output {
                Some(output) => {
                    decryptor
                        .decrypt_to(&file, password.as_deref(), &output)
                        .await?
                }
                None => decryptor.decrypt_file(&file, password.as_deref()).await?,
            };
            display_decrypt_report(&formatter, &report);
        }
        Command::List => list(&config, &formatter)?,
        Command::Watch(args) => {
            let summary = watch(&config, &formatter, &args).await?;
            display_watch_summary(&formatter, &summary);
        }
    }

    Ok(Outcome::Complete)
}

/// Use `path` as given if it exists, otherwise look for it in the input
/// directory.
fn resolve_input(config: &Config, path: &Path) -> PathBuf {
    if path.exists() || path.is_absolute() {
        return path.to_path_buf();
    }
    let candidate = config.input_dir.join(path);
    if candidate.exists() {
        candidate
    } else {
        path.to_path_buf()
    }
}

async fn edit(
    config: &Config,
    formatter: &OutputFormatter,
    file: &Path,
    edit: PageEdit,
) -> Result<(), PdfinatorError> {
    let file = resolve_input(config, file);
    let report = PageEditor::new(config).apply(&file, edit).await?;
    display_edit_report(formatter, &report);
    Ok(())
}

/// Print the PDFs under the input directory as a tree.
fn list(config: &Config, formatter: &OutputFormatter) -> Result<(), PdfinatorError> {
    let files = DirectoryScanner::new(config.input_dir.clone(), true)
        .excluding(&config.output_dir)
        .excluding(&config.logs_dir)
        .scan()?;
    let registry = ProcessedSet::load(&config.registry_path)?;

    formatter.section(&format!("{}/", config.input_dir.display()));
    if files.is_empty() {
        formatter.item("(no PDF files)");
        return Ok(());
    }
    for line in render_tree(&files, &registry) {
        formatter.item(&line);
    }
    formatter.blank_line();
    formatter.info(&format!(
        "{} PDF file(s), {} processed",
        files.len(),
        files.iter().filter(|f| registry.contains(&f.id)).count()
    ));
    Ok(())
}

/// One line per directory and file, indented by depth.
///
/// `files` must be sorted by identifier, as returned by the scanner.
fn render_tree(files: &[ScannedFile], registry: &ProcessedSet) -> Vec<String> {
    let mut lines = Vec::new();
    let mut open: Vec<&str> = Vec::new();

    for file in files {
        let mut parts: Vec<&str> = file.id.split('/').collect();
        let name = parts.pop().unwrap_or_default();

        let common = open
            .iter()
            .zip(&parts)
            .take_while(|(a, b)| a == b)
            .count();
        open.truncate(common);
        for dir in &parts[common..] {
            lines.push(format!("{}{dir}/", "  ".repeat(open.len())));
            open.push(*dir);
        }

        let marker = if registry.contains(&file.id) {
            " [processed]"
        } else {
            ""
        };
        lines.push(format!("{}{name}{marker}", "  ".repeat(open.len())));
    }

    lines
}

async fn watch(
    config: &Config,
    formatter: &OutputFormatter,
    args: &WatchArgs,
) -> Result<WatchSummary, PdfinatorError> {
    let mut watcher = Watcher::new(config);

    match args.watch_action() {
        Some(action) => {
            formatter.info(&format!(
                "Watching {} ({action}), press Ctrl-C to stop",
                config.input_dir.display()
            ));
            let mut handler = ActionHandler::new(action, config);
            drive(&mut watcher, &mut handler, config, args.once, ctrl_c()).await
        }
        None => {
            if !io::stdin().is_terminal() {
                warn!("Standard input is not a terminal, menu answers are read from it");
            }
            formatter.info(&format!("Watching {}", config.input_dir.display()));
            let mut handler = MenuHandler::new(io::stdin().lock(), io::stdout(), config);
            // Prompts block on stdin, so Ctrl-C keeps its default behavior
            drive(
                &mut watcher,
                &mut handler,
                config,
                args.once,
                std::future::pending::<()>(),
            )
            .await
        }
    }
}

async fn drive<H, S>(
    watcher: &mut Watcher,
    handler: &mut H,
    config: &Config,
    once: bool,
    shutdown: S,
) -> Result<WatchSummary, PdfinatorError>
where
    H: FileHandler,
    S: Future,
{
    if once {
        watcher.run(CountedTicker::once(), handler, shutdown).await
    } else {
        let ticker = IntervalTicker::new(config.poll_interval());
        watcher.run(ticker, handler, shutdown).await
    }
}

/// Completes on Ctrl-C. Never completes if the signal handler cannot be
/// installed.
async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
}
