//! Output formatting and display for pdfinator.
//!
//! This module handles all user-facing console output:
//! - Formatted status messages
//! - Per-operation summaries
//! - Quiet and verbose modes
//!
//! # Examples
//!
//! ```no_run
//! use pdfinator::output::OutputFormatter;
//! use pdfinator::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Watching ./pdfs");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::decrypt::{DecryptReport, SaveMethod};
use crate::edit::EditReport;
use crate::extract::TextReport;
use crate::merge::MergeReport;
use crate::split::SplitReport;
use crate::watch::WatchSummary;

/// Display the result of a split.
pub fn display_split_report(formatter: &OutputFormatter, report: &SplitReport) {
    formatter.success(&format!(
        "Split {} into {} part(s) in {}",
        report.source.display(),
        report.parts.len(),
        report.output_dir.display()
    ));

    for part in &report.parts {
        formatter.detail(
            &format!("Part {}", part.index),
            &format!(
                "pages {}-{} -> {}",
                part.range.start + 1,
                part.range.end,
                part.path.display()
            ),
        );
        if let Some(text_path) = &part.text_path {
            formatter.detail("  text", &text_path.display().to_string());
        }
    }
}

/// Display the result of a merge.
///
/// Skipped inputs are listed as warnings.
pub fn display_merge_report(formatter: &OutputFormatter, report: &MergeReport) {
    for skipped in &report.skipped {
        formatter.warning(&format!("Skipped missing input: {}", skipped.display()));
    }

    formatter.success(&format!(
        "Merged {} file(s) into {} ({} pages)",
        report.merged.len(),
        report.output_path.display(),
        report.total_pages
    ));
    formatter.detail("Input size", &report.format_input_size());
    formatter.detail("Output size", &report.write.format_file_size());
    formatter.detail("Time", &format!("{:.2}s", report.merge_time.as_secs_f64()));

    if report.is_partial() {
        formatter.warning(&format!(
            "Partial merge: {} input(s) were missing",
            report.skipped.len()
        ));
    }
}

/// Display the result of a page edit.
pub fn display_edit_report(formatter: &OutputFormatter, report: &EditReport) {
    formatter.success(&format!(
        "Applied {} ({} -> {} pages), saved to {}",
        report.edit,
        report.pages_before,
        report.pages_after,
        report.output_path.display()
    ));
}

/// Display the result of a text extraction.
pub fn display_text_report(formatter: &OutputFormatter, report: &TextReport) {
    formatter.success(&format!(
        "Extracted text of {} page(s) to {}",
        report.pages,
        report.output_path.display()
    ));
    formatter.detail("Characters", &report.chars.to_string());
}

/// Display the result of a decryption.
pub fn display_decrypt_report(formatter: &OutputFormatter, report: &DecryptReport) {
    let how = match report.method {
        SaveMethod::PassThrough => "not encrypted, copied unchanged".to_string(),
        SaveMethod::Direct => "unlocked".to_string(),
        SaveMethod::PageByPage { copied, total } => {
            format!("unlocked, rebuilt {copied} of {total} page(s)")
        }
    };

    formatter.success(&format!(
        "{}: {} -> {}",
        report.source.display(),
        how,
        report.output_path.display()
    ));

    if let SaveMethod::PageByPage { copied, total } = report.method {
        if copied < total {
            formatter.warning(&format!("{} page(s) could not be copied", total - copied));
        }
    }
}

/// Display the totals of a watch session.
pub fn display_watch_summary(formatter: &OutputFormatter, summary: &WatchSummary) {
    formatter.section("Watch summary");
    formatter.info(&format!("  Passes:    {}", summary.ticks));
    formatter.info(&format!("  Processed: {}", summary.processed));
    if summary.failed > 0 {
        formatter.warning(&format!("  Failed:    {}", summary.failed));
    }
    if summary.failed_passes > 0 {
        formatter.warning(&format!("  Failed passes: {}", summary.failed_passes));
    }
    if summary.interrupted {
        formatter.info("  Stopped by user");
    }
}
