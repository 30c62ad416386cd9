//! PDF merging operations.
//!
//! This module provides:
//! - Input ordering with reporting of missing files ([`MergePlan`])
//! - Document concatenation that preserves page order ([`Merger`])
//!
//! # Examples
//!
//! ```no_run
//! use pdfinator::merge::merge_pdfs;
//! use pdfinator::config::Config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let report = merge_pdfs(&config, &["scans/*.pdf"], None).await?;
//! println!("Merged {} pages", report.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod merger;
pub mod plan;

pub use merger::{MergeReport, Merger};
pub use plan::MergePlan;

use crate::config::Config;
use crate::error::Result;
use std::path::Path;

/// Merge the files matched by `patterns`, in pattern order.
///
/// Convenience function that expands the patterns, creates a merger and
/// performs the merge.
///
/// # Errors
///
/// Returns an error if a pattern is invalid or any merge step fails.
pub async fn merge_pdfs<T>(config: &Config, patterns: T, output: Option<&Path>) -> Result<MergeReport>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let plan = MergePlan::from_patterns(patterns)?;
    Merger::new(config).merge_plan(plan, output).await
}
