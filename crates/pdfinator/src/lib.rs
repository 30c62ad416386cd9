//! pdfinator - Split, merge, edit, unlock and read PDF files.
//!
//! This library provides the operations behind the `pdfinator` tool:
//!
//! - Splitting a document into fixed-size chunks or single pages
//! - Merging several documents in order
//! - Deleting or duplicating a single page
//! - Extracting the text layer of every page
//! - Unlocking encrypted documents with a list of candidate passwords
//! - Watching an input directory and handling each new file once
//!
//! Every operation takes an explicit [`Config`] (or the pieces of it it needs)
//! and returns a [`Result`] whose error can be classified with
//! [`PdfinatorError::kind`].
//!
//! # Examples
//!
//! ## Split a document
//!
//! ```no_run
//! use pdfinator::config::Config;
//! use pdfinator::split::Splitter;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let report = Splitter::new(&config)
//!     .split_file(Path::new("pdfs/book.pdf"), 3)
//!     .await?;
//! println!("Wrote {} parts to {}", report.parts.len(), report.output_dir.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Merge documents
//!
//! ```no_run
//! use pdfinator::config::Config;
//! use pdfinator::merge::Merger;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let report = Merger::new(&config).merge_files(&inputs, None).await?;
//! if report.is_partial() {
//!     eprintln!("Skipped {} missing input(s)", report.skipped.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod decrypt;
pub mod edit;
pub mod error;
pub mod extract;
pub mod io;
pub mod layout;
pub mod logging;
pub mod merge;
pub mod output;
pub mod pages;
pub mod registry;
pub mod split;
pub mod utils;
pub mod watch;

// Re-export commonly used types
pub use config::{Config, OverwriteMode};
pub use error::{ErrorKind, PdfinatorError, Result};
pub use layout::OutputLayout;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
