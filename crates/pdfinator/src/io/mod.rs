//! I/O operations for pdfinator.
//!
//! This module is the only place that touches PDF files on disk:
//! - Loading PDF documents (and checking that inputs exist)
//! - Writing PDFs and text outputs atomically
//! - Copying unchanged inputs through
//!
//! # Examples
//!
//! ```no_run
//! use pdfinator::io::{PdfReader, PdfWriter};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let doc = reader.load(&PathBuf::from("input.pdf")).await?;
//!
//! let writer = PdfWriter::new();
//! writer.save(&doc.document, &PathBuf::from("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteStatistics};
