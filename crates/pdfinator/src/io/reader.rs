//! PDF reading and loading operations.
//!
//! Loading runs on the blocking thread pool so the async watch loop stays
//! responsive while lopdf parses a large file.
//!
//! # Examples
//!
//! ```no_run
//! use pdfinator::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load(Path::new("document.pdf")).await?;
//! println!("Loaded {} pages in {:?}", loaded.page_count, loaded.load_time);
//! # Ok(())
//! # }
//! ```

use lopdf::xref::XrefEntry;
use lopdf::{Document, Object, ObjectId, Reader};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::debug;

use crate::error::{PdfinatorError, Result};

/// A loaded PDF document together with what we know about its source file.
#[derive(Debug, Clone)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: u32,

    /// Whether the source file carries an encryption dictionary.
    ///
    /// Stays true after a reader for ordinary operations has stripped the
    /// dictionary from [`LoadedPdf::document`].
    pub encrypted: bool,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

impl LoadedPdf {
    fn new(document: Document, path: PathBuf, encrypted: bool, load_time: Duration) -> Self {
        let page_count = document.get_pages().len() as u32;
        let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        Self {
            document,
            path,
            page_count,
            encrypted,
            load_time,
            file_size,
        }
    }
}

/// PDF reader with configurable loading behavior.
#[derive(Debug, Clone)]
pub struct PdfReader {
    /// Whether to reject documents without pages.
    verify: bool,

    /// Whether encrypted documents are handed out with their encryption
    /// dictionary in place.
    keep_encryption: bool,
}

impl PdfReader {
    /// Create a new PDF reader with default settings.
    ///
    /// Documents that open with an empty user password come back with their
    /// encryption dictionary removed, so anything assembled from them is
    /// written in the clear. Documents that need a real password are
    /// rejected with [`PdfinatorError::PasswordRequired`].
    pub fn new() -> Self {
        Self {
            verify: true,
            keep_encryption: false,
        }
    }

    /// Create the reader used for unlocking.
    ///
    /// Encrypted documents keep their encryption dictionary, and documents
    /// that need a password come back with their still-encrypted objects so
    /// a candidate password can decrypt them. Their page tree may be
    /// unusable until then, so empty documents are not rejected.
    pub fn for_decryption() -> Self {
        Self {
            verify: false,
            keep_encryption: true,
        }
    }

    /// Check that `path` exists and is a regular file.
    ///
    /// # Errors
    ///
    /// Returns [`PdfinatorError::FileNotFound`] or [`PdfinatorError::NotAFile`].
    pub fn check_path_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.try_exists()? {
            return Err(PdfinatorError::file_not_found(path.to_path_buf()));
        }

        if !path.is_file() {
            return Err(PdfinatorError::not_a_file(path.to_path_buf()));
        }

        Ok(())
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist or is a directory
    /// - File is not a valid PDF
    /// - PDF has no pages (unless built with [`PdfReader::for_decryption`])
    /// - PDF needs a password (unless built with [`PdfReader::for_decryption`])
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        Self::check_path_exists(path)?;

        let path_buf = path.to_path_buf();
        let verify = self.verify;
        let keep_encryption = self.keep_encryption;

        let loaded = task::spawn_blocking(move || {
            let start = Instant::now();

            let bytes = std::fs::read(&path_buf)?;
            let mut doc = Document::load_mem(&bytes).map_err(|e| {
                PdfinatorError::failed_to_load_pdf(path_buf.clone(), e.to_string())
            })?;

            let encrypted = doc.is_encrypted();
            if encrypted {
                if doc.encryption_state.is_some() {
                    // lopdf already decrypted every object with the empty user password
                    if !keep_encryption {
                        debug!("{} opens without a password", path_buf.display());
                        strip_encryption(&mut doc);
                    }
                } else if keep_encryption {
                    load_locked_objects(&mut doc, &bytes);
                } else {
                    return Err(PdfinatorError::PasswordRequired { path: path_buf });
                }
            }

            let loaded = LoadedPdf::new(doc, path_buf, encrypted, start.elapsed());

            if verify && loaded.page_count == 0 {
                return Err(PdfinatorError::EmptyDocument { path: loaded.path });
            }

            Ok::<_, PdfinatorError>(loaded)
        })
        .await
        .map_err(|e| PdfinatorError::other(format!("Load task failed: {e}")))??;

        debug!(
            "Loaded {} ({} pages, {} bytes) in {:?}",
            loaded.path.display(),
            loaded.page_count,
            loaded.file_size,
            loaded.load_time
        );

        Ok(loaded)
    }

    /// Load several documents in order, keeping each individual result.
    pub async fn load_sequential(&self, paths: &[PathBuf]) -> Vec<Result<LoadedPdf>> {
        let mut results = Vec::with_capacity(paths.len());

        for path in paths {
            results.push(self.load(path).await);
        }

        results
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop the encryption dictionary of a document whose objects are already in
/// the clear.
pub fn strip_encryption(doc: &mut Document) {
    if let Some(Object::Reference(id)) = doc.trailer.remove(b"Encrypt") {
        doc.objects.remove(&id);
    }
}

/// Parse the objects lopdf skips when the empty user password is rejected.
///
/// They stay encrypted; [`Document::decrypt`] turns them into plain objects
/// once a working password is known.
fn load_locked_objects(doc: &mut Document, bytes: &[u8]) {
    // Cross-reference offsets count from the header, as in `Reader::read`
    let start = bytes
        .windows(5)
        .position(|w| w == b"%PDF-")
        .unwrap_or(0);

    let ids: Vec<ObjectId> = doc
        .reference_table
        .entries
        .iter()
        .filter_map(|(&number, entry)| match entry {
            XrefEntry::Normal { generation, .. } => Some((number, *generation)),
            _ => None,
        })
        .collect();

    let reader = Reader {
        buffer: &bytes[start..],
        document: std::mem::take(doc),
        encryption_state: None,
        raw_objects: BTreeMap::new(),
    };

    let mut parsed = Vec::with_capacity(ids.len());
    for id in ids {
        match reader.get_object(id, &mut HashSet::new()) {
            Ok(object) => parsed.push((id, object)),
            Err(e) => debug!("Skipping locked object {} {}: {e}", id.0, id.1),
        }
    }

    *doc = reader.document;
    for (id, object) in parsed {
        doc.objects.entry(id).or_insert(object);
    }
}
